//! RDF Vocabulary Constants for the Fedora repository ecosystem
//!
//! This crate provides a centralized location for the RDF vocabulary IRIs and
//! namespace prefixes used throughout the migration tooling, along with the
//! server-managed predicate set that must be filtered from serialized output.
//!
//! # Organization
//!
//! Constants are organized by vocabulary:
//! - `rdf` - RDF vocabulary (http://www.w3.org/1999/02/22-rdf-syntax-ns#)
//! - `xsd` - XSD vocabulary (http://www.w3.org/2001/XMLSchema#)
//! - `ldp` - Linked Data Platform (http://www.w3.org/ns/ldp#)
//! - `fedora` - Fedora repository (http://fedora.info/definitions/v4/repository#)
//! - `memento` - Memento (http://mementoweb.org/ns#)
//! - `premis` - PREMIS preservation metadata (http://www.loc.gov/premis/rdf/v1#)
//! - `ebucore` - EBUCore (http://www.ebu.ch/metadata/ontologies/ebucore/ebucore#)
//! - `webac` - WebAC access control (http://fedora.info/definitions/v4/webac#)

/// RDF vocabulary constants
pub mod rdf {
    /// rdf: namespace IRI
    pub const NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";

    /// rdf:type IRI
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

    /// rdf:langString IRI
    pub const LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";

    /// rdf:first IRI (RDF list head)
    pub const FIRST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#first";

    /// rdf:rest IRI (RDF list tail)
    pub const REST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#rest";

    /// rdf:nil IRI (RDF list terminator)
    pub const NIL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#nil";
}

/// XSD vocabulary constants
pub mod xsd {
    /// xsd:string IRI
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

    /// xsd:integer IRI
    pub const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";

    /// xsd:decimal IRI
    pub const DECIMAL: &str = "http://www.w3.org/2001/XMLSchema#decimal";

    /// xsd:double IRI
    pub const DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";

    /// xsd:boolean IRI
    pub const BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";

    /// xsd:dateTime IRI
    pub const DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";

    /// xsd:long IRI
    pub const LONG: &str = "http://www.w3.org/2001/XMLSchema#long";
}

/// Linked Data Platform vocabulary constants
pub mod ldp {
    /// ldp: namespace IRI
    pub const NS: &str = "http://www.w3.org/ns/ldp#";

    /// ldp:RDFSource IRI
    pub const RDF_SOURCE: &str = "http://www.w3.org/ns/ldp#RDFSource";

    /// ldp:NonRDFSource IRI
    pub const NON_RDF_SOURCE: &str = "http://www.w3.org/ns/ldp#NonRDFSource";

    /// ldp:Container IRI
    pub const CONTAINER: &str = "http://www.w3.org/ns/ldp#Container";

    /// ldp:BasicContainer IRI
    pub const BASIC_CONTAINER: &str = "http://www.w3.org/ns/ldp#BasicContainer";

    /// ldp:DirectContainer IRI
    pub const DIRECT_CONTAINER: &str = "http://www.w3.org/ns/ldp#DirectContainer";

    /// ldp:IndirectContainer IRI
    pub const INDIRECT_CONTAINER: &str = "http://www.w3.org/ns/ldp#IndirectContainer";

    /// ldp:contains IRI
    pub const CONTAINS: &str = "http://www.w3.org/ns/ldp#contains";

    /// The closed set of concrete LDP container types.
    pub const CONTAINER_TYPES: [&str; 3] =
        [BASIC_CONTAINER, DIRECT_CONTAINER, INDIRECT_CONTAINER];
}

/// Fedora repository vocabulary constants
pub mod fedora {
    /// fedora: namespace IRI
    pub const NS: &str = "http://fedora.info/definitions/v4/repository#";

    /// fedora:created IRI
    pub const CREATED_DATE: &str = "http://fedora.info/definitions/v4/repository#created";

    /// fedora:createdBy IRI
    pub const CREATED_BY: &str = "http://fedora.info/definitions/v4/repository#createdBy";

    /// fedora:lastModified IRI
    pub const LAST_MODIFIED_DATE: &str =
        "http://fedora.info/definitions/v4/repository#lastModified";

    /// fedora:lastModifiedBy IRI
    pub const LAST_MODIFIED_BY: &str =
        "http://fedora.info/definitions/v4/repository#lastModifiedBy";

    /// fedora:NonRdfSourceDescription IRI
    pub const NON_RDF_SOURCE_DESCRIPTION: &str =
        "http://fedora.info/definitions/v4/repository#NonRdfSourceDescription";

    /// fedora:Version IRI
    pub const VERSION: &str = "http://fedora.info/definitions/v4/repository#Version";
}

/// Memento vocabulary constants
pub mod memento {
    /// memento: namespace IRI
    pub const NS: &str = "http://mementoweb.org/ns#";

    /// memento:Memento IRI
    pub const MEMENTO: &str = "http://mementoweb.org/ns#Memento";
}

/// PREMIS preservation vocabulary constants
pub mod premis {
    /// premis: namespace IRI
    pub const NS: &str = "http://www.loc.gov/premis/rdf/v1#";

    /// premis:hasFixity IRI
    pub const HAS_FIXITY: &str = "http://www.loc.gov/premis/rdf/v1#hasFixity";

    /// premis:hasMessageDigest IRI
    pub const HAS_MESSAGE_DIGEST: &str = "http://www.loc.gov/premis/rdf/v1#hasMessageDigest";

    /// premis:hasSize IRI
    pub const HAS_SIZE: &str = "http://www.loc.gov/premis/rdf/v1#hasSize";
}

/// EBUCore vocabulary constants
pub mod ebucore {
    /// ebucore: namespace IRI
    pub const NS: &str = "http://www.ebu.ch/metadata/ontologies/ebucore/ebucore#";

    /// ebucore:hasMimeType IRI
    pub const HAS_MIME_TYPE: &str =
        "http://www.ebu.ch/metadata/ontologies/ebucore/ebucore#hasMimeType";

    /// ebucore:filename IRI
    pub const FILENAME: &str =
        "http://www.ebu.ch/metadata/ontologies/ebucore/ebucore#filename";
}

/// WebAC access control vocabulary constants
pub mod webac {
    /// webac: namespace IRI
    pub const NS: &str = "http://fedora.info/definitions/v4/webac#";

    /// webac:Acl IRI
    pub const ACL: &str = "http://fedora.info/definitions/v4/webac#Acl";
}

/// Server-managed predicates outside the Fedora and Memento namespaces.
///
/// Fixity, containment, and binary technical metadata are re-derived by the
/// target repository and must never survive serialization.
pub const MANAGED_PREDICATES: [&str; 6] = [
    ldp::CONTAINS,
    premis::HAS_FIXITY,
    premis::HAS_MESSAGE_DIGEST,
    premis::HAS_SIZE,
    ebucore::HAS_MIME_TYPE,
    ebucore::FILENAME,
];

/// True if statements with this predicate are asserted by the repository
/// itself: anything in the Fedora or Memento namespaces, plus the fixed
/// managed-predicate set.
pub fn is_managed_predicate(predicate: &str) -> bool {
    predicate.starts_with(fedora::NS)
        || predicate.starts_with(memento::NS)
        || MANAGED_PREDICATES.contains(&predicate)
}

/// True if an `rdf:type` object IRI denotes a server-managed type (LDP or
/// Fedora namespace).
pub fn is_managed_type(type_iri: &str) -> bool {
    type_iri.starts_with(ldp::NS) || type_iri.starts_with(fedora::NS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn managed_predicates() {
        assert!(is_managed_predicate(ldp::CONTAINS));
        assert!(is_managed_predicate(premis::HAS_SIZE));
        assert!(is_managed_predicate(ebucore::FILENAME));
        assert!(is_managed_predicate(fedora::LAST_MODIFIED_DATE));
        assert!(is_managed_predicate("http://mementoweb.org/ns#mementoDatetime"));

        assert!(!is_managed_predicate("http://purl.org/dc/terms/title"));
        assert!(!is_managed_predicate(rdf::TYPE));
    }

    #[test]
    fn managed_types() {
        assert!(is_managed_type(ldp::BASIC_CONTAINER));
        assert!(is_managed_type(fedora::VERSION));
        assert!(!is_managed_type("http://xmlns.com/foaf/0.1/Person"));
        assert!(!is_managed_type(memento::MEMENTO));
    }

    #[test]
    fn container_type_set() {
        assert_eq!(ldp::CONTAINER_TYPES.len(), 3);
        assert!(ldp::CONTAINER_TYPES.contains(&ldp::BASIC_CONTAINER));
        assert!(!ldp::CONTAINER_TYPES.contains(&ldp::CONTAINER));
    }
}

//! RDF triple (statement)
//!
//! A triple represents a single RDF statement: subject-predicate-object.

use crate::Term;
use std::cmp::Ordering;

/// An RDF triple (subject-predicate-object)
///
/// # Invariants
///
/// - Subject can be IRI or blank node (not literal)
/// - Predicate must be IRI (not blank node or literal)
/// - Object can be IRI, blank node, or literal
///
/// These invariants are not enforced at construction time; the parser only
/// produces well-formed triples.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Triple {
    /// Subject (IRI or blank node)
    pub s: Term,
    /// Predicate (IRI only)
    pub p: Term,
    /// Object (IRI, blank node, or literal)
    pub o: Term,
}

impl Triple {
    /// Create a new triple
    pub fn new(s: Term, p: Term, o: Term) -> Self {
        Self { s, p, o }
    }

    /// Get the subject
    pub fn subject(&self) -> &Term {
        &self.s
    }

    /// Get the predicate
    pub fn predicate(&self) -> &Term {
        &self.p
    }

    /// Get the object
    pub fn object(&self) -> &Term {
        &self.o
    }

    /// Check if the predicate is rdf:type
    pub fn is_rdf_type(&self) -> bool {
        matches!(&self.p, Term::Iri(iri) if iri.as_ref() == fcrepo_vocab::rdf::TYPE)
    }
}

impl PartialOrd for Triple {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Triple {
    /// SPO ordering for deterministic output
    fn cmp(&self, other: &Self) -> Ordering {
        (&self.s, &self.p, &self.o).cmp(&(&other.s, &other.p, &other.o))
    }
}

impl std::fmt::Display for Triple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {} .", self.s, self.p, self.o)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triple_creation() {
        let t = Triple::new(
            Term::iri("http://example.org/alice"),
            Term::iri("http://xmlns.com/foaf/0.1/name"),
            Term::string("Alice"),
        );

        assert!(t.subject().is_iri());
        assert!(t.predicate().is_iri());
        assert!(t.object().is_literal());
    }

    #[test]
    fn test_is_rdf_type() {
        let type_triple = Triple::new(
            Term::iri("http://example.org/alice"),
            Term::iri(fcrepo_vocab::rdf::TYPE),
            Term::iri("http://xmlns.com/foaf/0.1/Person"),
        );
        assert!(type_triple.is_rdf_type());

        let other_triple = Triple::new(
            Term::iri("http://example.org/alice"),
            Term::iri("http://xmlns.com/foaf/0.1/name"),
            Term::string("Alice"),
        );
        assert!(!other_triple.is_rdf_type());
    }

    #[test]
    fn test_triple_ordering() {
        let t1 = Triple::new(
            Term::iri("http://a.org"),
            Term::iri("http://p.org"),
            Term::string("x"),
        );
        let t2 = Triple::new(
            Term::iri("http://a.org"),
            Term::iri("http://p.org"),
            Term::string("y"),
        );
        let t3 = Triple::new(
            Term::iri("http://b.org"),
            Term::iri("http://p.org"),
            Term::string("x"),
        );

        assert!(t1 < t2);
        assert!(t1 < t3);
        assert!(t2 < t3);
    }
}

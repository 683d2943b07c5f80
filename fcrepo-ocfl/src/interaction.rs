//! Fedora interaction models
//!
//! The interaction model of a resource governs how it is addressed by the
//! repository: the three concrete LDP container types, non-RDF sources and
//! their descriptions, and access-control lists.

use fcrepo_vocab::{fedora, ldp, webac};

/// The closed set of interaction models a migrated resource can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionModel {
    BasicContainer,
    DirectContainer,
    IndirectContainer,
    NonRdfSource,
    NonRdfSourceDescription,
    Acl,
}

impl InteractionModel {
    /// The IRI stored in resource headers for this model.
    pub fn as_iri(&self) -> &'static str {
        match self {
            InteractionModel::BasicContainer => ldp::BASIC_CONTAINER,
            InteractionModel::DirectContainer => ldp::DIRECT_CONTAINER,
            InteractionModel::IndirectContainer => ldp::INDIRECT_CONTAINER,
            InteractionModel::NonRdfSource => ldp::NON_RDF_SOURCE,
            InteractionModel::NonRdfSourceDescription => fedora::NON_RDF_SOURCE_DESCRIPTION,
            InteractionModel::Acl => webac::ACL,
        }
    }

    /// Look up a model by IRI. Returns `None` for IRIs that do not name an
    /// interaction model (e.g. `ldp:Container`, `ldp:RDFSource`).
    pub fn from_iri(iri: &str) -> Option<Self> {
        match iri {
            _ if iri == ldp::BASIC_CONTAINER => Some(InteractionModel::BasicContainer),
            _ if iri == ldp::DIRECT_CONTAINER => Some(InteractionModel::DirectContainer),
            _ if iri == ldp::INDIRECT_CONTAINER => Some(InteractionModel::IndirectContainer),
            _ if iri == ldp::NON_RDF_SOURCE => Some(InteractionModel::NonRdfSource),
            _ if iri == fedora::NON_RDF_SOURCE_DESCRIPTION => {
                Some(InteractionModel::NonRdfSourceDescription)
            }
            _ if iri == webac::ACL => Some(InteractionModel::Acl),
            _ => None,
        }
    }

    /// True for the three concrete LDP container models.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            InteractionModel::BasicContainer
                | InteractionModel::DirectContainer
                | InteractionModel::IndirectContainer
        )
    }
}

impl std::fmt::Display for InteractionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_iri())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iri_round_trip() {
        for model in [
            InteractionModel::BasicContainer,
            InteractionModel::DirectContainer,
            InteractionModel::IndirectContainer,
            InteractionModel::NonRdfSource,
            InteractionModel::NonRdfSourceDescription,
            InteractionModel::Acl,
        ] {
            assert_eq!(InteractionModel::from_iri(model.as_iri()), Some(model));
        }
    }

    #[test]
    fn abstract_ldp_types_are_not_models() {
        assert_eq!(InteractionModel::from_iri(ldp::CONTAINER), None);
        assert_eq!(InteractionModel::from_iri(ldp::RDF_SOURCE), None);
        assert_eq!(InteractionModel::from_iri("http://example.org/x"), None);
    }

    #[test]
    fn container_check() {
        assert!(InteractionModel::BasicContainer.is_container());
        assert!(InteractionModel::IndirectContainer.is_container());
        assert!(!InteractionModel::NonRdfSource.is_container());
        assert!(!InteractionModel::Acl.is_container());
    }
}

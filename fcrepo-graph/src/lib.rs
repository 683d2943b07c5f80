//! RDF graph model and syntax support for Fedora export migration
//!
//! This crate provides canonical types for representing RDF graphs
//! ([`Term`], [`Triple`], [`Graph`]), a Turtle parser, and an N-Triples
//! serializer.
//!
//! # Key Design Principles
//!
//! 1. **Expanded IRIs only** - All IRIs are stored in expanded form;
//!    prefixed names are resolved at parse time.
//!
//! 2. **Lexical fidelity** - Literals keep their source lexical form and an
//!    explicit datatype IRI. Plain strings use `xsd:string`, language-tagged
//!    strings use `rdf:langString`. Nothing is normalized, so values
//!    round-trip byte-for-byte.
//!
//! 3. **Document order** - The `Graph` type preserves statement order, which
//!    matters for multi-valued predicates. Call `sort()` for deterministic
//!    serialization.
//!
//! # Example
//!
//! ```
//! use fcrepo_graph::{parse, ntriples};
//!
//! let turtle = r#"
//!     @prefix ex: <http://example.org/> .
//!     ex:alice ex:name "Alice" .
//! "#;
//!
//! let graph = parse(turtle).unwrap();
//! assert_eq!(graph.len(), 1);
//!
//! let nt = ntriples::to_ntriples(&graph);
//! assert!(nt.contains("<http://example.org/alice>"));
//! ```

pub mod error;
mod graph;
pub mod lex;
pub mod ntriples;
pub mod parser;
mod term;
mod triple;

pub use error::{RdfError, Result};
pub use graph::Graph;
pub use parser::parse;
pub use term::{BlankId, Term};
pub use triple::Triple;

/// The RDF syntaxes accepted as migration input.
///
/// N-Triples is a syntactic subset of Turtle, so both formats are handled by
/// the same parser; the variant determines the file extension used to locate
/// documents in the export tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RdfFormat {
    /// Turtle (`.ttl`), the Fedora 5 export default
    #[default]
    Turtle,
    /// N-Triples (`.nt`)
    NTriples,
}

impl RdfFormat {
    /// The file extension (without dot) for documents in this syntax.
    pub fn extension(&self) -> &'static str {
        match self {
            RdfFormat::Turtle => "ttl",
            RdfFormat::NTriples => "nt",
        }
    }

    /// Look up a format by its conventional file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "ttl" => Some(RdfFormat::Turtle),
            "nt" => Some(RdfFormat::NTriples),
            _ => None,
        }
    }
}

impl std::fmt::Display for RdfFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RdfFormat::Turtle => write!(f, "Turtle"),
            RdfFormat::NTriples => write!(f, "N-Triples"),
        }
    }
}

/// Parse a document in the given syntax into a [`Graph`].
pub fn parse_document(input: &str, format: RdfFormat) -> Result<Graph> {
    // N-Triples documents are valid Turtle; one parser covers both
    let _ = format;
    parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_extensions() {
        assert_eq!(RdfFormat::Turtle.extension(), "ttl");
        assert_eq!(RdfFormat::NTriples.extension(), "nt");
        assert_eq!(RdfFormat::from_extension("ttl"), Some(RdfFormat::Turtle));
        assert_eq!(RdfFormat::from_extension("rdf"), None);
        assert_eq!(RdfFormat::default(), RdfFormat::Turtle);
    }

    #[test]
    fn parse_document_dispatch() {
        let nt = "<http://e.org/s> <http://e.org/p> \"o\" .\n";
        assert_eq!(parse_document(nt, RdfFormat::NTriples).unwrap().len(), 1);
        assert_eq!(parse_document(nt, RdfFormat::Turtle).unwrap().len(), 1);
    }
}

//! N-Triples serialization
//!
//! Canonical line-based output with proper literal escaping. This is the only
//! output syntax the migration produces; Fedora 6 stores resource RDF as
//! N-Triples.

use crate::{Graph, Term, Triple};
use fcrepo_vocab::xsd;

/// Escape special characters for an N-Triples string literal.
///
/// Handles `\` `"` newline, carriage return, tab, and other C0 control
/// characters (as `\u00XX`).
pub fn escape_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04X}", c as u32));
            }
            c => out.push(c),
        }
    }
    out
}

/// Format a single term in N-Triples syntax.
pub fn format_term(term: &Term) -> String {
    match term {
        Term::Iri(iri) => format!("<{}>", iri),
        Term::BlankNode(id) => format!("_:{}", id.as_str()),
        Term::Literal {
            lexical,
            datatype,
            language,
        } => {
            let escaped = escape_literal(lexical);
            if let Some(lang) = language {
                format!("\"{}\"@{}", escaped, lang)
            } else if datatype.as_ref() == xsd::STRING {
                format!("\"{}\"", escaped)
            } else {
                format!("\"{}\"^^<{}>", escaped, datatype)
            }
        }
    }
}

/// Format one triple as an N-Triples line (without the trailing newline).
pub fn format_triple(triple: &Triple) -> String {
    format!(
        "{} {} {} .",
        format_term(&triple.s),
        format_term(&triple.p),
        format_term(&triple.o)
    )
}

/// Serialize a whole graph, one line per triple, in graph order.
pub fn to_ntriples(graph: &Graph) -> String {
    let mut out = String::new();
    for triple in graph.iter() {
        out.push_str(&format_triple(triple));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_special_chars() {
        assert_eq!(escape_literal("hello"), "hello");
        assert_eq!(escape_literal("he said \"hi\""), "he said \\\"hi\\\"");
        assert_eq!(escape_literal("line1\nline2"), "line1\\nline2");
        assert_eq!(escape_literal("path\\to"), "path\\\\to");
        assert_eq!(escape_literal("a\tb"), "a\\tb");
        assert_eq!(escape_literal("\u{0001}"), "\\u0001");
    }

    #[test]
    fn format_terms() {
        assert_eq!(
            format_term(&Term::iri("http://e.org/a")),
            "<http://e.org/a>"
        );
        assert_eq!(format_term(&Term::blank("b0")), "_:b0");
        assert_eq!(format_term(&Term::string("plain")), "\"plain\"");
        assert_eq!(
            format_term(&Term::lang_string("bonjour", "fr")),
            "\"bonjour\"@fr"
        );
        assert_eq!(
            format_term(&Term::typed("42", xsd::INTEGER)),
            "\"42\"^^<http://www.w3.org/2001/XMLSchema#integer>"
        );
    }

    #[test]
    fn round_trip_through_parser() {
        let source = "<http://e.org/s> <http://e.org/p> \"a \\\"quoted\\\" value\\n\" .\n";
        let graph = crate::parse(source).unwrap();
        assert_eq!(to_ntriples(&graph), source);
    }
}

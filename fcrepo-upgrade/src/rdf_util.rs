//! RDF utilities for the migration
//!
//! Parsing, server-managed triple filtering, identifier translation, and the
//! typed predicate extractors the header synthesis relies on.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use fcrepo_graph::{ntriples, Graph, RdfFormat, Term, Triple};
use tracing::trace;

use crate::error::{Result, UpgradeError};

/// Parse an RDF document from disk.
///
/// An unreadable file is an I/O error; an unparseable document is
/// `SourceCorrupt` naming the path.
pub fn parse_rdf(path: &Path, format: RdfFormat) -> Result<Graph> {
    let content = fs::read_to_string(path)?;
    fcrepo_graph::parse_document(&content, format).map_err(|e| {
        UpgradeError::source_corrupt(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Serialize a graph as N-Triples, dropping server-managed triples and
/// translating subject/object identifiers.
///
/// URIs beginning with `original` have that prefix replaced by `replacement`
/// and trailing slashes stripped. Lines are sorted so output is
/// deterministic regardless of statement order.
pub fn write_rdf_translate_ids(graph: &Graph, original: &str, replacement: &str) -> Vec<u8> {
    let mut lines: Vec<String> = graph
        .iter()
        .filter(|t| !is_server_managed_triple(t))
        .map(|t| {
            let translated = Triple::new(
                translate_id(&t.s, original, replacement),
                t.p.clone(),
                translate_id(&t.o, original, replacement),
            );
            ntriples::format_triple(&translated)
        })
        .collect();

    lines.sort();

    let mut out = String::new();
    for line in lines {
        out.push_str(&line);
        out.push('\n');
    }
    out.into_bytes()
}

/// Returns the first object, as a string, that matches the predicate.
pub fn get_first_value(predicate: &str, graph: &Graph) -> Option<String> {
    graph
        .with_predicate(predicate)
        .find_map(|t| t.o.lexical())
        .map(String::from)
}

/// Returns the first object, parsed as a UTC instant, that matches the
/// predicate. A malformed date literal is `SourceCorrupt`.
pub fn get_date_value(predicate: &str, graph: &Graph) -> Result<Option<DateTime<Utc>>> {
    match get_first_value(predicate, graph) {
        None => Ok(None),
        Some(value) => DateTime::parse_from_rfc3339(&value)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|e| {
                UpgradeError::source_corrupt(format!("invalid date literal '{value}': {e}"))
            }),
    }
}

/// Returns all of the objects, as URI strings, that match the predicate, in
/// document order.
pub fn get_uris(predicate: &str, graph: &Graph) -> Vec<String> {
    graph
        .with_predicate(predicate)
        .map(|t| t.o.value_str().to_string())
        .collect()
}

fn is_server_managed_triple(triple: &Triple) -> bool {
    is_managed_type(triple)
        || matches!(&triple.p, Term::Iri(p) if fcrepo_vocab::is_managed_predicate(p))
}

fn is_managed_type(triple: &Triple) -> bool {
    triple.is_rdf_type()
        && matches!(&triple.o, Term::Iri(o) if fcrepo_vocab::is_managed_type(o))
}

fn translate_id(term: &Term, original: &str, replacement: &str) -> Term {
    if let Term::Iri(iri) = term {
        if iri.starts_with(original) {
            let swapped = iri.replacen(original, replacement, 1);
            let translated = swapped.trim_end_matches('/');
            trace!("Translating {} to {}", iri, translated);
            return Term::iri(translated);
        }
    }
    term.clone()
}

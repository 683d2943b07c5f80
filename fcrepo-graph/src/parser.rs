//! Turtle parser
//!
//! Recursive-descent parser over the token stream produced by [`crate::lex`].
//! Builds a [`Graph`] with fully expanded IRIs; prefixed names are resolved
//! against the document's prefix declarations and relative IRIs against its
//! base. N-Triples documents are a syntactic subset and parse unchanged.

use std::collections::HashMap;

use fcrepo_vocab::{rdf, xsd};

use crate::error::{RdfError, Result};
use crate::lex::{tokenize, Token, TokenKind};
use crate::{Graph, Term};

/// Parse a Turtle document into a [`Graph`].
pub fn parse(input: &str) -> Result<Graph> {
    Parser::new(input)?.parse_document()
}

/// Turtle parser state.
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    graph: Graph,
    prefixes: HashMap<String, String>,
    base: Option<String>,
    blank_counter: usize,
}

impl Parser {
    fn new(input: &str) -> Result<Self> {
        Ok(Self {
            tokens: tokenize(input)?,
            pos: 0,
            graph: Graph::new(),
            prefixes: HashMap::new(),
            base: None,
            blank_counter: 0,
        })
    }

    fn parse_document(mut self) -> Result<Graph> {
        while !matches!(self.peek(), TokenKind::Eof) {
            match self.peek() {
                TokenKind::PrefixDirective => self.parse_prefix_directive()?,
                TokenKind::BaseDirective => self.parse_base_directive()?,
                _ => {
                    self.parse_triples()?;
                    self.expect_dot()?;
                }
            }
        }
        self.graph.base = self.base.clone();
        Ok(self.graph)
    }

    // =========================================================================
    // Token stream helpers
    // =========================================================================

    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    fn peek_pos(&self) -> usize {
        self.tokens[self.pos].pos
    }

    fn advance(&mut self) -> TokenKind {
        let kind = self.tokens[self.pos].kind.clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        kind
    }

    fn expect_dot(&mut self) -> Result<()> {
        match self.advance() {
            TokenKind::Dot => Ok(()),
            other => Err(RdfError::parse(
                self.peek_pos(),
                format!("expected '.' but found {:?}", other),
            )),
        }
    }

    // =========================================================================
    // Directives
    // =========================================================================

    fn parse_prefix_directive(&mut self) -> Result<()> {
        self.advance(); // @prefix / PREFIX

        let prefix = match self.advance() {
            TokenKind::PrefixedName { prefix, local } if local.is_empty() => prefix,
            other => {
                return Err(RdfError::parse(
                    self.peek_pos(),
                    format!("expected prefix declaration but found {:?}", other),
                ))
            }
        };

        let namespace = match self.advance() {
            TokenKind::Iri(iri) => iri,
            other => {
                return Err(RdfError::parse(
                    self.peek_pos(),
                    format!("expected namespace IRI but found {:?}", other),
                ))
            }
        };

        self.prefixes.insert(prefix.clone(), namespace.clone());
        self.graph.add_prefix(prefix, namespace);

        // '@prefix' requires a terminating dot; SPARQL-style 'PREFIX' omits it
        if matches!(self.peek(), TokenKind::Dot) {
            self.advance();
        }
        Ok(())
    }

    fn parse_base_directive(&mut self) -> Result<()> {
        self.advance(); // @base / BASE

        match self.advance() {
            TokenKind::Iri(iri) => self.base = Some(iri),
            other => {
                return Err(RdfError::parse(
                    self.peek_pos(),
                    format!("expected base IRI but found {:?}", other),
                ))
            }
        }

        if matches!(self.peek(), TokenKind::Dot) {
            self.advance();
        }
        Ok(())
    }

    // =========================================================================
    // Triples
    // =========================================================================

    fn parse_triples(&mut self) -> Result<()> {
        let subject = match self.peek() {
            TokenKind::LBracket => {
                let node = self.parse_blank_node_property_list()?;
                // A bare property list may stand alone as a statement
                if matches!(self.peek(), TokenKind::Dot) {
                    return Ok(());
                }
                node
            }
            TokenKind::LParen => self.parse_collection()?,
            _ => self.parse_subject()?,
        };

        self.parse_predicate_object_list(&subject)
    }

    fn parse_subject(&mut self) -> Result<Term> {
        let pos = self.peek_pos();
        match self.advance() {
            TokenKind::Iri(iri) => Ok(Term::iri(self.resolve_iri(&iri))),
            TokenKind::PrefixedName { prefix, local } => self.expand_prefixed(&prefix, &local),
            TokenKind::BlankNodeLabel(label) => Ok(Term::blank(label)),
            other => Err(RdfError::parse(
                pos,
                format!("expected subject but found {:?}", other),
            )),
        }
    }

    fn parse_predicate_object_list(&mut self, subject: &Term) -> Result<()> {
        loop {
            let predicate = self.parse_verb()?;
            self.parse_object_list(subject, &predicate)?;

            if matches!(self.peek(), TokenKind::Semicolon) {
                while matches!(self.peek(), TokenKind::Semicolon) {
                    self.advance();
                }
                // A trailing ';' before the statement terminator is legal
                if matches!(
                    self.peek(),
                    TokenKind::Dot | TokenKind::RBracket | TokenKind::Eof
                ) {
                    return Ok(());
                }
                continue;
            }
            return Ok(());
        }
    }

    fn parse_verb(&mut self) -> Result<Term> {
        let pos = self.peek_pos();
        match self.advance() {
            TokenKind::A => Ok(Term::iri(rdf::TYPE)),
            TokenKind::Iri(iri) => Ok(Term::iri(self.resolve_iri(&iri))),
            TokenKind::PrefixedName { prefix, local } => self.expand_prefixed(&prefix, &local),
            other => Err(RdfError::parse(
                pos,
                format!("expected predicate but found {:?}", other),
            )),
        }
    }

    fn parse_object_list(&mut self, subject: &Term, predicate: &Term) -> Result<()> {
        loop {
            let object = self.parse_object()?;
            self.graph
                .add_triple(subject.clone(), predicate.clone(), object);

            if matches!(self.peek(), TokenKind::Comma) {
                self.advance();
                continue;
            }
            return Ok(());
        }
    }

    fn parse_object(&mut self) -> Result<Term> {
        let pos = self.peek_pos();
        match self.peek().clone() {
            TokenKind::LBracket => self.parse_blank_node_property_list(),
            TokenKind::LParen => self.parse_collection(),
            TokenKind::Iri(iri) => {
                self.advance();
                Ok(Term::iri(self.resolve_iri(&iri)))
            }
            TokenKind::PrefixedName { prefix, local } => {
                self.advance();
                self.expand_prefixed(&prefix, &local)
            }
            TokenKind::BlankNodeLabel(label) => {
                self.advance();
                Ok(Term::blank(label))
            }
            TokenKind::StringLiteral(value) => {
                self.advance();
                self.parse_literal_suffix(value)
            }
            TokenKind::Integer(text) => {
                self.advance();
                Ok(Term::typed(text, xsd::INTEGER))
            }
            TokenKind::Decimal(text) => {
                self.advance();
                Ok(Term::typed(text, xsd::DECIMAL))
            }
            TokenKind::Double(text) => {
                self.advance();
                Ok(Term::typed(text, xsd::DOUBLE))
            }
            TokenKind::Boolean(value) => {
                self.advance();
                Ok(Term::typed(if value { "true" } else { "false" }, xsd::BOOLEAN))
            }
            other => Err(RdfError::parse(
                pos,
                format!("expected object but found {:?}", other),
            )),
        }
    }

    /// Optional `@lang` or `^^datatype` after a string literal.
    fn parse_literal_suffix(&mut self, value: String) -> Result<Term> {
        match self.peek().clone() {
            TokenKind::LangTag(lang) => {
                self.advance();
                Ok(Term::lang_string(value, lang))
            }
            TokenKind::DoubleCaret => {
                self.advance();
                let pos = self.peek_pos();
                let datatype = match self.advance() {
                    TokenKind::Iri(iri) => self.resolve_iri(&iri),
                    TokenKind::PrefixedName { prefix, local } => {
                        match self.expand_prefixed(&prefix, &local)? {
                            Term::Iri(iri) => iri.to_string(),
                            _ => unreachable!("expand_prefixed only returns IRIs"),
                        }
                    }
                    other => {
                        return Err(RdfError::parse(
                            pos,
                            format!("expected datatype IRI but found {:?}", other),
                        ))
                    }
                };
                Ok(Term::typed(value, datatype))
            }
            _ => Ok(Term::string(value)),
        }
    }

    /// `[ ... ]` — anonymous node, optionally with its own properties.
    fn parse_blank_node_property_list(&mut self) -> Result<Term> {
        self.advance(); // '['
        let node = self.fresh_blank();

        if matches!(self.peek(), TokenKind::RBracket) {
            self.advance();
            return Ok(node);
        }

        self.parse_predicate_object_list(&node)?;

        match self.advance() {
            TokenKind::RBracket => Ok(node),
            other => Err(RdfError::parse(
                self.peek_pos(),
                format!("expected ']' but found {:?}", other),
            )),
        }
    }

    /// `( ... )` — RDF collection, expanded to rdf:first / rdf:rest chains.
    fn parse_collection(&mut self) -> Result<Term> {
        self.advance(); // '('
        let mut items = Vec::new();

        while !matches!(self.peek(), TokenKind::RParen) {
            if matches!(self.peek(), TokenKind::Eof) {
                return Err(RdfError::parse(self.peek_pos(), "unterminated collection"));
            }
            items.push(self.parse_object()?);
        }
        self.advance(); // ')'

        if items.is_empty() {
            return Ok(Term::iri(rdf::NIL));
        }

        let nodes: Vec<Term> = items.iter().map(|_| self.fresh_blank()).collect();
        for (i, item) in items.into_iter().enumerate() {
            self.graph
                .add_triple(nodes[i].clone(), Term::iri(rdf::FIRST), item);
            let rest = if i + 1 < nodes.len() {
                nodes[i + 1].clone()
            } else {
                Term::iri(rdf::NIL)
            };
            self.graph
                .add_triple(nodes[i].clone(), Term::iri(rdf::REST), rest);
        }

        Ok(nodes[0].clone())
    }

    // =========================================================================
    // IRI resolution
    // =========================================================================

    fn expand_prefixed(&self, prefix: &str, local: &str) -> Result<Term> {
        let namespace = self
            .prefixes
            .get(prefix)
            .ok_or_else(|| RdfError::UndefinedPrefix(prefix.to_string()))?;
        Ok(Term::iri(format!("{}{}", namespace, local)))
    }

    fn resolve_iri(&self, iri: &str) -> String {
        if has_scheme(iri) {
            return iri.to_string();
        }

        let Some(base) = &self.base else {
            return iri.to_string();
        };

        if iri.is_empty() {
            return base.clone();
        }

        if let Some(fragment) = iri.strip_prefix('#') {
            let stem = base.split('#').next().unwrap_or(base);
            return format!("{}#{}", stem, fragment);
        }

        if iri.starts_with('/') {
            if let Some(authority_start) = base.find("://") {
                let path_start = base[authority_start + 3..]
                    .find('/')
                    .map(|i| authority_start + 3 + i)
                    .unwrap_or(base.len());
                return format!("{}{}", &base[..path_start], iri);
            }
            return iri.to_string();
        }

        match base.rfind('/') {
            Some(i) => format!("{}{}", &base[..=i], iri),
            None => iri.to_string(),
        }
    }

    fn fresh_blank(&mut self) -> Term {
        let label = format!("genid{}", self.blank_counter);
        self.blank_counter += 1;
        Term::blank(label)
    }
}

/// True if the string starts with a URI scheme (`scheme:`).
fn has_scheme(iri: &str) -> bool {
    let Some(colon) = iri.find(':') else {
        return false;
    };
    let scheme = &iri[..colon];
    !scheme.is_empty()
        && scheme.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.')
}

//! Token types produced by the Turtle lexer

/// A lexed token with its position (character offset) in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub pos: usize,
}

impl Token {
    pub fn new(kind: TokenKind, pos: usize) -> Self {
        Self { kind, pos }
    }
}

/// The kinds of token in a Turtle document.
///
/// Content-bearing tokens carry their decoded text: IRIs without the angle
/// brackets, strings with escapes resolved, blank node labels without `_:`,
/// language tags without `@`. Numeric tokens keep the raw lexical form so
/// values round-trip unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// `<...>` with brackets stripped and escapes resolved
    Iri(String),
    /// `prefix:local` (either part may be empty)
    PrefixedName { prefix: String, local: String },
    /// `_:label` with the `_:` stripped
    BlankNodeLabel(String),
    /// Any of the four quoting forms, with escapes resolved
    StringLiteral(String),
    /// `@tag` with the `@` stripped
    LangTag(String),
    /// Integer lexical form (e.g. `42`, `-7`)
    Integer(String),
    /// Decimal lexical form (e.g. `3.14`)
    Decimal(String),
    /// Double lexical form (e.g. `1.2e3`)
    Double(String),
    /// `true` or `false`
    Boolean(bool),
    /// The `a` keyword (rdf:type)
    A,
    /// `@prefix` or SPARQL-style `PREFIX`
    PrefixDirective,
    /// `@base` or SPARQL-style `BASE`
    BaseDirective,
    Dot,
    Semicolon,
    Comma,
    LBracket,
    RBracket,
    LParen,
    RParen,
    /// `^^`
    DoubleCaret,
    Eof,
}

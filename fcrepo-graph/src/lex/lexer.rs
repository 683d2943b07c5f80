//! Turtle lexer
//!
//! Tokenizes Turtle input into a stream of tokens. Fails fast on the first
//! lexical error with the offending position. The lexer works on a decoded
//! character buffer so multi-byte input never splits a token.

use super::token::{Token, TokenKind};
use crate::error::{RdfError, Result};

/// Tokenize an entire Turtle document.
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    Lexer::new(input).tokenize()
}

/// Lexer for Turtle documents.
pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
}

impl Lexer {
    /// Create a new lexer for the given input.
    pub fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    /// Tokenize the entire input, ending with an `Eof` token.
    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();

        loop {
            self.skip_trivia();

            let start = self.pos;
            if self.at_end() {
                tokens.push(Token::new(TokenKind::Eof, start));
                break;
            }

            let kind = self.next_token()?;
            tokens.push(Token::new(kind, start));
        }

        Ok(tokens)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    /// Skip whitespace and `#` comments.
    fn skip_trivia(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.pos += 1;
            } else if c == '#' {
                while let Some(c) = self.peek() {
                    self.pos += 1;
                    if c == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    fn next_token(&mut self) -> Result<TokenKind> {
        let c = self.peek().expect("next_token called at end of input");

        match c {
            '<' => self.lex_iri(),
            '_' if self.peek_at(1) == Some(':') => self.lex_blank_node(),
            '@' => self.lex_at_word(),
            '"' | '\'' => self.lex_string(c),
            '^' => {
                self.bump();
                if self.bump() == Some('^') {
                    Ok(TokenKind::DoubleCaret)
                } else {
                    Err(RdfError::lexer(self.pos, "expected '^^'"))
                }
            }
            '.' => {
                self.bump();
                Ok(TokenKind::Dot)
            }
            ';' => {
                self.bump();
                Ok(TokenKind::Semicolon)
            }
            ',' => {
                self.bump();
                Ok(TokenKind::Comma)
            }
            '[' => {
                self.bump();
                Ok(TokenKind::LBracket)
            }
            ']' => {
                self.bump();
                Ok(TokenKind::RBracket)
            }
            '(' => {
                self.bump();
                Ok(TokenKind::LParen)
            }
            ')' => {
                self.bump();
                Ok(TokenKind::RParen)
            }
            ':' => {
                // Default-prefix name: `:local` or bare `:`
                self.bump();
                let local = self.lex_local_name()?;
                Ok(TokenKind::PrefixedName {
                    prefix: String::new(),
                    local,
                })
            }
            c if c.is_ascii_digit() => self.lex_number(),
            '+' | '-' => self.lex_number(),
            c if is_pn_chars_base(c) => self.lex_word(),
            other => Err(RdfError::lexer(
                self.pos,
                format!("unexpected character '{}'", other),
            )),
        }
    }

    /// `<...>` with `\u`/`\U` escapes.
    fn lex_iri(&mut self) -> Result<TokenKind> {
        let start = self.pos;
        self.bump(); // '<'
        let mut iri = String::new();

        loop {
            match self.bump() {
                Some('>') => return Ok(TokenKind::Iri(iri)),
                Some('\\') => match self.bump() {
                    Some('u') => iri.push(self.lex_hex_escape(4)?),
                    Some('U') => iri.push(self.lex_hex_escape(8)?),
                    _ => {
                        return Err(RdfError::lexer(
                            self.pos,
                            "invalid escape in IRI (only \\u and \\U are allowed)",
                        ))
                    }
                },
                Some(c) if c == '\n' || c == '\r' => {
                    return Err(RdfError::lexer(start, "unterminated IRI"))
                }
                Some(c) => iri.push(c),
                None => return Err(RdfError::lexer(start, "unterminated IRI")),
            }
        }
    }

    /// `_:label`
    fn lex_blank_node(&mut self) -> Result<TokenKind> {
        self.bump(); // '_'
        self.bump(); // ':'
        let mut label = String::new();

        while let Some(c) = self.peek() {
            if is_pn_chars(c) || c == '.' {
                label.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }

        // A trailing '.' terminates the statement, not the label
        while label.ends_with('.') {
            label.pop();
            self.pos -= 1;
        }

        if label.is_empty() {
            return Err(RdfError::lexer(self.pos, "empty blank node label"));
        }

        Ok(TokenKind::BlankNodeLabel(label))
    }

    /// `@prefix`, `@base`, or a language tag.
    fn lex_at_word(&mut self) -> Result<TokenKind> {
        self.bump(); // '@'
        let mut word = String::new();

        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '-' {
                word.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }

        match word.as_str() {
            "prefix" => Ok(TokenKind::PrefixDirective),
            "base" => Ok(TokenKind::BaseDirective),
            "" => Err(RdfError::lexer(self.pos, "empty language tag")),
            _ => Ok(TokenKind::LangTag(word)),
        }
    }

    /// All four string quoting forms, with escapes resolved.
    fn lex_string(&mut self, quote: char) -> Result<TokenKind> {
        let start = self.pos;
        let long = self.peek_at(1) == Some(quote) && self.peek_at(2) == Some(quote);

        self.bump();
        if long {
            self.bump();
            self.bump();
        }

        let mut value = String::new();
        loop {
            if long {
                if self.peek() == Some(quote)
                    && self.peek_at(1) == Some(quote)
                    && self.peek_at(2) == Some(quote)
                {
                    self.pos += 3;
                    return Ok(TokenKind::StringLiteral(value));
                }
            }

            match self.bump() {
                Some(c) if c == quote && !long => return Ok(TokenKind::StringLiteral(value)),
                Some('\\') => value.push(self.lex_string_escape()?),
                Some(c) if (c == '\n' || c == '\r') && !long => {
                    return Err(RdfError::lexer(start, "unterminated string literal"))
                }
                Some(c) => value.push(c),
                None => return Err(RdfError::lexer(start, "unterminated string literal")),
            }
        }
    }

    fn lex_string_escape(&mut self) -> Result<char> {
        match self.bump() {
            Some('t') => Ok('\t'),
            Some('b') => Ok('\u{0008}'),
            Some('n') => Ok('\n'),
            Some('r') => Ok('\r'),
            Some('f') => Ok('\u{000C}'),
            Some('"') => Ok('"'),
            Some('\'') => Ok('\''),
            Some('\\') => Ok('\\'),
            Some('u') => self.lex_hex_escape(4),
            Some('U') => self.lex_hex_escape(8),
            other => Err(RdfError::InvalidEscape(format!(
                "\\{}",
                other.map(String::from).unwrap_or_default()
            ))),
        }
    }

    fn lex_hex_escape(&mut self, digits: usize) -> Result<char> {
        let mut value: u32 = 0;
        for _ in 0..digits {
            let c = self
                .bump()
                .ok_or_else(|| RdfError::InvalidEscape("truncated unicode escape".into()))?;
            let digit = c
                .to_digit(16)
                .ok_or_else(|| RdfError::InvalidEscape(format!("invalid hex digit '{}'", c)))?;
            value = value * 16 + digit;
        }
        char::from_u32(value)
            .ok_or_else(|| RdfError::InvalidEscape(format!("invalid code point U+{:X}", value)))
    }

    /// Numeric literal; keeps the raw lexical form.
    fn lex_number(&mut self) -> Result<TokenKind> {
        let mut text = String::new();
        let mut has_dot = false;
        let mut has_exp = false;

        if matches!(self.peek(), Some('+') | Some('-')) {
            text.push(self.bump().unwrap());
        }

        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                text.push(c);
                self.pos += 1;
            } else if c == '.' && !has_dot && !has_exp {
                // Only part of the number when followed by a digit;
                // otherwise it is the statement terminator
                if self.peek_at(1).is_some_and(|n| n.is_ascii_digit()) {
                    has_dot = true;
                    text.push(c);
                    self.pos += 1;
                } else {
                    break;
                }
            } else if (c == 'e' || c == 'E') && !has_exp {
                has_exp = true;
                text.push(c);
                self.pos += 1;
                if matches!(self.peek(), Some('+') | Some('-')) {
                    text.push(self.bump().unwrap());
                }
            } else {
                break;
            }
        }

        if !text.chars().any(|c| c.is_ascii_digit()) {
            return Err(RdfError::lexer(self.pos, "expected a number"));
        }

        if has_exp {
            Ok(TokenKind::Double(text))
        } else if has_dot {
            Ok(TokenKind::Decimal(text))
        } else {
            Ok(TokenKind::Integer(text))
        }
    }

    /// A bare word: a keyword (`a`, `true`, `false`, `PREFIX`, `BASE`) or the
    /// prefix part of a prefixed name.
    fn lex_word(&mut self) -> Result<TokenKind> {
        let mut word = String::new();

        while let Some(c) = self.peek() {
            if is_pn_chars(c) || c == '.' {
                word.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }

        // A prefix never ends with '.'; give trailing dots back
        while word.ends_with('.') {
            word.pop();
            self.pos -= 1;
        }

        if self.peek() == Some(':') {
            self.pos += 1;
            let local = self.lex_local_name()?;
            return Ok(TokenKind::PrefixedName {
                prefix: word,
                local,
            });
        }

        match word.as_str() {
            "a" => Ok(TokenKind::A),
            "true" => Ok(TokenKind::Boolean(true)),
            "false" => Ok(TokenKind::Boolean(false)),
            w if w.eq_ignore_ascii_case("prefix") => Ok(TokenKind::PrefixDirective),
            w if w.eq_ignore_ascii_case("base") => Ok(TokenKind::BaseDirective),
            other => Err(RdfError::lexer(
                self.pos,
                format!("unexpected token '{}'", other),
            )),
        }
    }

    /// The local part of a prefixed name. Handles `\`-escaped characters and
    /// `%XX` sequences (which stay percent-encoded in the expanded IRI).
    fn lex_local_name(&mut self) -> Result<String> {
        let mut local = String::new();

        while let Some(c) = self.peek() {
            if is_pn_chars(c) || c == '.' || c == ':' {
                local.push(c);
                self.pos += 1;
            } else if c == '%' {
                local.push(c);
                self.pos += 1;
                for _ in 0..2 {
                    match self.peek() {
                        Some(h) if h.is_ascii_hexdigit() => {
                            local.push(h);
                            self.pos += 1;
                        }
                        _ => {
                            return Err(RdfError::lexer(
                                self.pos,
                                "invalid percent escape in prefixed name",
                            ))
                        }
                    }
                }
            } else if c == '\\' {
                self.pos += 1;
                match self.bump() {
                    Some(escaped) => local.push(escaped),
                    None => {
                        return Err(RdfError::lexer(
                            self.pos,
                            "truncated escape in prefixed name",
                        ))
                    }
                }
            } else {
                break;
            }
        }

        // A trailing '.' terminates the statement, not the name
        while local.ends_with('.') {
            local.pop();
            self.pos -= 1;
        }

        Ok(local)
    }
}

/// First character of a prefix or bare word.
fn is_pn_chars_base(c: char) -> bool {
    c.is_alphabetic()
}

/// Subsequent characters of names and labels.
fn is_pn_chars(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || c == '\u{00B7}'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lex_iri_and_dot() {
        let tokens = kinds("<http://example.org/a> .");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Iri("http://example.org/a".into()),
                TokenKind::Dot,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_prefixed_name_with_trailing_dot() {
        let tokens = kinds("ex:name.");
        assert_eq!(
            tokens,
            vec![
                TokenKind::PrefixedName {
                    prefix: "ex".into(),
                    local: "name".into()
                },
                TokenKind::Dot,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_prefix_directive() {
        let tokens = kinds("@prefix ex: <http://example.org/> .");
        assert_eq!(
            tokens,
            vec![
                TokenKind::PrefixDirective,
                TokenKind::PrefixedName {
                    prefix: "ex".into(),
                    local: String::new()
                },
                TokenKind::Iri("http://example.org/".into()),
                TokenKind::Dot,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_strings() {
        assert_eq!(
            kinds(r#""hello""#),
            vec![TokenKind::StringLiteral("hello".into()), TokenKind::Eof]
        );
        assert_eq!(
            kinds(r#""he\tsaid \"hi\"""#),
            vec![
                TokenKind::StringLiteral("he\tsaid \"hi\"".into()),
                TokenKind::Eof
            ]
        );
        assert_eq!(
            kinds("\"\"\"multi\nline \" quote\"\"\""),
            vec![
                TokenKind::StringLiteral("multi\nline \" quote".into()),
                TokenKind::Eof
            ]
        );
        assert_eq!(
            kinds("'single'"),
            vec![TokenKind::StringLiteral("single".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn lex_string_with_lang_tag() {
        let tokens = kinds(r#""bonjour"@fr"#);
        assert_eq!(
            tokens,
            vec![
                TokenKind::StringLiteral("bonjour".into()),
                TokenKind::LangTag("fr".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_typed_literal() {
        let tokens = kinds(r#""42"^^<http://www.w3.org/2001/XMLSchema#integer>"#);
        assert_eq!(
            tokens,
            vec![
                TokenKind::StringLiteral("42".into()),
                TokenKind::DoubleCaret,
                TokenKind::Iri("http://www.w3.org/2001/XMLSchema#integer".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_numbers() {
        assert_eq!(
            kinds("42 -7 3.14 1.2e3 10 ."),
            vec![
                TokenKind::Integer("42".into()),
                TokenKind::Integer("-7".into()),
                TokenKind::Decimal("3.14".into()),
                TokenKind::Double("1.2e3".into()),
                TokenKind::Integer("10".into()),
                TokenKind::Dot,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_blank_node() {
        assert_eq!(
            kinds("_:b0 ."),
            vec![
                TokenKind::BlankNodeLabel("b0".into()),
                TokenKind::Dot,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_keywords_and_punctuation() {
        assert_eq!(
            kinds("a true false ; , [ ] ( )"),
            vec![
                TokenKind::A,
                TokenKind::Boolean(true),
                TokenKind::Boolean(false),
                TokenKind::Semicolon,
                TokenKind::Comma,
                TokenKind::LBracket,
                TokenKind::RBracket,
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_comments() {
        let tokens = kinds("# a comment\n<http://e.org/x> # trailing\n.");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Iri("http://e.org/x".into()),
                TokenKind::Dot,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_unicode_escape_in_iri() {
        assert_eq!(
            kinds(r"<http://e.org/\u0041>"),
            vec![TokenKind::Iri("http://e.org/A".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn lex_local_name_escapes() {
        assert_eq!(
            kinds(r"ex:with\!bang"),
            vec![
                TokenKind::PrefixedName {
                    prefix: "ex".into(),
                    local: "with!bang".into()
                },
                TokenKind::Eof,
            ]
        );
        assert_eq!(
            kinds("ex:with%21pct"),
            vec![
                TokenKind::PrefixedName {
                    prefix: "ex".into(),
                    local: "with%21pct".into()
                },
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_unterminated_string_fails() {
        assert!(tokenize("\"oops").is_err());
        assert!(tokenize("<http://unclosed").is_err());
    }
}

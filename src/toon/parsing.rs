//! Parser for the TOON format
//!
//! Recursive descent over the lexed token stream. Two document forms are
//! accepted:
//!
//!     Braced form: a JSON-style root object. Newlines and indentation are
//!     insignificant; pairs are comma-separated and a trailing comma is
//!     allowed.
//!
//!     Line form: `key: value` lines. A key with no inline value that is
//!     followed by a deeper-indented block owns that block as a nested
//!     object; a key with no inline value and no block is an empty object.
//!     Inline values may themselves be braced objects or arrays, which may
//!     span lines.
//!
//! Failure model
//!
//!     Structural problems (unclosed delimiters, a missing `:`, an
//!     unexpected token where a key or value is required) are hard failures:
//!     [`parse`] returns a [`ParseError`] and no result is produced.
//!     Non-fatal findings on an otherwise well-formed document - duplicate
//!     keys within one object, indentation that is not a whole number of
//!     units - are collected as [`Diagnostic`]s on the successful result.
//!
//! Locations
//!
//!     Every property's range runs from the first byte of its key to the
//!     last byte of its value (for block-valued keys, to the end of the last
//!     child). The parser guarantees the containment invariants documented
//!     in [ast](crate::toon::ast).

use crate::toon::ast::{LineIndex, ObjectNode, PropertyNode, Scalar, SourceRange, Value};
use crate::toon::lexing::{self, LexOutput};
use crate::toon::token::{Token, TokenKind};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// The complete, immutable result of one parse
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseResult {
    pub tokens: Vec<Token>,
    pub diagnostics: Vec<Diagnostic>,
    pub root: ObjectNode,
}

/// A non-fatal finding attached to a successful parse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub message: String,
    pub line: usize,
    pub column: usize,
    pub start: usize,
    pub end: usize,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.message)
    }
}

/// A hard parse failure; no result is produced
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unexpected end of input at line {line}: expected {expected}")]
    UnexpectedEof {
        expected: &'static str,
        offset: usize,
        line: usize,
    },
    #[error("expected {expected}, found {found} at {line}:{column}")]
    UnexpectedToken {
        expected: &'static str,
        found: &'static str,
        offset: usize,
        line: usize,
        column: usize,
    },
    #[error("unexpected indentation at line {line}")]
    UnexpectedIndent { offset: usize, line: usize },
    #[error("unexpected trailing content at line {line}")]
    TrailingContent { offset: usize, line: usize },
    #[error("invalid number {text:?} at line {line}")]
    InvalidNumber {
        text: String,
        offset: usize,
        line: usize,
    },
}

/// Parse TOON source text into a [`ParseResult`].
///
/// Pure and repeatable: the result is a function of the input string only.
pub fn parse(text: &str) -> Result<ParseResult, ParseError> {
    let LexOutput {
        tokens,
        indent_issues,
    } = lexing::lex(text);
    let index = LineIndex::new(text);
    let mut parser = Parser {
        text,
        tokens: &tokens,
        index: &index,
        pos: 0,
        diagnostics: Vec::new(),
    };
    let root = parser.parse_document()?;
    let mut diagnostics = parser.diagnostics;
    for issue in indent_issues {
        let (line, column) = index.position_of(issue.offset);
        diagnostics.push(Diagnostic {
            message: "indentation is not a whole number of units".to_string(),
            line,
            column,
            start: issue.offset,
            end: issue.offset + issue.width,
        });
    }
    diagnostics.sort_by_key(|diagnostic| (diagnostic.start, diagnostic.end));
    Ok(ParseResult {
        tokens,
        diagnostics,
        root,
    })
}

struct Parser<'a> {
    text: &'a str,
    tokens: &'a [Token],
    index: &'a LineIndex,
    pos: usize,
    diagnostics: Vec<Diagnostic>,
}

/// Tokens with no significance inside braces
fn is_braced_trivia(kind: TokenKind) -> bool {
    kind.is_trivia()
        || matches!(
            kind,
            TokenKind::Newline | TokenKind::Indent | TokenKind::Dedent
        )
}

impl<'a> Parser<'a> {
    fn parse_document(&mut self) -> Result<ObjectNode, ParseError> {
        match self.peek_braced() {
            None => Ok(ObjectNode::default()),
            Some(token) if token.kind == TokenKind::LeftBrace => {
                let (object, _) = self.parse_object()?;
                if let Some(extra) = self.peek_braced() {
                    let (line, _) = self.index.position_of(extra.start);
                    return Err(ParseError::TrailingContent {
                        offset: extra.start,
                        line,
                    });
                }
                Ok(object)
            }
            Some(_) => {
                // Line form scans from the stream start so indentation
                // counting stays aligned with line boundaries.
                self.pos = 0;
                let properties = self.parse_block(0)?;
                Ok(ObjectNode::new(properties))
            }
        }
    }

    // ----- braced form -----

    fn parse_object(&mut self) -> Result<(ObjectNode, SourceRange), ParseError> {
        let open = self.expect_braced(TokenKind::LeftBrace, "'{'")?;
        let mut properties = Vec::new();
        let close;
        loop {
            let token = match self.peek_braced() {
                Some(token) => token,
                None => return Err(self.err_eof("'}'")),
            };
            if token.kind == TokenKind::RightBrace {
                self.pos += 1;
                close = token;
                break;
            }
            properties.push(self.parse_braced_pair()?);
            let separator = match self.peek_braced() {
                Some(token) => token,
                None => return Err(self.err_eof("',' or '}'")),
            };
            match separator.kind {
                TokenKind::Comma => self.pos += 1,
                TokenKind::RightBrace => {
                    self.pos += 1;
                    close = separator;
                    break;
                }
                _ => return Err(self.err_unexpected("',' or '}'", separator)),
            }
        }
        self.report_duplicates(&properties);
        let range = self.range(open.start, close.end());
        Ok((ObjectNode::new(properties), range))
    }

    fn parse_braced_pair(&mut self) -> Result<PropertyNode, ParseError> {
        let key_token = match self.peek_braced() {
            Some(token) => token,
            None => return Err(self.err_eof("a key")),
        };
        if !key_token.kind.is_key() {
            return Err(self.err_unexpected("a key", key_token));
        }
        self.pos += 1;
        let key = self.key_text(key_token);
        let colon = match self.peek_braced() {
            Some(token) => token,
            None => return Err(self.err_eof("':'")),
        };
        if colon.kind != TokenKind::Colon {
            return Err(self.err_unexpected("':'", colon));
        }
        self.pos += 1;
        let (value, end) = self.parse_value()?;
        Ok(PropertyNode {
            key,
            value,
            range: self.range(key_token.start, end),
        })
    }

    /// Parse a value in braced context; returns the value and its end offset
    fn parse_value(&mut self) -> Result<(Value, usize), ParseError> {
        let token = match self.peek_braced() {
            Some(token) => token,
            None => return Err(self.err_eof("a value")),
        };
        match token.kind {
            TokenKind::LeftBrace => {
                let (object, range) = self.parse_object()?;
                Ok((Value::Object(object), range.end))
            }
            TokenKind::LeftBracket => self.parse_array(),
            TokenKind::String => {
                self.pos += 1;
                Ok((Value::Scalar(Scalar::Str(self.unquote(token))), token.end()))
            }
            TokenKind::Identifier => {
                self.pos += 1;
                Ok((
                    Value::Scalar(Scalar::Str(self.slice(token).to_string())),
                    token.end(),
                ))
            }
            TokenKind::Number => {
                self.pos += 1;
                let text = self.slice(token);
                let number = match text.parse::<f64>() {
                    Ok(number) => number,
                    Err(_) => {
                        let (line, _) = self.index.position_of(token.start);
                        return Err(ParseError::InvalidNumber {
                            text: text.to_string(),
                            offset: token.start,
                            line,
                        });
                    }
                };
                Ok((Value::Scalar(Scalar::Number(number)), token.end()))
            }
            TokenKind::True => {
                self.pos += 1;
                Ok((Value::Scalar(Scalar::Bool(true)), token.end()))
            }
            TokenKind::False => {
                self.pos += 1;
                Ok((Value::Scalar(Scalar::Bool(false)), token.end()))
            }
            TokenKind::Null => {
                self.pos += 1;
                Ok((Value::Scalar(Scalar::Null), token.end()))
            }
            _ => Err(self.err_unexpected("a value", token)),
        }
    }

    fn parse_array(&mut self) -> Result<(Value, usize), ParseError> {
        self.expect_braced(TokenKind::LeftBracket, "'['")?;
        let mut values = Vec::new();
        loop {
            let token = match self.peek_braced() {
                Some(token) => token,
                None => return Err(self.err_eof("']'")),
            };
            if token.kind == TokenKind::RightBracket {
                self.pos += 1;
                return Ok((Value::Array(values), token.end()));
            }
            let (value, _) = self.parse_value()?;
            values.push(value);
            let separator = match self.peek_braced() {
                Some(token) => token,
                None => return Err(self.err_eof("',' or ']'")),
            };
            match separator.kind {
                TokenKind::Comma => self.pos += 1,
                TokenKind::RightBracket => {
                    self.pos += 1;
                    return Ok((Value::Array(values), separator.end()));
                }
                _ => return Err(self.err_unexpected("',' or ']'", separator)),
            }
        }
    }

    // ----- line form -----

    fn parse_block(&mut self, level: usize) -> Result<Vec<PropertyNode>, ParseError> {
        let mut properties = Vec::new();
        while let Some((line_level, idx)) = self.peek_line() {
            if line_level < level {
                break;
            }
            if line_level > level {
                let token = self.tokens[idx];
                let (line, _) = self.index.position_of(token.start);
                return Err(ParseError::UnexpectedIndent {
                    offset: token.start,
                    line,
                });
            }
            self.pos = idx;
            properties.push(self.parse_line_property(level)?);
        }
        self.report_duplicates(&properties);
        Ok(properties)
    }

    fn parse_line_property(&mut self, level: usize) -> Result<PropertyNode, ParseError> {
        let key_token = self.tokens[self.pos];
        if !key_token.kind.is_key() {
            return Err(self.err_unexpected("a key", key_token));
        }
        self.pos += 1;
        let key = self.key_text(key_token);
        let colon = match self.peek_line_token() {
            Some(token) => token,
            None => return Err(self.err_eof("':'")),
        };
        if colon.kind != TokenKind::Colon {
            return Err(self.err_unexpected("':'", colon));
        }
        self.pos += 1;

        match self.peek_line_token() {
            // `key:` at end of input - empty object
            None => Ok(PropertyNode {
                key,
                value: Value::Object(ObjectNode::default()),
                range: self.range(key_token.start, colon.end()),
            }),
            // `key:` followed by a newline - nested block or empty object
            Some(token) if token.kind == TokenKind::Newline => {
                self.pos += 1;
                match self.peek_line() {
                    Some((line_level, _)) if line_level > level => {
                        let children = self.parse_block(level + 1)?;
                        let end = children
                            .last()
                            .map(|child| child.range.end)
                            .unwrap_or_else(|| colon.end());
                        Ok(PropertyNode {
                            key,
                            value: Value::Object(ObjectNode::new(children)),
                            range: self.range(key_token.start, end),
                        })
                    }
                    _ => Ok(PropertyNode {
                        key,
                        value: Value::Object(ObjectNode::default()),
                        range: self.range(key_token.start, colon.end()),
                    }),
                }
            }
            // inline value, must finish its line
            Some(_) => {
                let (value, end) = self.parse_value()?;
                match self.peek_line_token() {
                    None => {}
                    Some(next) if next.kind == TokenKind::Newline => self.pos += 1,
                    Some(next) => return Err(self.err_unexpected("end of line", next)),
                }
                Ok(PropertyNode {
                    key,
                    value,
                    range: self.range(key_token.start, end),
                })
            }
        }
    }

    /// Locate the next content line without moving: returns its indentation
    /// level and the index of its first content token
    fn peek_line(&self) -> Option<(usize, usize)> {
        let mut level = 0usize;
        let mut idx = self.pos;
        while idx < self.tokens.len() {
            match self.tokens[idx].kind {
                TokenKind::Newline => {
                    level = 0;
                    idx += 1;
                }
                TokenKind::Indent => {
                    level += 1;
                    idx += 1;
                }
                TokenKind::Dedent | TokenKind::Whitespace | TokenKind::Comment => idx += 1,
                _ => return Some((level, idx)),
            }
        }
        None
    }

    // ----- shared helpers -----

    fn peek_braced(&mut self) -> Option<Token> {
        while self
            .tokens
            .get(self.pos)
            .is_some_and(|token| is_braced_trivia(token.kind))
        {
            self.pos += 1;
        }
        self.tokens.get(self.pos).copied()
    }

    // Dedent markers sit between the last token of a block and the end of
    // input; within a line they terminate it just like running out of tokens.
    fn peek_line_token(&mut self) -> Option<Token> {
        while self
            .tokens
            .get(self.pos)
            .is_some_and(|token| token.kind.is_trivia() || token.kind == TokenKind::Dedent)
        {
            self.pos += 1;
        }
        self.tokens.get(self.pos).copied()
    }

    fn expect_braced(&mut self, kind: TokenKind, expected: &'static str) -> Result<Token, ParseError> {
        match self.peek_braced() {
            Some(token) if token.kind == kind => {
                self.pos += 1;
                Ok(token)
            }
            Some(token) => Err(self.err_unexpected(expected, token)),
            None => Err(self.err_eof(expected)),
        }
    }

    fn slice(&self, token: Token) -> &str {
        &self.text[token.span()]
    }

    fn key_text(&self, token: Token) -> String {
        if token.kind == TokenKind::String {
            self.unquote(token)
        } else {
            self.slice(token).to_string()
        }
    }

    fn unquote(&self, token: Token) -> String {
        let raw = self.slice(token);
        unescape(&raw[1..raw.len() - 1])
    }

    fn range(&self, start: usize, end: usize) -> SourceRange {
        let end_anchor = if end > start { end - 1 } else { start };
        SourceRange::new(
            start,
            end,
            self.index.line_of(start),
            self.index.line_of(end_anchor),
        )
    }

    fn report_duplicates(&mut self, properties: &[PropertyNode]) {
        let mut seen: HashSet<&str> = HashSet::new();
        for property in properties {
            if !seen.insert(property.key.as_str()) {
                let (line, column) = self.index.position_of(property.range.start);
                self.diagnostics.push(Diagnostic {
                    message: format!("duplicate key {:?}", property.key),
                    line,
                    column,
                    start: property.range.start,
                    end: property.range.end,
                });
            }
        }
    }

    fn err_unexpected(&self, expected: &'static str, found: Token) -> ParseError {
        let (line, column) = self.index.position_of(found.start);
        ParseError::UnexpectedToken {
            expected,
            found: found.kind.describe(),
            offset: found.start,
            line,
            column,
        }
    }

    fn err_eof(&self, expected: &'static str) -> ParseError {
        let offset = self.text.len();
        ParseError::UnexpectedEof {
            expected,
            offset,
            line: self.index.line_of(offset),
        }
    }
}

/// Resolve backslash escapes inside a string literal's body
fn unescape(inner: &str) -> String {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some(other) => out.push(other),
                None => out.push('\\'),
            }
        } else {
            out.push(ch);
        }
    }
    out
}

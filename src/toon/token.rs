//! Token definitions for the TOON format
//!
//! All tokens that can appear in a TOON token stream. The core kinds are
//! defined with the logos derive macro; `Indent`, `Dedent`, and `Invalid`
//! are synthetic - they are produced by the lexing pipeline rather than the
//! logos pass itself (see [lexing](crate::toon::lexing)).

use logos::Logos;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// All possible tokens in the TOON format
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    #[token("{")]
    LeftBrace,
    #[token("}")]
    RightBrace,
    #[token("[")]
    LeftBracket,
    #[token("]")]
    RightBracket,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token("|")]
    Pipe,

    // Keyword scalars
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,

    /// Double-quoted string with backslash escapes, single line
    #[regex(r#""([^"\\\n]|\\[^\n])*""#)]
    String,
    /// Integer or decimal number with optional exponent
    #[regex(r"-?[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?")]
    Number,
    /// Bare word: unquoted keys and unquoted scalar values
    #[regex(r"[A-Za-z_][A-Za-z0-9_\-]*")]
    Identifier,

    /// Line comment, runs to end of line
    #[regex(r"#[^\n]*")]
    Comment,

    #[token("\n")]
    Newline,
    /// Horizontal whitespace; line-leading runs are rewritten by the
    /// indentation transformation
    #[regex(r"[ \t\r]+")]
    Whitespace,

    /// One level of line-leading indentation (two spaces or one tab)
    Indent,
    /// Zero-width marker emitted when a line's indentation level drops
    Dedent,
    /// Source text the lexer could not match
    Invalid,
}

impl TokenKind {
    /// Human-readable name used in error messages
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::LeftBrace => "'{'",
            TokenKind::RightBrace => "'}'",
            TokenKind::LeftBracket => "'['",
            TokenKind::RightBracket => "']'",
            TokenKind::Colon => "':'",
            TokenKind::Comma => "','",
            TokenKind::Pipe => "'|'",
            TokenKind::True => "'true'",
            TokenKind::False => "'false'",
            TokenKind::Null => "'null'",
            TokenKind::String => "string",
            TokenKind::Number => "number",
            TokenKind::Identifier => "identifier",
            TokenKind::Comment => "comment",
            TokenKind::Newline => "end of line",
            TokenKind::Whitespace => "whitespace",
            TokenKind::Indent => "indentation",
            TokenKind::Dedent => "dedent",
            TokenKind::Invalid => "invalid input",
        }
    }

    /// Whitespace and comments: skipped everywhere by the parser
    pub fn is_trivia(&self) -> bool {
        matches!(self, TokenKind::Whitespace | TokenKind::Comment)
    }

    /// Tokens that can open a scalar value
    pub fn is_scalar_start(&self) -> bool {
        matches!(
            self,
            TokenKind::String
                | TokenKind::Number
                | TokenKind::Identifier
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Null
        )
    }

    /// Tokens that can serve as a property key
    pub fn is_key(&self) -> bool {
        matches!(self, TokenKind::String | TokenKind::Identifier)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe())
    }
}

/// A single token: kind plus the byte span it covers in the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub length: usize,
}

impl Token {
    pub fn new(kind: TokenKind, start: usize, length: usize) -> Self {
        Self {
            kind,
            start,
            length,
        }
    }

    /// Byte offset one past the last byte of the token
    pub fn end(&self) -> usize {
        self.start + self.length
    }

    /// The byte range this token covers
    pub fn span(&self) -> Range<usize> {
        self.start..self.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logos::Logos;

    fn kinds(source: &str) -> Vec<TokenKind> {
        TokenKind::lexer(source)
            .map(|result| result.unwrap_or(TokenKind::Invalid))
            .collect()
    }

    #[test]
    fn structural_tokens() {
        assert_eq!(
            kinds("{}[],:|"),
            vec![
                TokenKind::LeftBrace,
                TokenKind::RightBrace,
                TokenKind::LeftBracket,
                TokenKind::RightBracket,
                TokenKind::Comma,
                TokenKind::Colon,
                TokenKind::Pipe,
            ]
        );
    }

    #[test]
    fn keywords_beat_identifiers() {
        assert_eq!(
            kinds("true false null truthy"),
            vec![
                TokenKind::True,
                TokenKind::Whitespace,
                TokenKind::False,
                TokenKind::Whitespace,
                TokenKind::Null,
                TokenKind::Whitespace,
                TokenKind::Identifier,
            ]
        );
    }

    #[test]
    fn strings_and_numbers() {
        assert_eq!(
            kinds(r#""hello \"quoted\"" -3.5e2 42"#),
            vec![
                TokenKind::String,
                TokenKind::Whitespace,
                TokenKind::Number,
                TokenKind::Whitespace,
                TokenKind::Number,
            ]
        );
    }

    #[test]
    fn unterminated_string_is_invalid() {
        let kinds = kinds("\"oops\n");
        assert!(kinds.contains(&TokenKind::Invalid));
    }

    #[test]
    fn comment_runs_to_end_of_line() {
        assert_eq!(
            kinds("# note: {not structure}\nkey"),
            vec![TokenKind::Comment, TokenKind::Newline, TokenKind::Identifier]
        );
    }

    #[test]
    fn token_span() {
        let token = Token::new(TokenKind::Identifier, 4, 3);
        assert_eq!(token.end(), 7);
        assert_eq!(token.span(), 4..7);
    }
}

//! Lexer for the TOON format
//!
//! Lexing runs in two stages:
//!
//!     1. Core tokenization using the logos lexer. Unmatched input becomes
//!        `Invalid` tokens; everything else maps 1:1 onto the source.
//!
//!     2. Indentation transformation. Line-leading whitespace on significant
//!        lines is rewritten into one `Indent` token per indentation unit
//!        (two spaces or one tab), and zero-width `Dedent` tokens are
//!        inserted at the start of a line whose level is lower than the
//!        previous significant line's. Blank lines and comment-only lines
//!        never change the indentation level and keep their raw whitespace.
//!
//! Synthetic tokens carry meaningful positions: each `Indent` covers the
//! bytes of its unit, and `Dedent` sits zero-width at the line start. A
//! leading run that is not an exact number of units (for example three
//! spaces) keeps the remainder as a `Whitespace` token and is reported as an
//! [`IndentIssue`] so the parser can surface a diagnostic.

use crate::toon::token::{Token, TokenKind};
use logos::Logos;

/// An indentation run that is not a whole number of indent units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndentIssue {
    /// Byte offset of the first byte that does not fit a unit
    pub offset: usize,
    /// Width in bytes of the leftover run
    pub width: usize,
}

/// Result of the full lexing pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct LexOutput {
    pub tokens: Vec<Token>,
    pub indent_issues: Vec<IndentIssue>,
}

/// Tokenize source text and apply the indentation transformation
pub fn lex(source: &str) -> LexOutput {
    let raw = tokenize(source);
    transform_indentation(source, raw)
}

/// Raw logos pass: tokens with byte spans, errors mapped to `Invalid`
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(source);
    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let kind = result.unwrap_or(TokenKind::Invalid);
        tokens.push(Token::new(kind, span.start, span.end - span.start));
    }
    tokens
}

/// Rewrite line-leading whitespace into `Indent`/`Dedent` tokens
fn transform_indentation(source: &str, raw: Vec<Token>) -> LexOutput {
    let mut tokens = Vec::with_capacity(raw.len());
    let mut indent_issues = Vec::new();
    let mut level = 0usize;
    let mut i = 0usize;

    // Invariant: at the top of the loop, raw[i] is the first token of a line.
    while i < raw.len() {
        let (leading, content_idx) = if raw[i].kind == TokenKind::Whitespace {
            (Some(raw[i]), i + 1)
        } else {
            (None, i)
        };
        let significant = matches!(
            raw.get(content_idx).map(|token| token.kind),
            Some(kind) if !matches!(kind, TokenKind::Newline | TokenKind::Comment)
        );

        if significant {
            let (units, remainder) = match leading {
                Some(ws) => measure_units(source, &ws),
                None => (Vec::new(), None),
            };
            let new_level = units.len();
            if new_level < level {
                let at = leading
                    .map(|ws| ws.start)
                    .unwrap_or_else(|| raw[content_idx].start);
                for _ in new_level..level {
                    tokens.push(Token::new(TokenKind::Dedent, at, 0));
                }
            }
            for (start, length) in &units {
                tokens.push(Token::new(TokenKind::Indent, *start, *length));
            }
            if let Some((offset, width)) = remainder {
                indent_issues.push(IndentIssue { offset, width });
                tokens.push(Token::new(TokenKind::Whitespace, offset, width));
            }
            level = new_level;
        } else if let Some(ws) = leading {
            tokens.push(ws);
        }

        // Copy the rest of the line through its newline.
        i = content_idx;
        while i < raw.len() {
            let token = raw[i];
            tokens.push(token);
            i += 1;
            if token.kind == TokenKind::Newline {
                break;
            }
        }
    }

    for _ in 0..level {
        tokens.push(Token::new(TokenKind::Dedent, source.len(), 0));
    }

    LexOutput {
        tokens,
        indent_issues,
    }
}

/// Split a leading whitespace run into indent units.
///
/// A unit is two spaces or one tab. The scan stops at the first byte that
/// does not start a unit; anything left over is returned as the remainder.
fn measure_units(source: &str, ws: &Token) -> (Vec<(usize, usize)>, Option<(usize, usize)>) {
    let bytes = &source.as_bytes()[ws.span()];
    let base = ws.start;
    let mut units = Vec::new();
    let mut j = 0usize;
    while j < bytes.len() {
        match bytes[j] {
            b'\t' => {
                units.push((base + j, 1));
                j += 1;
            }
            b' ' if j + 1 < bytes.len() && bytes[j + 1] == b' ' => {
                units.push((base + j, 2));
                j += 2;
            }
            _ => break,
        }
    }
    let remainder = if j < bytes.len() {
        Some((base + j, bytes.len() - j))
    } else {
        None
    };
    (units, remainder)
}

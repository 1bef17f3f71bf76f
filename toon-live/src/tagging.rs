//! Token decorations for syntax highlighting
//!
//! Maps every token of a parse result to a decoration span and attaches
//! diagnostics to the tokens they belong to: the token covering the
//! diagnostic's span when there is one, otherwise the first content token
//! on the diagnostic's line. Pure function over a [`ParseResult`].

use std::ops::Range;
use toon::{Diagnostic, ParseResult, Token, TokenKind};

/// One highlighted span with any diagnostics anchored to it
#[derive(Debug, Clone, PartialEq)]
pub struct TokenDecoration {
    pub kind: TokenKind,
    pub span: Range<usize>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Decorate every token of the result
pub fn decorate(result: &ParseResult) -> Vec<TokenDecoration> {
    let mut decorations: Vec<TokenDecoration> = result
        .tokens
        .iter()
        .map(|token| TokenDecoration {
            kind: token.kind,
            span: token.span(),
            diagnostics: Vec::new(),
        })
        .collect();
    for diagnostic in &result.diagnostics {
        if let Some(index) = attach_index(&result.tokens, diagnostic) {
            decorations[index].diagnostics.push(diagnostic.clone());
        }
    }
    decorations
}

fn attach_index(tokens: &[Token], diagnostic: &Diagnostic) -> Option<usize> {
    // A token covering the whole diagnostic span wins.
    if let Some(index) = tokens.iter().position(|token| {
        token.length > 0 && token.start <= diagnostic.start && diagnostic.end <= token.end()
    }) {
        return Some(index);
    }
    // Otherwise the first content token on the diagnostic's line.
    let line_start = tokens
        .iter()
        .rev()
        .find(|token| token.kind == TokenKind::Newline && token.end() <= diagnostic.start)
        .map(|token| token.end())
        .unwrap_or(0);
    tokens.iter().position(|token| {
        token.start >= line_start
            && token.length > 0
            && !token.kind.is_trivia()
            && token.kind != TokenKind::Newline
    })
}

//! Parse engine seam
//!
//! The live document model treats parsing as an external pure function:
//! text in, result or error out, no shared state. [`ToonEngine`] is the
//! production engine; tests plug in engines with controlled timing.

use toon::{parse, ParseError, ParseResult};

/// A pure parsing function behind a trait object
pub trait ParseEngine: Send + Sync {
    fn parse(&self, text: &str) -> Result<ParseResult, ParseError>;
}

/// The real TOON parser
#[derive(Debug, Default)]
pub struct ToonEngine;

impl ParseEngine for ToonEngine {
    fn parse(&self, text: &str) -> Result<ParseResult, ParseError> {
        parse(text)
    }
}

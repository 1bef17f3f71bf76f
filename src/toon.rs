//! TOON format implementation
//!
//! This module hosts the complete processing pipeline:
//!     1. Lexing: tokenization of source text. See [lexing](crate::toon::lexing).
//!     2. Parsing: recursive descent over the token stream producing the AST.
//!        See [parsing](crate::toon::parsing).
//!     3. AST: positioned structural nodes. See [ast](crate::toon::ast).
//!
//! Location tracking
//!
//!     Logos tokens carry the byte range of their source text. That
//!     information is preserved through every transformation and ends up on
//!     the AST nodes as byte offsets plus line numbers, so tooling built on
//!     the parse result can always map a node back to the exact buffer span
//!     it came from.

pub mod ast;
pub mod lexing;
pub mod parsing;
pub mod token;

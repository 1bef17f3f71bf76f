//! toon - a parser for the TOON format
//!
//! TOON is a compact structured key/value text format. A document is an
//! ordered sequence of properties; a property's value is a scalar, an array,
//! or a nested object. Two surface forms are accepted:
//!
//!     Braced form (JSON-style, newlines insignificant):
//!         {"server": {"host": "localhost", "port": 8080}}
//!
//!     Line form (TOON's native shape, indentation-based):
//!         server:
//!           host: "localhost"
//!           port: 8080
//!
//! The crate exposes the complete pipeline from source text to a positioned
//! structural tree: lexing (logos tokens plus an indentation transformation),
//! parsing (recursive descent over the token stream), and an AST in which
//! every property carries exact byte offsets and line numbers back into the
//! source. Editor tooling is built on top of this crate; see the `toon-live`
//! crate for the live-document model.

pub mod toon;

pub use crate::toon::ast::{LineIndex, ObjectNode, PropertyNode, Scalar, SourceRange, Value};
pub use crate::toon::parsing::{parse, Diagnostic, ParseError, ParseResult};
pub use crate::toon::token::{Token, TokenKind};

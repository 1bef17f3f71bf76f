//! AST for the TOON format
//!
//! Parsed structural nodes with mandatory source locations. Every property
//! carries a [`SourceRange`]: byte offsets plus line numbers back into the
//! source text. The location invariants the parser guarantees:
//!
//!     - `start <= end` for every range
//!     - a child property's range is fully contained in its parent's range
//!     - sibling property ranges never overlap
//!
//! Offsets are byte offsets, lines are 0-based. `end` is exclusive as a byte
//! offset; [`SourceRange::contains`] additionally accepts the caret position
//! sitting immediately after the node, which is what position-to-node
//! lookups in editor tooling want.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// A source location: byte span plus the lines it starts and ends on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRange {
    pub start: usize,
    pub end: usize,
    pub start_line: usize,
    pub end_line: usize,
}

impl SourceRange {
    pub fn new(start: usize, end: usize, start_line: usize, end_line: usize) -> Self {
        Self {
            start,
            end,
            start_line,
            end_line,
        }
    }

    /// Whether an offset falls inside this range (inclusive of the position
    /// immediately after the last byte)
    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }

    /// The byte range as a half-open `Range`
    pub fn span(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl fmt::Display for SourceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// A scalar value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Scalar {
    Str(String),
    Number(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Str(text) => write!(f, "{:?}", text),
            Scalar::Number(number) => write!(f, "{}", number),
            Scalar::Bool(value) => write!(f, "{}", value),
            Scalar::Null => write!(f, "null"),
        }
    }
}

/// A property value: scalar, array, or nested object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Scalar(Scalar),
    Array(Vec<Value>),
    Object(ObjectNode),
}

impl Value {
    pub fn as_object(&self) -> Option<&ObjectNode> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }
}

/// An ordered collection of properties.
///
/// Insertion order is source order. Keys are not required to be unique; the
/// parser reports duplicates as diagnostics but keeps every entry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ObjectNode {
    pub properties: Vec<PropertyNode>,
}

impl ObjectNode {
    pub fn new(properties: Vec<PropertyNode>) -> Self {
        Self { properties }
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// First property with the given key, if any
    pub fn get(&self, key: &str) -> Option<&PropertyNode> {
        self.properties.iter().find(|property| property.key == key)
    }
}

/// A single `key: value` property with its source location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyNode {
    pub key: String,
    pub value: Value,
    pub range: SourceRange,
}

/// Byte offset to line conversion over one source snapshot.
///
/// Built once per parse; lookup is a binary search over line start offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (idx, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(idx + 1);
            }
        }
        Self { line_starts }
    }

    /// 0-based line containing the byte offset
    pub fn line_of(&self, offset: usize) -> usize {
        self.line_starts.partition_point(|&start| start <= offset) - 1
    }

    /// 0-based (line, column) of the byte offset
    pub fn position_of(&self, offset: usize) -> (usize, usize) {
        let line = self.line_of(offset);
        (line, offset - self.line_starts[line])
    }
}

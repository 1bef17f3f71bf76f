//! Live document model for TOON editor tooling
//!
//! This crate keeps parsed TOON documents in sync with changing editor
//! buffers and derives the view-facing structures an editor integration
//! needs. It has no UI of its own: the editor surface and the outline view
//! are trait seams the host plugs into.
//!
//! The pieces:
//!
//!     - [`LiveDocument`]: one open buffer plus its latest successful parse.
//!       Buffer changes trigger background re-parses, serialized so at most
//!       one parse per document is in flight.
//!     - [`DocumentRegistry`]: owns the live documents, keyed by buffer id.
//!     - [`outline`]: pure functions from a parse result to the hierarchical
//!       outline and position-based lookup within it.
//!     - [`CaretSync`]: two-way caret/outline synchronization with feedback
//!       suppression.
//!     - [`tagging`]: per-token decorations with diagnostics attached.
//!
//! Parsing itself lives in the `toon` crate; this crate consumes it through
//! the [`ParseEngine`] seam so tests can substitute engines with controlled
//! timing and failure behavior.

pub mod buffer;
pub mod caret;
pub mod document;
pub mod engine;
pub mod event;
pub mod outline;
pub mod registry;
pub mod tagging;

pub use buffer::{MemoryBuffer, TextBuffer};
pub use caret::{CaretSync, EditorSurface, OutlineView, SyncState};
pub use document::LiveDocument;
pub use engine::{ParseEngine, ToonEngine};
pub use event::{Emitter, Subscription};
pub use outline::{IconKind, OutlineItem, OutlinePath, VisualWeight};
pub use registry::{BufferId, DocumentRegistry, RegistryError};
pub use tagging::TokenDecoration;

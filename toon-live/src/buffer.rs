//! Text buffer seam
//!
//! A [`LiveDocument`](crate::LiveDocument) reads its text through this trait
//! so the model never depends on a concrete editor. Hosts adapt their buffer
//! type; tests use [`MemoryBuffer`].

use crate::event::{Emitter, Subscription};
use parking_lot::Mutex;

/// An editor text buffer: a current snapshot plus change notifications
pub trait TextBuffer: Send + Sync {
    /// Full text of the buffer at this moment
    fn current_text(&self) -> String;

    /// Register for change notifications. Notifications fire after the
    /// change has been committed, so `current_text` already reflects it.
    fn subscribe_changes(&self, listener: Box<dyn Fn() + Send + Sync>) -> Subscription;
}

/// In-memory buffer for tests and headless use
pub struct MemoryBuffer {
    text: Mutex<String>,
    changed: Emitter<()>,
}

impl MemoryBuffer {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Mutex::new(text.into()),
            changed: Emitter::new(),
        }
    }

    /// Replace the buffer content and notify subscribers
    pub fn set_text(&self, text: impl Into<String>) {
        *self.text.lock() = text.into();
        self.changed.emit(&());
    }

    pub fn change_listener_count(&self) -> usize {
        self.changed.listener_count()
    }
}

impl TextBuffer for MemoryBuffer {
    fn current_text(&self) -> String {
        self.text.lock().clone()
    }

    fn subscribe_changes(&self, listener: Box<dyn Fn() + Send + Sync>) -> Subscription {
        self.changed.subscribe(move |_| listener())
    }
}

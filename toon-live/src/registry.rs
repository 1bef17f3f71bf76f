//! Document registry
//!
//! Explicit ownership of live documents, keyed by buffer id. The host
//! opens a document when a buffer appears and closes it when the buffer
//! goes away; nothing is created implicitly on lookup.

use crate::buffer::TextBuffer;
use crate::document::LiveDocument;
use crate::engine::ParseEngine;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::runtime::Handle;

/// Stable identifier for an open buffer
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BufferId(pub String);

impl BufferId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("buffer {0} is already open")]
    AlreadyOpen(BufferId),
    #[error("buffer {0} is not open")]
    NotOpen(BufferId),
}

/// Holds every open [`LiveDocument`], one per buffer id
pub struct DocumentRegistry {
    engine: Arc<dyn ParseEngine>,
    runtime: Handle,
    documents: Mutex<HashMap<BufferId, Arc<LiveDocument>>>,
}

impl DocumentRegistry {
    pub fn new(engine: Arc<dyn ParseEngine>, runtime: Handle) -> Self {
        Self {
            engine,
            runtime,
            documents: Mutex::new(HashMap::new()),
        }
    }

    /// Open a live document over the buffer. Fails if the id is already
    /// open; close it first to rebind.
    pub fn open(
        &self,
        id: BufferId,
        buffer: Arc<dyn TextBuffer>,
    ) -> Result<Arc<LiveDocument>, RegistryError> {
        let mut documents = self.documents.lock();
        if documents.contains_key(&id) {
            return Err(RegistryError::AlreadyOpen(id));
        }
        let document = LiveDocument::open(
            buffer,
            Arc::clone(&self.engine),
            self.runtime.clone(),
        );
        tracing::debug!(buffer = %id, "document opened");
        documents.insert(id, Arc::clone(&document));
        Ok(document)
    }

    /// The document for the id, if open
    pub fn get(&self, id: &BufferId) -> Option<Arc<LiveDocument>> {
        self.documents.lock().get(id).cloned()
    }

    /// Dispose and remove the document for the id
    pub fn close(&self, id: &BufferId) -> Result<(), RegistryError> {
        let document = self
            .documents
            .lock()
            .remove(id)
            .ok_or_else(|| RegistryError::NotOpen(id.clone()))?;
        document.dispose();
        tracing::debug!(buffer = %id, "document closed");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.documents.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.lock().is_empty()
    }
}

//! Live document: one open buffer kept in sync with its parse
//!
//! Buffer changes schedule a background re-parse. Scheduling is coalescing:
//! at most one parse per document is in flight, and changes arriving while
//! one runs fold into a single follow-up parse, so the published result
//! always catches up with the final text. A failed parse keeps the previous
//! result; consumers only ever see complete, well-formed snapshots.

use crate::buffer::TextBuffer;
use crate::engine::ParseEngine;
use crate::event::{Emitter, Subscription};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tokio::runtime::Handle;
use toon::ParseResult;

struct DocumentState {
    latest: Option<Arc<ParseResult>>,
    disposed: bool,
    buffer_subscription: Option<Subscription>,
}

/// A buffer plus its most recent successful parse
pub struct LiveDocument {
    buffer: Arc<dyn TextBuffer>,
    engine: Arc<dyn ParseEngine>,
    runtime: Handle,
    parsing: AtomicBool,
    dirty: AtomicBool,
    state: Mutex<DocumentState>,
    parsed: Emitter<Arc<LiveDocument>>,
}

impl std::fmt::Debug for LiveDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("LiveDocument")
            .field("parsing", &self.parsing.load(Ordering::SeqCst))
            .field("has_result", &state.latest.is_some())
            .field("disposed", &state.disposed)
            .finish_non_exhaustive()
    }
}

impl LiveDocument {
    /// Open a document over a buffer. Subscribes to buffer changes and
    /// kicks off the initial parse.
    pub fn open(
        buffer: Arc<dyn TextBuffer>,
        engine: Arc<dyn ParseEngine>,
        runtime: Handle,
    ) -> Arc<Self> {
        let document = Arc::new_cyclic(|weak: &Weak<Self>| {
            let weak = weak.clone();
            let subscription = buffer.subscribe_changes(Box::new(move || {
                if let Some(document) = weak.upgrade() {
                    document.schedule_reparse();
                }
            }));
            LiveDocument {
                buffer: Arc::clone(&buffer),
                engine,
                runtime,
                parsing: AtomicBool::new(false),
                dirty: AtomicBool::new(false),
                state: Mutex::new(DocumentState {
                    latest: None,
                    disposed: false,
                    buffer_subscription: Some(subscription),
                }),
                parsed: Emitter::new(),
            }
        });
        document.schedule_reparse();
        document
    }

    /// Request a re-parse of the current buffer text.
    ///
    /// If a parse is already running the request is folded into one
    /// follow-up parse; it is never lost.
    pub fn schedule_reparse(self: &Arc<Self>) {
        if self.state.lock().disposed {
            return;
        }
        self.dirty.store(true, Ordering::SeqCst);
        if self.parsing.swap(true, Ordering::SeqCst) {
            tracing::debug!("change coalesced into the in-flight parse");
            return;
        }
        let document = Arc::clone(self);
        self.runtime.spawn(async move {
            document.parse_loop().await;
        });
    }

    async fn parse_loop(self: Arc<Self>) {
        loop {
            self.dirty.store(false, Ordering::SeqCst);
            let text = self.buffer.current_text();
            let engine = Arc::clone(&self.engine);
            let outcome = tokio::task::spawn_blocking(move || engine.parse(&text)).await;

            let mut published = false;
            match outcome {
                Ok(Ok(result)) => {
                    let mut state = self.state.lock();
                    if state.disposed {
                        self.parsing.store(false, Ordering::SeqCst);
                        return;
                    }
                    state.latest = Some(Arc::new(result));
                    published = true;
                }
                Ok(Err(error)) => {
                    tracing::debug!(%error, "parse failed, keeping previous result");
                }
                Err(join_error) => {
                    tracing::debug!(%join_error, "parse task failed, keeping previous result");
                }
            }
            if published {
                self.parsed.emit(&self);
            }

            if self.dirty.load(Ordering::SeqCst) {
                continue;
            }
            self.parsing.store(false, Ordering::SeqCst);
            // A change may have landed between the check and the store; it
            // saw parsing=true and coalesced, so pick it up here unless a
            // newer schedule already claimed the flag.
            if self.dirty.load(Ordering::SeqCst) && !self.parsing.swap(true, Ordering::SeqCst) {
                continue;
            }
            return;
        }
    }

    /// The most recent successful parse, if any
    pub fn result(&self) -> Option<Arc<ParseResult>> {
        self.state.lock().latest.clone()
    }

    /// Whether a background parse is currently in flight
    pub fn is_parsing(&self) -> bool {
        self.parsing.load(Ordering::SeqCst)
    }

    /// Register for completed-parse notifications. The payload is the
    /// document itself; read [`result`](Self::result) for the snapshot.
    pub fn on_parsed(
        &self,
        listener: impl Fn(&Arc<LiveDocument>) + Send + Sync + 'static,
    ) -> Subscription {
        self.parsed.subscribe(listener)
    }

    /// Detach from the buffer and drop the current result. Idempotent;
    /// an in-flight parse finishes without publishing.
    pub fn dispose(&self) {
        let subscription = {
            let mut state = self.state.lock();
            if state.disposed {
                return;
            }
            state.disposed = true;
            state.latest = None;
            state.buffer_subscription.take()
        };
        drop(subscription);
        tracing::debug!("document disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.state.lock().disposed
    }
}

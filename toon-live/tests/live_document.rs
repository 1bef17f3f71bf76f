//! Behavior tests for the live document and registry
//!
//! The gated engine makes parse timing explicit: it signals when a parse
//! has started and blocks until the test releases it, so concurrency
//! properties are asserted deterministically instead of by sleeping.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;
use tokio::runtime::Handle;
use toon::{ParseError, ParseResult, Scalar, Value};
use toon_live::{
    BufferId, DocumentRegistry, LiveDocument, MemoryBuffer, ParseEngine, RegistryError, ToonEngine,
};

async fn wait_idle(document: &Arc<LiveDocument>) {
    for _ in 0..400 {
        if !document.is_parsing() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("document never went idle");
}

fn number_of(result: &ParseResult, key: &str) -> f64 {
    match result.root.get(key).map(|property| &property.value) {
        Some(Value::Scalar(Scalar::Number(number))) => *number,
        other => panic!("expected number for {}, got {:?}", key, other),
    }
}

/// Engine that signals parse starts and blocks until released
struct GateEngine {
    started: Mutex<mpsc::Sender<()>>,
    permits: Mutex<mpsc::Receiver<()>>,
    running: AtomicUsize,
    max_running: AtomicUsize,
    completed: AtomicUsize,
}

impl GateEngine {
    fn new() -> (Arc<Self>, mpsc::Receiver<()>, mpsc::Sender<()>) {
        let (started_tx, started_rx) = mpsc::channel();
        let (permit_tx, permit_rx) = mpsc::channel();
        let engine = Arc::new(Self {
            started: Mutex::new(started_tx),
            permits: Mutex::new(permit_rx),
            running: AtomicUsize::new(0),
            max_running: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
        });
        (engine, started_rx, permit_tx)
    }
}

impl ParseEngine for GateEngine {
    fn parse(&self, text: &str) -> Result<ParseResult, ParseError> {
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_running.fetch_max(now, Ordering::SeqCst);
        self.started.lock().send(()).ok();
        // held open until the test releases a permit
        self.permits.lock().recv().ok();
        self.completed.fetch_add(1, Ordering::SeqCst);
        self.running.fetch_sub(1, Ordering::SeqCst);
        toon::parse(text)
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn changes_during_a_parse_coalesce_into_one_follow_up() {
    let buffer = Arc::new(MemoryBuffer::new("a: 0\n"));
    let (engine, started, release) = GateEngine::new();
    let document = LiveDocument::open(buffer.clone(), engine.clone(), Handle::current());

    // initial parse is now inside the engine
    started.recv_timeout(Duration::from_secs(5)).unwrap();
    for i in 1..=5 {
        buffer.set_text(format!("a: {}\n", i));
    }
    release.send(()).unwrap();

    // exactly one follow-up parse covers all five changes
    started.recv_timeout(Duration::from_secs(5)).unwrap();
    release.send(()).unwrap();
    wait_idle(&document).await;

    assert_eq!(engine.max_running.load(Ordering::SeqCst), 1);
    assert_eq!(engine.completed.load(Ordering::SeqCst), 2);
    assert!(started.try_recv().is_err());
    let result = document.result().unwrap();
    assert_eq!(number_of(&result, "a"), 5.0);
}

#[tokio::test]
async fn failed_parse_keeps_the_previous_result() {
    let buffer = Arc::new(MemoryBuffer::new("a: 1\n"));
    let document = LiveDocument::open(buffer.clone(), Arc::new(ToonEngine), Handle::current());
    wait_idle(&document).await;
    let good = document.result().unwrap();
    assert_eq!(number_of(&good, "a"), 1.0);

    buffer.set_text("!!");
    wait_idle(&document).await;
    let after_failure = document.result().unwrap();
    assert_eq!(after_failure.root, good.root);

    // a later good edit recovers
    buffer.set_text("a: 2\n");
    wait_idle(&document).await;
    assert_eq!(number_of(&document.result().unwrap(), "a"), 2.0);
}

#[tokio::test]
async fn parsed_notifications_follow_every_publication() {
    let buffer = Arc::new(MemoryBuffer::new("a: 1\n"));
    let document = LiveDocument::open(buffer.clone(), Arc::new(ToonEngine), Handle::current());
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let subscription = document.on_parsed(move |document| {
        if let Some(result) = document.result() {
            tx.send(number_of(&result, "a")).ok();
        }
    });

    wait_idle(&document).await;
    assert_eq!(rx.recv().await, Some(1.0));

    buffer.set_text("a: 2\n");
    wait_idle(&document).await;
    assert_eq!(rx.recv().await, Some(2.0));

    // failures publish nothing
    buffer.set_text("!!");
    wait_idle(&document).await;
    assert!(rx.try_recv().is_err());

    subscription.unsubscribe();
    buffer.set_text("a: 3\n");
    wait_idle(&document).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn dispose_detaches_and_is_idempotent() {
    let buffer = Arc::new(MemoryBuffer::new("a: 1\n"));
    let document = LiveDocument::open(buffer.clone(), Arc::new(ToonEngine), Handle::current());
    assert_eq!(buffer.change_listener_count(), 1);
    wait_idle(&document).await;
    assert!(document.result().is_some());

    document.dispose();
    assert!(document.is_disposed());
    assert_eq!(buffer.change_listener_count(), 0);
    assert!(document.result().is_none());
    assert!(format!("{:?}", document).contains("disposed: true"));

    // second dispose is a no-op, not a panic
    document.dispose();
    assert_eq!(buffer.change_listener_count(), 0);

    // nothing reacts to buffer changes or explicit schedules any more
    buffer.set_text("b: 2\n");
    document.schedule_reparse();
    assert!(!document.is_parsing());
    assert!(document.result().is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn parse_finishing_after_dispose_publishes_nothing() {
    let buffer = Arc::new(MemoryBuffer::new("a: 1\n"));
    let (engine, started, release) = GateEngine::new();
    let document = LiveDocument::open(buffer.clone(), engine, Handle::current());

    started.recv_timeout(Duration::from_secs(5)).unwrap();
    document.dispose();
    release.send(()).unwrap();
    wait_idle(&document).await;

    assert!(document.result().is_none());
}

#[tokio::test]
async fn registry_owns_documents_explicitly() {
    let registry = DocumentRegistry::new(Arc::new(ToonEngine), Handle::current());
    let buffer = Arc::new(MemoryBuffer::new("a: 1\n"));
    let id = BufferId::new("memo://config.toon");

    let document = registry.open(id.clone(), buffer.clone()).unwrap();
    assert_eq!(registry.len(), 1);
    assert!(Arc::ptr_eq(&registry.get(&id).unwrap(), &document));

    // a second open of the same id is an error, not a silent rebind
    let other = Arc::new(MemoryBuffer::new(""));
    assert_eq!(
        registry.open(id.clone(), other).unwrap_err(),
        RegistryError::AlreadyOpen(id.clone())
    );

    wait_idle(&document).await;
    registry.close(&id).unwrap();
    assert!(registry.is_empty());
    assert!(document.is_disposed());
    assert_eq!(buffer.change_listener_count(), 0);
    assert_eq!(
        registry.close(&id).unwrap_err(),
        RegistryError::NotOpen(id)
    );
}

//! Scripted in-memory collaborator doubles for tests and examples.
//!
//! Each mock is configured per URL before the load starts:
//!
//! ```rust
//! use std::time::Duration;
//! use loadstone::host::mock::{ElementSignal, MockDocument};
//!
//! let document = MockDocument::new();
//! document.set_signal("slow.js", ElementSignal::Load(Duration::from_millis(80)));
//! document.set_signal("broken.css", ElementSignal::Error(Duration::ZERO));
//! document.set_signal("stalled.js", ElementSignal::Never);
//! ```
//!
//! Unscripted URLs load immediately on [`MockDocument`] and fail on
//! [`MockTransport`], so a test that forgets to script a fetch surfaces the
//! mistake instead of silently succeeding.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use url::Url;

use super::{
    DocumentHost, ElementSpec, FetchedBody, FontFaceHandle, FontFaceSpec, FontHost, HostError,
    Transport,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// How a mock element settles after insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementSignal {
    /// Fire the load signal after the given delay.
    Load(Duration),
    /// Fire the error signal after the given delay.
    Error(Duration),
    /// Never settle; only a timeout or cancellation can win.
    Never,
}

/// One entry in the document's event log, for ordering assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentEvent {
    /// An element for this URL was appended.
    Inserted(String),
    /// The element for this URL fired load or error.
    Settled(String),
}

/// Scripted [`DocumentHost`].
#[derive(Debug, Default)]
pub struct MockDocument {
    origin: Option<Url>,
    signals: Mutex<HashMap<String, ElementSignal>>,
    insert_log: Mutex<Vec<ElementSpec>>,
    attached: Mutex<Vec<ElementSpec>>,
    events: Mutex<Vec<DocumentEvent>>,
}

impl MockDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// A document with a known origin, for cache-busting locality checks.
    pub fn with_origin(origin: Url) -> Self {
        Self {
            origin: Some(origin),
            ..Self::default()
        }
    }

    /// Scripts the settle behavior for elements inserted with this URL.
    /// Unscripted URLs load immediately.
    pub fn set_signal(&self, url: &str, signal: ElementSignal) {
        lock(&self.signals).insert(url.to_string(), signal);
    }

    /// Pre-attaches an element, as if inserted outside the loader's control.
    pub fn attach_existing(&self, spec: ElementSpec) {
        lock(&self.attached).push(spec);
    }

    /// How many elements were ever inserted for this URL.
    pub fn insert_count(&self, url: &str) -> usize {
        lock(&self.insert_log)
            .iter()
            .filter(|spec| spec.url == url)
            .count()
    }

    /// How many elements were ever inserted, across all URLs.
    pub fn total_inserts(&self) -> usize {
        lock(&self.insert_log).len()
    }

    /// Whether an element for this URL is currently attached.
    pub fn is_attached(&self, url: &str) -> bool {
        lock(&self.attached).iter().any(|spec| spec.url == url)
    }

    /// Snapshot of the currently attached elements.
    pub fn attached_specs(&self) -> Vec<ElementSpec> {
        lock(&self.attached).clone()
    }

    /// Snapshot of every insert ever made, in order.
    pub fn inserted_specs(&self) -> Vec<ElementSpec> {
        lock(&self.insert_log).clone()
    }

    /// Ordered insert/settle event log.
    pub fn events(&self) -> Vec<DocumentEvent> {
        lock(&self.events).clone()
    }

    fn log(&self, event: DocumentEvent) {
        lock(&self.events).push(event);
    }
}

#[async_trait]
impl DocumentHost for MockDocument {
    async fn insert(&self, spec: ElementSpec) -> Result<(), HostError> {
        let url = spec.url.clone();
        let signal = lock(&self.signals)
            .get(&url)
            .cloned()
            .unwrap_or(ElementSignal::Load(Duration::ZERO));
        lock(&self.insert_log).push(spec.clone());
        lock(&self.attached).push(spec);
        self.log(DocumentEvent::Inserted(url.clone()));
        match signal {
            ElementSignal::Load(delay) => {
                tokio::time::sleep(delay).await;
                self.log(DocumentEvent::Settled(url));
                Ok(())
            }
            ElementSignal::Error(delay) => {
                tokio::time::sleep(delay).await;
                self.log(DocumentEvent::Settled(url.clone()));
                Err(HostError::Failed(format!(
                    "failed to load resource {}",
                    url
                )))
            }
            ElementSignal::Never => futures::future::pending().await,
        }
    }

    fn contains(&self, url: &str) -> bool {
        self.is_attached(url)
    }

    fn remove_matching(&self, url: &str) {
        lock(&self.attached).retain(|spec| spec.url != url);
    }

    fn origin(&self) -> Option<Url> {
        self.origin.clone()
    }
}

/// How a mock fetch settles.
#[derive(Debug, Clone, PartialEq, Eq)]
enum FetchScript {
    Body(Vec<u8>, Duration),
    Fail(String, Duration),
    Never,
}

/// Scripted [`Transport`].
#[derive(Debug, Default)]
pub struct MockTransport {
    scripts: Mutex<HashMap<String, FetchScript>>,
    fetch_log: Mutex<Vec<String>>,
    aborted: Mutex<Vec<String>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts an immediate successful body for this URL.
    pub fn respond(&self, url: &str, bytes: impl Into<Vec<u8>>) {
        lock(&self.scripts).insert(url.to_string(), FetchScript::Body(bytes.into(), Duration::ZERO));
    }

    /// Scripts an immediate successful JSON body for this URL.
    pub fn respond_json(&self, url: &str, value: serde_json::Value) {
        self.respond(url, value.to_string().into_bytes());
    }

    /// Scripts a successful body delivered after a delay.
    pub fn respond_after(&self, url: &str, bytes: impl Into<Vec<u8>>, delay: Duration) {
        lock(&self.scripts).insert(url.to_string(), FetchScript::Body(bytes.into(), delay));
    }

    /// Scripts a transport rejection for this URL.
    pub fn fail(&self, url: &str, message: &str) {
        lock(&self.scripts).insert(
            url.to_string(),
            FetchScript::Fail(message.to_string(), Duration::ZERO),
        );
    }

    /// Scripts a fetch that never settles until aborted.
    pub fn stall(&self, url: &str) {
        lock(&self.scripts).insert(url.to_string(), FetchScript::Never);
    }

    /// How many fetches were issued for this URL.
    pub fn fetch_count(&self, url: &str) -> usize {
        lock(&self.fetch_log).iter().filter(|u| *u == url).count()
    }

    /// How many fetches were issued, across all URLs.
    pub fn total_fetches(&self) -> usize {
        lock(&self.fetch_log).len()
    }

    /// URLs whose fetch observed the cancellation signal.
    pub fn aborted_urls(&self) -> Vec<String> {
        lock(&self.aborted).clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn fetch(&self, url: &str, cancel: &CancellationToken) -> Result<FetchedBody, HostError> {
        lock(&self.fetch_log).push(url.to_string());
        let script = lock(&self.scripts).get(url).cloned();
        let work = async {
            match script {
                Some(FetchScript::Body(bytes, delay)) => {
                    tokio::time::sleep(delay).await;
                    Ok(FetchedBody::new(bytes))
                }
                Some(FetchScript::Fail(message, delay)) => {
                    tokio::time::sleep(delay).await;
                    Err(HostError::Failed(message))
                }
                Some(FetchScript::Never) => futures::future::pending().await,
                None => Err(HostError::Failed(format!(
                    "no response scripted for {}",
                    url
                ))),
            }
        };
        tokio::select! {
            _ = cancel.cancelled() => {
                lock(&self.aborted).push(url.to_string());
                Err(HostError::Aborted)
            }
            out = work => out,
        }
    }
}

/// Scripted [`FontHost`].
#[derive(Debug, Default)]
pub struct MockFonts {
    failures: Mutex<HashMap<String, String>>,
    loaded: Mutex<Vec<FontFaceSpec>>,
    registered: Mutex<Vec<FontFaceHandle>>,
    next_id: AtomicU64,
}

impl MockFonts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts a load failure for faces sourced from this URL.
    pub fn fail(&self, url: &str, message: &str) {
        lock(&self.failures).insert(url.to_string(), message.to_string());
    }

    /// Faces that were loaded, in order.
    pub fn loaded_faces(&self) -> Vec<FontFaceSpec> {
        lock(&self.loaded).clone()
    }

    /// How many faces were registered with the renderer.
    pub fn registered_count(&self) -> usize {
        lock(&self.registered).len()
    }
}

#[async_trait]
impl FontHost for MockFonts {
    async fn load(&self, spec: &FontFaceSpec) -> Result<FontFaceHandle, HostError> {
        if let Some(message) = lock(&self.failures).get(&spec.source_url) {
            return Err(HostError::Failed(message.clone()));
        }
        lock(&self.loaded).push(spec.clone());
        Ok(FontFaceHandle(self.next_id.fetch_add(1, Ordering::Relaxed)))
    }

    fn register(&self, face: FontFaceHandle) {
        lock(&self.registered).push(face);
    }
}

//! Collaborator seams: document tree, network transport, font registry.
//!
//! The loader never touches a real DOM, socket, or font renderer directly.
//! Everything it needs from the host environment is expressed as one of the
//! three traits below, so the core stays testable and embeddable:
//!
//! - [`DocumentHost`]: append an element and await its load/error signal,
//!   query attached elements by URL, detach them.
//! - [`Transport`]: fetch raw bytes with cooperative cancellation.
//! - [`FontHost`]: load a font face and register it for rendering.
//!
//! [`HttpTransport`] is the production [`Transport`]. [`mock`] ships scripted
//! in-memory doubles for tests and examples, and [`HeadlessDocument`] /
//! [`HeadlessFonts`] are the fallbacks for embedders that only fetch JSON or
//! binary resources.

mod http;
pub mod mock;

pub use http::HttpTransport;
pub use tokio_util::sync::CancellationToken;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::options::CrossOrigin;

/// Failures surfaced by a collaborator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HostError {
    /// The in-flight operation was severed through its cancellation signal.
    #[error("request aborted")]
    Aborted,
    /// Anything else the collaborator reports: element error signals,
    /// transport rejections, font loading failures.
    #[error("{0}")]
    Failed(String),
}

/// Element type a resource kind materializes as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementTag {
    Script,
    Link,
    Img,
}

impl ElementTag {
    pub fn tag_name(&self) -> &'static str {
        match self {
            ElementTag::Script => "script",
            ElementTag::Link => "link",
            ElementTag::Img => "img",
        }
    }

    /// The attribute carrying the element's URL (`src` or `href`), the same
    /// locator [`DocumentHost::contains`] matches on.
    pub fn url_attribute(&self) -> &'static str {
        match self {
            ElementTag::Script | ElementTag::Img => "src",
            ElementTag::Link => "href",
        }
    }
}

/// Where an element is appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsertionPoint {
    #[default]
    Head,
    Body,
}

/// Everything the document collaborator needs to build one element.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementSpec {
    pub tag: ElementTag,
    /// Final (possibly cache-busted) URL, written to the tag's URL attribute.
    pub url: String,
    /// Validated attributes, applied in order after the URL attribute.
    pub attributes: Vec<(String, String)>,
    pub insertion_point: InsertionPoint,
    pub cross_origin: Option<CrossOrigin>,
}

/// The document tree, reduced to what the loader needs.
#[async_trait]
pub trait DocumentHost: Send + Sync {
    /// Create the element described by `spec`, apply its attributes, append
    /// it at the insertion point, and resolve once the element fires its
    /// load (`Ok`) or error (`Err`) signal.
    ///
    /// The returned future may be dropped before it settles (on timeout or
    /// cancellation), in which case the element stays attached until
    /// [`DocumentHost::remove_matching`] detaches it.
    async fn insert(&self, spec: ElementSpec) -> Result<(), HostError>;

    /// Whether an element whose URL attribute equals `url` is attached.
    fn contains(&self, url: &str) -> bool;

    /// Detach every element whose URL attribute equals `url`.
    fn remove_matching(&self, url: &str);

    /// Origin of the hosting document, when one is known. Used to decide
    /// whether a URL counts as local for cache busting.
    fn origin(&self) -> Option<Url> {
        None
    }
}

/// Response body handed back by a [`Transport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedBody {
    bytes: Vec<u8>,
}

impl FetchedBody {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Parses the body as a JSON document.
    pub fn json(&self) -> Result<Value, HostError> {
        serde_json::from_slice(&self.bytes)
            .map_err(|e| HostError::Failed(format!("invalid JSON body: {}", e)))
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// The network, reduced to a cancellable byte fetch.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch the body at `url`. Implementations must resolve with
    /// [`HostError::Aborted`] promptly once `cancel` fires.
    async fn fetch(&self, url: &str, cancel: &CancellationToken) -> Result<FetchedBody, HostError>;
}

/// Descriptor for one font face to load.
#[derive(Debug, Clone, PartialEq)]
pub struct FontFaceSpec {
    pub family: String,
    pub source_url: String,
    pub cross_origin: Option<CrossOrigin>,
}

/// Opaque handle to a face loaded by a [`FontHost`]; only meaningful to the
/// host that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontFaceHandle(pub u64);

/// The font subsystem, reduced to load-then-register.
#[async_trait]
pub trait FontHost: Send + Sync {
    /// Load the described face without registering it.
    async fn load(&self, spec: &FontFaceSpec) -> Result<FontFaceHandle, HostError>;

    /// Make a previously loaded face available to the renderer.
    fn register(&self, face: FontFaceHandle);
}

/// Document collaborator for environments without a document tree.
///
/// Element loads fail immediately with a clear message; queries match
/// nothing. Lets embedders that only fetch JSON or binary resources build a
/// [`Loader`](crate::Loader) without a DOM.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessDocument;

#[async_trait]
impl DocumentHost for HeadlessDocument {
    async fn insert(&self, spec: ElementSpec) -> Result<(), HostError> {
        Err(HostError::Failed(format!(
            "no document tree to attach {}",
            spec.url
        )))
    }

    fn contains(&self, _url: &str) -> bool {
        false
    }

    fn remove_matching(&self, _url: &str) {}
}

/// Font collaborator for environments without a font renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessFonts;

#[async_trait]
impl FontHost for HeadlessFonts {
    async fn load(&self, spec: &FontFaceSpec) -> Result<FontFaceHandle, HostError> {
        Err(HostError::Failed(format!(
            "no font subsystem to load {}",
            spec.source_url
        )))
    }

    fn register(&self, _face: FontFaceHandle) {}
}

//! # Loadstone
//!
//! A deduplicating resource loader: given one or more URLs, it loads assets
//! of heterogeneous kinds (scripts, stylesheets, images, fonts, JSON
//! documents, opaque binary blobs) **at most once per URL**, hands every
//! caller of the same URL the same awaitable, and tracks load, cancel, and
//! timeout state for the lifetime of the loader.
//!
//! ## Design principles
//!
//! - **One attempt per key**: the load cache guarantees at most one
//!   in-flight load per URL; concurrent and later callers share the
//!   identical outcome through a `Shared` future.
//! - **One outcome shape**: every per-kind completion signal (element
//!   load/error events, transport responses, font registration) collapses
//!   into [`LoadedResource`] or a categorized [`LoadError`]; nothing above
//!   the strategy layer branches on kind.
//! - **First settlement wins**: each attempt races its protocol against one
//!   timeout timer and a cancellation token in a single `select!`; losing
//!   branches are dropped, so late signals cannot double-settle.
//! - **Injected collaborators**: the document tree, the network, and the
//!   font subsystem sit behind [`DocumentHost`], [`Transport`], and
//!   [`FontHost`]; production code plugs in [`HttpTransport`], tests and
//!   examples use the scripted doubles in [`host::mock`].
//!
//! ## Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//! use loadstone::host::mock::{MockDocument, MockFonts, MockTransport};
//! use loadstone::{LoadOptions, LoadState, Loader};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let document = Arc::new(MockDocument::new());
//! let loader = Loader::builder()
//!     .document(document.clone())
//!     .transport(Arc::new(MockTransport::new()))
//!     .fonts(Arc::new(MockFonts::new()))
//!     .build();
//!
//! // Sequential: plugin.js starts only after lib.js has loaded.
//! loader
//!     .include(["lib.js", "plugin.js"], &LoadOptions::new())
//!     .await
//!     .unwrap();
//! assert_eq!(loader.resource_state("lib.js"), LoadState::Loaded);
//!
//! loader.unload_resource("lib.js");
//! assert_eq!(loader.resource_state("lib.js"), LoadState::Unloaded);
//! # }
//! ```
//!
//! ## Main modules
//!
//! - [`loader`]: [`Loader`], [`LoaderBuilder`], [`IntoUrls`]: the public
//!   surface (`include`, `unload_resource`, `cancel_resource`,
//!   `resource_state`).
//! - [`kind`]: [`ResourceKind`], [`classify`]: URL extension to kind.
//! - [`options`]: [`LoadOptions`], [`CrossOrigin`]: per-call configuration
//!   and cache busting.
//! - [`attrs`]: per-kind attribute validation.
//! - [`error`]: [`LoadError`], [`ErrorKind`]: the failure taxonomy.
//! - [`outcome`]: [`LoadedResource`]: the unified success value.
//! - [`host`]: collaborator traits, [`HttpTransport`], headless fallbacks,
//!   and scripted mocks.

pub mod attrs;
mod cache;
pub mod error;
pub mod host;
pub mod kind;
pub mod loader;
pub mod options;
pub mod outcome;
mod strategy;

pub use cache::LoadState;
pub use error::{ErrorKind, LoadError};
pub use host::{
    DocumentHost, ElementSpec, ElementTag, FetchedBody, FontFaceHandle, FontFaceSpec, FontHost,
    HeadlessDocument, HeadlessFonts, HostError, HttpTransport, InsertionPoint, Transport,
};
pub use kind::{classify, ResourceKind};
pub use loader::{IntoUrls, Loader, LoaderBuilder};
pub use options::{CrossOrigin, LoadOptions, DEFAULT_CACHE_BUSTING_QUERY, DEFAULT_TIMEOUT};
pub use outcome::LoadedResource;
pub use strategy::FONT_FAMILY_PLACEHOLDER;

//! Unified load outcome value.
//!
//! Every per-kind protocol (element events, fetch bodies, font
//! registration) collapses into one variant type, so the cache and the
//! batch loader never branch on kind-specific shapes.

use std::sync::Arc;

use serde_json::Value;

/// What a successful load attempt produced. `Clone` is cheap: payloads are
/// shared, because every caller awaiting the same URL receives the same
/// value.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadedResource {
    /// A script, stylesheet, or image element fired its load signal.
    Element,
    /// An element for the URL was already attached; nothing new was loaded.
    AlreadyPresent,
    /// Parsed body of a JSON document.
    Json(Arc<Value>),
    /// Raw bytes of an opaque binary resource.
    Blob(Arc<Vec<u8>>),
    /// A font face was loaded and registered.
    Font,
}

impl LoadedResource {
    /// The parsed document, when this outcome is a JSON resource.
    pub fn json(&self) -> Option<&Value> {
        match self {
            LoadedResource::Json(value) => Some(value),
            _ => None,
        }
    }

    /// The raw bytes, when this outcome is a binary resource.
    pub fn bytes(&self) -> Option<&[u8]> {
        match self {
            LoadedResource::Blob(bytes) => Some(bytes),
            _ => None,
        }
    }
}

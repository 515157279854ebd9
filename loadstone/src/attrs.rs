//! Attribute validation for caller-supplied element attributes.
//!
//! Configuration objects are loosely typed at the call site; a typoed or
//! misplaced key must not fail the whole load. [`sanitize`] keeps the keys
//! that are legal on the element a kind produces, drops the rest, and emits
//! a `tracing::warn!` diagnostic per dropped key.

use std::collections::BTreeMap;
use std::collections::HashSet;

use once_cell::sync::Lazy;

use crate::kind::ResourceKind;

/// Attributes accepted on any element kind.
static GENERAL: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ["id", "class", "title"].into_iter().collect());

static SCRIPT: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "async",
        "defer",
        "type",
        "nomodule",
        "integrity",
        "referrerpolicy",
        "nonce",
    ]
    .into_iter()
    .collect()
});

static STYLESHEET: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "media",
        "type",
        "integrity",
        "referrerpolicy",
        "nonce",
        "disabled",
    ]
    .into_iter()
    .collect()
});

static IMAGE: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "alt",
        "width",
        "height",
        "loading",
        "decoding",
        "srcset",
        "sizes",
        "referrerpolicy",
    ]
    .into_iter()
    .collect()
});

/// Whether `key` is legal on the element `kind` produces. Fetch-based kinds
/// produce no element, so nothing is legal on them.
pub fn is_allowed(kind: ResourceKind, key: &str) -> bool {
    let per_kind = match kind {
        ResourceKind::Script => &*SCRIPT,
        ResourceKind::Stylesheet => &*STYLESHEET,
        ResourceKind::Image => &*IMAGE,
        ResourceKind::Font | ResourceKind::JsonDocument | ResourceKind::BinaryBlob => {
            return false;
        }
    };
    key.starts_with("data-") || GENERAL.contains(key) || per_kind.contains(key)
}

/// Filters `attributes` down to the keys legal for `kind`, in input order.
/// Rejected keys are dropped with a warning, never an error.
pub fn sanitize(kind: ResourceKind, attributes: &BTreeMap<String, String>) -> Vec<(String, String)> {
    let mut safe = Vec::with_capacity(attributes.len());
    for (key, value) in attributes {
        if is_allowed(kind, key) {
            safe.push((key.clone(), value.clone()));
        } else {
            tracing::warn!(kind = %kind, attribute = %key, "dropping attribute not valid for kind");
        }
    }
    safe
}

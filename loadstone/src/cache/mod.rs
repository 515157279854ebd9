//! Dedicated load cache: at most one in-flight attempt per URL.
//!
//! The cache is the loader's only shared mutable state. It is keyed by the
//! raw URL and owns one [`LoadRecord`] per key; the record's outcome is a
//! [`Shared`] future, so every caller (concurrent or later) awaits the
//! identical settlement. The check-then-create step goes through the map's
//! entry API, so no two attempts can ever be started for the same key.
//!
//! Each [`crate::Loader`] constructs its own cache; there is no process-wide
//! singleton, and independent loaders never share records.

use std::sync::{Arc, Mutex};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::LoadError;
use crate::kind::ResourceKind;
use crate::outcome::LoadedResource;

/// The one awaitable handed to every caller of a given URL.
pub type SharedOutcome = Shared<BoxFuture<'static, Result<LoadedResource, LoadError>>>;

/// Lifecycle of a cached resource. `Unloaded` doubles as the state of keys
/// the cache has never seen and of keys whose attempt failed: in both cases
/// nothing is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    Loading,
    Loaded,
    Unloaded,
}

/// Cache entry for one URL: kind, lifecycle state, the shared outcome, and
/// the handle that severs the attempt.
pub(crate) struct LoadRecord {
    pub(crate) kind: ResourceKind,
    /// URL actually requested (after cache busting); needed to detach the
    /// element this record may have inserted.
    pub(crate) final_url: String,
    state: Arc<Mutex<LoadState>>,
    pub(crate) outcome: SharedOutcome,
    pub(crate) cancel: CancellationToken,
}

pub(crate) struct LoadCache {
    records: DashMap<String, LoadRecord>,
}

impl LoadCache {
    pub(crate) fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    /// Returns the existing outcome for `url`, or atomically creates a new
    /// record whose attempt is produced by `start`. `start` runs at most
    /// once per key between creation and removal of the record.
    ///
    /// The attempt is wrapped so that settling it updates the record state:
    /// success marks the record `Loaded`, failure reverts it to `Unloaded`
    /// while the rejection stays cached for later callers.
    pub(crate) fn acquire<F>(
        &self,
        url: &str,
        kind: ResourceKind,
        final_url: &str,
        start: F,
    ) -> SharedOutcome
    where
        F: FnOnce(CancellationToken) -> BoxFuture<'static, Result<LoadedResource, LoadError>>,
    {
        match self.records.entry(url.to_string()) {
            Entry::Occupied(entry) => entry.get().outcome.clone(),
            Entry::Vacant(slot) => {
                let cancel = CancellationToken::new();
                let state = Arc::new(Mutex::new(LoadState::Loading));
                let settle_state = Arc::clone(&state);
                let attempt = start(cancel.clone());
                let outcome: SharedOutcome = async move {
                    let settled = attempt.await;
                    let next = if settled.is_ok() {
                        LoadState::Loaded
                    } else {
                        LoadState::Unloaded
                    };
                    *settle_state.lock().unwrap_or_else(|e| e.into_inner()) = next;
                    settled
                }
                .boxed()
                .shared();
                slot.insert(LoadRecord {
                    kind,
                    final_url: final_url.to_string(),
                    state,
                    outcome: outcome.clone(),
                    cancel,
                });
                outcome
            }
        }
    }

    /// Deletes the record, returning it so the owner can run cleanup
    /// (cancellation, element detach). Unknown keys return `None`.
    pub(crate) fn remove(&self, url: &str) -> Option<LoadRecord> {
        self.records.remove(url).map(|(_, record)| record)
    }

    /// Current lifecycle state; `Unloaded` for unknown keys.
    pub(crate) fn state(&self, url: &str) -> LoadState {
        self.records
            .get(url)
            .map(|record| *record.state.lock().unwrap_or_else(|e| e.into_inner()))
            .unwrap_or(LoadState::Unloaded)
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.records.len()
    }
}

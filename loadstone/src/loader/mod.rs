//! Public surface: [`Loader`], sequential `include`, unload/cancel/state.
//!
//! A [`Loader`] owns one load cache and the three collaborator handles.
//! `include` feeds URLs through the cache strictly in order: the load for
//! URL *n+1* does not begin until the load for URL *n* has settled, and the
//! chain stops at the first rejection, because real script dependencies
//! require their prerequisites to finish loading first. The
//! cache's keyed dedup still applies inside and across chains, so repeated
//! URLs never re-trigger a load.

use std::sync::Arc;

use futures::future::FutureExt;

use crate::attrs;
use crate::cache::{LoadCache, LoadState};
use crate::error::LoadError;
use crate::host::{
    DocumentHost, FontHost, HeadlessDocument, HeadlessFonts, HttpTransport, Transport,
};
use crate::kind::classify;
use crate::options::LoadOptions;
use crate::outcome::LoadedResource;
use crate::strategy::{self, Hosts, LoadPlan};

/// Conversion of "one URL or many" into an ordered list, so `include`
/// accepts a single `&str` as naturally as a slice or vector.
pub trait IntoUrls {
    fn into_urls(self) -> Vec<String>;
}

impl IntoUrls for &str {
    fn into_urls(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoUrls for String {
    fn into_urls(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoUrls for &String {
    fn into_urls(self) -> Vec<String> {
        vec![self.clone()]
    }
}

impl IntoUrls for Vec<String> {
    fn into_urls(self) -> Vec<String> {
        self
    }
}

impl IntoUrls for Vec<&str> {
    fn into_urls(self) -> Vec<String> {
        self.into_iter().map(str::to_string).collect()
    }
}

impl IntoUrls for &[&str] {
    fn into_urls(self) -> Vec<String> {
        self.iter().map(|url| url.to_string()).collect()
    }
}

impl<const N: usize> IntoUrls for [&str; N] {
    fn into_urls(self) -> Vec<String> {
        self.iter().map(|url| url.to_string()).collect()
    }
}

/// Deduplicating resource loader.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use loadstone::host::mock::{MockDocument, MockFonts, MockTransport};
/// use loadstone::{LoadOptions, Loader};
///
/// # #[tokio::main]
/// # async fn main() {
/// let loader = Loader::builder()
///     .document(Arc::new(MockDocument::new()))
///     .transport(Arc::new(MockTransport::new()))
///     .fonts(Arc::new(MockFonts::new()))
///     .build();
///
/// let outcomes = loader
///     .include(["lib.js", "plugin.js"], &LoadOptions::new())
///     .await
///     .unwrap();
/// assert_eq!(outcomes.len(), 2);
/// # }
/// ```
pub struct Loader {
    hosts: Arc<Hosts>,
    cache: LoadCache,
}

/// Builds a [`Loader`] from collaborator handles. Unset slots fall back to
/// [`HttpTransport`] for the network and the headless no-op hosts for the
/// document and fonts, which is enough for JSON/binary-only embedders.
#[derive(Default)]
pub struct LoaderBuilder {
    document: Option<Arc<dyn DocumentHost>>,
    transport: Option<Arc<dyn Transport>>,
    fonts: Option<Arc<dyn FontHost>>,
}

impl LoaderBuilder {
    pub fn document(mut self, document: Arc<dyn DocumentHost>) -> Self {
        self.document = Some(document);
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn fonts(mut self, fonts: Arc<dyn FontHost>) -> Self {
        self.fonts = Some(fonts);
        self
    }

    pub fn build(self) -> Loader {
        Loader {
            hosts: Arc::new(Hosts {
                document: self.document.unwrap_or_else(|| Arc::new(HeadlessDocument)),
                transport: self
                    .transport
                    .unwrap_or_else(|| Arc::new(HttpTransport::new())),
                fonts: self.fonts.unwrap_or_else(|| Arc::new(HeadlessFonts)),
            }),
            cache: LoadCache::new(),
        }
    }
}

impl Loader {
    pub fn builder() -> LoaderBuilder {
        LoaderBuilder::default()
    }

    /// Loads the given URLs strictly in order, each at most once per loader.
    ///
    /// Returns the per-URL outcomes in input order. The first rejection
    /// stops the chain and is returned as the call's error; URLs after it
    /// are never started. An empty input resolves to an empty vector.
    pub async fn include<U: IntoUrls>(
        &self,
        urls: U,
        options: &LoadOptions,
    ) -> Result<Vec<LoadedResource>, LoadError> {
        let urls = urls.into_urls();
        let mut outcomes = Vec::with_capacity(urls.len());
        for url in urls {
            outcomes.push(self.include_one(&url, options).await?);
        }
        Ok(outcomes)
    }

    async fn include_one(
        &self,
        url: &str,
        options: &LoadOptions,
    ) -> Result<LoadedResource, LoadError> {
        let Some(kind) = classify(url) else {
            tracing::warn!(url = %url, "unsupported resource type");
            return Err(LoadError::UnsupportedType {
                url: url.to_string(),
            });
        };

        let origin = self.hosts.document.origin();
        let final_url = options.final_url(url, kind, origin.as_ref());

        let hosts = Arc::clone(&self.hosts);
        let url_owned = url.to_string();
        let final_owned = final_url.clone();
        // Snapshot of the configuration pieces the attempt reads; the
        // closure below runs only if this call creates the record.
        let attributes = options.attributes.clone();
        let timeout = options.timeout;
        let append_to_body = options.append_to_body;
        let cross_origin = options.cross_origin;

        let outcome = self.cache.acquire(url, kind, &final_url, move |cancel| {
            tracing::debug!(url = %url_owned, kind = %kind, "starting load");
            let plan = LoadPlan {
                kind,
                final_url: final_owned,
                attributes: attrs::sanitize(kind, &attributes),
                timeout,
                append_to_body,
                cross_origin,
            };
            strategy::run(hosts, plan, cancel).boxed()
        });
        outcome.await
    }

    /// Detaches any element still matching `url` and forgets its record;
    /// the next `include` for `url` starts a fresh load.
    pub fn unload_resource(&self, url: &str) {
        if let Some(record) = self.cache.remove(url) {
            tracing::debug!(url = %url, kind = %record.kind, "resource unloaded");
            self.hosts.document.remove_matching(&record.final_url);
        }
        // Elements inserted outside this loader's control match the raw URL.
        self.hosts.document.remove_matching(url);
    }

    /// Severs an in-flight load for `url` through its cancellation handle,
    /// then performs the same cleanup as [`Loader::unload_resource`].
    /// Callers awaiting the load observe an abort-categorized rejection;
    /// cancelling a settled or unknown key only cleans up.
    pub fn cancel_resource(&self, url: &str) {
        if let Some(record) = self.cache.remove(url) {
            record.cancel.cancel();
            tracing::debug!(url = %url, kind = %record.kind, "resource load cancelled");
            self.hosts.document.remove_matching(&record.final_url);
        }
        self.hosts.document.remove_matching(url);
    }

    /// Lifecycle state for `url`; `Unloaded` for URLs this loader has never
    /// loaded (or whose attempt failed).
    pub fn resource_state(&self, url: &str) -> LoadState {
        self.cache.state(url)
    }
}

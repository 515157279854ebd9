//! Per-call load configuration.
//!
//! A [`LoadOptions`] value is an immutable snapshot: the loader reads it when
//! an attempt starts and never again, so mutating a configuration after a
//! call has begun cannot affect loads already in flight.

use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::kind::ResourceKind;

/// Default timeout raced against every load protocol.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Default cache-busting query template; `{now}` is replaced with a
/// millisecond timestamp.
pub const DEFAULT_CACHE_BUSTING_QUERY: &str = "_={now}";

/// Cross-origin policy applied to elements and font faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CrossOrigin {
    Anonymous,
    UseCredentials,
}

impl CrossOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            CrossOrigin::Anonymous => "anonymous",
            CrossOrigin::UseCredentials => "use-credentials",
        }
    }
}

/// Configuration for one `include` call.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use loadstone::options::LoadOptions;
///
/// let options = LoadOptions::new()
///     .with_timeout(Duration::from_secs(5))
///     .with_attribute("id", "analytics")
///     .with_cache_busting(true);
/// assert_eq!(options.timeout, Duration::from_secs(5));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Candidate element attributes; validated per kind before application.
    pub attributes: BTreeMap<String, String>,
    /// How long a load may stay pending before it is failed and cleaned up.
    pub timeout: Duration,
    /// Whether to append a volatile query parameter to defeat HTTP caching.
    pub cache_busting: bool,
    /// Query template appended when busting; `{now}` expands to a
    /// millisecond timestamp.
    pub cache_busting_query: String,
    /// Kinds eligible for cache busting.
    pub cache_busting_kinds: HashSet<ResourceKind>,
    /// When set, only URLs sharing the document's origin are busted.
    pub restrict_cache_busting_to_local: bool,
    /// Append script elements to the body instead of the head.
    pub append_to_body: bool,
    /// Cross-origin policy for elements and font faces.
    pub cross_origin: Option<CrossOrigin>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            attributes: BTreeMap::new(),
            timeout: DEFAULT_TIMEOUT,
            cache_busting: false,
            cache_busting_query: DEFAULT_CACHE_BUSTING_QUERY.to_string(),
            cache_busting_kinds: [ResourceKind::Script, ResourceKind::Stylesheet]
                .into_iter()
                .collect(),
            restrict_cache_busting_to_local: true,
            append_to_body: false,
            cross_origin: None,
        }
    }
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_cache_busting(mut self, enabled: bool) -> Self {
        self.cache_busting = enabled;
        self
    }

    pub fn with_cache_busting_query(mut self, template: impl Into<String>) -> Self {
        self.cache_busting_query = template.into();
        self
    }

    pub fn with_cache_busting_kinds(
        mut self,
        kinds: impl IntoIterator<Item = ResourceKind>,
    ) -> Self {
        self.cache_busting_kinds = kinds.into_iter().collect();
        self
    }

    pub fn with_restrict_cache_busting_to_local(mut self, restricted: bool) -> Self {
        self.restrict_cache_busting_to_local = restricted;
        self
    }

    pub fn with_append_to_body(mut self, append_to_body: bool) -> Self {
        self.append_to_body = append_to_body;
        self
    }

    pub fn with_cross_origin(mut self, policy: CrossOrigin) -> Self {
        self.cross_origin = Some(policy);
        self
    }

    /// The URL actually requested: the raw URL, plus the busting query when
    /// busting is enabled, the kind is eligible, and the URL counts as local
    /// if the restriction is on. The cache still keys on the raw URL, so two
    /// calls producing different timestamps dedupe correctly.
    pub(crate) fn final_url(
        &self,
        url: &str,
        kind: ResourceKind,
        origin: Option<&Url>,
    ) -> String {
        if !self.cache_busting || !self.cache_busting_kinds.contains(&kind) {
            return url.to_string();
        }
        if self.restrict_cache_busting_to_local {
            let local = match origin {
                Some(origin) => is_same_origin(url, origin),
                // Without a known document origin, locality cannot be proven.
                None => false,
            };
            if !local {
                return url.to_string();
            }
        }
        let stamp = chrono::Utc::now().timestamp_millis().to_string();
        let query = self.cache_busting_query.replace("{now}", &stamp);
        let separator = if url.contains('?') { '&' } else { '?' };
        format!("{}{}{}", url, separator, query)
    }
}

/// Absolute URLs are compared origin-to-origin; relative URLs resolve against
/// the document and therefore count as local.
fn is_same_origin(url: &str, origin: &Url) -> bool {
    match Url::parse(url) {
        Ok(parsed) => parsed.origin() == origin.origin(),
        Err(_) => true,
    }
}

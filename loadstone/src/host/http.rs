//! reqwest-backed [`Transport`].

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::{FetchedBody, HostError, Transport};

/// Production [`Transport`] over a shared `reqwest::Client`.
///
/// Non-success status codes are reported as [`HostError::Failed`]; the
/// loader's own timeout races every fetch, so the client needs no timeout of
/// its own unless the embedder configures one.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Uses a caller-configured client (proxies, default headers, ...).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, url: &str, cancel: &CancellationToken) -> Result<FetchedBody, HostError> {
        let request = async {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| HostError::Failed(e.to_string()))?
                .error_for_status()
                .map_err(|e| HostError::Failed(e.to_string()))?;
            let bytes = response
                .bytes()
                .await
                .map_err(|e| HostError::Failed(e.to_string()))?;
            Ok(FetchedBody::new(bytes.to_vec()))
        };
        tokio::select! {
            _ = cancel.cancelled() => Err(HostError::Aborted),
            out = request => out,
        }
    }
}

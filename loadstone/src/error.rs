//! Load failure taxonomy.
//!
//! Heterogeneous failure signals (element error events, transport
//! rejections, fired timers, cancellation) are normalized into [`LoadError`]
//! so calling code branches on [`LoadError::kind`], never on raw
//! collaborator shapes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::host::HostError;
use crate::kind::ResourceKind;

/// The four terminal, mutually exclusive failure categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    UnsupportedType,
    NetworkFailure,
    Timeout,
    Abort,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::UnsupportedType => "unsupported-type",
            ErrorKind::NetworkFailure => "network-failure",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Abort => "abort",
        }
    }
}

/// A categorized load failure. `Clone` because every caller awaiting the
/// same URL observes the identical rejection.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoadError {
    /// The URL's extension maps to no known resource kind.
    #[error("unsupported resource type: {url}")]
    UnsupportedType { url: String },
    /// The timeout timer won the race against the load protocol.
    #[error("resource loading timeout: {url}")]
    Timeout { url: String },
    /// The attempt was cancelled through its cancellation handle.
    #[error("resource load aborted: {url}")]
    Aborted { url: String },
    /// Element error signal or transport rejection.
    #[error("failed to load resource {url}: {message}")]
    Network { url: String, message: String },
}

impl LoadError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LoadError::UnsupportedType { .. } => ErrorKind::UnsupportedType,
            LoadError::Timeout { .. } => ErrorKind::Timeout,
            LoadError::Aborted { .. } => ErrorKind::Abort,
            LoadError::Network { .. } => ErrorKind::NetworkFailure,
        }
    }

    /// URL of the resource the failure belongs to.
    pub fn url(&self) -> &str {
        match self {
            LoadError::UnsupportedType { url }
            | LoadError::Timeout { url }
            | LoadError::Aborted { url }
            | LoadError::Network { url, .. } => url,
        }
    }

    /// Normalizes a raw collaborator failure. Classification order is fixed:
    /// an abort signal always wins; then a timeout marker in the message;
    /// then a missing kind classification; everything else is a network
    /// failure.
    pub fn categorize(raw: &HostError, kind: Option<ResourceKind>, url: &str) -> Self {
        match raw {
            HostError::Aborted => LoadError::Aborted {
                url: url.to_string(),
            },
            HostError::Failed(message) => {
                let lowered = message.to_lowercase();
                if lowered.contains("timeout") || lowered.contains("timed out") {
                    LoadError::Timeout {
                        url: url.to_string(),
                    }
                } else if kind.is_none() {
                    LoadError::UnsupportedType {
                        url: url.to_string(),
                    }
                } else {
                    LoadError::Network {
                        url: url.to_string(),
                        message: message.clone(),
                    }
                }
            }
        }
    }
}

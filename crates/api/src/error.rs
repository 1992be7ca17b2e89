//! Error types for platform service calls.

use std::io;

use thiserror::Error;

/// Error raised by the platform clients.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The execution identity token is not available.
    #[error("failed to get execution token: {variable} is not set")]
    MissingToken { variable: &'static str },

    #[error("invalid service URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The service answered with a non-success status.
    #[error("HTTP {status} from {url}: {body}")]
    Status { url: String, status: u16, body: String },

    /// The service answered successfully but the payload was unusable.
    #[error("unexpected response from {url}: {reason}")]
    MalformedResponse { url: String, reason: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("I/O error on {path}: {source}")]
    File {
        path: String,
        #[source]
        source: io::Error,
    },

    /// The async runtime backing a blocking call could not be started.
    #[error("runtime error: {0}")]
    Runtime(#[from] io::Error),
}

impl ApiError {
    pub(crate) fn file(path: &std::path::Path, source: io::Error) -> Self {
        Self::File {
            path: path.display().to_string(),
            source,
        }
    }

    /// True when the error stems from missing identity configuration rather
    /// than from a failed remote call.
    pub fn is_configuration(&self) -> bool {
        matches!(self, ApiError::MissingToken { .. } | ApiError::InvalidBaseUrl { .. })
    }
}

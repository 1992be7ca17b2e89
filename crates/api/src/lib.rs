//! Platform service clients for the detaxizer launcher.
//!
//! This crate provides the launcher's view of the managed execution
//! platform. It focuses on:
//!
//! - Reading the execution identity token from the environment
//! - Provisioning the shared storage volume through the dispatcher service
//! - Uploading run artifacts (the pipeline log) to remote storage
//! - Resolving the unique name of the current execution
//!
//! Every service sits behind a small synchronous trait
//! ([`StorageProvisioner`], [`ArtifactStore`], [`ExecutionNameSource`]) so
//! the orchestrator can run against in-memory fakes in tests. The HTTP
//! implementations are async `reqwest` clients driven through
//! [`detaxizer_util::block_on_future`].
//!
//! # Example
//!
//! ```ignore
//! use detaxizer_api::{DispatcherClient, StorageProvisioner};
//!
//! let dispatcher = DispatcherClient::new("http://nf-dispatcher-service.flyte.svc.cluster.local")?;
//! let pvc_name = dispatcher.provision(100)?;
//! println!("volume: {pvc_name}");
//! ```

use std::env;
use std::time::Duration;

use reqwest::{Client, header};
use url::Url;

pub mod artifacts;
pub mod error;
pub mod execution;
pub mod provisioner;

pub use artifacts::{ArtifactStore, HttpArtifactStore, LocalArtifactStore};
pub use error::ApiError;
pub use execution::{EXECUTION_NAME_ENV, EXECUTION_TOKEN_ENV, EnvExecutionName, ExecutionIdentity, ExecutionNameSource};
pub use provisioner::{DispatcherClient, StorageProvisioner};

/// Timeout applied to every platform HTTP request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the shared `reqwest::Client` used by the platform clients.
pub(crate) fn build_http_client() -> Result<Client, ApiError> {
    let mut default_headers = header::HeaderMap::new();
    default_headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
    let user_agent = format!("detaxizer-launcher/{}; {}", env!("CARGO_PKG_VERSION"), env::consts::OS);

    Ok(Client::builder()
        .default_headers(default_headers)
        .user_agent(user_agent)
        .timeout(REQUEST_TIMEOUT)
        .build()?)
}

/// Validate that a service base URL is usable and normalise it.
///
/// Rules:
/// - the URL must parse and use `http` or `https`
/// - it must include a host
///
/// The returned string has no trailing slash so that paths can be appended
/// with `format!("{base}/{path}")`.
pub(crate) fn validate_base_url(base: &str) -> Result<String, ApiError> {
    let invalid = |reason: String| ApiError::InvalidBaseUrl {
        url: base.to_string(),
        reason,
    };
    let parsed = Url::parse(base).map_err(|error| invalid(error.to_string()))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}://'", parsed.scheme())));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(invalid("missing host".to_string()));
    }

    Ok(base.trim_end_matches('/').to_string())
}

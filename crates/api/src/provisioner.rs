//! Shared storage provisioning through the dispatcher service.

use reqwest::{Client, header};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{ApiError, ExecutionIdentity, build_http_client, validate_base_url};

/// Requests a shared storage volume for the current execution.
///
/// Implementations return the volume's name. The call happens exactly once
/// per run, before anything touches the filesystem.
pub trait StorageProvisioner {
    fn provision(&self, storage_gib: u32) -> Result<String, ApiError>;
}

#[derive(Debug, Serialize)]
struct ProvisionRequest {
    storage_gib: u32,
}

#[derive(Debug, Deserialize)]
struct ProvisionResponse {
    name: String,
}

/// HTTP client for the platform's dispatcher service.
#[derive(Debug, Clone)]
pub struct DispatcherClient {
    base_url: String,
    http: Client,
}

impl DispatcherClient {
    /// Create a client for the dispatcher at `base_url`.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Ok(Self {
            base_url: validate_base_url(base_url)?,
            http: build_http_client()?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST `/provision-storage` and return the provisioned volume name.
    pub async fn provision_storage(&self, identity: &ExecutionIdentity, storage_gib: u32) -> Result<String, ApiError> {
        let url = format!("{}/provision-storage", self.base_url);
        debug!(%url, storage_gib, "requesting shared storage");

        let response = self
            .http
            .post(&url)
            .header(header::AUTHORIZATION, identity.authorization_header())
            .json(&ProvisionRequest { storage_gib })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::Status {
                url,
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ProvisionResponse = serde_json::from_str(&body).map_err(|error| ApiError::MalformedResponse {
            url: url.clone(),
            reason: error.to_string(),
        })?;
        if parsed.name.trim().is_empty() {
            return Err(ApiError::MalformedResponse {
                url,
                reason: "volume name is empty".to_string(),
            });
        }

        info!(pvc = %parsed.name, "provisioned shared storage");
        Ok(parsed.name)
    }
}

impl StorageProvisioner for DispatcherClient {
    fn provision(&self, storage_gib: u32) -> Result<String, ApiError> {
        let identity = ExecutionIdentity::from_env()?;
        detaxizer_util::block_on_future(self.provision_storage(&identity, storage_gib))
    }
}

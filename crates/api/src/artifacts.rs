//! Upload targets for run artifacts such as the pipeline log.

use std::fs;
use std::path::{Path, PathBuf};

use reqwest::{Client, header};
use tracing::{debug, info};

use crate::{ApiError, ExecutionIdentity, build_http_client, validate_base_url};

/// Destination for files produced by a run.
///
/// `remote` is a platform URI such as
/// `latch:///your_log_dir/nf_nf_core_detaxizer/<execution>/nextflow.log`.
pub trait ArtifactStore {
    fn upload(&self, local: &Path, remote: &str) -> Result<(), ApiError>;
}

/// Strips the URI scheme and leading slashes from a remote path.
fn object_key(remote: &str) -> &str {
    let without_scheme = remote.split_once("://").map_or(remote, |(_, rest)| rest);
    without_scheme.trim_start_matches('/')
}

/// Uploads artifacts with an HTTP `PUT` to a blob endpoint.
///
/// The object key is the remote path without its scheme, so
/// `latch:///logs/run/nextflow.log` becomes `{endpoint}/logs/run/nextflow.log`.
#[derive(Debug, Clone)]
pub struct HttpArtifactStore {
    endpoint: String,
    http: Client,
}

impl HttpArtifactStore {
    pub fn new(endpoint: &str) -> Result<Self, ApiError> {
        Ok(Self {
            endpoint: validate_base_url(endpoint)?,
            http: build_http_client()?,
        })
    }

    async fn put(&self, identity: &ExecutionIdentity, bytes: Vec<u8>, remote: &str) -> Result<(), ApiError> {
        let url = format!("{}/{}", self.endpoint, object_key(remote));
        debug!(%url, size = bytes.len(), "uploading artifact");

        let response = self
            .http
            .put(&url)
            .header(header::AUTHORIZATION, identity.authorization_header())
            .header(header::CONTENT_TYPE, "application/octet-stream")
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                url,
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

impl ArtifactStore for HttpArtifactStore {
    fn upload(&self, local: &Path, remote: &str) -> Result<(), ApiError> {
        let identity = ExecutionIdentity::from_env()?;
        let bytes = fs::read(local).map_err(|error| ApiError::file(local, error))?;
        detaxizer_util::block_on_future(self.put(&identity, bytes, remote))?;
        info!(remote, "uploaded artifact");
        Ok(())
    }
}

/// Copies artifacts below a local root directory, mirroring the remote key.
#[derive(Debug, Clone)]
pub struct LocalArtifactStore {
    root: PathBuf,
}

impl LocalArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Local path an upload of `remote` is written to.
    pub fn destination(&self, remote: &str) -> PathBuf {
        object_key(remote)
            .split('/')
            .filter(|segment| !segment.is_empty() && *segment != "." && *segment != "..")
            .fold(self.root.clone(), |path, segment| path.join(segment))
    }
}

impl ArtifactStore for LocalArtifactStore {
    fn upload(&self, local: &Path, remote: &str) -> Result<(), ApiError> {
        let destination = self.destination(remote);
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).map_err(|error| ApiError::file(parent, error))?;
        }
        fs::copy(local, &destination).map_err(|error| ApiError::file(local, error))?;
        info!(remote, destination = %destination.display(), "stored artifact locally");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_key_drops_scheme_and_leading_slashes() {
        assert_eq!(object_key("latch:///logs/run-1/nextflow.log"), "logs/run-1/nextflow.log");
        assert_eq!(object_key("/plain/path"), "plain/path");
    }

    #[test]
    fn local_store_mirrors_remote_layout() {
        let root = tempfile::tempdir().unwrap();
        let source_dir = tempfile::tempdir().unwrap();
        let log = source_dir.path().join(".nextflow.log");
        fs::write(&log, "N E X T F L O W").unwrap();

        let store = LocalArtifactStore::new(root.path());
        store
            .upload(&log, "latch:///your_log_dir/nf_nf_core_detaxizer/run-9/nextflow.log")
            .unwrap();

        let stored = root.path().join("your_log_dir/nf_nf_core_detaxizer/run-9/nextflow.log");
        assert_eq!(fs::read_to_string(stored).unwrap(), "N E X T F L O W");
    }

    #[test]
    fn local_store_ignores_parent_segments() {
        let store = LocalArtifactStore::new("/tmp/artifacts");
        assert_eq!(store.destination("latch:///../etc/passwd"), PathBuf::from("/tmp/artifacts/etc/passwd"));
    }

    #[test]
    fn local_store_reports_missing_source() {
        let root = tempfile::tempdir().unwrap();
        let store = LocalArtifactStore::new(root.path());
        let error = store.upload(&root.path().join("missing.log"), "latch:///x/y.log").unwrap_err();
        assert!(matches!(error, ApiError::File { .. }));
    }
}

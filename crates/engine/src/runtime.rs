//! Subprocess execution and post-run log upload.

use std::path::Path;
use std::process::{Command, ExitStatus};

use detaxizer_api::{ArtifactStore, ExecutionNameSource};
use detaxizer_util::join_remote_path;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::LogUploadError;
use crate::invocation::RunInvocation;
use crate::LaunchError;

/// Name the log is stored under in the remote execution folder.
pub const REMOTE_LOG_NAME: &str = "nextflow.log";

/// Run the pipeline and block until it exits.
///
/// The child inherits stdio and the process environment, overlaid with the
/// invocation's environment, and runs inside the working directory.
pub fn execute_pipeline(invocation: &RunInvocation) -> Result<(), LaunchError> {
    info!(command = %invocation.display_command(), "launching pipeline");

    let status = Command::new(&invocation.program)
        .args(&invocation.arguments)
        .current_dir(&invocation.working_directory)
        .envs(&invocation.environment)
        .status()
        .map_err(|source| LaunchError::Spawn {
            program: invocation.program.display().to_string(),
            source,
        })?;

    if status.success() {
        info!("pipeline finished successfully");
        return Ok(());
    }

    let (code, signal) = exit_details(status);
    warn!(?code, ?signal, "pipeline exited unsuccessfully");
    Err(LaunchError::PipelineExecution { code, signal })
}

#[cfg(unix)]
fn exit_details(status: ExitStatus) -> (Option<i32>, Option<i32>) {
    use std::os::unix::process::ExitStatusExt;
    (status.code(), status.signal())
}

#[cfg(not(unix))]
fn exit_details(status: ExitStatus) -> (Option<i32>, Option<i32>) {
    (status.code(), None)
}

/// What happened to the pipeline log after a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LogUploadStatus {
    Uploaded { remote: String },
    /// The pipeline never wrote a log.
    MissingLogFile,
    /// The execution name could not be resolved, so there is no destination.
    SkippedNoExecutionName,
}

/// Upload `log_file` to `<destination>/<execution name>/nextflow.log`.
pub fn upload_run_log(
    log_file: &Path,
    destination: &str,
    artifacts: &dyn ArtifactStore,
    execution_name: &dyn ExecutionNameSource,
) -> Result<LogUploadStatus, LogUploadError> {
    if !log_file.is_file() {
        info!(path = %log_file.display(), "no pipeline log to upload");
        return Ok(LogUploadStatus::MissingLogFile);
    }

    let Some(name) = execution_name.execution_name() else {
        info!("skipping log upload, failed to get execution name");
        return Ok(LogUploadStatus::SkippedNoExecutionName);
    };

    let remote = join_remote_path(destination, [name.as_str(), REMOTE_LOG_NAME]);
    info!(%remote, "uploading pipeline log");
    artifacts.upload(log_file, &remote).map_err(|source| LogUploadError {
        local: log_file.display().to_string(),
        remote: remote.clone(),
        source,
    })?;
    Ok(LogUploadStatus::Uploaded { remote })
}

use std::io;
use std::path::Path;

use detaxizer_api::ApiError;
use thiserror::Error;

/// Fatal failure of a pipeline launch.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Required identity, settings, or parameter input is missing or invalid.
    #[error("configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("failed to provision shared storage: {0}")]
    Provisioning(#[source] ApiError),

    #[error("failed to prepare working directory at {path}: {source}")]
    Workspace {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to start pipeline program {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("pipeline run failed: {}", describe_exit(.code, .signal))]
    PipelineExecution { code: Option<i32>, signal: Option<i32> },
}

impl LaunchError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap an input problem (unreadable settings, bad parameters) as a
    /// configuration error.
    pub fn invalid_input(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Configuration {
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    pub(crate) fn workspace(path: &Path, source: io::Error) -> Self {
        Self::Workspace {
            path: path.display().to_string(),
            source,
        }
    }

    /// Classify a provisioning client error.
    ///
    /// A missing identity token is a configuration problem, every other
    /// failure belongs to the provisioning call itself.
    pub fn from_provisioning(error: ApiError) -> Self {
        if error.is_configuration() {
            Self::Configuration {
                message: error.to_string(),
                source: Some(Box::new(error)),
            }
        } else {
            Self::Provisioning(error)
        }
    }

    /// Process exit code suggested for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            LaunchError::PipelineExecution { code: Some(code), .. } if *code > 0 => *code,
            LaunchError::Configuration { .. } => 2,
            _ => 1,
        }
    }
}

fn describe_exit(code: &Option<i32>, signal: &Option<i32>) -> String {
    match (code, signal) {
        (Some(code), _) => format!("exit code {code}"),
        (None, Some(signal)) => format!("terminated by signal {signal}"),
        (None, None) => "terminated without an exit code".to_string(),
    }
}

/// Failure to upload the pipeline log.
///
/// Never fatal; it is recorded in the run report and logged.
#[derive(Debug, Error)]
#[error("failed to upload {local} to {remote}: {source}")]
pub struct LogUploadError {
    pub local: String,
    pub remote: String,
    #[source]
    pub source: ApiError,
}

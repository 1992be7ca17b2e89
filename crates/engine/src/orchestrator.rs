//! Sequential run orchestration: provision, materialize, invoke, upload.

use chrono::{DateTime, Utc};
use detaxizer_api::{ArtifactStore, ExecutionNameSource, StorageProvisioner};
use detaxizer_types::{ParameterCatalog, ResolvedParameters};
use tracing::{info, warn};

use crate::error::LogUploadError;
use crate::invocation::RunInvocation;
use crate::runtime::{LogUploadStatus, execute_pipeline, upload_run_log};
use crate::settings::LaunchSettings;
use crate::workspace::{MaterializeSummary, materialize_workspace};
use crate::LaunchError;

/// Everything known about a run once it is over.
///
/// `outcome` is the result of the main steps. A log upload problem is kept
/// in `log_upload` and never replaces it.
#[derive(Debug)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub pvc_name: Option<String>,
    pub workspace: Option<MaterializeSummary>,
    pub invocation: Option<RunInvocation>,
    /// `None` when provisioning failed and nothing else ran.
    pub log_upload: Option<Result<LogUploadStatus, LogUploadError>>,
    pub outcome: Result<(), LaunchError>,
}

impl RunReport {
    pub fn succeeded(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn into_outcome(self) -> Result<(), LaunchError> {
        self.outcome
    }
}

/// Drives one launch of the pipeline against the platform services.
pub struct Orchestrator<'a> {
    settings: &'a LaunchSettings,
    catalog: &'a ParameterCatalog,
    provisioner: &'a dyn StorageProvisioner,
    artifacts: &'a dyn ArtifactStore,
    execution_name: &'a dyn ExecutionNameSource,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        settings: &'a LaunchSettings,
        catalog: &'a ParameterCatalog,
        provisioner: &'a dyn StorageProvisioner,
        artifacts: &'a dyn ArtifactStore,
        execution_name: &'a dyn ExecutionNameSource,
    ) -> Self {
        Self {
            settings,
            catalog,
            provisioner,
            artifacts,
            execution_name,
        }
    }

    /// Request the shared volume and return its name.
    pub fn provision(&self) -> Result<String, LaunchError> {
        info!(storage_gib = self.settings.storage_gib, "provisioning shared storage");
        self.provisioner
            .provision(self.settings.storage_gib)
            .map_err(LaunchError::from_provisioning)
    }

    /// Build the invocation a run would execute, without side effects.
    pub fn plan(&self, pvc_name: &str, parameters: ResolvedParameters) -> RunInvocation {
        RunInvocation::new(self.settings, self.catalog, pvc_name, parameters)
    }

    /// Run every stage in order.
    ///
    /// A provisioning failure ends the run before the filesystem is touched.
    /// Otherwise the log upload is attempted whatever the outcome of the
    /// pipeline stages.
    pub fn run(&self, parameters: ResolvedParameters) -> RunReport {
        let started_at = Utc::now();
        let mut report = RunReport {
            started_at,
            finished_at: started_at,
            pvc_name: None,
            workspace: None,
            invocation: None,
            log_upload: None,
            outcome: Ok(()),
        };

        let pvc_name = match self.provision() {
            Ok(name) => name,
            Err(error) => {
                report.finished_at = Utc::now();
                report.outcome = Err(error);
                return report;
            }
        };
        report.pvc_name = Some(pvc_name.clone());

        let outcome = self.run_pipeline_stages(&pvc_name, parameters, &mut report);
        report.outcome = outcome;

        let upload = upload_run_log(
            &self.settings.log_file(),
            &self.settings.log_destination,
            self.artifacts,
            self.execution_name,
        );
        if let Err(error) = &upload {
            warn!(error = %error, "failed to upload pipeline log");
        }
        report.log_upload = Some(upload);
        report.finished_at = Utc::now();

        match &report.outcome {
            Ok(()) => info!(elapsed_seconds = (report.finished_at - started_at).num_seconds(), "run completed"),
            Err(error) => warn!(error = %error, "run failed"),
        }
        report
    }

    fn run_pipeline_stages(&self, pvc_name: &str, parameters: ResolvedParameters, report: &mut RunReport) -> Result<(), LaunchError> {
        let summary = materialize_workspace(
            &self.settings.source_root,
            &self.settings.working_directory,
            &self.settings.excluded_directories,
        )?;
        report.workspace = Some(summary);

        let invocation = self.plan(pvc_name, parameters);
        let result = execute_pipeline(&invocation);
        report.invocation = Some(invocation);
        result
    }
}

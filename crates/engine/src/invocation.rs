//! The concrete pipeline command for one run.

use std::collections::BTreeMap;
use std::path::PathBuf;

use detaxizer_types::{ParameterCatalog, ResolvedParameters};
use detaxizer_util::{redact_sensitive, render_command_line};
use serde::Serialize;

use crate::flags::build_parameter_flags;
use crate::settings::LaunchSettings;

pub const NXF_HOME_ENV: &str = "NXF_HOME";
pub const NXF_OPTS_ENV: &str = "NXF_OPTS";
pub const STORAGE_CLAIM_ENV: &str = "K8S_STORAGE_CLAIM_NAME";
pub const DISABLE_CHECK_LATEST_ENV: &str = "NXF_DISABLE_CHECK_LATEST";

/// One execution of the pipeline binary.
///
/// `environment` holds only the keys overlaid on the inherited process
/// environment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunInvocation {
    pub pvc_name: String,
    pub parameters: ResolvedParameters,
    pub working_directory: PathBuf,
    pub program: PathBuf,
    pub arguments: Vec<String>,
    pub environment: BTreeMap<String, String>,
}

impl RunInvocation {
    pub fn new(settings: &LaunchSettings, catalog: &ParameterCatalog, pvc_name: impl Into<String>, parameters: ResolvedParameters) -> Self {
        let pvc_name = pvc_name.into();
        let workdir = &settings.working_directory;

        let mut arguments = vec![
            "run".to_string(),
            workdir.join(&settings.entry_script).to_string_lossy().into_owned(),
            "-work-dir".to_string(),
            workdir.to_string_lossy().into_owned(),
            "-profile".to_string(),
            settings.profile.clone(),
            "-c".to_string(),
            settings.config_file.clone(),
        ];
        arguments.extend(build_parameter_flags(catalog, &parameters));

        let environment = BTreeMap::from([
            (NXF_HOME_ENV.to_string(), settings.nextflow_home.to_string_lossy().into_owned()),
            (NXF_OPTS_ENV.to_string(), settings.jvm_options.clone()),
            (STORAGE_CLAIM_ENV.to_string(), pvc_name.clone()),
            (DISABLE_CHECK_LATEST_ENV.to_string(), "true".to_string()),
        ]);

        Self {
            pvc_name,
            parameters,
            working_directory: workdir.clone(),
            program: settings.nextflow_bin.clone(),
            arguments,
            environment,
        }
    }

    /// Program followed by its arguments.
    pub fn command_line(&self) -> Vec<String> {
        std::iter::once(self.program.to_string_lossy().into_owned())
            .chain(self.arguments.iter().cloned())
            .collect()
    }

    /// Shell-quoted command line with secrets redacted, for logs.
    pub fn display_command(&self) -> String {
        redact_sensitive(&render_command_line(self.command_line()))
    }
}

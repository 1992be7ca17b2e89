//! Launch settings: filesystem layout, pipeline invocation constants, and
//! service endpoints.
//!
//! Settings are resolved in three layers. Built-in defaults match the managed
//! platform's container image. An optional JSON file may override any field,
//! and a handful of `DETAXIZER_*` environment variables override the rest.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use dirs_next::config_dir;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use detaxizer_util::expand_tilde;

/// Environment variable allowing callers to override the settings file path.
pub const SETTINGS_PATH_ENV: &str = "DETAXIZER_SETTINGS_PATH";

/// Default filename for the JSON settings payload.
pub const SETTINGS_FILE_NAME: &str = "settings.json";

pub const SOURCE_ROOT_ENV: &str = "DETAXIZER_SOURCE_ROOT";
pub const WORKDIR_ENV: &str = "DETAXIZER_WORKDIR";
pub const NEXTFLOW_BIN_ENV: &str = "DETAXIZER_NEXTFLOW_BIN";
pub const DISPATCHER_URL_ENV: &str = "DETAXIZER_DISPATCHER_URL";
pub const ARTIFACT_ENDPOINT_ENV: &str = "DETAXIZER_ARTIFACT_ENDPOINT";
pub const ARTIFACT_DIR_ENV: &str = "DETAXIZER_ARTIFACT_DIR";

/// Directory names never copied into the working directory.
pub const DEFAULT_EXCLUDED_DIRECTORIES: [&str; 9] = [
    "latch",
    ".latch",
    "nextflow",
    ".nextflow",
    "work",
    "results",
    "miniconda",
    "anaconda3",
    "mambaforge",
];

/// Error surfaced when the settings file cannot be used.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("settings file {path} is invalid: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Everything the orchestrator needs to know about its surroundings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LaunchSettings {
    /// Tree copied into the working directory.
    pub source_root: PathBuf,
    /// Working directory on the shared volume.
    pub working_directory: PathBuf,
    /// Entry names pruned at every depth during materialization.
    pub excluded_directories: Vec<String>,
    /// Pre-built pipeline runner.
    pub nextflow_bin: PathBuf,
    /// Pipeline entry script, relative to the working directory.
    pub entry_script: String,
    pub profile: String,
    /// Platform config passed with `-c`.
    pub config_file: String,
    pub nextflow_home: PathBuf,
    /// Value of `NXF_OPTS`.
    pub jvm_options: String,
    /// Log file looked up at the working-directory root after the run.
    pub log_file_name: String,
    /// Remote directory that receives per-execution log folders.
    pub log_destination: String,
    /// Size of the shared volume requested from the dispatcher.
    pub storage_gib: u32,
    pub dispatcher_url: String,
    /// Blob endpoint for HTTP artifact uploads. When unset, artifacts are
    /// stored below `artifact_dir`.
    pub artifact_endpoint: Option<String>,
    pub artifact_dir: Option<PathBuf>,
}

impl Default for LaunchSettings {
    fn default() -> Self {
        Self {
            source_root: PathBuf::from("/root"),
            working_directory: PathBuf::from("/nf-workdir"),
            excluded_directories: DEFAULT_EXCLUDED_DIRECTORIES.iter().map(|name| name.to_string()).collect(),
            nextflow_bin: PathBuf::from("/root/nextflow"),
            entry_script: "main.nf".to_string(),
            profile: "docker".to_string(),
            config_file: "latch.config".to_string(),
            nextflow_home: PathBuf::from("/root/.nextflow"),
            jvm_options: "-Xms2048M -Xmx8G -XX:ActiveProcessorCount=4".to_string(),
            log_file_name: ".nextflow.log".to_string(),
            log_destination: "latch:///your_log_dir/nf_nf_core_detaxizer".to_string(),
            storage_gib: 100,
            dispatcher_url: "http://nf-dispatcher-service.flyte.svc.cluster.local".to_string(),
            artifact_endpoint: None,
            artifact_dir: None,
        }
    }
}

impl LaunchSettings {
    /// Resolve settings from defaults, a settings file, and the environment.
    ///
    /// An explicit `path` must exist and parse. The implicit path (from
    /// [`SETTINGS_PATH_ENV`] or the user config directory) is optional, and a
    /// file that fails to parse there is ignored with a warning.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let mut settings = match path {
            Some(explicit) => read_settings_file(explicit)?,
            None => {
                let implicit = default_settings_path();
                match read_settings_file(&implicit) {
                    Ok(settings) => settings,
                    Err(SettingsError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => Self::default(),
                    Err(SettingsError::Json { path, source }) => {
                        warn!(path = %path, error = %source, "failed to parse settings file; using defaults");
                        Self::default()
                    }
                    Err(error) => return Err(error),
                }
            }
        };
        settings.apply_env_overrides();
        Ok(settings)
    }

    /// Overlay the `DETAXIZER_*` environment variables onto these settings.
    pub fn apply_env_overrides(&mut self) {
        if let Some(value) = env_override(SOURCE_ROOT_ENV) {
            self.source_root = expand_tilde(&value);
        }
        if let Some(value) = env_override(WORKDIR_ENV) {
            self.working_directory = expand_tilde(&value);
        }
        if let Some(value) = env_override(NEXTFLOW_BIN_ENV) {
            self.nextflow_bin = expand_tilde(&value);
        }
        if let Some(value) = env_override(DISPATCHER_URL_ENV) {
            self.dispatcher_url = value;
        }
        if let Some(value) = env_override(ARTIFACT_ENDPOINT_ENV) {
            self.artifact_endpoint = Some(value);
        }
        if let Some(value) = env_override(ARTIFACT_DIR_ENV) {
            self.artifact_dir = Some(expand_tilde(&value));
        }
    }

    /// Absolute path of the pipeline log after a run.
    pub fn log_file(&self) -> PathBuf {
        self.working_directory.join(&self.log_file_name)
    }
}

fn env_override(variable: &str) -> Option<String> {
    env::var(variable)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Settings file location: [`SETTINGS_PATH_ENV`] or
/// `<config dir>/detaxizer/settings.json`.
pub fn default_settings_path() -> PathBuf {
    if let Some(path) = env_override(SETTINGS_PATH_ENV) {
        return expand_tilde(&path);
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("detaxizer")
        .join(SETTINGS_FILE_NAME)
}

fn read_settings_file(path: &Path) -> Result<LaunchSettings, SettingsError> {
    let content = fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.display().to_string(),
        source,
    })?;
    debug!(path = %path.display(), "loaded settings file");
    serde_json::from_str(&content).map_err(|source| SettingsError::Json {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_OVERRIDES: [&str; 7] = [
        SETTINGS_PATH_ENV,
        SOURCE_ROOT_ENV,
        WORKDIR_ENV,
        NEXTFLOW_BIN_ENV,
        DISPATCHER_URL_ENV,
        ARTIFACT_ENDPOINT_ENV,
        ARTIFACT_DIR_ENV,
    ];

    fn without_overrides<R>(body: impl FnOnce() -> R) -> R {
        temp_env::with_vars_unset(ALL_OVERRIDES, body)
    }

    #[test]
    fn defaults_match_platform_layout() {
        let settings = LaunchSettings::default();
        assert_eq!(settings.working_directory, PathBuf::from("/nf-workdir"));
        assert_eq!(settings.log_file(), PathBuf::from("/nf-workdir/.nextflow.log"));
        assert_eq!(settings.excluded_directories.len(), 9);
        assert_eq!(settings.storage_gib, 100);
    }

    #[test]
    fn explicit_file_overrides_selected_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"working_directory": "/scratch/run", "storage_gib": 250}"#).unwrap();

        let settings = without_overrides(|| LaunchSettings::load(Some(&path))).unwrap();
        assert_eq!(settings.working_directory, PathBuf::from("/scratch/run"));
        assert_eq!(settings.storage_gib, 250);
        assert_eq!(settings.profile, "docker");
    }

    #[test]
    fn explicit_file_must_exist_and_parse() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(matches!(
            without_overrides(|| LaunchSettings::load(Some(&missing))),
            Err(SettingsError::Io { .. })
        ));

        let broken = dir.path().join("broken.json");
        fs::write(&broken, r#"{"unknown_field": true}"#).unwrap();
        assert!(matches!(
            without_overrides(|| LaunchSettings::load(Some(&broken))),
            Err(SettingsError::Json { .. })
        ));
    }

    #[test]
    fn environment_overrides_win_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"working_directory": "/from/file"}"#).unwrap();

        let settings = temp_env::with_vars(
            [
                (SETTINGS_PATH_ENV, Some(path.to_str().unwrap())),
                (WORKDIR_ENV, Some("/from/env")),
                (DISPATCHER_URL_ENV, Some("http://localhost:9000")),
                (ARTIFACT_DIR_ENV, Some("/tmp/artifacts")),
                (SOURCE_ROOT_ENV, None),
                (NEXTFLOW_BIN_ENV, None),
                (ARTIFACT_ENDPOINT_ENV, Some("   ")),
            ],
            || LaunchSettings::load(None),
        )
        .unwrap();

        assert_eq!(settings.working_directory, PathBuf::from("/from/env"));
        assert_eq!(settings.dispatcher_url, "http://localhost:9000");
        assert_eq!(settings.artifact_dir, Some(PathBuf::from("/tmp/artifacts")));
        assert_eq!(settings.artifact_endpoint, None);
    }

    #[test]
    fn unreadable_implicit_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json").unwrap();

        let settings = temp_env::with_vars(
            ALL_OVERRIDES.map(|name| (name, if name == SETTINGS_PATH_ENV { path.to_str() } else { None })),
            || LaunchSettings::load(None),
        )
        .unwrap();
        assert_eq!(settings, LaunchSettings::default());
    }
}

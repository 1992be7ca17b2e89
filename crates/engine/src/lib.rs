//! # Detaxizer Engine
//!
//! Launches the nf-core/detaxizer pipeline on the managed platform. A run is
//! a strict sequence of stages:
//!
//! 1. Provision a shared storage volume and obtain its name.
//! 2. Materialize the working directory from a filtered copy of the source
//!    tree.
//! 3. Translate resolved parameters into pipeline flags and build the
//!    command line and environment overlay.
//! 4. Run the pipeline binary as a blocking subprocess.
//! 5. Upload the pipeline log, whatever happened in steps 2 to 4.
//!
//! ## Architecture
//!
//! - **`settings`**: filesystem layout, invocation constants, and endpoints
//! - **`flags`**: parameter value to command-line token translation
//! - **`workspace`**: working directory materialization
//! - **`invocation`**: the concrete command for one run
//! - **`runtime`**: subprocess execution and log upload
//! - **`orchestrator`**: stage sequencing and failure semantics
//!
//! ## Usage
//!
//! ```rust
//! use detaxizer_engine::{LaunchSettings, build_parameter_flags};
//! use detaxizer_registry::{DefaultPolicy, ParameterValue, Registry};
//! use indexmap::IndexMap;
//!
//! let registry = Registry::embedded()?;
//! let supplied = IndexMap::from([("tax2filter".to_string(), ParameterValue::text("Homo"))]);
//! let resolved = registry.resolve(&supplied, DefaultPolicy::Omit)?;
//!
//! let flags = build_parameter_flags(registry.catalog(), &resolved);
//! assert_eq!(flags, vec!["--tax2filter", "Homo"]);
//! assert_eq!(LaunchSettings::default().storage_gib, 100);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod flags;
pub mod invocation;
pub mod orchestrator;
pub mod runtime;
pub mod settings;
pub mod workspace;

pub use error::{LaunchError, LogUploadError};
pub use flags::build_parameter_flags;
pub use invocation::RunInvocation;
pub use orchestrator::{Orchestrator, RunReport};
pub use runtime::{LogUploadStatus, execute_pipeline, upload_run_log};
pub use settings::{LaunchSettings, SettingsError, default_settings_path};
pub use workspace::{MaterializeSummary, materialize_workspace};

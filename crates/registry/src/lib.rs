//! Registry crate describing the launchable nf-core/detaxizer workflow.
//!
//! This crate owns the static parameter catalog, the workflow metadata
//! exported to the UI layer, and the translation of user input (command-line
//! flags or a JSON params file) into typed parameter values.

pub mod catalog;
pub mod clap_builder;
pub mod models;

pub use catalog::{DEFAULT_KRAKEN2_DB, WORKFLOW_IDENTIFIER, detaxizer_catalog, detaxizer_metadata};
pub use clap_builder::{add_parameter_args, values_from_matches};
pub use detaxizer_types::{DefaultPolicy, ParameterCatalog, ParameterDescriptor, ParameterKind, ParameterValue, ResolvedParameters};
pub use models::{Registry, RegistryError};

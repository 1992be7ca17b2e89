use std::{fs, path::Path};

use detaxizer_types::{CatalogError, DefaultPolicy, ParameterCatalog, ParameterValue, ResolvedParameters, WorkflowMetadata};
use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::catalog::{detaxizer_catalog, detaxizer_metadata};

/// Errors surfaced while loading or resolving parameters.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("failed to read params file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("params file {path} is not valid JSON: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("params file {path} must contain a JSON object at the top level")]
    NotAnObject { path: String },
}

/// The launchable workflow: its metadata and its parameter catalog.
///
/// This is the surface consumed by the UI/validation layer (via
/// [`Registry::export_json`]) and by the orchestrator (via
/// [`Registry::catalog`]). It is built once and passed explicitly.
#[derive(Debug, Clone, Serialize)]
pub struct Registry {
    /// Workflow identity and resource requests.
    pub metadata: WorkflowMetadata,
    /// Declared parameters in form/command-line order.
    pub parameters: ParameterCatalog,
}

impl Registry {
    /// Build the registry for the embedded detaxizer workflow.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use detaxizer_registry::Registry;
    ///
    /// let registry = Registry::embedded().expect("embedded catalog is valid");
    /// assert!(registry.catalog().get("tax2filter").is_some());
    /// ```
    pub fn embedded() -> Result<Self, RegistryError> {
        Ok(Self {
            metadata: detaxizer_metadata(),
            parameters: detaxizer_catalog()?,
        })
    }

    pub fn catalog(&self) -> &ParameterCatalog {
        &self.parameters
    }

    /// Serialize metadata and catalog for the UI layer.
    pub fn export_json(&self) -> serde_json::Value {
        serde_json::json!({
            "metadata": self.metadata,
            "parameters": self.parameters,
        })
    }

    /// Read a JSON params file whose keys are parameter names.
    pub fn load_params_file(&self, path: &Path) -> Result<IndexMap<String, ParameterValue>, RegistryError> {
        let path_text = path.display().to_string();
        let content = fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path_text.clone(),
            source,
        })?;
        let document: serde_json::Value = serde_json::from_str(&content).map_err(|source| RegistryError::Json {
            path: path_text.clone(),
            source,
        })?;
        let object = document.as_object().ok_or(RegistryError::NotAnObject { path: path_text.clone() })?;
        let values = self.parameters.values_from_json(object)?;
        debug!(path = %path_text, count = values.len(), "loaded params file");
        Ok(values)
    }

    /// Resolve supplied values against the catalog.
    pub fn resolve(&self, supplied: &IndexMap<String, ParameterValue>, policy: DefaultPolicy) -> Result<ResolvedParameters, RegistryError> {
        Ok(self.parameters.resolve(supplied, policy)?)
    }
}

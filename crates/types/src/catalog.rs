//! Ordered parameter catalog and per-run resolved values.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::parameter::{ParameterDescriptor, ParameterValue};
use crate::parameter::parsing::ValueError;

/// Errors raised while building a catalog or resolving values against it.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CatalogError {
    #[error("parameter '{0}' is declared more than once")]
    DuplicateName(String),

    #[error("unknown parameter '{0}'")]
    UnknownParameter(String),

    #[error("invalid value for parameter '{name}': {source}")]
    InvalidValue {
        name: String,
        #[source]
        source: ValueError,
    },

    #[error("value for parameter '{name}' must be a {expected}, got {found}")]
    KindMismatch {
        name: String,
        expected: crate::ParameterKind,
        found: crate::ParameterKind,
    },
}

/// How catalog defaults are treated for parameters the user did not supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultPolicy {
    /// Leave unsupplied parameters absent; the pipeline applies its own
    /// defaults, which the catalog mirrors.
    #[default]
    Omit,
    /// Forward catalog defaults as explicit values.
    Emit,
}

/// Read-only, declaration-ordered mapping from parameter name to descriptor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ParameterCatalog {
    parameters: IndexMap<String, ParameterDescriptor>,
}

impl ParameterCatalog {
    /// Build a catalog from descriptors in declaration order.
    pub fn from_descriptors(descriptors: impl IntoIterator<Item = ParameterDescriptor>) -> Result<Self, CatalogError> {
        let mut parameters = IndexMap::new();
        for descriptor in descriptors {
            if parameters.contains_key(&descriptor.name) {
                return Err(CatalogError::DuplicateName(descriptor.name));
            }
            parameters.insert(descriptor.name.clone(), descriptor);
        }
        Ok(Self { parameters })
    }

    pub fn get(&self, name: &str) -> Option<&ParameterDescriptor> {
        self.parameters.get(name)
    }

    /// Descriptors in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &ParameterDescriptor> {
        self.parameters.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.parameters.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Resolve user-supplied values against the catalog.
    ///
    /// Every declared parameter gets an entry, in declaration order. Supplied
    /// values must name a declared parameter and match its kind. Parameters
    /// without a supplied value fall back according to `policy`.
    pub fn resolve(
        &self,
        supplied: &IndexMap<String, ParameterValue>,
        policy: DefaultPolicy,
    ) -> Result<ResolvedParameters, CatalogError> {
        if let Some(unknown) = supplied.keys().find(|name| !self.parameters.contains_key(*name)) {
            return Err(CatalogError::UnknownParameter(unknown.clone()));
        }

        let mut values = IndexMap::with_capacity(self.parameters.len());
        for descriptor in self.iter() {
            let value = match supplied.get(&descriptor.name) {
                Some(value) if value.kind() != descriptor.kind => {
                    return Err(CatalogError::KindMismatch {
                        name: descriptor.name.clone(),
                        expected: descriptor.kind,
                        found: value.kind(),
                    });
                }
                Some(value) => Some(value.clone()),
                None => match policy {
                    DefaultPolicy::Omit => None,
                    DefaultPolicy::Emit => descriptor.default.clone(),
                },
            };
            values.insert(descriptor.name.clone(), value);
        }
        Ok(ResolvedParameters { values })
    }

    /// Convert a JSON object (for example, a params file) into typed values.
    ///
    /// `null` entries are dropped as "not supplied".
    pub fn values_from_json(&self, object: &serde_json::Map<String, JsonValue>) -> Result<IndexMap<String, ParameterValue>, CatalogError> {
        let mut values = IndexMap::new();
        for (name, json) in object {
            let descriptor = self.get(name).ok_or_else(|| CatalogError::UnknownParameter(name.clone()))?;
            let parsed = ParameterValue::from_json(descriptor.kind, json).map_err(|source| CatalogError::InvalidValue {
                name: name.clone(),
                source,
            })?;
            if let Some(value) = parsed {
                values.insert(name.clone(), value);
            }
        }
        Ok(values)
    }
}

/// Values resolved for one run, keyed by parameter name in declaration order.
///
/// `None` means the parameter is absent and contributes nothing to the
/// pipeline command line.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct ResolvedParameters {
    values: IndexMap<String, Option<ParameterValue>>,
}

impl ResolvedParameters {
    /// Present value of a parameter, if any.
    pub fn get(&self, name: &str) -> Option<&ParameterValue> {
        self.values.get(name).and_then(Option::as_ref)
    }

    /// All entries, absent ones included, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&ParameterValue>)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value.as_ref()))
    }

    /// Only the entries carrying a value.
    pub fn present(&self) -> impl Iterator<Item = (&str, &ParameterValue)> {
        self.values
            .iter()
            .filter_map(|(name, value)| value.as_ref().map(|value| (name.as_str(), value)))
    }

    /// Names of non-optional parameters that have no value.
    pub fn missing_required<'a>(&self, catalog: &'a ParameterCatalog) -> Vec<&'a str> {
        catalog
            .iter()
            .filter(|descriptor| !descriptor.optional && self.get(&descriptor.name).is_none())
            .map(|descriptor| descriptor.name.as_str())
            .collect()
    }
}

//! Shared type definitions for the detaxizer launcher.
//!
//! The models here describe the pipeline's declared inputs (kinds, values,
//! descriptors), the ordered catalog that groups them, the values resolved for
//! a single run, and the workflow metadata exported alongside the catalog.
//! They preserve declaration order (via `IndexMap`) so that UI forms and
//! generated command lines follow the same, predictable sequence.

pub mod catalog;
pub mod parameter;
pub mod workflow;

pub use catalog::{CatalogError, DefaultPolicy, ParameterCatalog, ResolvedParameters};
pub use parameter::parsing::ValueError;
pub use parameter::{Location, ParameterDescriptor, ParameterKind, ParameterValue};
pub use workflow::{TaskResources, WorkflowMetadata};

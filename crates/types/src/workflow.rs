//! Workflow-level metadata exported alongside the parameter catalog.

use serde::{Deserialize, Serialize};

/// Resource request for one scheduled task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TaskResources {
    /// Requested CPU cores (fractions allowed).
    pub cpu: f32,
    /// Requested memory in GiB.
    pub memory_gib: f32,
    /// Requested ephemeral storage in GiB.
    pub storage_gib: u32,
}

/// Describes the launchable workflow to the platform's UI layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkflowMetadata {
    /// Canonical identifier, also used in the log upload destination.
    pub identifier: String,
    /// Title shown in workflow pickers.
    pub display_name: String,
    /// Optional descriptive copy.
    #[serde(default)]
    pub description: Option<String>,
    /// Resources for the storage provisioning task.
    pub initialize_resources: TaskResources,
    /// Resources for the pipeline runtime task.
    pub runtime_resources: TaskResources,
}

//! Transforms: the reusable recipe a job is submitted against.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::preset::Preset;

/// What the service does with the rest of the job when this output fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
pub enum OnErrorType {
    /// Fail the whole job
    #[default]
    StopProcessingJob,
    /// Keep producing the other outputs
    ContinueJob,
}

impl OnErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OnErrorType::StopProcessingJob => "StopProcessingJob",
            OnErrorType::ContinueJob => "ContinueJob",
        }
    }
}

impl fmt::Display for OnErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Relative priority of an output, or of a job among other jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Normal => "Normal",
            Priority::High => "High",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One stage of a transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransformOutput {
    /// Preset producing this output
    pub preset: Preset,

    /// Failure policy
    #[serde(default)]
    pub on_error: OnErrorType,

    /// Priority relative to the other outputs
    #[serde(default)]
    pub relative_priority: Priority,
}

impl TransformOutput {
    /// Create an output with the service defaults (stop on error, normal priority).
    pub fn new(preset: Preset) -> Self {
        Self {
            preset,
            on_error: OnErrorType::default(),
            relative_priority: Priority::default(),
        }
    }

    pub fn with_on_error(mut self, on_error: OnErrorType) -> Self {
        self.on_error = on_error;
        self
    }

    pub fn with_relative_priority(mut self, priority: Priority) -> Self {
        self.relative_priority = priority;
        self
    }
}

/// Properties of a transform resource.
///
/// `created` and `last_modified` are filled in by the service and never sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Outputs in submission order. Jobs must supply one job output per entry.
    pub outputs: Vec<TransformOutput>,

    #[serde(default, skip_serializing)]
    pub created: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing)]
    pub last_modified: Option<DateTime<Utc>>,
}

impl Transform {
    pub fn new(outputs: Vec<TransformOutput>) -> Self {
        Self {
            description: None,
            outputs,
            created: None,
            last_modified: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

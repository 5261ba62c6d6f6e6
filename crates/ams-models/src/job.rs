//! Jobs: one run of a transform over an input.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::transform::Priority;

/// Job state as reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
pub enum JobState {
    /// Waiting for resources
    #[default]
    Queued,
    /// Resources allocated, about to start
    Scheduled,
    Processing,
    Finished,
    Error,
    Canceling,
    Canceled,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Queued => "Queued",
            JobState::Scheduled => "Scheduled",
            JobState::Processing => "Processing",
            JobState::Finished => "Finished",
            JobState::Error => "Error",
            JobState::Canceling => "Canceling",
            JobState::Canceled => "Canceled",
        }
    }

    /// No further state changes are expected.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Finished | JobState::Error | JobState::Canceled)
    }

    /// Terminal without producing output.
    pub fn is_failure(&self) -> bool {
        matches!(self, JobState::Error | JobState::Canceled)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Source media for a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "@odata.type")]
pub enum JobInput {
    /// Files already stored in an asset
    #[serde(rename = "#Microsoft.Media.JobInputAsset")]
    Asset(JobInputAsset),
    /// Files fetched over HTTP(S)
    #[serde(rename = "#Microsoft.Media.JobInputHttp")]
    Http(JobInputHttp),
}

impl JobInput {
    pub fn asset(asset_name: impl Into<String>) -> Self {
        JobInput::Asset(JobInputAsset {
            asset_name: asset_name.into(),
            files: Vec::new(),
        })
    }

    /// HTTP input from absolute URLs.
    pub fn http(files: Vec<String>) -> Self {
        JobInput::Http(JobInputHttp {
            base_uri: None,
            files,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobInputAsset {
    pub asset_name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobInputHttp {
    /// Prefix joined with each entry of `files`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_uri: Option<String>,
    #[serde(default)]
    pub files: Vec<String>,
}

/// Destination of one transform output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "@odata.type")]
pub enum JobOutput {
    #[serde(rename = "#Microsoft.Media.JobOutputAsset")]
    Asset(JobOutputAsset),
}

impl JobOutput {
    pub fn asset(asset_name: impl Into<String>) -> Self {
        JobOutput::Asset(JobOutputAsset::new(asset_name))
    }

    pub fn as_asset(&self) -> &JobOutputAsset {
        match self {
            JobOutput::Asset(output) => output,
        }
    }
}

/// Job output written into an asset. Status fields are service-populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobOutputAsset {
    pub asset_name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing)]
    pub state: Option<JobState>,

    /// Percent complete, 0-100
    #[serde(default, skip_serializing)]
    pub progress: Option<u8>,

    #[serde(default, skip_serializing)]
    pub error: Option<JobError>,

    #[serde(default, skip_serializing)]
    pub start_time: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing)]
    pub end_time: Option<DateTime<Utc>>,
}

impl JobOutputAsset {
    pub fn new(asset_name: impl Into<String>) -> Self {
        Self {
            asset_name: asset_name.into(),
            label: None,
            state: None,
            progress: None,
            error: None,
            start_time: None,
            end_time: None,
        }
    }
}

/// Error detail attached to a failed job output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// "DoNotRetry" or "MayRetry"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry: Option<String>,
}

impl fmt::Display for JobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Properties of a job resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub input: JobInput,

    /// One entry per transform output, in the same order
    pub outputs: Vec<JobOutput>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,

    #[serde(default, skip_serializing)]
    pub state: JobState,

    #[serde(default, skip_serializing)]
    pub created: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing)]
    pub start_time: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing)]
    pub end_time: Option<DateTime<Utc>>,
}

impl Job {
    pub fn new(input: JobInput, outputs: Vec<JobOutput>) -> Self {
        Self {
            input,
            outputs,
            description: None,
            priority: None,
            state: JobState::default(),
            created: None,
            start_time: None,
            end_time: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Progress of the first output, as reported by the service.
    pub fn first_output_progress(&self) -> Option<u8> {
        self.outputs.first().and_then(|o| o.as_asset().progress)
    }

    /// First error reported on any output.
    pub fn first_error(&self) -> Option<&JobError> {
        self.outputs.iter().find_map(|o| o.as_asset().error.as_ref())
    }
}

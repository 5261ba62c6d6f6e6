//! Streaming locators, endpoints and published paths.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Built-in streaming policy for unencrypted HLS/DASH/Smooth delivery.
pub const PREDEFINED_CLEAR_STREAMING_ONLY: &str = "Predefined_ClearStreamingOnly";

/// Properties of a streaming locator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StreamingLocator {
    pub asset_name: String,
    pub streaming_policy_name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub streaming_locator_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

impl StreamingLocator {
    pub fn new(asset_name: impl Into<String>, streaming_policy_name: impl Into<String>) -> Self {
        Self {
            asset_name: asset_name.into(),
            streaming_policy_name: streaming_policy_name.into(),
            streaming_locator_id: None,
            start_time: None,
            end_time: None,
        }
    }

    /// Locator using the clear (unencrypted) streaming policy.
    pub fn clear(asset_name: impl Into<String>) -> Self {
        Self::new(asset_name, PREDEFINED_CLEAR_STREAMING_ONLY)
    }
}

/// Paths published by a locator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListPathsResponse {
    #[serde(default)]
    pub streaming_paths: Vec<StreamingPath>,
    #[serde(default)]
    pub download_paths: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StreamingPath {
    /// "Hls", "Dash" or "SmoothStreaming"
    pub streaming_protocol: String,
    pub encryption_scheme: String,
    #[serde(default)]
    pub paths: Vec<String>,
}

/// Properties of a streaming endpoint; only what URL building needs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StreamingEndpoint {
    #[serde(default)]
    pub host_name: String,
    /// "Running", "Stopped", ...
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_state: Option<String>,
}

impl StreamingEndpoint {
    /// Full playback URLs for every streaming path.
    pub fn urls_for(&self, paths: &ListPathsResponse) -> Vec<String> {
        paths
            .streaming_paths
            .iter()
            .flat_map(|p| p.paths.iter())
            .map(|path| format!("https://{}{}", self.host_name, path))
            .collect()
    }

    pub fn is_running(&self) -> bool {
        self.resource_state.as_deref() == Some("Running")
    }
}

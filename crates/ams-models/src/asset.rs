//! Assets and container SAS requests.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Properties of an asset resource. An empty value creates a plain asset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternate_id: Option<String>,

    /// Blob container name; generated by the service when omitted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_account_name: Option<String>,

    #[serde(default, skip_serializing)]
    pub asset_id: Option<String>,

    #[serde(default, skip_serializing)]
    pub created: Option<DateTime<Utc>>,
}

impl Asset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum AssetContainerPermission {
    Read,
    ReadWrite,
    ReadWriteDelete,
}

/// Body of the `listContainerSas` action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListContainerSasInput {
    pub permissions: AssetContainerPermission,
    pub expiry_time: DateTime<Utc>,
}

impl ListContainerSasInput {
    pub fn new(permissions: AssetContainerPermission, expiry_time: DateTime<Utc>) -> Self {
        Self {
            permissions,
            expiry_time,
        }
    }
}

/// Result of the `listContainerSas` action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssetContainerSas {
    #[serde(default)]
    pub asset_container_sas_urls: Vec<String>,
}

impl AssetContainerSas {
    pub fn first_url(&self) -> Option<&str> {
        self.asset_container_sas_urls.first().map(String::as_str)
    }
}

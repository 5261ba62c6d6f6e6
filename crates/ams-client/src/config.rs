//! Client configuration.

use std::fmt;
use std::time::Duration;

use crate::error::{AmsError, AmsResult};

/// Default Azure Resource Manager endpoint.
pub const DEFAULT_ARM_ENDPOINT: &str = "https://management.azure.com";
/// Default Azure AD authority.
pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";
/// Media Services REST API version.
pub const DEFAULT_API_VERSION: &str = "2022-07-01";

/// How the client obtains bearer tokens.
#[derive(Clone)]
pub enum Credentials {
    /// Pre-issued access token, used as is
    Static(String),
    /// Azure AD client-credentials flow with a service principal
    ClientSecret {
        tenant_id: String,
        client_id: String,
        client_secret: String,
    },
}

impl Credentials {
    /// Read credentials from `AZURE_ACCESS_TOKEN`, or else the
    /// `AZURE_TENANT_ID` / `AZURE_CLIENT_ID` / `AZURE_CLIENT_SECRET` triple.
    pub fn from_env() -> AmsResult<Self> {
        if let Some(token) = non_empty_var("AZURE_ACCESS_TOKEN") {
            return Ok(Credentials::Static(token));
        }

        match (
            non_empty_var("AZURE_TENANT_ID"),
            non_empty_var("AZURE_CLIENT_ID"),
            non_empty_var("AZURE_CLIENT_SECRET"),
        ) {
            (Some(tenant_id), Some(client_id), Some(client_secret)) => Ok(Credentials::ClientSecret {
                tenant_id,
                client_id,
                client_secret,
            }),
            _ => Err(AmsError::config_error(
                "Set AZURE_ACCESS_TOKEN, or AZURE_TENANT_ID, AZURE_CLIENT_ID and AZURE_CLIENT_SECRET",
            )),
        }
    }

    /// Whether a rejected token can be replaced by asking again.
    pub fn is_refreshable(&self) -> bool {
        matches!(self, Credentials::ClientSecret { .. })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Static(_) => f.write_str("Static(<redacted>)"),
            Credentials::ClientSecret {
                tenant_id,
                client_id,
                ..
            } => f
                .debug_struct("ClientSecret")
                .field("tenant_id", tenant_id)
                .field("client_id", client_id)
                .field("client_secret", &"<redacted>")
                .finish(),
        }
    }
}

/// Media Services client configuration.
#[derive(Debug, Clone)]
pub struct AmsConfig {
    /// Azure subscription ID
    pub subscription_id: String,
    /// Resource group holding the account
    pub resource_group: String,
    /// Media Services account name
    pub account_name: String,
    /// ARM base URL
    pub arm_endpoint: String,
    /// Azure AD base URL
    pub authority_host: String,
    /// REST API version
    pub api_version: String,
    /// Request timeout
    pub timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Token source
    pub credentials: Credentials,
}

impl AmsConfig {
    /// Create a config with default endpoints and timeouts.
    pub fn new(
        subscription_id: impl Into<String>,
        resource_group: impl Into<String>,
        account_name: impl Into<String>,
        credentials: Credentials,
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_group: resource_group.into(),
            account_name: account_name.into(),
            arm_endpoint: DEFAULT_ARM_ENDPOINT.to_string(),
            authority_host: DEFAULT_AUTHORITY_HOST.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(5),
            credentials,
        }
    }

    /// Create config from environment variables.
    pub fn from_env() -> AmsResult<Self> {
        let subscription_id = required_var("AZURE_SUBSCRIPTION_ID")?;
        let resource_group = required_var("AZURE_RESOURCE_GROUP")?;
        let account_name = required_var("AZURE_MEDIA_SERVICES_ACCOUNT_NAME")?;
        let credentials = Credentials::from_env()?;

        Ok(Self {
            subscription_id,
            resource_group,
            account_name,
            arm_endpoint: non_empty_var("AZURE_ARM_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_ARM_ENDPOINT.to_string()),
            authority_host: non_empty_var("AZURE_AUTHORITY_HOST")
                .unwrap_or_else(|| DEFAULT_AUTHORITY_HOST.to_string()),
            api_version: non_empty_var("AMS_API_VERSION")
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            timeout: Duration::from_secs(
                std::env::var("AMS_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
            connect_timeout: Duration::from_secs(
                std::env::var("AMS_CONNECT_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
            credentials,
        })
    }

    /// Point the client at a different ARM endpoint.
    pub fn with_arm_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.arm_endpoint = endpoint.into();
        self
    }

    /// Point token requests at a different authority.
    pub fn with_authority_host(mut self, host: impl Into<String>) -> Self {
        self.authority_host = host.into();
        self
    }

    /// Base URL of the Media Services account resource.
    pub fn account_url(&self) -> String {
        format!(
            "{}/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Media/mediaServices/{}",
            self.arm_endpoint.trim_end_matches('/'),
            urlencoding::encode(&self.subscription_id),
            urlencoding::encode(&self.resource_group),
            urlencoding::encode(&self.account_name),
        )
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn required_var(name: &str) -> AmsResult<String> {
    non_empty_var(name).ok_or_else(|| AmsError::config_error(format!("{} must be set", name)))
}

//! Encoding run configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::descriptor::Recipe;
use crate::error::EncodingResult;

/// Default local source file.
pub const DEFAULT_SOURCE_FILE: &str = "ignite.mp4";

/// Directory finished output is downloaded into.
pub const DEFAULT_OUTPUT_DIR: &str = "Output";

/// Streaming endpoint used to build playback URLs.
pub const DEFAULT_STREAMING_ENDPOINT: &str = "default";

/// Where the job reads its input from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobSource {
    /// Local file, uploaded into a fresh input asset
    File(PathBuf),
    /// HTTP(S) URL the service fetches directly
    Url(String),
}

/// Configuration for one encoding run.
#[derive(Debug, Clone)]
pub struct EncodingRunConfig {
    /// Transform recipe
    pub recipe: Recipe,
    /// Transform name in the account
    pub transform_name: String,
    /// Prefix for asset and job names
    pub name_prefix: String,
    /// Job input
    pub source: JobSource,
    /// Delay between job status checks
    pub poll_interval: Duration,
    /// Give up waiting after this long
    pub job_timeout: Duration,
    /// Create a streaming locator for finished output
    pub publish: bool,
    /// Suffix making this run's resource names unique
    pub uniqueness: String,
    /// Streaming endpoint to build URLs from
    pub streaming_endpoint: String,
    /// Download finished output under `{dir}/{output asset}`; `None` skips it
    pub output_dir: Option<PathBuf>,
}

impl EncodingRunConfig {
    /// Defaults for a recipe, with a fresh uniqueness suffix.
    pub fn new(recipe: Recipe) -> Self {
        Self {
            recipe,
            transform_name: recipe.default_transform_name().to_string(),
            name_prefix: recipe.default_name_prefix().to_string(),
            source: JobSource::File(PathBuf::from(DEFAULT_SOURCE_FILE)),
            poll_interval: Duration::from_secs(10),
            job_timeout: Duration::from_secs(600),
            publish: true,
            uniqueness: generate_uniqueness(),
            streaming_endpoint: DEFAULT_STREAMING_ENDPOINT.to_string(),
            output_dir: Some(PathBuf::from(DEFAULT_OUTPUT_DIR)),
        }
    }

    /// Create config from environment variables.
    pub fn from_env() -> EncodingResult<Self> {
        let recipe = match non_empty_var("ENCODING_RECIPE") {
            Some(value) => value.parse::<Recipe>()?,
            None => Recipe::default(),
        };

        let source = match non_empty_var("ENCODING_SOURCE_URL") {
            Some(url) => JobSource::Url(url),
            None => JobSource::File(PathBuf::from(
                non_empty_var("ENCODING_SOURCE_FILE")
                    .unwrap_or_else(|| DEFAULT_SOURCE_FILE.to_string()),
            )),
        };

        let download = std::env::var("ENCODING_DOWNLOAD")
            .ok()
            .and_then(|s| parse_bool(&s))
            .unwrap_or(true);
        let output_dir = download.then(|| {
            PathBuf::from(
                non_empty_var("ENCODING_OUTPUT_DIR").unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string()),
            )
        });

        Ok(Self {
            recipe,
            transform_name: non_empty_var("ENCODING_TRANSFORM_NAME")
                .unwrap_or_else(|| recipe.default_transform_name().to_string()),
            name_prefix: non_empty_var("ENCODING_NAME_PREFIX")
                .unwrap_or_else(|| recipe.default_name_prefix().to_string()),
            source,
            poll_interval: Duration::from_secs(
                std::env::var("ENCODING_POLL_INTERVAL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
            ),
            job_timeout: Duration::from_secs(
                std::env::var("ENCODING_JOB_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(600),
            ),
            publish: std::env::var("ENCODING_PUBLISH")
                .ok()
                .and_then(|s| parse_bool(&s))
                .unwrap_or(true),
            uniqueness: non_empty_var("ENCODING_UNIQUENESS").unwrap_or_else(generate_uniqueness),
            streaming_endpoint: DEFAULT_STREAMING_ENDPOINT.to_string(),
            output_dir,
        })
    }

    pub fn with_source(mut self, source: JobSource) -> Self {
        self.source = source;
        self
    }

    pub fn with_uniqueness(mut self, uniqueness: impl Into<String>) -> Self {
        self.uniqueness = uniqueness.into();
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_job_timeout(mut self, timeout: Duration) -> Self {
        self.job_timeout = timeout;
        self
    }

    pub fn with_publish(mut self, publish: bool) -> Self {
        self.publish = publish;
        self
    }

    pub fn with_output_dir(mut self, output_dir: Option<PathBuf>) -> Self {
        self.output_dir = output_dir;
        self
    }

    pub fn input_asset_name(&self) -> String {
        format!("{}-input-{}", self.name_prefix, self.uniqueness)
    }

    pub fn output_asset_name(&self) -> String {
        format!("{}-output-{}", self.name_prefix, self.uniqueness)
    }

    pub fn job_name(&self) -> String {
        format!("{}-job-{}", self.name_prefix, self.uniqueness)
    }

    pub fn locator_name(&self) -> String {
        format!("locator{}", self.uniqueness)
    }
}

/// First 8 hex chars of a random UUID.
fn generate_uniqueness() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

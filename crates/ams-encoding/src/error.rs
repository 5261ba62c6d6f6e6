//! Encoding run error types.

use ams_client::AmsError;
use ams_models::JobState;
use thiserror::Error;

use crate::descriptor::RecipeParseError;

pub type EncodingResult<T> = Result<T, EncodingError>;

#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("Job {job_name} ended in state {state}: {message}")]
    JobFailed {
        job_name: String,
        state: JobState,
        message: String,
    },

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Media Services error: {0}")]
    Ams(#[from] AmsError),

    #[error("Invalid recipe: {0}")]
    Recipe(#[from] RecipeParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EncodingError {
    pub fn upload_failed(msg: impl Into<String>) -> Self {
        Self::UploadFailed(msg.into())
    }

    pub fn download_failed(msg: impl Into<String>) -> Self {
        Self::DownloadFailed(msg.into())
    }

    /// Whether the service ran the job and it ended in `Error` or `Canceled`.
    pub fn is_job_failure(&self) -> bool {
        matches!(self, Self::JobFailed { .. })
    }
}

//! Structured job logging utilities.
//!
//! Provides consistent, structured logging for an encoding job with
//! tracing spans and contextual information.

use ams_models::JobState;
use tracing::{error, info, warn, Span};

/// Job logger carrying the job name and operation on every event.
#[derive(Debug, Clone)]
pub struct JobLogger {
    job_name: String,
    operation: String,
}

impl JobLogger {
    /// Create a new job logger.
    ///
    /// # Arguments
    /// * `job_name` - Media Services job name
    /// * `operation` - The stage being logged (e.g., "encode", "publish")
    pub fn new(job_name: &str, operation: &str) -> Self {
        Self {
            job_name: job_name.to_string(),
            operation: operation.to_string(),
        }
    }

    /// Logger for the same job under a different operation.
    pub fn for_operation(&self, operation: &str) -> Self {
        Self::new(&self.job_name, operation)
    }

    pub fn log_start(&self, message: &str) {
        info!(
            job_name = %self.job_name,
            operation = %self.operation,
            "Job started: {}", message
        );
    }

    pub fn log_progress(&self, message: &str) {
        info!(
            job_name = %self.job_name,
            operation = %self.operation,
            "Job progress: {}", message
        );
    }

    /// Log a polled job state with the first output's progress.
    pub fn log_state(&self, state: JobState, progress: Option<u8>) {
        match progress {
            Some(progress) => info!(
                job_name = %self.job_name,
                operation = %self.operation,
                state = %state,
                progress,
                "Job state: {} ({}%)", state, progress
            ),
            None => info!(
                job_name = %self.job_name,
                operation = %self.operation,
                state = %state,
                "Job state: {}", state
            ),
        }
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            job_name = %self.job_name,
            operation = %self.operation,
            "Job warning: {}", message
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            job_name = %self.job_name,
            operation = %self.operation,
            "Job error: {}", message
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            job_name = %self.job_name,
            operation = %self.operation,
            "Job completed: {}", message
        );
    }

    pub fn job_name(&self) -> &str {
        &self.job_name
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Create a tracing span for this job.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "job",
            job_name = %self.job_name,
            operation = %self.operation
        )
    }
}

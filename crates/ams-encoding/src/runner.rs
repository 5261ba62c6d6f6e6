//! End-to-end encoding run.
//!
//! Creates the transform, stages the input, submits one job and waits for
//! it. Finished output can be downloaded locally and published through a
//! clear streaming locator.

use std::path::{Path, PathBuf};

use ams_client::AmsClient;
use ams_models::{
    Asset, AssetContainerPermission, Job, JobInput, JobOutput, JobState, ListContainerSasInput,
    StreamingLocator, Transform,
};
use chrono::Utc;
use serde::Serialize;
use tokio::time::Instant;
use tracing::Instrument;

use crate::config::{EncodingRunConfig, JobSource};
use crate::error::{EncodingError, EncodingResult};
use crate::logging::JobLogger;

/// How long the upload SAS stays valid.
const UPLOAD_SAS_TTL_HOURS: i64 = 1;

/// How long the download SAS stays valid.
const DOWNLOAD_SAS_TTL_HOURS: i64 = 24;

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncodingOutcome {
    pub transform_name: String,
    /// Input asset, when the source was uploaded
    pub input_asset: Option<String>,
    pub output_asset: String,
    pub job_name: String,
    /// Last observed state; non-terminal if the wait timed out
    pub state: JobState,
    /// Files written under the output directory
    pub downloaded_files: Vec<PathBuf>,
    /// Locator created for the output, if published
    pub locator_name: Option<String>,
    pub streaming_urls: Vec<String>,
}

impl EncodingOutcome {
    pub fn is_finished(&self) -> bool {
        self.state == JobState::Finished
    }
}

/// One encoding run against a Media Services account.
pub struct EncodingRun {
    client: AmsClient,
    config: EncodingRunConfig,
}

impl EncodingRun {
    pub fn new(client: AmsClient, config: EncodingRunConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &EncodingRunConfig {
        &self.config
    }

    /// Transform this run submits.
    pub fn transform(&self) -> Transform {
        self.config.recipe.transform()
    }

    /// Execute the run.
    pub async fn execute(&self) -> EncodingResult<EncodingOutcome> {
        let job_name = self.config.job_name();
        let logger = JobLogger::new(&job_name, "encode");
        let span = logger.create_span();

        self.execute_inner(&job_name, &logger).instrument(span).await
    }

    async fn execute_inner(
        &self,
        job_name: &str,
        logger: &JobLogger,
    ) -> EncodingResult<EncodingOutcome> {
        let transform_name = &self.config.transform_name;
        logger.log_start(&format!(
            "recipe={} transform={}",
            self.config.recipe, transform_name
        ));

        let transform = self.transform();
        let created = self
            .client
            .create_or_update_transform(transform_name, &transform)
            .await?;
        logger.log_progress(&format!(
            "transform {} has {} outputs",
            created.name_or(transform_name),
            transform.outputs.len()
        ));

        let (input, input_asset) = self.resolve_input(logger).await?;

        let output_asset = self.config.output_asset_name();
        self.client
            .create_or_update_asset(&output_asset, &Asset::new())
            .await?;
        logger.log_progress(&format!("created output asset {}", output_asset));

        // Every transform output lands in the same output asset
        let outputs = transform
            .outputs
            .iter()
            .map(|_| JobOutput::asset(&output_asset))
            .collect();
        let job = Job::new(input, outputs);
        self.client
            .submit_job(transform_name, job_name, &job)
            .await?;

        let job = self.wait_for_job(job_name, logger).await?;

        if job.state.is_failure() {
            let message = job
                .first_error()
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no error details reported".to_string());
            logger.log_error(&format!("{}: {}", job.state, message));
            return Err(EncodingError::JobFailed {
                job_name: job_name.to_string(),
                state: job.state,
                message,
            });
        }

        let mut outcome = EncodingOutcome {
            transform_name: transform_name.clone(),
            input_asset,
            output_asset,
            job_name: job_name.to_string(),
            state: job.state,
            downloaded_files: Vec::new(),
            locator_name: None,
            streaming_urls: Vec::new(),
        };

        if let Some(dir) = self.config.output_dir.as_deref().filter(|_| outcome.is_finished()) {
            let downloader = logger.for_operation("download");
            outcome.downloaded_files = self
                .download_results(&outcome.output_asset, dir, &downloader)
                .await?;
        }

        if self.config.publish && outcome.is_finished() {
            let publisher = logger.for_operation("publish");
            let locator_name = self.config.locator_name();
            outcome.streaming_urls = self
                .publish(&outcome.output_asset, &locator_name, &publisher)
                .await?;
            outcome.locator_name = Some(locator_name);
        }

        logger.log_completion(&format!(
            "state={} files={} urls={}",
            outcome.state,
            outcome.downloaded_files.len(),
            outcome.streaming_urls.len()
        ));
        Ok(outcome)
    }

    /// Build the job input, uploading the source file when needed.
    async fn resolve_input(&self, logger: &JobLogger) -> EncodingResult<(JobInput, Option<String>)> {
        match &self.config.source {
            JobSource::Url(url) => {
                logger.log_progress(&format!("using HTTP input {}", url));
                Ok((JobInput::http(vec![url.clone()]), None))
            }
            JobSource::File(path) => {
                let asset_name = self.config.input_asset_name();
                self.upload_source(&asset_name, path, logger).await?;
                Ok((JobInput::asset(&asset_name), Some(asset_name)))
            }
        }
    }

    async fn upload_source(
        &self,
        asset_name: &str,
        path: &Path,
        logger: &JobLogger,
    ) -> EncodingResult<()> {
        if !tokio::fs::try_exists(path).await? {
            return Err(EncodingError::upload_failed(format!(
                "source file {} does not exist",
                path.display()
            )));
        }

        self.client
            .create_or_update_asset(asset_name, &Asset::new())
            .await?;

        let expiry = Utc::now() + chrono::Duration::hours(UPLOAD_SAS_TTL_HOURS);
        let sas = self
            .client
            .list_container_sas(
                asset_name,
                &ListContainerSasInput::new(AssetContainerPermission::ReadWrite, expiry),
            )
            .await?;

        let container_url = sas.first_url().ok_or_else(|| {
            EncodingError::upload_failed(format!("no container SAS URL for asset {}", asset_name))
        })?;

        let blob = self.client.upload_file(container_url, path).await?;
        logger.log_progress(&format!("uploaded {} into {}", blob, asset_name));
        Ok(())
    }

    /// Poll the job until it reaches a terminal state or the timeout elapses.
    ///
    /// On timeout the last observed job is returned as is.
    pub async fn wait_for_job(&self, job_name: &str, logger: &JobLogger) -> EncodingResult<Job> {
        let deadline = Instant::now() + self.config.job_timeout;

        loop {
            let job = self
                .client
                .get_job(&self.config.transform_name, job_name)
                .await?
                .properties;
            logger.log_state(job.state, job.first_output_progress());

            if job.state.is_terminal() {
                return Ok(job);
            }

            if Instant::now() >= deadline {
                logger.log_warning(&format!(
                    "stopped waiting after {:?}, job still {}",
                    self.config.job_timeout, job.state
                ));
                return Ok(job);
            }

            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    /// Download every blob of an asset into `{dir}/{asset_name}`.
    ///
    /// Blobs are written flat by their last name segment.
    async fn download_results(
        &self,
        asset_name: &str,
        dir: &Path,
        logger: &JobLogger,
    ) -> EncodingResult<Vec<PathBuf>> {
        let expiry = Utc::now() + chrono::Duration::hours(DOWNLOAD_SAS_TTL_HOURS);
        let sas = self
            .client
            .list_container_sas(
                asset_name,
                &ListContainerSasInput::new(AssetContainerPermission::Read, expiry),
            )
            .await?;

        let container_url = sas.first_url().ok_or_else(|| {
            EncodingError::download_failed(format!("no container SAS URL for asset {}", asset_name))
        })?;

        let target = dir.join(asset_name);
        tokio::fs::create_dir_all(&target).await?;

        let blobs = self.client.list_blobs(container_url).await?;
        let mut files = Vec::with_capacity(blobs.len());
        for blob in &blobs {
            let dest = target.join(blob.file_name());
            self.client
                .download_blob(container_url, &blob.name, &dest)
                .await?;
            files.push(dest);
        }

        logger.log_progress(&format!(
            "downloaded {} files into {}",
            files.len(),
            target.display()
        ));
        Ok(files)
    }

    async fn publish(
        &self,
        asset_name: &str,
        locator_name: &str,
        logger: &JobLogger,
    ) -> EncodingResult<Vec<String>> {
        self.client
            .create_streaming_locator(locator_name, &StreamingLocator::clear(asset_name))
            .await?;

        let endpoint = self
            .client
            .get_streaming_endpoint(&self.config.streaming_endpoint)
            .await?
            .properties;
        if !endpoint.is_running() {
            logger.log_warning(&format!(
                "streaming endpoint {} is not running, URLs will not play until it is started",
                self.config.streaming_endpoint
            ));
        }

        let paths = self.client.list_paths(locator_name).await?;
        let urls = endpoint.urls_for(&paths);
        logger.log_progress(&format!("locator {} has {} streaming URLs", locator_name, urls.len()));
        Ok(urls)
    }
}

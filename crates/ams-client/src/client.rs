//! Media Services REST API client.
//!
//! Thin typed wrapper over the ARM endpoints used by an encoding run:
//! transforms, assets, jobs and streaming locators, plus block blob upload,
//! listing and download against an asset container. Every call is traced
//! and counted.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ams_models::{
    Asset, AssetContainerSas, Job, ListContainerSasInput, ListPathsResponse, Resource,
    ResourceRequest, StreamingEndpoint, StreamingLocator, Transform,
};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, info_span, Instrument};
use url::Url;

use crate::blob::{parse_list_blobs, BlobItem};
use crate::config::AmsConfig;
use crate::error::{AmsError, AmsResult};
use crate::metrics::record_request;
use crate::token_cache::TokenCache;

/// Storage service version sent with blob requests.
const BLOB_API_VERSION: &str = "2021-08-06";

/// Media Services REST API client.
pub struct AmsClient {
    http: Client,
    config: AmsConfig,
    base_url: String,
    token_cache: Arc<TokenCache>,
}

impl Clone for AmsClient {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            config: self.config.clone(),
            base_url: self.base_url.clone(),
            token_cache: Arc::clone(&self.token_cache),
        }
    }
}

impl AmsClient {
    /// Create a new client.
    pub fn new(config: AmsConfig) -> AmsResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent(concat!("ams-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(AmsError::Network)?;

        let token_cache = TokenCache::new(
            http.clone(),
            config.credentials.clone(),
            config.authority_host.clone(),
        );

        Ok(Self {
            http,
            base_url: config.account_url(),
            config,
            token_cache: Arc::new(token_cache),
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> AmsResult<Self> {
        Self::new(AmsConfig::from_env()?)
    }

    pub fn config(&self) -> &AmsConfig {
        &self.config
    }

    // =========================================================================
    // Transforms
    // =========================================================================

    /// Create or replace a transform.
    pub async fn create_or_update_transform(
        &self,
        name: &str,
        transform: &Transform,
    ) -> AmsResult<Resource<Transform>> {
        let path = format!("transforms/{}", segment(name));
        let resource = self
            .put_resource("create_or_update_transform", &path, transform)
            .await?;
        info!(transform = %name, outputs = transform.outputs.len(), "Transform created or updated");
        Ok(resource)
    }

    /// Get a transform, or `None` if it does not exist.
    pub async fn get_transform(&self, name: &str) -> AmsResult<Option<Resource<Transform>>> {
        let path = format!("transforms/{}", segment(name));
        self.get_resource("get_transform", &path).await
    }

    /// Delete a transform.
    pub async fn delete_transform(&self, name: &str) -> AmsResult<()> {
        let path = format!("transforms/{}", segment(name));
        let url = self.resource_url(&path);

        self.execute_request("delete_transform", &path, async {
            let response = self.send::<()>(Method::DELETE, &url, None).await?;
            match response.status() {
                status @ (StatusCode::OK | StatusCode::NO_CONTENT) => Ok(((), status)),
                status => Err(handle_error_response(status, &url, response).await),
            }
        })
        .await
    }

    // =========================================================================
    // Assets
    // =========================================================================

    /// Create or update an asset.
    pub async fn create_or_update_asset(
        &self,
        name: &str,
        asset: &Asset,
    ) -> AmsResult<Resource<Asset>> {
        let path = format!("assets/{}", segment(name));
        self.put_resource("create_or_update_asset", &path, asset).await
    }

    /// List SAS URLs for the asset's storage container.
    pub async fn list_container_sas(
        &self,
        asset_name: &str,
        input: &ListContainerSasInput,
    ) -> AmsResult<AssetContainerSas> {
        let path = format!("assets/{}/listContainerSas", segment(asset_name));
        self.post_action("list_container_sas", &path, input).await
    }

    /// Upload a local file as a block blob into a container SAS URL.
    ///
    /// Returns the blob name. The SAS token is never logged.
    pub async fn upload_file(&self, container_sas_url: &str, file: &Path) -> AmsResult<String> {
        let file_name = file
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                AmsError::request_failed(format!("Invalid file name: {}", file.display()))
            })?
            .to_string();

        let url = blob_url(container_sas_url, &file_name)?;
        let data = tokio::fs::read(file).await?;
        let size = data.len();

        debug!(blob = %file_name, bytes = size, "Uploading blob");

        self.execute_request("upload_file", &file_name, async {
            let response = self
                .http
                .put(url.clone())
                .header("x-ms-blob-type", "BlockBlob")
                .header("x-ms-version", BLOB_API_VERSION)
                .body(data)
                .send()
                .await?;

            match response.status() {
                status @ (StatusCode::CREATED | StatusCode::OK) => Ok(((), status)),
                status => Err(blob_error(status, "upload", &file_name, response).await),
            }
        })
        .await?;

        info!(blob = %file_name, bytes = size, "Uploaded blob");
        Ok(file_name)
    }

    /// List every blob in a container SAS URL, following continuation markers.
    pub async fn list_blobs(&self, container_sas_url: &str) -> AmsResult<Vec<BlobItem>> {
        let base = Url::parse(container_sas_url)?;
        let container = base.path().trim_start_matches('/').to_string();

        let mut blobs = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let mut url = base.clone();
            url.query_pairs_mut()
                .append_pair("restype", "container")
                .append_pair("comp", "list");
            if let Some(marker) = &marker {
                url.query_pairs_mut().append_pair("marker", marker);
            }

            let page = self
                .execute_request("list_blobs", &container, async {
                    let response = self
                        .http
                        .get(url)
                        .header("x-ms-version", BLOB_API_VERSION)
                        .send()
                        .await?;
                    match response.status() {
                        StatusCode::OK => {
                            let body = response.text().await?;
                            Ok((parse_list_blobs(&body)?, StatusCode::OK))
                        }
                        status => Err(blob_error(status, "listing", &container, response).await),
                    }
                })
                .await?;

            blobs.extend(page.blobs);
            match page.next_marker {
                Some(next) => marker = Some(next),
                None => break,
            }
        }

        debug!(container = %container, blobs = blobs.len(), "Listed blobs");
        Ok(blobs)
    }

    /// Download one blob from a container SAS URL into `dest`, streaming
    /// the body to disk. Returns the number of bytes written.
    pub async fn download_blob(
        &self,
        container_sas_url: &str,
        blob_name: &str,
        dest: &Path,
    ) -> AmsResult<u64> {
        let url = blob_url(container_sas_url, blob_name)?;

        let written = self
            .execute_request("download_blob", blob_name, async {
                let mut response = self
                    .http
                    .get(url)
                    .header("x-ms-version", BLOB_API_VERSION)
                    .send()
                    .await?;

                let status = response.status();
                if status != StatusCode::OK {
                    return Err(blob_error(status, "download", blob_name, response).await);
                }

                let mut file = tokio::fs::File::create(dest).await?;
                let mut written = 0u64;
                while let Some(chunk) = response.chunk().await? {
                    file.write_all(&chunk).await?;
                    written += chunk.len() as u64;
                }
                file.flush().await?;
                Ok((written, status))
            })
            .await?;

        info!(blob = %blob_name, bytes = written, path = %dest.display(), "Downloaded blob");
        Ok(written)
    }

    // =========================================================================
    // Jobs
    // =========================================================================

    /// Submit a job against a transform.
    pub async fn submit_job(
        &self,
        transform_name: &str,
        job_name: &str,
        job: &Job,
    ) -> AmsResult<Resource<Job>> {
        let path = job_path(transform_name, job_name);
        let resource = self.put_resource("submit_job", &path, job).await?;
        info!(
            transform = %transform_name,
            job = %job_name,
            outputs = job.outputs.len(),
            "Job submitted"
        );
        Ok(resource)
    }

    /// Get current job status.
    pub async fn get_job(&self, transform_name: &str, job_name: &str) -> AmsResult<Resource<Job>> {
        let path = job_path(transform_name, job_name);
        self.get_resource("get_job", &path)
            .await?
            .ok_or_else(|| AmsError::NotFound(format!("job {}/{}", transform_name, job_name)))
    }

    /// Ask the service to cancel a job.
    pub async fn cancel_job(&self, transform_name: &str, job_name: &str) -> AmsResult<()> {
        let path = format!("{}/cancelJob", job_path(transform_name, job_name));
        let url = self.resource_url(&path);

        self.execute_request("cancel_job", &path, async {
            let response = self
                .send(Method::POST, &url, Some(&serde_json::Map::new()))
                .await?;
            match response.status() {
                status @ (StatusCode::OK | StatusCode::ACCEPTED | StatusCode::NO_CONTENT) => {
                    Ok(((), status))
                }
                status => Err(handle_error_response(status, &url, response).await),
            }
        })
        .await
    }

    // =========================================================================
    // Streaming
    // =========================================================================

    /// Create a streaming locator.
    pub async fn create_streaming_locator(
        &self,
        name: &str,
        locator: &StreamingLocator,
    ) -> AmsResult<Resource<StreamingLocator>> {
        let path = format!("streamingLocators/{}", segment(name));
        self.put_resource("create_streaming_locator", &path, locator)
            .await
    }

    /// List paths published by a locator.
    pub async fn list_paths(&self, locator_name: &str) -> AmsResult<ListPathsResponse> {
        let path = format!("streamingLocators/{}/listPaths", segment(locator_name));
        self.post_action("list_paths", &path, &serde_json::Map::new())
            .await
    }

    /// Get a streaming endpoint.
    pub async fn get_streaming_endpoint(
        &self,
        name: &str,
    ) -> AmsResult<Resource<StreamingEndpoint>> {
        let path = format!("streamingEndpoints/{}", segment(name));
        self.get_resource("get_streaming_endpoint", &path)
            .await?
            .ok_or_else(|| AmsError::NotFound(format!("streaming endpoint {}", name)))
    }

    // =========================================================================
    // Request plumbing
    // =========================================================================

    fn resource_url(&self, path: &str) -> String {
        format!(
            "{}/{}?api-version={}",
            self.base_url, path, self.config.api_version
        )
    }

    async fn put_resource<P>(
        &self,
        operation: &str,
        path: &str,
        properties: &P,
    ) -> AmsResult<Resource<P>>
    where
        P: Serialize + DeserializeOwned,
    {
        let url = self.resource_url(path);
        let body = ResourceRequest::new(properties);

        self.execute_request(operation, path, async {
            let response = self.send(Method::PUT, &url, Some(&body)).await?;
            match response.status() {
                status @ (StatusCode::OK | StatusCode::CREATED) => {
                    Ok((response.json::<Resource<P>>().await?, status))
                }
                status => Err(handle_error_response(status, &url, response).await),
            }
        })
        .await
    }

    async fn get_resource<P>(&self, operation: &str, path: &str) -> AmsResult<Option<Resource<P>>>
    where
        P: DeserializeOwned,
    {
        let url = self.resource_url(path);

        self.execute_request(operation, path, async {
            let response = self.send::<()>(Method::GET, &url, None).await?;
            match response.status() {
                StatusCode::OK => {
                    Ok((Some(response.json::<Resource<P>>().await?), StatusCode::OK))
                }
                StatusCode::NOT_FOUND => Ok((None, StatusCode::NOT_FOUND)),
                status => Err(handle_error_response(status, &url, response).await),
            }
        })
        .await
    }

    async fn post_action<B, R>(&self, operation: &str, path: &str, body: &B) -> AmsResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.resource_url(path);

        self.execute_request(operation, path, async {
            let response = self.send(Method::POST, &url, Some(body)).await?;
            match response.status() {
                StatusCode::OK => Ok((response.json::<R>().await?, StatusCode::OK)),
                status => Err(handle_error_response(status, &url, response).await),
            }
        })
        .await
    }

    /// Send an authorized request. A 401 invalidates the cached token and
    /// resends once with a fresh one.
    async fn send<B>(&self, method: Method, url: &str, body: Option<&B>) -> AmsResult<Response>
    where
        B: Serialize + ?Sized,
    {
        let token = self.token_cache.get_token().await?;
        let response = self.authorized(method.clone(), url, body, &token).send().await?;

        if response.status() != StatusCode::UNAUTHORIZED || !self.token_cache.is_refreshable() {
            return Ok(response);
        }

        debug!("Access token rejected, refreshing");
        self.token_cache.invalidate().await;
        let token = self.token_cache.get_token().await?;
        Ok(self.authorized(method, url, body, &token).send().await?)
    }

    fn authorized<B>(&self, method: Method, url: &str, body: Option<&B>, token: &str) -> RequestBuilder
    where
        B: Serialize + ?Sized,
    {
        let builder = self.http.request(method, url).bearer_auth(token);
        match body {
            Some(body) => builder.json(body),
            None => builder,
        }
    }

    /// Run a request inside a tracing span and record its metrics.
    ///
    /// The future yields the response status alongside its value so the
    /// metric carries the status the service actually returned.
    async fn execute_request<T, F>(&self, operation: &str, resource: &str, fut: F) -> AmsResult<T>
    where
        F: std::future::Future<Output = AmsResult<(T, StatusCode)>>,
    {
        let span = info_span!("ams_request", operation = %operation, resource = %resource);

        let start = Instant::now();
        let result = fut.instrument(span).await;
        let latency_ms = start.elapsed().as_millis() as f64;

        match result {
            Ok((value, status)) => {
                record_request(operation, status.as_u16(), latency_ms);
                Ok(value)
            }
            Err(e) => {
                record_request(operation, e.http_status().unwrap_or(0), latency_ms);
                Err(e)
            }
        }
    }
}

fn segment(name: &str) -> String {
    urlencoding::encode(name).into_owned()
}

fn job_path(transform_name: &str, job_name: &str) -> String {
    format!(
        "transforms/{}/jobs/{}",
        segment(transform_name),
        segment(job_name)
    )
}

async fn handle_error_response(status: StatusCode, url: &str, response: Response) -> AmsError {
    let body = response.text().await.unwrap_or_default();
    AmsError::from_response_body(status.as_u16(), url, &body)
}

/// Storage errors come back as XML; the body is kept as is.
async fn blob_error(status: StatusCode, action: &str, blob: &str, response: Response) -> AmsError {
    let body = response.text().await.unwrap_or_default();
    AmsError::from_http_status(
        status.as_u16(),
        format!("{} of {} failed: {}", action, blob, body),
    )
}

/// Container SAS URL with a blob name appended to its path.
fn blob_url(container_sas_url: &str, blob_name: &str) -> AmsResult<Url> {
    let mut url = Url::parse(container_sas_url)?;
    url.path_segments_mut()
        .map_err(|_| AmsError::invalid_response("Container SAS URL has no path"))?
        .pop_if_empty()
        .extend(blob_name.split('/'));
    Ok(url)
}

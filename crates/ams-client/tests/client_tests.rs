//! Client tests against a mock Media Services endpoint.

use std::io::Write;

use ams_client::{AmsClient, AmsConfig, AmsError, Credentials};
use ams_models::{
    Asset, AssetContainerPermission, Codec, Format, Job, JobInput, JobOutput, JobState,
    ListContainerSasInput, Preset, PresetName, StreamingLocator, Transform, TransformOutput,
};
use chrono::{TimeZone, Utc};
use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};
use serde_json::json;
use tempfile::NamedTempFile;
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ACCOUNT_PATH: &str =
    "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Media/mediaServices/acct";

fn static_client(server: &MockServer) -> AmsClient {
    let config = AmsConfig::new("sub", "rg", "acct", Credentials::Static("test-token".into()))
        .with_arm_endpoint(server.uri());
    AmsClient::new(config).unwrap()
}

fn secret_client(server: &MockServer) -> AmsClient {
    let credentials = Credentials::ClientSecret {
        tenant_id: "tenant".into(),
        client_id: "client".into(),
        client_secret: "secret".into(),
    };
    let config = AmsConfig::new("sub", "rg", "acct", credentials)
        .with_arm_endpoint(server.uri())
        .with_authority_host(server.uri());
    AmsClient::new(config).unwrap()
}

/// Request counts by (operation, status) label.
fn request_counts(snapshotter: &Snapshotter) -> Vec<(String, String, u64)> {
    let mut counts: Vec<(String, String, u64)> = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .filter(|(key, _, _, _)| key.key().name() == "ams_requests_total")
        .filter_map(|(key, _, _, value)| {
            let label = |name: &str| {
                key.key()
                    .labels()
                    .find(|l| l.key() == name)
                    .map(|l| l.value().to_string())
                    .unwrap_or_default()
            };
            match value {
                DebugValue::Counter(n) => Some((label("operation"), label("status"), n)),
                _ => None,
            }
        })
        .collect();
    counts.sort();
    counts
}

fn account_path(rest: &str) -> String {
    format!("{}/{}", ACCOUNT_PATH, rest)
}

#[tokio::test]
async fn test_create_or_update_transform_sends_properties() {
    let server = MockServer::start().await;

    let transform = Transform::new(vec![
        TransformOutput::new(Preset::built_in(PresetName::SaasCopyCodec)),
        TransformOutput::new(Preset::standard(
            vec![Codec::copy_video(), Codec::copy_audio()],
            vec![Format::mp4("CopyCodec-{Basename}{Extension}")],
        )),
    ])
    .with_description("copy");

    let expected_body = json!({"properties": serde_json::to_value(&transform).unwrap()});

    Mock::given(method("PUT"))
        .and(path(account_path("transforms/CopyCodec")))
        .and(query_param("api-version", "2022-07-01"))
        .and(header("authorization", "Bearer test-token"))
        .and(body_json(&expected_body))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "name": "CopyCodec",
            "properties": {
                "description": "copy",
                "outputs": expected_body["properties"]["outputs"].clone(),
                "created": "2026-10-19T08:00:00Z"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = static_client(&server);
    let resource = client
        .create_or_update_transform("CopyCodec", &transform)
        .await
        .unwrap();

    assert_eq!(resource.name.as_deref(), Some("CopyCodec"));
    assert_eq!(resource.properties.outputs, transform.outputs);
    assert!(resource.properties.created.is_some());
}

#[tokio::test]
async fn test_get_missing_transform_returns_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(account_path("transforms/Missing")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"code": "NotFound", "message": "not here"}
        })))
        .mount(&server)
        .await;

    let client = static_client(&server);
    assert!(client.get_transform("Missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_arm_error_message_is_surfaced() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(account_path("assets/bad")))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"code": "BadRequest", "message": "Asset name is invalid"}
        })))
        .mount(&server)
        .await;

    let client = static_client(&server);
    let err = client
        .create_or_update_asset("bad", &Asset::new())
        .await
        .unwrap_err();

    assert!(matches!(err, AmsError::ClientError(400, _)));
    assert!(err.to_string().contains("Asset name is invalid"));
}

#[tokio::test]
async fn test_submit_and_get_job() {
    let server = MockServer::start().await;

    let job = Job::new(
        JobInput::asset("in-1"),
        vec![JobOutput::asset("out-1"), JobOutput::asset("out-1")],
    );

    Mock::given(method("PUT"))
        .and(path(account_path("transforms/CopyCodec/jobs/job-1")))
        .and(body_json(json!({"properties": serde_json::to_value(&job).unwrap()})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "name": "job-1",
            "properties": {
                "input": {"@odata.type": "#Microsoft.Media.JobInputAsset", "assetName": "in-1"},
                "outputs": [
                    {"@odata.type": "#Microsoft.Media.JobOutputAsset", "assetName": "out-1", "state": "Queued", "progress": 0},
                    {"@odata.type": "#Microsoft.Media.JobOutputAsset", "assetName": "out-1", "state": "Queued", "progress": 0}
                ],
                "state": "Queued"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(account_path("transforms/CopyCodec/jobs/job-1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "job-1",
            "properties": {
                "input": {"@odata.type": "#Microsoft.Media.JobInputAsset", "assetName": "in-1"},
                "outputs": [
                    {"@odata.type": "#Microsoft.Media.JobOutputAsset", "assetName": "out-1", "state": "Processing", "progress": 55},
                    {"@odata.type": "#Microsoft.Media.JobOutputAsset", "assetName": "out-1", "state": "Queued", "progress": 0}
                ],
                "state": "Processing"
            }
        })))
        .mount(&server)
        .await;

    let client = static_client(&server);
    let submitted = client.submit_job("CopyCodec", "job-1", &job).await.unwrap();
    assert_eq!(submitted.properties.state, JobState::Queued);

    let status = client.get_job("CopyCodec", "job-1").await.unwrap();
    assert_eq!(status.properties.state, JobState::Processing);
    assert_eq!(status.properties.first_output_progress(), Some(55));
}

#[tokio::test]
async fn test_get_missing_job_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(account_path("transforms/CopyCodec/jobs/nope")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = static_client(&server);
    let err = client.get_job("CopyCodec", "nope").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_delete_transform() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path(account_path("transforms/Old")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = static_client(&server);
    client.delete_transform("Old").await.unwrap();
}

#[tokio::test]
async fn test_cancel_job() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(account_path("transforms/CopyCodec/jobs/job-1/cancelJob")))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = static_client(&server);
    client.cancel_job("CopyCodec", "job-1").await.unwrap();
}

#[tokio::test]
async fn test_client_credentials_token_is_cached() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/tenant/oauth2/v2.0/token"))
        .and(body_string_contains("grant_type=client_credentials"))
        .and(body_string_contains("client_id=client"))
        .and(body_string_contains(
            "scope=https%3A%2F%2Fmanagement.azure.com%2F.default",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token_type": "Bearer",
            "expires_in": 3599,
            "access_token": "aad-token"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(account_path("transforms/CopyCodec")))
        .and(header("authorization", "Bearer aad-token"))
        .respond_with(ResponseTemplate::new(404))
        .expect(2)
        .mount(&server)
        .await;

    let client = secret_client(&server);
    assert!(client.get_transform("CopyCodec").await.unwrap().is_none());
    assert!(client.get_transform("CopyCodec").await.unwrap().is_none());
}

#[tokio::test]
async fn test_rejected_token_is_refreshed_once() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/tenant/oauth2/v2.0/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "expires_in": 3599,
            "access_token": "stale-token"
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/tenant/oauth2/v2.0/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "expires_in": 3599,
            "access_token": "fresh-token"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(account_path("transforms/CopyCodec")))
        .and(header("authorization", "Bearer stale-token"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(account_path("transforms/CopyCodec")))
        .and(header("authorization", "Bearer fresh-token"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = secret_client(&server);
    assert!(client.get_transform("CopyCodec").await.unwrap().is_none());
}

#[tokio::test]
async fn test_token_endpoint_failure_is_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/tenant/oauth2/v2.0/token"))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid_client"))
        .mount(&server)
        .await;

    let client = secret_client(&server);
    let err = client.get_transform("CopyCodec").await.unwrap_err();
    assert!(matches!(err, AmsError::AuthError(_)));
}

#[tokio::test]
async fn test_list_container_sas_and_upload() {
    let server = MockServer::start().await;
    let expiry = Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap();

    Mock::given(method("POST"))
        .and(path(account_path("assets/in-1/listContainerSas")))
        .and(body_json(json!({"permissions": "ReadWrite", "expiryTime": "2026-10-19T09:00:00Z"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "assetContainerSasUrls": [format!("{}/asset-123?sv=2021&sig=abc", server.uri())]
        })))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/asset-123/ignite.mp4"))
        .and(query_param("sig", "abc"))
        .and(header("x-ms-blob-type", "BlockBlob"))
        .and(body_string_contains("fake mp4 payload"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("ignite.mp4");
    let mut file = std::fs::File::create(&file_path).unwrap();
    file.write_all(b"fake mp4 payload").unwrap();

    let client = static_client(&server);
    let sas = client
        .list_container_sas(
            "in-1",
            &ListContainerSasInput::new(AssetContainerPermission::ReadWrite, expiry),
        )
        .await
        .unwrap();

    let blob = client
        .upload_file(sas.first_url().unwrap(), &file_path)
        .await
        .unwrap();
    assert_eq!(blob, "ignite.mp4");
}

#[tokio::test]
async fn test_upload_missing_file_is_io_error() {
    let server = MockServer::start().await;
    let client = static_client(&server);

    let missing = NamedTempFile::new().unwrap().path().with_file_name("does-not-exist.mp4");
    let err = client
        .upload_file(&format!("{}/c?sig=x", server.uri()), &missing)
        .await
        .unwrap_err();
    assert!(matches!(err, AmsError::Io(_)));
}

#[tokio::test]
async fn test_streaming_locator_and_paths() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(account_path("streamingLocators/locator1")))
        .and(body_json(json!({"properties": {
            "assetName": "out-1",
            "streamingPolicyName": "Predefined_ClearStreamingOnly"
        }})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "name": "locator1",
            "properties": {
                "assetName": "out-1",
                "streamingPolicyName": "Predefined_ClearStreamingOnly",
                "streamingLocatorId": "9f2a"
            }
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(account_path("streamingLocators/locator1/listPaths")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "streamingPaths": [{
                "streamingProtocol": "Hls",
                "encryptionScheme": "NoEncryption",
                "paths": ["/9f2a/ignite.ism/manifest(format=m3u8-cmaf)"]
            }],
            "downloadPaths": []
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(account_path("streamingEndpoints/default")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "default",
            "properties": {"hostName": "acct.streaming.media.azure.net", "resourceState": "Running"}
        })))
        .mount(&server)
        .await;

    let client = static_client(&server);
    let locator = client
        .create_streaming_locator("locator1", &StreamingLocator::clear("out-1"))
        .await
        .unwrap();
    assert_eq!(locator.properties.streaming_locator_id.as_deref(), Some("9f2a"));

    let paths = client.list_paths("locator1").await.unwrap();
    let endpoint = client.get_streaming_endpoint("default").await.unwrap();
    assert_eq!(
        endpoint.properties.urls_for(&paths),
        vec!["https://acct.streaming.media.azure.net/9f2a/ignite.ism/manifest(format=m3u8-cmaf)".to_string()]
    );
}

#[tokio::test]
async fn test_request_metrics_carry_response_status() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    let _guard = metrics::set_default_local_recorder(&recorder);

    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(account_path("assets/out-1")))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "name": "out-1",
            "properties": {}
        })))
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path(account_path("transforms/Old")))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(account_path("transforms/Missing")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = static_client(&server);
    client.create_or_update_asset("out-1", &Asset::new()).await.unwrap();
    client.delete_transform("Old").await.unwrap();
    assert!(client.get_transform("Missing").await.unwrap().is_none());

    assert_eq!(
        request_counts(&snapshotter),
        vec![
            ("create_or_update_asset".to_string(), "201".to_string(), 1),
            ("delete_transform".to_string(), "204".to_string(), 1),
            ("get_transform".to_string(), "404".to_string(), 1),
        ]
    );
}

#[tokio::test]
async fn test_list_blobs_follows_markers() {
    let server = MockServer::start().await;

    // Mounted first so it wins over the unmarked listing below
    Mock::given(method("GET"))
        .and(path("/asset-out"))
        .and(query_param("restype", "container"))
        .and(query_param("comp", "list"))
        .and(query_param("sig", "abc"))
        .and(query_param("marker", "page2"))
        .and(header("x-ms-version", "2021-08-06"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<?xml version="1.0" encoding="utf-8"?>
<EnumerationResults ContainerName="asset-out">
  <Blobs>
    <Blob><Name>sprite-ignite-000001.jpg</Name><Properties><Content-Length>10</Content-Length></Properties></Blob>
  </Blobs>
  <NextMarker />
</EnumerationResults>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/asset-out"))
        .and(query_param("restype", "container"))
        .and(query_param("comp", "list"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<?xml version="1.0" encoding="utf-8"?>
<EnumerationResults ContainerName="asset-out">
  <Blobs>
    <Blob><Name>CopyCodec-ignite.mp4</Name><Properties><Content-Length>16</Content-Length></Properties></Blob>
  </Blobs>
  <NextMarker>page2</NextMarker>
</EnumerationResults>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let client = static_client(&server);
    let blobs = client
        .list_blobs(&format!("{}/asset-out?sv=2021&sig=abc", server.uri()))
        .await
        .unwrap();

    let names: Vec<&str> = blobs.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["CopyCodec-ignite.mp4", "sprite-ignite-000001.jpg"]);
    assert_eq!(blobs[0].content_length, Some(16));
}

#[tokio::test]
async fn test_download_blob_writes_file() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/asset-out/thumbs/sprite-ignite-000001.jpg"))
        .and(query_param("sig", "abc"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"jpeg bytes".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("sprite-ignite-000001.jpg");

    let client = static_client(&server);
    let written = client
        .download_blob(
            &format!("{}/asset-out?sig=abc", server.uri()),
            "thumbs/sprite-ignite-000001.jpg",
            &dest,
        )
        .await
        .unwrap();

    assert_eq!(written, 10);
    assert_eq!(std::fs::read(&dest).unwrap(), b"jpeg bytes");
}

#[tokio::test]
async fn test_download_missing_blob_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/asset-out/gone.mp4"))
        .respond_with(ResponseTemplate::new(404).set_body_string("<Error><Code>BlobNotFound</Code></Error>"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let client = static_client(&server);
    let err = client
        .download_blob(
            &format!("{}/asset-out?sig=abc", server.uri()),
            "gone.mp4",
            &dir.path().join("gone.mp4"),
        )
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert!(!dir.path().join("gone.mp4").exists());
}

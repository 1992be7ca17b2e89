use detaxizer_api::{ApiError, ArtifactStore, DispatcherClient, EXECUTION_TOKEN_ENV, ExecutionIdentity, HttpArtifactStore, StorageProvisioner};
use wiremock::matchers::{body_json, body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn provision_storage_posts_size_and_returns_volume_name() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/provision-storage"))
        .and(header("authorization", "Latch-Execution-Token exec-abc"))
        .and(body_json(serde_json::json!({ "storage_gib": 100 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "name": "pvc-detaxizer-1" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = DispatcherClient::new(&server.uri()).unwrap();
    let name = client
        .provision_storage(&ExecutionIdentity::new("exec-abc"), 100)
        .await
        .unwrap();
    assert_eq!(name, "pvc-detaxizer-1");
}

#[tokio::test]
async fn non_success_status_is_reported_with_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/provision-storage"))
        .respond_with(ResponseTemplate::new(503).set_body_string("no capacity"))
        .mount(&server)
        .await;

    let client = DispatcherClient::new(&server.uri()).unwrap();
    let error = client
        .provision_storage(&ExecutionIdentity::new("exec-abc"), 100)
        .await
        .unwrap_err();
    match error {
        ApiError::Status { status, body, .. } => {
            assert_eq!(status, 503);
            assert_eq!(body, "no capacity");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn response_without_name_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/provision-storage"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "volume": "x" })))
        .mount(&server)
        .await;

    let client = DispatcherClient::new(&server.uri()).unwrap();
    let error = client
        .provision_storage(&ExecutionIdentity::new("exec-abc"), 100)
        .await
        .unwrap_err();
    assert!(matches!(error, ApiError::MalformedResponse { .. }), "error: {error:?}");
}

#[tokio::test(flavor = "multi_thread")]
async fn blocking_provision_reads_token_from_environment() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/provision-storage"))
        .and(header("authorization", "Latch-Execution-Token from-env"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "name": "pvc-env" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = DispatcherClient::new(&server.uri()).unwrap();
    let name = temp_env::with_var(EXECUTION_TOKEN_ENV, Some("from-env"), || client.provision(100)).unwrap();
    assert_eq!(name, "pvc-env");
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_token_fails_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = DispatcherClient::new(&server.uri()).unwrap();
    let error = temp_env::with_var(EXECUTION_TOKEN_ENV, None::<&str>, || client.provision(100)).unwrap_err();
    assert!(matches!(error, ApiError::MissingToken { .. }));
    assert!(error.is_configuration());
}

#[tokio::test(flavor = "multi_thread")]
async fn http_artifact_store_puts_file_under_object_key() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/your_log_dir/nf_nf_core_detaxizer/run-3/nextflow.log"))
        .and(header("authorization", "Latch-Execution-Token exec-log"))
        .and(body_string("log contents"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join(".nextflow.log");
    std::fs::write(&log, "log contents").unwrap();

    let store = HttpArtifactStore::new(&server.uri()).unwrap();
    temp_env::with_var(EXECUTION_TOKEN_ENV, Some("exec-log"), || {
        store.upload(&log, "latch:///your_log_dir/nf_nf_core_detaxizer/run-3/nextflow.log")
    })
    .unwrap();
}

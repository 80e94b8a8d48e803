//! HTTP transfer client integration tests
//!
//! Runs the real reqwest-backed client against loopback stub servers so
//! the wire-level normalization rules (non-2xx statuses, `success:false`
//! bodies, parse failures) are exercised end to end.

use axum::extract::Multipart;
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

use tdash_client::models::{LocalFileHandle, ProcessConfig};
use tdash_client::services::{CleanupTarget, HttpTransferClient, TransferApi};

/// Bind a stub service on an ephemeral loopback port
async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn temp_file(dir: &tempfile::TempDir, name: &str, contents: &[u8]) -> LocalFileHandle {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    LocalFileHandle::new(name, contents.len() as u64, path)
}

fn rates() -> ProcessConfig {
    ProcessConfig {
        rate_spot: 15500.0,
        rate_remote: 15600.0,
    }
}

/// TC-HTTP-001: Upload round trip returns the server-assigned name
#[tokio::test]
async fn tc_http_001_upload_round_trip() {
    // Given: A server that stores the multipart `file` field
    async fn upload_handler(mut multipart: Multipart) -> Json<Value> {
        while let Some(field) = multipart.next_field().await.unwrap() {
            if field.name() == Some("file") {
                let file_name = field.file_name().unwrap_or("unnamed").to_string();
                let bytes = field.bytes().await.unwrap();
                assert!(!bytes.is_empty());
                return Json(json!({
                    "success": true,
                    "message": "File uploaded successfully",
                    "output_file": format!("1722400000_{}", file_name),
                }));
            }
        }
        Json(json!({"success": false, "error": "Failed to read uploaded file"}))
    }
    let base = serve(Router::new().route("/api/upload", post(upload_handler))).await;
    let client = HttpTransferClient::new(&base).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let handle = temp_file(&dir, "JISDOR_2024.csv", b"date,rate\n2024-01-02,15500\n");

    // When: The file is uploaded
    let server_name = client.upload(&handle).await.unwrap();

    // Then: The server-assigned name (not the local one) comes back
    assert_eq!(server_name, "1722400000_JISDOR_2024.csv");
}

/// TC-HTTP-002: `success:false` in a 200 body is a transfer failure
#[tokio::test]
async fn tc_http_002_upload_application_failure_normalized() {
    let router = Router::new().route(
        "/api/upload",
        post(|| async {
            Json(json!({
                "success": false,
                "error": "Only Excel files (.xlsx, .xls) or CSV are allowed"
            }))
        }),
    );
    let base = serve(router).await;
    let client = HttpTransferClient::new(&base).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let handle = temp_file(&dir, "trades_jan.csv", b"data");

    let error = client.upload(&handle).await.unwrap_err();

    match error {
        tdash_client::WorkflowError::Transfer { status, message } => {
            assert_eq!(status, Some(200));
            assert!(message.contains("Only Excel files"));
        }
        other => panic!("expected transfer failure, got {:?}", other),
    }
}

/// TC-HTTP-003: Pre-flight validation fails before any network call
#[tokio::test]
async fn tc_http_003_upload_preflight_validation() {
    // A base URL nothing listens on: a network attempt would surface as a
    // transfer failure, not validation
    let client = HttpTransferClient::new("http://127.0.0.1:9").unwrap();
    let dir = tempfile::tempdir().unwrap();

    // Empty file
    let empty = temp_file(&dir, "empty.csv", b"");
    assert!(client.upload(&empty).await.unwrap_err().is_validation());

    // Unsupported extension
    let wrong_type = temp_file(&dir, "notes.txt", b"hello");
    assert!(client.upload(&wrong_type).await.unwrap_err().is_validation());

    // Vanished file
    let gone = LocalFileHandle::new("gone.csv", 10, dir.path().join("gone.csv"));
    assert!(client.upload(&gone).await.unwrap_err().is_validation());
}

/// TC-HTTP-004: Listings parse records with their timestamps
#[tokio::test]
async fn tc_http_004_listing_round_trip() {
    let router = Router::new()
        .route(
            "/api/files",
            get(|| async {
                Json(json!({
                    "success": true,
                    "files": [
                        {"name": "1722_JISDOR.csv", "size": 2048, "uploaded_at": "2024-07-31T09:00:00Z"},
                        {"name": "1723_trades.csv", "size": 4096, "uploaded_at": "2024-07-31T09:05:00Z"}
                    ]
                }))
            }),
        )
        .route(
            "/api/outputs",
            get(|| async {
                Json(json!({"success": true, "files": null}))
            }),
        );
    let base = serve(router).await;
    let client = HttpTransferClient::new(&base).unwrap();

    let inputs = client.list_inputs().await.unwrap();
    assert_eq!(inputs.len(), 2);
    assert_eq!(inputs[0].name, "1722_JISDOR.csv");
    assert_eq!(inputs[0].size, 2048);
    assert_eq!(inputs[0].timestamp(), Some("2024-07-31T09:00:00Z"));

    // A null files array (empty store) is an empty listing, not an error
    let outputs = client.list_outputs().await.unwrap();
    assert!(outputs.is_empty());
}

/// TC-HTTP-005: Listing `success:false` carries the server message
#[tokio::test]
async fn tc_http_005_listing_application_failure() {
    let router = Router::new().route(
        "/api/files",
        get(|| async {
            Json(json!({"success": false, "error": "Failed to read upload directory"}))
        }),
    );
    let base = serve(router).await;
    let client = HttpTransferClient::new(&base).unwrap();

    let error = client.list_inputs().await.unwrap_err();

    match error {
        tdash_client::WorkflowError::Transfer { message, .. } => {
            assert!(message.contains("Failed to read upload directory"));
        }
        other => panic!("expected transfer failure, got {:?}", other),
    }
}

/// TC-HTTP-006: Non-2xx statuses become transfer failures
#[tokio::test]
async fn tc_http_006_listing_server_error_status() {
    let router = Router::new().route(
        "/api/outputs",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "output directory unavailable") }),
    );
    let base = serve(router).await;
    let client = HttpTransferClient::new(&base).unwrap();

    let error = client.list_outputs().await.unwrap_err();

    match error {
        tdash_client::WorkflowError::Transfer { status, message } => {
            assert_eq!(status, Some(500));
            assert!(message.contains("output directory unavailable"));
        }
        other => panic!("expected transfer failure, got {:?}", other),
    }
}

/// TC-HTTP-007: A failed processing run is still an outcome with its log
#[tokio::test]
async fn tc_http_007_process_failure_body_is_an_outcome() {
    let router = Router::new().route(
        "/api/process",
        post(|| async {
            Json(json!({
                "success": false,
                "error": "Processing failed: exit status 1",
                "logs": ["Traceback (most recent call last):", "ValueError: bad rate"]
            }))
        }),
    );
    let base = serve(router).await;
    let client = HttpTransferClient::new(&base).unwrap();

    let outcome = client
        .process("jisdor_001.csv", &["trades_001.csv".to_string()], &rates())
        .await
        .unwrap();

    assert!(!outcome.succeeded);
    assert_eq!(outcome.logs.len(), 2);
    assert_eq!(
        outcome.error_message.as_deref(),
        Some("Processing failed: exit status 1")
    );
}

/// TC-HTTP-008: The processing request carries the documented shape
#[tokio::test]
async fn tc_http_008_process_request_shape() {
    let captured: Arc<Mutex<Option<Value>>> = Arc::new(Mutex::new(None));
    let router = {
        let captured = Arc::clone(&captured);
        Router::new().route(
            "/api/process",
            post(move |Json(body): Json<Value>| {
                let captured = Arc::clone(&captured);
                async move {
                    *captured.lock().unwrap() = Some(body);
                    Json(json!({
                        "success": true,
                        "message": "Data processed successfully",
                        "output_file": "dashboard_1722400555.xlsx",
                        "logs": ["Parsed 120 rows"]
                    }))
                }
            }),
        )
    };
    let base = serve(router).await;
    let client = HttpTransferClient::new(&base).unwrap();

    let outcome = client
        .process(
            "jisdor_001.csv",
            &["trades_001.csv".to_string(), "trades_002.csv".to_string()],
            &rates(),
        )
        .await
        .unwrap();

    assert!(outcome.succeeded);
    assert_eq!(outcome.output_file.as_deref(), Some("dashboard_1722400555.xlsx"));

    let body = captured.lock().unwrap().take().unwrap();
    assert_eq!(body["jisdor_file"], "jisdor_001.csv");
    assert_eq!(
        body["trade_history_files"],
        json!(["trades_001.csv", "trades_002.csv"])
    );
    assert_eq!(body["config"]["rate_spot"], 15500.0);
    assert_eq!(body["config"]["rate_remote"], 15600.0);
}

/// TC-HTTP-009: Cleanup returns the deleted count, zero included
#[tokio::test]
async fn tc_http_009_cleanup_returns_deleted_count() {
    let router = Router::new().route(
        "/api/cleanup",
        delete(|| async {
            Json(json!({"success": true, "message": "Cleanup completed", "deleted": 4}))
        }),
    );
    let base = serve(router).await;
    let client = HttpTransferClient::new(&base).unwrap();

    let deleted = client.cleanup(CleanupTarget::Inputs).await.unwrap();

    assert_eq!(deleted, 4);
}

/// TC-HTTP-010: Health probe round trip
#[tokio::test]
async fn tc_http_010_health_round_trip() {
    let router = Router::new().route(
        "/api/health",
        get(|| async {
            Json(json!({
                "status": "healthy",
                "service": "trade-history-dashboard",
                "time": "2024-08-07T10:00:00Z"
            }))
        }),
    );
    let base = serve(router).await;
    let client = HttpTransferClient::new(&base).unwrap();

    let health = client.health().await.unwrap();

    assert_eq!(health.status, "healthy");
    assert_eq!(health.service, "trade-history-dashboard");
}

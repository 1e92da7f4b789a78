//! Exercises the reqwest clients against in-process fake services.

use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use codepad_client::{ExecutionClient, ExecutionService, HttpProjectApi, ProjectApi};
use codepad_core::{EditorError, ExecutionRequest, ProjectId};

type Recorded = Arc<Mutex<Vec<Value>>>;

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Address nothing listens on.
async fn dead_address() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

fn backend(recorded: Recorded) -> Router {
    Router::new()
        .route(
            "/getProject",
            post(
                |State(rec): State<Recorded>, Json(body): Json<Value>| async move {
                    rec.lock().unwrap().push(body.clone());
                    if body["projectId"] == "missing" {
                        return (
                            StatusCode::NOT_FOUND,
                            Json(json!({ "success": false, "msg": "Project not found!" })),
                        );
                    }
                    (
                        StatusCode::OK,
                        Json(json!({
                            "success": true,
                            "project": {
                                "name": "hello",
                                "code": "print('hi')",
                                "projLanguage": "python",
                                "version": "3.10.0"
                            }
                        })),
                    )
                },
            ),
        )
        .route(
            "/saveProject",
            post(
                |State(rec): State<Recorded>, Json(body): Json<Value>| async move {
                    rec.lock().unwrap().push(body.clone());
                    if body["token"].is_null() {
                        return Json(json!({ "success": false, "msg": "User not found!" }));
                    }
                    Json(json!({ "success": true, "msg": "Project saved successfully" }))
                },
            ),
        )
        .with_state(recorded)
}

fn piston(recorded: Recorded) -> Router {
    Router::new()
        .route(
            "/execute",
            post(
                |State(rec): State<Recorded>, Json(body): Json<Value>| async move {
                    rec.lock().unwrap().push(body.clone());
                    let content = body["files"][0]["content"].as_str().unwrap_or_default();
                    match content {
                        "fail" => (
                            StatusCode::OK,
                            Json(json!({ "run": { "code": 1, "output": "Error: boom\n" } })),
                        ),
                        "unknown-runtime" => (
                            StatusCode::BAD_REQUEST,
                            Json(json!({ "message": "runtime is unknown" })),
                        ),
                        _ => (
                            StatusCode::OK,
                            Json(json!({ "run": { "code": 0, "output": "hi\n" } })),
                        ),
                    }
                },
            ),
        )
        .route("/garbage", post(|| async { "<html>bad gateway</html>" }))
        .with_state(recorded)
}

#[tokio::test]
async fn load_sends_token_and_maps_project() {
    let recorded = Recorded::default();
    let base = serve(backend(recorded.clone())).await;
    let api = HttpProjectApi::new(base);

    let project = api
        .load(Some("tok-1"), &ProjectId::from("p1"))
        .await
        .expect("load should succeed");

    assert_eq!(project.name, "hello");
    assert_eq!(project.language, "python");
    assert_eq!(project.id, ProjectId::from("p1"));
    let sent = recorded.lock().unwrap()[0].clone();
    assert_eq!(sent, json!({ "token": "tok-1", "projectId": "p1" }));
}

#[tokio::test]
async fn load_refusal_is_not_found_even_with_error_status() {
    let base = serve(backend(Recorded::default())).await;
    let api = HttpProjectApi::new(base);

    let err = api
        .load(Some("tok"), &ProjectId::from("missing"))
        .await
        .unwrap_err();
    assert_eq!(err, EditorError::NotFound("Project not found!".to_string()));
}

#[tokio::test]
async fn save_posts_code_and_reports_rejection() {
    let recorded = Recorded::default();
    let base = serve(backend(recorded.clone())).await;
    let api = HttpProjectApi::new(base);
    let id = ProjectId::from("p1");

    api.save(Some("tok"), &id, "x = 1").await.expect("save ok");
    let err = api.save(None, &id, "x = 2").await.unwrap_err();

    assert_eq!(err, EditorError::Validation("User not found!".to_string()));
    let sent = recorded.lock().unwrap().clone();
    assert_eq!(sent[0], json!({ "token": "tok", "projectId": "p1", "code": "x = 1" }));
    assert_eq!(sent[1]["token"], Value::Null);
}

#[tokio::test]
async fn project_api_transport_failure_is_network_error() {
    let api = HttpProjectApi::new(dead_address().await);
    let err = api.load(None, &ProjectId::from("p1")).await.unwrap_err();
    assert!(err.is_network(), "expected network error, got {err:?}");
}

#[tokio::test]
async fn execute_normalizes_success_and_failure() {
    let recorded = Recorded::default();
    let base = serve(piston(recorded.clone())).await;
    let client = ExecutionClient::new(format!("{base}/execute"));

    let request =
        ExecutionRequest::new("python", "3.10.0", "print('hi')").with_filename("main.python");
    let ok = client
        .execute(&request)
        .await
        .unwrap();
    assert!(ok.succeeded);
    assert_eq!(ok.raw_output, "hi\n");

    let failed = client
        .execute(&ExecutionRequest::new("python", "3.10.0", "fail"))
        .await
        .unwrap();
    assert!(!failed.succeeded);
    assert_eq!(failed.exit_code, 1);

    let sent = recorded.lock().unwrap().clone();
    assert_eq!(
        sent[0],
        json!({
            "language": "python",
            "version": "3.10.0",
            "files": [{ "filename": "main.python", "content": "print('hi')" }]
        })
    );
    assert!(sent[1]["files"][0].get("filename").is_none());
}

#[tokio::test]
async fn execute_refusal_is_service_error() {
    let base = serve(piston(Recorded::default())).await;
    let client = ExecutionClient::new(format!("{base}/execute"));

    let err = client
        .execute(&ExecutionRequest::new("python", "9.9.9", "unknown-runtime"))
        .await
        .unwrap_err();
    assert!(matches!(err, EditorError::Service(_)));
    assert!(err.message().contains("runtime is unknown"));
}

#[tokio::test]
async fn execute_non_json_body_is_network_error() {
    let base = serve(piston(Recorded::default())).await;
    let client = ExecutionClient::new(format!("{base}/garbage"));

    let err = client
        .execute(&ExecutionRequest::new("python", "3.10.0", "x"))
        .await
        .unwrap_err();
    assert!(err.is_network());
}

#[tokio::test]
async fn execute_transport_failure_is_network_error() {
    let client = ExecutionClient::new(format!("{}/execute", dead_address().await));
    let err = client
        .execute(&ExecutionRequest::new("python", "3.10.0", "x"))
        .await
        .unwrap_err();
    assert!(err.is_network());
}

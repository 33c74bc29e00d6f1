//! End-to-end tests for the Inkwell HTTP API.
//!
//! These drive the full stack (router, services, store) the same way a
//! client would, against both store backends.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use inkwell_config::{AppConfig, DatabaseConfig};
use inkwell_gateway::{GatewayState, build_router};
use inkwell_service::{CredentialHasher, Services};
use inkwell_store::Stores;

// ── Harness ──────────────────────────────────────────────────────────────

fn app_with(stores: Stores) -> Router {
    let config = AppConfig::default();
    let services = Services::new(&stores, CredentialHasher::new(Some("e2e-pepper")));
    build_router(Arc::new(GatewayState { services }), &config)
}

async fn sqlite_app() -> Router {
    let database = DatabaseConfig {
        backend: "sqlite".into(),
        url: "sqlite::memory:".into(),
        max_connections: 1,
    };
    let stores = inkwell_store::open(&database).await.unwrap();
    app_with(stores)
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

// ── Scenarios ────────────────────────────────────────────────────────────

async fn assessment_scenario(app: Router) {
    let (status, started) = call(
        &app,
        "POST",
        "/assessments/start",
        Some(json!({
            "user_id": 1,
            "title": "Geography & arithmetic",
            "description": "Two quick ones",
            "questions": [
                {"id": 1, "prompt": "Capital of France?", "correct_answer": "Paris"},
                {"id": 2, "prompt": "6 x 7", "correct_answer": "42"}
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let session = started["session_id"].as_str().unwrap().to_string();
    assert_eq!(session.len(), 32);
    assert_eq!(started["questions"].as_array().unwrap().len(), 2);

    let submit = |question_id: u32, answer: &str, session: &str| {
        json!({"session_id": session, "question_id": question_id, "answer": answer})
    };

    let (status, grade) = call(&app, "POST", "/assessments/submit", Some(submit(1, "Paris", &session))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(grade, json!({"is_correct": true, "feedback": "Correct"}));

    let (status, grade) = call(&app, "POST", "/assessments/submit", Some(submit(2, "43", &session))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(grade, json!({"is_correct": false, "feedback": "Incorrect"}));

    let (status, error) = call(&app, "POST", "/assessments/submit", Some(submit(99, "x", &session))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["error"], "Question not found");

    let (status, error) = call(&app, "POST", "/assessments/submit", Some(submit(1, "Paris", "bogus"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["error"], "Session not found");

    // Grading is exact: no trimming, no case folding.
    let (_, grade) = call(&app, "POST", "/assessments/submit", Some(submit(1, "paris", &session))).await;
    assert_eq!(grade["is_correct"], false);
    let (_, grade) = call(&app, "POST", "/assessments/submit", Some(submit(1, " Paris", &session))).await;
    assert_eq!(grade["is_correct"], false);

    let (status, assessment) = call(&app, "GET", &format!("/assessments/{session}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(assessment["session_id"], session.as_str());
    assert_eq!(assessment["title"], "Geography & arithmetic");
    assert_eq!(assessment["questions"], started["questions"]);

    // Session tokens are case-sensitive.
    let (status, _) = call(&app, "GET", &format!("/assessments/{}", session.to_uppercase()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Every graded submission is recorded; unknown questions are not.
    let (status, answers) = call(&app, "GET", &format!("/assessments/{session}/answers"), None).await;
    assert_eq!(status, StatusCode::OK);
    let answers = answers.as_array().unwrap();
    assert_eq!(answers.len(), 4);
    assert!(answers.iter().all(|a| a["user_id"] == 1));
    assert_eq!(answers[0]["feedback"], "Correct");
    assert_eq!(answers[1]["feedback"], "Incorrect");
}

async fn account_scenario(app: Router) {
    let (status, body) = call(
        &app,
        "POST",
        "/auth/register",
        Some(json!({"username": "ada", "email": "ada@example.com", "authhash": "c0ffee"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User registered successfully");

    let (status, _) = call(
        &app,
        "POST",
        "/auth/register",
        Some(json!({"username": "ada2", "email": "ada@example.com", "authhash": "c0ffee"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, user) = call(
        &app,
        "POST",
        "/auth/login",
        Some(json!({"email": "ada@example.com", "authhash": "c0ffee"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["username"], "ada");
    assert!(user.get("auth_hash").is_none());

    let (status, error) = call(
        &app,
        "POST",
        "/auth/login",
        Some(json!({"email": "ada@example.com", "authhash": "wrong"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error["error"], "Invalid email or password");

    let (status, users) = call(&app, "GET", "/user", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users.as_array().unwrap().len(), 1);

    let (status, stories) = call(&app, "GET", "/stories", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(stories.as_array().unwrap().is_empty());
}

// ── Tests ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn assessment_flow_in_memory() {
    assessment_scenario(app_with(Stores::in_memory())).await;
}

#[tokio::test]
async fn assessment_flow_sqlite() {
    assessment_scenario(sqlite_app().await).await;
}

#[tokio::test]
async fn accounts_in_memory() {
    account_scenario(app_with(Stores::in_memory())).await;
}

#[tokio::test]
async fn accounts_sqlite() {
    account_scenario(sqlite_app().await).await;
}

#[tokio::test]
async fn health_reports_version() {
    let app = app_with(Stores::in_memory());
    let (status, body) = call(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn concurrent_sessions_are_distinct() {
    let app = app_with(Stores::in_memory());
    let mut handles = Vec::new();
    for i in 0..16 {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            let (_, body) = call(
                &app,
                "POST",
                "/assessments/start",
                Some(json!({
                    "user_id": i,
                    "title": format!("Quiz {i}"),
                    "questions": [{"prompt": "1 + 1", "correct_answer": "2"}]
                })),
            )
            .await;
            body["session_id"].as_str().unwrap().to_string()
        }));
    }

    let mut sessions = Vec::new();
    for handle in handles {
        sessions.push(handle.await.unwrap());
    }
    sessions.sort();
    sessions.dedup();
    assert_eq!(sessions.len(), 16);
}

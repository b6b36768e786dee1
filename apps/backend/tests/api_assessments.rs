//! Assessment API tests.

mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::Value;

use common::fixtures;
use common::TestContext;

async fn start(server: &TestServer, user_id: &str, word_id: &str) -> Value {
    let response = server
        .post("/api/assessments")
        .json(&fixtures::start_assessment_request(user_id, word_id))
        .await;
    response.assert_status_ok();
    response.json()
}

#[tokio::test]
async fn test_health() {
    let ctx = TestContext::new(&[]);
    let server = TestServer::new(ctx.router()).unwrap();

    let response = server.get("/health").await;
    response.assert_status_ok();
    response.assert_text("OK");
}

/// A word with no history starts on the first flow.
#[tokio::test]
async fn test_start_without_history() {
    let ctx = TestContext::new(&["apple"]);
    let server = TestServer::new(ctx.router()).unwrap();

    let body = start(&server, "u1", "apple").await;

    assert_eq!(body["stage"], "flow1_transEn");
    assert_eq!(body["history_length"], 0);
    assert!(body["session_id"].is_string());
}

#[tokio::test]
async fn test_start_unknown_word() {
    let ctx = TestContext::new(&[]);
    let server = TestServer::new(ctx.router()).unwrap();

    let response = server
        .post("/api/assessments")
        .json(&fixtures::start_assessment_request("u1", "ghost"))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["error"], "not_found");
}

/// Translate passes, pronunciation fails: L1, and the session is gone.
#[tokio::test]
async fn test_flow1_resolves_to_level() {
    let ctx = TestContext::new(&["apple"]);
    let server = TestServer::new(ctx.router()).unwrap();

    let session_id = start(&server, "u1", "apple").await["session_id"]
        .as_str()
        .unwrap()
        .to_string();
    let answer_url = format!("/api/assessments/{}/answer", session_id);

    let response = server.post(&answer_url).json(&fixtures::answer_request(true)).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["stage"], "flow1_pronounce");
    assert!(body.get("resolved_level").is_none());

    let response = server.post(&answer_url).json(&fixtures::answer_request(false)).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["resolved_level"], 1);
    assert!(body.get("stage").is_none());
    assert_eq!(body["schedule"]["progress"]["proficiency_level"], 1);
    assert_eq!(body["schedule"]["log"]["strategy_id"], "adaptive-fsrs");

    let history: Value = server.get("/api/history/u1/apple").await.json();
    assert_eq!(history["levels"], serde_json::json!([1]));

    let response = server.post(&answer_url).json(&fixtures::answer_request(true)).await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_answer_unknown_session() {
    let ctx = TestContext::new(&[]);
    let server = TestServer::new(ctx.router()).unwrap();

    let response = server
        .post(&format!("/api/assessments/{}/answer", uuid::Uuid::new_v4()))
        .json(&fixtures::answer_request(true))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

/// After four scheduled assessments a word with a non-L0 last entry is
/// routed to the listening flow.
#[tokio::test]
async fn test_history_drives_routing() {
    let ctx = TestContext::new(&["apple"]);
    let server = TestServer::new(ctx.router()).unwrap();

    for level in [0, 1, 2, 2] {
        server
            .post("/api/reviews/schedule")
            .json(&fixtures::schedule_request("u1", "apple", level))
            .await
            .assert_status_ok();
    }

    let body = start(&server, "u1", "apple").await;
    assert_eq!(body["stage"], "flow2_listen");
    assert_eq!(body["history_length"], 4);

    // Another user has no history for the same word.
    let body = start(&server, "u2", "apple").await;
    assert_eq!(body["stage"], "flow1_transEn");
}

/// A short non-L0 history goes through the default flow.
#[tokio::test]
async fn test_default_flow() {
    let ctx = TestContext::new(&["apple"]);
    let server = TestServer::new(ctx.router()).unwrap();

    server
        .post("/api/reviews/schedule")
        .json(&fixtures::schedule_request("u1", "apple", 2))
        .await
        .assert_status_ok();

    let body = start(&server, "u1", "apple").await;
    assert_eq!(body["stage"], "flowDefault");

    let answer_url = format!(
        "/api/assessments/{}/answer",
        body["session_id"].as_str().unwrap()
    );
    let response = server
        .post(&answer_url)
        .json(&fixtures::answer_request(true))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["resolved_level"], 2);
    assert_eq!(body["schedule"]["progress"]["reviewed_times"], 2);

    let history: Value = server.get("/api/history/u1/apple").await.json();
    assert_eq!(history["levels"], serde_json::json!([2, 2]));
}

/// An answer that only advances the flow schedules nothing.
#[tokio::test]
async fn test_pending_answer_schedules_nothing() {
    let ctx = TestContext::new(&["apple"]);
    let server = TestServer::new(ctx.router()).unwrap();

    let session_id = start(&server, "u1", "apple").await["session_id"]
        .as_str()
        .unwrap()
        .to_string();
    let response = server
        .post(&format!("/api/assessments/{}/answer", session_id))
        .json(&fixtures::answer_request(true))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body.get("schedule").is_none());

    server
        .get("/api/progress/u1/apple")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

//! Tests for the question answering endpoint.

mod common;

use common::{create_test_settings, test_profile, TestApp};

use ask_service::services::{MockAnswerProvider, MockIdentityProvider};
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn ask_returns_accumulated_answer() {
    let app = TestApp::spawn_with(
        MockIdentityProvider::returning(test_profile("dev@cx-labs.io")),
        MockAnswerProvider::answering("The answer is 42."),
        create_test_settings(),
    )
    .await;
    let client = app.client();

    // No login needed; the endpoint is open to anonymous visitors.
    let response = client
        .post(app.url("/ask"))
        .json(&json!({ "question": "What is the answer?" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["answer"], "The answer is 42.");
    assert_eq!(app.answers.calls(), 1);
}

#[tokio::test]
async fn ask_rejects_missing_question() {
    let app = TestApp::spawn().await;
    let client = app.client();

    let response = client
        .post(app.url("/ask"))
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["error"], "question must be a string");
    assert_eq!(app.answers.calls(), 0);
}

#[tokio::test]
async fn ask_rejects_non_string_question() {
    let app = TestApp::spawn().await;
    let client = app.client();

    let response = client
        .post(app.url("/ask"))
        .json(&json!({ "question": 42 }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["error"], "question must be a string");
    assert_eq!(app.answers.calls(), 0);
}

#[tokio::test]
async fn ask_rejects_empty_question() {
    let app = TestApp::spawn().await;
    let client = app.client();

    let response = client
        .post(app.url("/ask"))
        .json(&json!({ "question": "" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["error"], "question must be a string");
    assert_eq!(app.answers.calls(), 0);
}

#[tokio::test]
async fn ask_rejects_non_json_body() {
    let app = TestApp::spawn().await;
    let client = app.client();

    // A body the JSON extractor refuses is the same as a missing question.
    let response = client
        .post(app.url("/ask"))
        .header("content-type", "text/plain")
        .body("What is the answer?")
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["error"], "question must be a string");

    // Malformed JSON gets the same treatment.
    let response = client
        .post(app.url("/ask"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["error"], "question must be a string");
    assert_eq!(app.answers.calls(), 0);
}

#[tokio::test]
async fn ask_provider_failure_stays_opaque() {
    let app = TestApp::spawn_with(
        MockIdentityProvider::returning(test_profile("dev@cx-labs.io")),
        MockAnswerProvider::failing(),
        create_test_settings(),
    )
    .await;
    let client = app.client();

    let response = client
        .post(app.url("/ask"))
        .json(&json!({ "question": "Will this work?" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["error"], "internal_error");
    assert_eq!(app.answers.calls(), 1);
}

#[tokio::test]
async fn ask_passes_question_through_verbatim() {
    let app = TestApp::spawn_with(
        MockIdentityProvider::returning(test_profile("dev@cx-labs.io")),
        MockAnswerProvider::new(),
        create_test_settings(),
    )
    .await;
    let client = app.client();

    let response = client
        .post(app.url("/ask"))
        .json(&json!({ "question": "Does Unicode survive? ✓" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["answer"], "Mock answer for: Does Unicode survive? ✓");
}

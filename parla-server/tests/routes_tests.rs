//! Drive the router in-process against a scripted model.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use parla_core::prelude::*;
use parla_server::{AppState, build_app};
use serde_json::{Value, json};
use tower::ServiceExt;

struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<String>>>,
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    async fn generate_request(&self, _request: &LLMRequest) -> Result<LLMResponse> {
        let content = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ParlaError::Llm("script exhausted".to_string())))?;
        Ok(LLMResponse {
            content,
            usage: None,
        })
    }

    fn model_info(&self) -> ModelInfo {
        ModelInfo {
            provider: "scripted".to_string(),
            model_name: "scripted-1".to_string(),
        }
    }
}

fn app(replies: Vec<Result<String>>) -> (Router, AppState) {
    let provider = Arc::new(ScriptedProvider {
        replies: Mutex::new(replies.into()),
    });
    let state = AppState::new(LanguageAssistant::new(provider, LLMConfig::default()));
    (build_app(state.clone(), &ServerConfig::default()), state)
}

async fn post(app: &Router, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_correct_grammar() {
    let (app, _) = app(vec![Ok("She goes to school.\n".to_string())]);

    let body = r#"{"sentence": "she go to school"}"#;
    let (status, body) = post(&app, "/correct-grammar", body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"correctedSentence": "She goes to school."}));
}

#[tokio::test]
async fn test_missing_sentence_is_bad_request() {
    let (app, _) = app(vec![]);

    let (status, body) = post(&app, "/auto-complete", "{}").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Sentence is required");
    assert!(body.get("details").is_some());
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let (app, _) = app(vec![]);

    let (status, body) = post(&app, "/correct-grammar", "{sentence:").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid JSON body");
}

#[tokio::test]
async fn test_auto_complete_model_failure_is_internal_error() {
    let (app, _) = app(vec![Err(ParlaError::Llm("upstream timeout".to_string()))]);

    let (status, body) = post(&app, "/auto-complete", r#"{"sentence": "I would like"}"#).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to auto-complete sentence");
    assert!(body["details"].as_str().unwrap().contains("upstream timeout"));
}

#[tokio::test]
async fn test_roleplay_round_trip_and_reset() {
    let (app, state) = app(vec![Ok(
        r#"Sure! {"response": "Table for two?", "correction": "Use \"a table\"."}"#.to_string(),
    )]);

    let (status, body) = post(
        &app,
        "/roleplay",
        r#"{"userId": "u1", "scenario": "Restaurant", "message": "I want table"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["roleplayResponse"]["response"], "Table for two?");
    assert_eq!(body["roleplayResponse"]["correction"], "Use \"a table\".");
    assert_eq!(state.assistant.roleplay_store().history("u1").await.len(), 2);

    let (status, body) = post(&app, "/reset-history", r#"{"userId": "u1"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].as_str().unwrap().contains("u1"));

    let (status, body) = post(&app, "/reset-history", r#"{"userId": "u1"}"#).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");
}

#[tokio::test]
async fn test_roleplay_null_correction() {
    let (app, state) = app(vec![Ok(
        r#"{"response": "Here is your latte.", "correction": null}"#.to_string(),
    )]);

    let (status, body) = post(
        &app,
        "/roleplay",
        r#"{"userId": "u2", "scenario": "Coffee shop", "message": "A latte, please"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"roleplayResponse": {"response": "Here is your latte.", "correction": ""}})
    );
    assert_eq!(state.assistant.roleplay_store().history("u2").await.len(), 2);
}

#[tokio::test]
async fn test_roleplay_unparseable_reply_is_internal_error() {
    let (app, state) = app(vec![Ok("I'd rather not.".to_string())]);

    let (status, body) = post(
        &app,
        "/roleplay",
        r#"{"userId": "u1", "scenario": "Bank", "message": "Open account"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to generate roleplay response");
    assert!(!state.assistant.roleplay_store().contains("u1").await);
}

#[tokio::test]
async fn test_therapist_chat_and_reset_all() {
    let (app, state) = app(vec![
        Ok("I'm here to listen.".to_string()),
        Ok("Tell me more.".to_string()),
    ]);

    let (status, body) = post(
        &app,
        "/therapist-chat",
        r#"{"userId": "a", "message": "Rough day"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"therapistResponse": "I'm here to listen."}));

    post(&app, "/therapist-chat", r#"{"userId": "b", "message": "Hi"}"#).await;
    assert_eq!(state.assistant.therapist_store().user_count().await, 2);

    let (status, body) = post(&app, "/therapist-reset", "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "All therapist histories have been reset.");
    assert_eq!(state.assistant.therapist_store().user_count().await, 0);
}

#[tokio::test]
async fn test_therapist_reset_unknown_user_is_not_found() {
    let (app, state) = app(vec![Ok("I'm here to listen.".to_string())]);

    post(&app, "/therapist-chat", r#"{"userId": "a", "message": "Hi"}"#).await;

    let (status, body) = post(&app, "/therapist-reset", r#"{"userId": "nobody"}"#).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");
    assert!(state.assistant.therapist_store().contains("a").await);
}

#[tokio::test]
async fn test_therapist_chat_requires_user_id() {
    let (app, _) = app(vec![]);

    let (status, body) = post(&app, "/therapist-chat", r#"{"message": "hello"}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "userId and message are required");
}

#[tokio::test]
async fn test_health() {
    let (app, _) = app(vec![]);

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["model"]["provider"], "scripted");
    assert_eq!(body["model"]["model"], "scripted-1");
    assert_eq!(body["roleplayUsers"], 0);
}

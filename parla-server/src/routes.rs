//! Route handlers and their request/response bodies.
//!
//! Request fields are all optional so that a missing field reaches the
//! assistant's validation and gets its static message, instead of failing
//! deserialization with a serde error.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use parla_core::assistant::RoleplayReply;
use parla_core::llm::ModelInfo;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ApiError;
use crate::server::AppState;

type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentenceRequest {
    pub sentence: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleplayRequest {
    pub user_id: Option<String>,
    pub scenario: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TherapistRequest {
    pub user_id: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetRequest {
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrectedSentence {
    pub corrected_sentence: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedSentence {
    pub completed_sentence: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleplayResponse {
    pub roleplay_response: RoleplayReply,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TherapistResponse {
    pub therapist_response: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub model: ModelInfo,
    pub roleplay_users: usize,
    pub therapist_users: usize,
}

/// Reset bodies may be empty; an empty body means "everyone".
fn optional_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| {
        ApiError::new(
            axum::http::StatusCode::BAD_REQUEST,
            "Invalid JSON body",
            e.to_string(),
        )
    })
}

pub async fn correct_grammar(
    State(state): State<AppState>,
    body: Result<Json<SentenceRequest>, JsonRejection>,
) -> ApiResult<CorrectedSentence> {
    let Json(req) = body?;
    info!(route = "/correct-grammar", "request received");

    let corrected_sentence = state
        .assistant
        .correct_grammar(req.sentence.as_deref())
        .await
        .map_err(|e| ApiError::from_core("Failed to correct grammar", e))?;
    Ok(Json(CorrectedSentence { corrected_sentence }))
}

pub async fn auto_complete(
    State(state): State<AppState>,
    body: Result<Json<SentenceRequest>, JsonRejection>,
) -> ApiResult<CompletedSentence> {
    let Json(req) = body?;
    info!(route = "/auto-complete", "request received");

    let completed_sentence = state
        .assistant
        .auto_complete(req.sentence.as_deref())
        .await
        .map_err(|e| ApiError::from_core("Failed to auto-complete sentence", e))?;
    Ok(Json(CompletedSentence { completed_sentence }))
}

pub async fn roleplay(
    State(state): State<AppState>,
    body: Result<Json<RoleplayRequest>, JsonRejection>,
) -> ApiResult<RoleplayResponse> {
    let Json(req) = body?;
    info!(route = "/roleplay", user_id = ?req.user_id, "request received");

    let roleplay_response = state
        .assistant
        .roleplay(
            req.user_id.as_deref(),
            req.scenario.as_deref(),
            req.message.as_deref(),
        )
        .await
        .map_err(|e| ApiError::from_core("Failed to generate roleplay response", e))?;
    Ok(Json(RoleplayResponse { roleplay_response }))
}

pub async fn reset_history(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<MessageResponse> {
    let req: ResetRequest = optional_body(&body)?;
    info!(route = "/reset-history", user_id = ?req.user_id, "request received");

    let outcome = state
        .assistant
        .reset_roleplay(req.user_id.as_deref())
        .await
        .map_err(|e| ApiError::from_core("Failed to reset roleplay history", e))?;
    Ok(Json(MessageResponse {
        message: outcome.message(),
    }))
}

pub async fn therapist_chat(
    State(state): State<AppState>,
    body: Result<Json<TherapistRequest>, JsonRejection>,
) -> ApiResult<TherapistResponse> {
    let Json(req) = body?;
    info!(route = "/therapist-chat", user_id = ?req.user_id, "request received");

    let therapist_response = state
        .assistant
        .therapist_chat(req.user_id.as_deref(), req.message.as_deref())
        .await
        .map_err(|e| ApiError::from_core("Failed to generate therapist response", e))?;
    Ok(Json(TherapistResponse { therapist_response }))
}

pub async fn therapist_reset(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<MessageResponse> {
    let req: ResetRequest = optional_body(&body)?;
    info!(route = "/therapist-reset", user_id = ?req.user_id, "request received");

    let outcome = state
        .assistant
        .reset_therapist(req.user_id.as_deref())
        .await
        .map_err(|e| ApiError::from_core("Failed to reset therapist history", e))?;
    Ok(Json(MessageResponse {
        message: outcome.message(),
    }))
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let assistant = &state.assistant;
    Json(HealthResponse {
        status: "ok",
        version: parla_core::VERSION,
        model: assistant.model_info(),
        roleplay_users: assistant.roleplay_store().user_count().await,
        therapist_users: assistant.therapist_store().user_count().await,
    })
}

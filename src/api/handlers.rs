use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{ApiError, JsonBody, QueryParams};
use crate::state::{AppState, ANSWER_RECORDED, VOTE_RECORDED};
use crate::types::{RoomId, RoomState};

#[derive(Debug, Deserialize)]
pub struct RoomQuery {
    pub room: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    pub room: Option<String>,
    pub updates: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub room: Option<String>,
    pub group: Option<String>,
    pub response: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub room: Option<String>,
    pub jury_id: Option<String>,
    pub vote: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateAnswerRequest {
    pub room: Option<String>,
    pub question: Option<String>,
    pub context: Option<String>,
    pub save_to_state: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct UpdateResponse {
    pub success: bool,
    pub state: RoomState,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct GenerateAnswerResponse {
    pub success: bool,
    pub ia: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub store: String,
    pub llm: String,
}

/// Read a room's state, creating it on first access.
///
/// GET /api/state?room=<id>
pub async fn get_state(
    State(state): State<Arc<AppState>>,
    QueryParams(query): QueryParams<RoomQuery>,
) -> Result<Json<RoomState>, ApiError> {
    let room = RoomId::resolve(query.room.as_deref());
    Ok(Json(state.get_state(&room).await?))
}

/// Merge a partial state into a room.
///
/// POST /api/update `{room?, updates}`
pub async fn update_state(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<UpdateRequest>,
) -> Result<Json<UpdateResponse>, ApiError> {
    let room = RoomId::resolve(body.room.as_deref());
    let merged = state.merge_update(&room, body.updates).await?;

    Ok(Json(UpdateResponse {
        success: true,
        state: merged,
    }))
}

/// Record a group's answer to the active question.
///
/// POST /api/group `{room?, group, response}`
pub async fn record_answer(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<AnswerRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let room = RoomId::resolve(body.room.as_deref());
    state
        .record_answer(&room, body.group.as_deref(), body.response.as_deref())
        .await?;

    Ok(Json(MessageResponse {
        success: true,
        message: ANSWER_RECORDED,
    }))
}

/// Record a juror's vote.
///
/// POST /api/vote `{room?, juryId, vote}`
pub async fn record_vote(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<VoteRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let room = RoomId::resolve(body.room.as_deref());
    state
        .record_vote(&room, body.jury_id.as_deref(), body.vote.as_deref())
        .await?;

    Ok(Json(MessageResponse {
        success: true,
        message: VOTE_RECORDED,
    }))
}

/// Ask the LLM and, unless `saveToState` is false, store its answer in the room.
///
/// POST /api/ia `{room?, question, context?, saveToState?}`
pub async fn generate_answer(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<GenerateAnswerRequest>,
) -> Result<Json<GenerateAnswerResponse>, ApiError> {
    let room = RoomId::resolve(body.room.as_deref());
    let answer = state
        .generate_answer(
            &room,
            body.question.as_deref(),
            body.context.as_deref(),
            body.save_to_state.unwrap_or(true),
        )
        .await?;

    Ok(Json(GenerateAnswerResponse {
        success: true,
        ia: answer.text,
    }))
}

/// GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        store: state.store.name().to_string(),
        llm: state.llm.name().to_string(),
    })
}

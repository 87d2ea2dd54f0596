use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::state::RoomError;

/// Errors surfaced by the HTTP endpoints, rendered as `{"error": "..."}`
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid JSON body")]
    InvalidJson,

    #[error("Invalid query string")]
    InvalidQuery,

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error(transparent)]
    Room(#[from] RoomError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidJson | ApiError::InvalidQuery => StatusCode::BAD_REQUEST,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Room(RoomError::InvalidInput(_) | RoomError::InvalidState(_)) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Room(RoomError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Room(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Internal causes are logged, never sent to clients
        let message = if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmError;
    use crate::store::StoreError;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::InvalidJson, StatusCode::BAD_REQUEST),
            (ApiError::InvalidQuery, StatusCode::BAD_REQUEST),
            (ApiError::MethodNotAllowed, StatusCode::METHOD_NOT_ALLOWED),
            (
                RoomError::InvalidInput("Invalid vote".into()).into(),
                StatusCode::BAD_REQUEST,
            ),
            (
                RoomError::InvalidState("No active question".into()).into(),
                StatusCode::BAD_REQUEST,
            ),
            (
                RoomError::NotFound("Game not started".into()).into(),
                StatusCode::NOT_FOUND,
            ),
            (
                RoomError::from(StoreError::Command("boom".into())).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                RoomError::from(LlmError::ApiError("boom".into())).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.status(), expected, "{:?}", error);
        }
    }

    #[test]
    fn test_client_errors_keep_their_message() {
        let error: ApiError = RoomError::NotFound("Game not started".into()).into();
        assert_eq!(error.to_string(), "Game not started");
        assert_eq!(ApiError::InvalidJson.to_string(), "Invalid JSON body");
    }
}

//! HTTP surface of the room state service.
//!
//! Every endpoint accepts one method plus `OPTIONS`, answers JSON, and allows
//! any origin.

mod error;
pub mod handlers;

pub use error::ApiError;

use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::{request::Parts, StatusCode},
    routing::{get, post, MethodRouter},
    Router,
};
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::state::AppState;

/// JSON request body.
///
/// An empty body reads as `{}`. Anything that is not JSON, or does not match
/// `T`, is rejected with [`ApiError::InvalidJson`]. The Content-Type header is
/// not checked.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|e| {
            tracing::warn!("Failed to read request body: {}", e);
            ApiError::InvalidJson
        })?;

        parse_body(&bytes).map(JsonBody)
    }
}

fn parse_body<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
    let parsed = if bytes.iter().all(u8::is_ascii_whitespace) {
        serde_json::from_value(serde_json::Value::Object(serde_json::Map::new()))
    } else {
        serde_json::from_slice(bytes)
    };

    parsed.map_err(|e| {
        tracing::debug!("Rejected request body: {}", e);
        ApiError::InvalidJson
    })
}

/// Query-string parameters, rejected as [`ApiError::InvalidQuery`] when they
/// do not decode as `T`
#[derive(Debug)]
pub struct QueryParams<T>(pub T);

impl<T, S> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<T>::try_from_uri(&parts.uri).map_err(|e| {
            tracing::debug!("Rejected query string: {}", e);
            ApiError::InvalidQuery
        })?;
        Ok(QueryParams(params))
    }
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Wrap a single-method route with the preflight handler and the JSON 405 fallback
fn endpoint(route: MethodRouter<Arc<AppState>>) -> MethodRouter<Arc<AppState>> {
    route.options(preflight).fallback(method_not_allowed)
}

/// Build the application router.
///
/// When `static_dir` is set, unknown paths are served from that directory.
pub fn router(state: Arc<AppState>, static_dir: Option<PathBuf>) -> Router {
    let mut app = Router::new()
        .route("/api/state", endpoint(get(handlers::get_state)))
        .route("/api/update", endpoint(post(handlers::update_state)))
        .route("/api/group", endpoint(post(handlers::record_answer)))
        .route("/api/vote", endpoint(post(handlers::record_vote)))
        .route("/api/ia", endpoint(post(handlers::generate_answer)))
        .route("/health", endpoint(get(handlers::health)));

    if let Some(dir) = static_dir {
        tracing::info!("Serving static files from {}", dir.display());
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Body {
        room: Option<String>,
    }

    #[test]
    fn test_empty_body_reads_as_empty_object() {
        let body: Body = parse_body(b"").unwrap();
        assert!(body.room.is_none());
        let body: Body = parse_body(b" \n").unwrap();
        assert!(body.room.is_none());
    }

    #[test]
    fn test_malformed_body_is_invalid_json() {
        assert!(matches!(
            parse_body::<Body>(b"{room:"),
            Err(ApiError::InvalidJson)
        ));
        assert!(matches!(
            parse_body::<Body>(br#"{"room": 7}"#),
            Err(ApiError::InvalidJson)
        ));
    }

    #[test]
    fn test_query_params_reject_repeated_room() {
        let uri: axum::http::Uri = "/api/state?room=a&room=b".parse().unwrap();
        assert!(Query::<Body>::try_from_uri(&uri).is_err());

        let uri: axum::http::Uri = "/api/state?room=a".parse().unwrap();
        let Query(body) = Query::<Body>::try_from_uri(&uri).unwrap();
        assert_eq!(body.room.as_deref(), Some("a"));
    }

    #[test]
    fn test_valid_body() {
        let body: Body = parse_body(br#"{"room": "r1", "extra": true}"#).unwrap();
        assert_eq!(body.room.as_deref(), Some("r1"));
    }
}

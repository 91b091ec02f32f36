//! HTTP surface over the session manager

use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};
use uuid::Uuid;

use crate::error::{ExtractionError, SessionError};
use crate::prompts::Mode;
use crate::session::{SessionManager, SessionSnapshot};

/// Uploads above this size are rejected before decoding
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound,
    Upstream(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "session not found".to_string()),
            ApiError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg),
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Extraction(ExtractionError::Decode(_)) => {
                ApiError::BadRequest(err.to_string())
            }
            _ => ApiError::Upstream(err.to_string()),
        }
    }
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct CreatedSession {
    #[serde(flatten)]
    session: SessionSnapshot,
    reply: String,
}

/// Multipart fields: `image` (file, required) and `mode` (text, defaults to roast)
async fn create_session(
    State(manager): State<Arc<SessionManager>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<CreatedSession>), ApiError> {
    let mut image: Option<Vec<u8>> = None;
    let mut mode = Mode::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Multipart error: {}", e)))?
    {
        let field_name = field.name().map(|n| n.to_string());
        match field_name.as_deref() {
            Some("image") => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Read error: {}", e)))?;
                image = Some(bytes.to_vec());
            }
            Some("mode") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Read error: {}", e)))?;
                mode = text
                    .parse::<Mode>()
                    .map_err(|e| ApiError::BadRequest(e.to_string()))?;
            }
            _ => {}
        }
    }

    let image = image
        .filter(|bytes| !bytes.is_empty())
        .ok_or_else(|| ApiError::BadRequest("missing 'image' file field".to_string()))?;

    let session = manager.create(&image, mode).await.map_err(|e| {
        error!("Session start failed: {}", e);
        ApiError::from(e)
    })?;
    let reply = session
        .transcript
        .last()
        .map(|m| m.content.clone())
        .unwrap_or_default();

    Ok((StatusCode::CREATED, Json(CreatedSession { session, reply })))
}

async fn get_session(
    State(manager): State<Arc<SessionManager>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    manager.snapshot(id).await.map(Json).ok_or(ApiError::NotFound)
}

#[derive(Deserialize)]
struct SendMessage {
    text: String,
}

#[derive(Serialize)]
struct Reply {
    reply: String,
}

async fn send_message(
    State(manager): State<Arc<SessionManager>>,
    Path(id): Path<Uuid>,
    Json(body): Json<SendMessage>,
) -> Result<Json<Reply>, ApiError> {
    if body.text.trim().is_empty() {
        return Err(ApiError::BadRequest("message text is empty".to_string()));
    }

    match manager.send(id, &body.text).await {
        None => Err(ApiError::NotFound),
        Some(Ok(reply)) => Ok(Json(Reply { reply })),
        Some(Err(e)) => {
            warn!("Message to session {} failed: {}", id, e);
            Err(ApiError::Upstream(e.to_string()))
        }
    }
}

async fn end_session(
    State(manager): State<Arc<SessionManager>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if manager.end(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}

pub fn router(manager: Arc<SessionManager>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/sessions", post(create_session))
        .route("/sessions/{id}", get(get_session).delete(end_session))
        .route("/sessions/{id}/messages", post(send_message))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .with_state(manager)
}

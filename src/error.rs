//! API Error Envelope
//! Mission: One tagged error shape for every failure the API can report
//!
//! Every error response is `{"success": false, "kind": ..., "detail": ...}`.
//! Validation failures carry an array of field-level messages in `detail`;
//! everything else carries a single message string.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use tracing::error;

/// A single field-level validation message.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl FieldError {
    /// Message tied to a specific input field.
    pub fn field(field: &str, msg: &str) -> Self {
        Self {
            msg: msg.to_string(),
            field: Some(field.to_string()),
        }
    }

    /// Message with no field attribution (business rejections like
    /// "Wrong Password" ride the same channel as field validation).
    pub fn message(msg: &str) -> Self {
        Self {
            msg: msg.to_string(),
            field: None,
        }
    }
}

/// API error taxonomy.
///
/// Status codes follow the original service: validation and conflict are
/// both 400, a missing credential is 403 while a bad one is 401, and the
/// two must stay distinct.
#[derive(Debug)]
pub enum ApiError {
    /// 400 - list of field-level messages
    Validation(Vec<FieldError>),
    /// 400 - uniqueness violation, single message
    Conflict(String),
    /// 403 - no Authorization header at all
    Forbidden,
    /// 401 - invalid/expired token, or token for a vanished user
    Unauthorized(&'static str),
    /// 404 - id lookup with no (owned) match
    NotFound(String),
    /// 500 - unclassified store/runtime failure
    Internal(anyhow::Error),
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, detail) = match self {
            ApiError::Validation(errors) => (StatusCode::BAD_REQUEST, "validation", json!(errors)),
            ApiError::Conflict(msg) => (StatusCode::BAD_REQUEST, "conflict", json!(msg)),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "forbidden", json!("Forbidden")),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", json!(msg)),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", json!(msg)),
            ApiError::Internal(err) => {
                error!("Internal error: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    json!(err.to_string()),
                )
            }
        };

        let body = Json(json!({
            "success": false,
            "kind": kind,
            "detail": detail,
        }));

        (status, body).into_response()
    }
}

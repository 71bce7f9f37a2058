use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use medimeet_services::recording::{ReconcileError, RecordingError};
use medimeet_services::store::StoreError;
use medimeet_services::token::TokenError;
use serde::Serialize;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Unauthorized(String),
    Conflict(String),
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal", msg),
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::NotFound("Resource not found".to_string()),
            StoreError::Conflict(msg) => ApiError::Conflict(msg),
            StoreError::Mongo(e) => ApiError::Internal(e.to_string()),
            StoreError::BsonSer(e) => ApiError::Internal(e.to_string()),
            StoreError::BsonDe(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<RecordingError> for ApiError {
    fn from(err: RecordingError) -> Self {
        match err {
            // The original wire contract reports start/stop conflicts and
            // agent failures as 400, not 409/502.
            RecordingError::AlreadyActive | RecordingError::NoActiveRecording => {
                ApiError::BadRequest(err.to_string())
            }
            RecordingError::Transport(e) => ApiError::BadRequest(e.to_string()),
            RecordingError::Store(e) => e.into(),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::NotFound => ApiError::NotFound(err.to_string()),
            TokenError::NotAuthorized => ApiError::Unauthorized(err.to_string()),
            TokenError::Signing(msg) => ApiError::Internal(msg),
            TokenError::Store(e) => e.into(),
        }
    }
}

impl From<ReconcileError> for ApiError {
    fn from(err: ReconcileError) -> Self {
        match err {
            ReconcileError::UnknownRecording => ApiError::BadRequest(err.to_string()),
            ReconcileError::Store(e) => e.into(),
        }
    }
}

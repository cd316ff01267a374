use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError { status: StatusCode::BAD_REQUEST, message: msg.into() }
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        ApiError { status: StatusCode::NOT_FOUND, message: msg.into() }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError { status: StatusCode::INTERNAL_SERVER_ERROR, message: msg.into() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.message }));
        (self.status, body).into_response()
    }
}

impl From<chanforge_store::RepositoryError> for ApiError {
    fn from(e: chanforge_store::RepositoryError) -> Self {
        ApiError::internal(e.to_string())
    }
}

impl From<chanforge_engine::EngineError> for ApiError {
    fn from(e: chanforge_engine::EngineError) -> Self {
        ApiError::internal(e.to_string())
    }
}

impl From<chanforge_reconciler::ReconcileError> for ApiError {
    fn from(e: chanforge_reconciler::ReconcileError) -> Self {
        ApiError::internal(e.to_string())
    }
}

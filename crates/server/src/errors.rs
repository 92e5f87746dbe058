use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use service::errors::ServiceError;
use thiserror::Error;
use tracing::error;

/// JSON error body: `{"error": <title>, "message": <detail>}`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub error: &'static str,
    pub message: Option<String>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, error: &'static str, message: Option<String>) -> Self {
        Self { status, error, message }
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let message = self.message.unwrap_or_else(|| self.error.to_string());
        (self.status, Json(serde_json::json!({"error": self.error, "message": message}))).into_response()
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::NotFound(msg) => JsonApiError::new(StatusCode::NOT_FOUND, "Not Found", Some(msg)),
            ServiceError::Validation(msg) => JsonApiError::new(StatusCode::BAD_REQUEST, "Validation Error", Some(msg)),
            ServiceError::Storage(_) => {
                error!(err = %e, "store write failed");
                JsonApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Storage Error", Some(e.to_string()))
            }
            _ => {
                error!(err = %e, "request failed");
                JsonApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", Some(e.to_string()))
            }
        }
    }
}

/// Unparseable bodies and a missing `Content-Type: application/json` are both
/// reported as validation errors.
impl From<JsonRejection> for JsonApiError {
    fn from(rejection: JsonRejection) -> Self {
        JsonApiError::new(StatusCode::BAD_REQUEST, "Validation Error", Some(rejection.body_text()))
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("runtime check failed: {0}")]
    Runtime(String),
    #[error("store unavailable: {0}")]
    Store(#[from] ServiceError),
}

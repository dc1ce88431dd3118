//! HTTP Error Mapping
//!
//! Maps application errors to status codes and a JSON body
//! `{ "error": <kind>, "message": <text> }`. Server-side failures are logged
//! and their details hidden from the client.

use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use qprint_core::domain::DomainError;
use qprint_core::error::AppError;
use serde::Serialize;

/// Error kinds reported in the `error` field
pub mod kind {
    pub const VALIDATION: &str = "validation";
    pub const NOT_FOUND: &str = "not_found";
    pub const LOCATION_UNAVAILABLE: &str = "location_unavailable";
    pub const UNAUTHORIZED: &str = "unauthorized";
    pub const FORBIDDEN: &str = "forbidden";
    pub const ALREADY_REDEEMED: &str = "already_redeemed";
    pub const CONFLICT: &str = "conflict";
    pub const INVALID_STATE: &str = "invalid_state";
    pub const INTERNAL: &str = "internal";
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

/// Newtype so `AppError` can be returned from handlers
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(AppError::Domain(err))
    }
}

// Extractor rejections are malformed client input
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(AppError::Validation(format!(
            "invalid JSON body: {}",
            rejection.body_text()
        )))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self(AppError::Validation(format!(
            "invalid path parameter: {}",
            rejection.body_text()
        )))
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        Self(AppError::Validation(format!(
            "invalid multipart request: {}",
            rejection.body_text()
        )))
    }
}

/// Status code and kind for an application error
pub fn classify(err: &AppError) -> (StatusCode, &'static str) {
    match err {
        AppError::Domain(domain) => match domain {
            DomainError::AlreadyRedeemed(_) => (StatusCode::GONE, kind::ALREADY_REDEEMED),
            DomainError::ShopMismatch { .. } => (StatusCode::FORBIDDEN, kind::FORBIDDEN),
            DomainError::LocationUnavailable => {
                (StatusCode::NOT_FOUND, kind::LOCATION_UNAVAILABLE)
            }
            DomainError::ValidationError(_) => (StatusCode::BAD_REQUEST, kind::VALIDATION),
            DomainError::InvalidStateTransition { .. } => {
                (StatusCode::CONFLICT, kind::INVALID_STATE)
            }
        },
        AppError::Validation(_) => (StatusCode::BAD_REQUEST, kind::VALIDATION),
        AppError::NotFound(_) => (StatusCode::NOT_FOUND, kind::NOT_FOUND),
        AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, kind::UNAUTHORIZED),
        AppError::Forbidden(_) => (StatusCode::FORBIDDEN, kind::FORBIDDEN),
        AppError::Conflict(_) => (StatusCode::CONFLICT, kind::CONFLICT),
        AppError::Database(_)
        | AppError::Blob(_)
        | AppError::Io(_)
        | AppError::Config(_)
        | AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, kind::INTERNAL),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = classify(&self.0);

        let message = if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
            "internal server error".to_string()
        } else {
            match &self.0 {
                // Display strings of these variants carry a category prefix
                AppError::Domain(e) => e.to_string(),
                AppError::Validation(m)
                | AppError::NotFound(m)
                | AppError::Unauthorized(m)
                | AppError::Forbidden(m)
                | AppError::Conflict(m) => m.clone(),
                other => other.to_string(),
            }
        };

        (status, Json(ErrorBody { error, message })).into_response()
    }
}

// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::auth::Permission;
use crate::database::DatabaseError;
use crate::validation::FieldErrors;

pub const PLEASE_LOG_IN: &str = "Please Log In";
pub const NO_PERMISSION: &str = "You don't have permission ! contact your admin";

/// Every way a request can fail, each rendered as a `{"msg": ...}` body
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    // 401 - no identity reached the handler
    #[error("{}", PLEASE_LOG_IN)]
    NotAuthenticated,

    // 401 - bearer token missing or rejected by the middleware
    #[error("{0}")]
    InvalidToken(String),

    // 401 - identity lacks the operation's capability
    #[error("{} (requires {0})", NO_PERMISSION)]
    NotAuthorized(Permission),

    // 403 - payload failed field rules
    #[error("{msg}")]
    ValidationFailed { msg: String, errors: FieldErrors },

    // 400 - body is not a JSON object
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    // 413 - body exceeds the configured limit
    #[error("request body too large")]
    PayloadTooLarge,

    // 404
    #[error("{0}")]
    NotFound(String),

    // 500 - details are logged, never returned
    #[error("store failure: {0}")]
    Store(#[from] DatabaseError),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotAuthenticated => StatusCode::UNAUTHORIZED,
            ApiError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotAuthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::ValidationFailed { .. } => StatusCode::FORBIDDEN,
            ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::NotAuthenticated => PLEASE_LOG_IN,
            ApiError::InvalidToken(msg) => msg,
            ApiError::NotAuthorized(_) => NO_PERMISSION,
            ApiError::ValidationFailed { msg, .. } => msg,
            ApiError::InvalidBody(_) => "invalid request body",
            ApiError::PayloadTooLarge => "request body too large",
            ApiError::NotFound(msg) => msg,
            ApiError::Store(_) => "internal server error",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::ValidationFailed { msg, errors } => json!({
                "msg": msg,
                "errors": errors,
            }),
            ApiError::InvalidBody(detail) => json!({
                "msg": self.message(),
                "detail": detail,
            }),
            _ => json!({ "msg": self.message() }),
        }
    }
}

// Static constructor methods
impl ApiError {
    pub fn validation_failed(msg: impl Into<String>, errors: FieldErrors) -> Self {
        ApiError::ValidationFailed {
            msg: msg.into(),
            errors,
        }
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        ApiError::NotFound(msg.into())
    }

    pub fn invalid_token(msg: impl Into<String>) -> Self {
        ApiError::InvalidToken(msg.into())
    }
}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        if let ApiError::Store(err) = &self {
            // Log the real error but return generic message
            tracing::error!("Store error: {}", err);
        }
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

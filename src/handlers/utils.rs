use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path},
    http::StatusCode,
    Extension, Json,
};
use serde_json::Value;

use crate::auth::{Identity, Permission};
use crate::database::DatabaseError;
use crate::error::ApiError;

/// Step 1: the identity attached by the JWT middleware, if any
pub fn require_identity(identity: Option<Extension<Identity>>) -> Result<Identity, ApiError> {
    identity
        .map(|Extension(identity)| identity)
        .ok_or(ApiError::NotAuthenticated)
}

/// Step 2: the identity must hold the operation's capability
pub fn require_permission(identity: &Identity, permission: Permission) -> Result<(), ApiError> {
    if identity.can(permission) {
        return Ok(());
    }
    tracing::info!("'{}' denied: missing {}", identity.username, permission);
    Err(ApiError::NotAuthorized(permission))
}

/// Path id, `None` when the segment is not an integer
pub fn path_id(path: Result<Path<i64>, PathRejection>) -> Option<i64> {
    path.ok().map(|Path(id)| id)
}

/// JSON body, parsed only after the identity checks have passed
pub fn json_body(payload: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    payload.map(|Json(value)| value).map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge
        } else {
            ApiError::InvalidBody(rejection.body_text())
        }
    })
}

/// Lookup and delete failures of any kind answer with the same not-found message
pub fn collapse_to_not_found(err: DatabaseError, msg: &'static str) -> ApiError {
    match &err {
        DatabaseError::NotFound { entity, id } => tracing::debug!("{} {} not found", entity, id),
        other => tracing::warn!("{} (cause: {})", msg, other),
    }
    ApiError::not_found(msg)
}

use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, State},
    Extension, Json,
};
use serde_json::Value;

use super::utils::{collapse_to_not_found, json_body, path_id, require_identity, require_permission};
use crate::app::AppState;
use crate::auth::{Identity, Permission};
use crate::database::models::{Comment, CommentTarget};
use crate::database::DatabaseError;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::validation::{missing_pk, validate_comment, FieldErrors};

/// POST /api/v1/comments/add
pub async fn add_comment(
    State(state): State<AppState>,
    identity: Option<Extension<Identity>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult {
    let identity = require_identity(identity)?;
    require_permission(&identity, Permission::CommentAdd)?;

    let payload = json_body(payload)?;
    let draft = validate_comment(state.store.as_ref(), &payload, &identity.username)
        .await
        .map_err(|e| e.into_api_error("couldn't create a comment"))?;

    let target = draft.target;
    let comment = state
        .store
        .insert_comment(draft)
        .await
        .map_err(|e| target_conflict(e, target, "couldn't create a comment"))?;

    tracing::info!(
        "Comment {} on {} {} added by {}",
        comment.id,
        comment.target.kind,
        comment.target.id,
        comment.author
    );
    Ok(ApiResponse::created("Comment Added Successfully!"))
}

/// GET /api/v1/comments/all
pub async fn list_comments(
    State(state): State<AppState>,
    identity: Option<Extension<Identity>>,
) -> ApiResult<Vec<Comment>> {
    require_identity(identity)?;

    let comments = state.store.list_comments().await?;
    Ok(ApiResponse::list("list of all comments", "comments", comments))
}

/// DELETE /api/v1/comments/delete/:comment_id
pub async fn delete_comment(
    State(state): State<AppState>,
    identity: Option<Extension<Identity>>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult {
    const NOT_FOUND: &str = "The comment is not found!";

    let identity = require_identity(identity)?;
    require_permission(&identity, Permission::CommentDelete)?;

    let comment_id = path_id(path).ok_or_else(|| ApiError::not_found(NOT_FOUND))?;
    let comment = state
        .store
        .delete_comment(comment_id)
        .await
        .map_err(|e| collapse_to_not_found(e, NOT_FOUND))?;

    tracing::info!("Comment {} deleted by {}", comment.id, identity.username);
    Ok(ApiResponse::ok("the comment was deleted"))
}

// The target can disappear between validation and the write
fn target_conflict(err: DatabaseError, target: CommentTarget, msg: &str) -> ApiError {
    match err {
        DatabaseError::Conflict(_) => {
            let mut errors = FieldErrors::new();
            errors.add("target", missing_pk(target.id));
            ApiError::validation_failed(msg, errors)
        }
        other => other.into(),
    }
}

use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, State},
    Extension, Json,
};
use serde_json::Value;

use super::utils::{collapse_to_not_found, json_body, path_id, require_identity, require_permission};
use crate::app::AppState;
use crate::auth::{Identity, Permission};
use crate::database::models::Place;
use crate::database::DatabaseError;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::validation::{missing_pk, validate_place, FieldErrors};

/// GET /api/v1/places/all
pub async fn list_place(
    State(state): State<AppState>,
    identity: Option<Extension<Identity>>,
) -> ApiResult<Vec<Place>> {
    require_identity(identity)?;

    let places = state.store.list_places().await?;
    Ok(ApiResponse::list("list of all places", "places", places))
}

/// POST /api/v1/places/add
pub async fn add_place(
    State(state): State<AppState>,
    identity: Option<Extension<Identity>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult {
    let identity = require_identity(identity)?;
    require_permission(&identity, Permission::PlaceAdd)?;

    let payload = json_body(payload)?;
    let draft = validate_place(state.store.as_ref(), &payload)
        .await
        .map_err(|e| e.into_api_error("couldn't create place"))?;

    let city = draft.city;
    let place = state
        .store
        .insert_place(draft)
        .await
        .map_err(|e| city_conflict(e, city, "couldn't create place"))?;

    tracing::info!("Place {} '{}' added by {}", place.id, place.name, identity.username);
    Ok(ApiResponse::created("place added successfuly!"))
}

/// PUT /api/v1/places/update/:place_id
pub async fn update_place(
    State(state): State<AppState>,
    identity: Option<Extension<Identity>>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult {
    const NOT_FOUND: &str = "This place does not exist!";

    let identity = require_identity(identity)?;
    require_permission(&identity, Permission::PlaceUpdate)?;

    let place_id = path_id(path).ok_or_else(|| ApiError::not_found(NOT_FOUND))?;
    match state.store.get_place(place_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Err(ApiError::not_found(NOT_FOUND)),
        Err(e) => return Err(collapse_to_not_found(e, NOT_FOUND)),
    }

    let payload = json_body(payload)?;
    let draft = validate_place(state.store.as_ref(), &payload)
        .await
        .map_err(|e| e.into_api_error("couldn't update"))?;

    let city = draft.city;
    let place = state
        .store
        .update_place(place_id, draft)
        .await
        .map_err(|e| match e {
            DatabaseError::NotFound { .. } => ApiError::not_found(NOT_FOUND),
            other => city_conflict(other, city, "couldn't update"),
        })?;

    tracing::info!("Place {} updated by {}", place.id, identity.username);
    Ok(ApiResponse::ok("place updated successfuly!"))
}

/// DELETE /api/v1/places/delete/:place_id
pub async fn delete_place(
    State(state): State<AppState>,
    identity: Option<Extension<Identity>>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult {
    const NOT_FOUND: &str = "place is not found!";

    let identity = require_identity(identity)?;
    require_permission(&identity, Permission::PlaceDelete)?;

    let place_id = path_id(path).ok_or_else(|| ApiError::not_found(NOT_FOUND))?;
    let place = state
        .store
        .delete_place(place_id)
        .await
        .map_err(|e| collapse_to_not_found(e, NOT_FOUND))?;

    tracing::info!("Place {} '{}' deleted by {}", place.id, place.name, identity.username);
    Ok(ApiResponse::ok(format!("{} has been deleted!!", place.name)))
}

// The city can disappear between validation and the write
fn city_conflict(err: DatabaseError, city: i64, msg: &str) -> ApiError {
    match err {
        DatabaseError::Conflict(_) => {
            let mut errors = FieldErrors::new();
            errors.add("city", missing_pk(city));
            ApiError::validation_failed(msg, errors)
        }
        other => other.into(),
    }
}

use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, State},
    Extension, Json,
};
use serde_json::Value;

use super::utils::{collapse_to_not_found, json_body, path_id, require_identity, require_permission};
use crate::app::AppState;
use crate::auth::{Identity, Permission};
use crate::database::models::City;
use crate::database::DatabaseError;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::validation::{city::NAME_TAKEN, validate_city, FieldErrors};

/// POST /api/v1/citys/add
pub async fn add_city(
    State(state): State<AppState>,
    identity: Option<Extension<Identity>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult {
    let identity = require_identity(identity)?;
    require_permission(&identity, Permission::CityAdd)?;

    let payload = json_body(payload)?;
    let draft = validate_city(state.store.as_ref(), &payload, None)
        .await
        .map_err(|e| e.into_api_error("couldn't create city"))?;

    let city = state
        .store
        .insert_city(draft)
        .await
        .map_err(|e| name_conflict(e, "couldn't create city"))?;

    tracing::info!("City {} '{}' created by {}", city.id, city.name, identity.username);
    Ok(ApiResponse::created("city created successfuly!"))
}

/// GET /api/v1/citys/all
pub async fn list_city(
    State(state): State<AppState>,
    identity: Option<Extension<Identity>>,
) -> ApiResult<Vec<City>> {
    require_identity(identity)?;

    let citys = state.store.list_cities().await?;
    Ok(ApiResponse::list("list of all citys", "citys", citys))
}

/// PUT /api/v1/citys/update/:city_id
pub async fn update_city(
    State(state): State<AppState>,
    identity: Option<Extension<Identity>>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult {
    const NOT_FOUND: &str = "This city does not exist!";

    let identity = require_identity(identity)?;
    require_permission(&identity, Permission::CityUpdate)?;

    let city_id = path_id(path).ok_or_else(|| ApiError::not_found(NOT_FOUND))?;
    match state.store.get_city(city_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Err(ApiError::not_found(NOT_FOUND)),
        Err(e) => return Err(collapse_to_not_found(e, NOT_FOUND)),
    }

    let payload = json_body(payload)?;
    let draft = validate_city(state.store.as_ref(), &payload, Some(city_id))
        .await
        .map_err(|e| e.into_api_error("couldn't update"))?;

    let city = state
        .store
        .update_city(city_id, draft)
        .await
        .map_err(|e| match e {
            DatabaseError::NotFound { .. } => ApiError::not_found(NOT_FOUND),
            other => name_conflict(other, "couldn't update"),
        })?;

    tracing::info!("City {} updated by {}", city.id, identity.username);
    Ok(ApiResponse::ok("city updated successfuly!"))
}

/// DELETE /api/v1/citys/delete/:city_id
pub async fn delete_city(
    State(state): State<AppState>,
    identity: Option<Extension<Identity>>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult {
    const NOT_FOUND: &str = "city is not found!";

    let identity = require_identity(identity)?;
    require_permission(&identity, Permission::CityDelete)?;

    let city_id = path_id(path).ok_or_else(|| ApiError::not_found(NOT_FOUND))?;
    let city = state
        .store
        .delete_city(city_id)
        .await
        .map_err(|e| collapse_to_not_found(e, NOT_FOUND))?;

    tracing::info!("City {} '{}' deleted by {}", city.id, city.name, identity.username);
    Ok(ApiResponse::ok(format!("{} city has been deleted!!", city.name)))
}

// A concurrent insert can win the unique index after validation passed
fn name_conflict(err: DatabaseError, msg: &str) -> ApiError {
    match err {
        DatabaseError::Conflict(_) => {
            let mut errors = FieldErrors::new();
            errors.add("name", NAME_TAKEN);
            ApiError::validation_failed(msg, errors)
        }
        other => other.into(),
    }
}

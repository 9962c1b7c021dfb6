use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::auth::{validate_jwt, Identity};
use crate::error::ApiError;

/// JWT authentication middleware that validates tokens and attaches the `Identity`
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let identity = authenticate(&headers, &state.config.security.jwt_secret).map_err(|msg| {
        tracing::debug!("Rejected {} {}: {}", request.method(), request.uri().path(), msg);
        ApiError::invalid_token(msg)
    })?;

    tracing::debug!("Authenticated '{}' ({})", identity.username, identity.user_id);
    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}

/// Resolve the bearer token in `headers` into an identity
pub fn authenticate(headers: &HeaderMap, secret: &str) -> Result<Identity, String> {
    let token = extract_jwt_from_headers(headers)?;
    let claims = validate_jwt(&token, secret).map_err(|e| e.to_string())?;
    Ok(Identity::from(claims))
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        let token = token.trim();
        if token.is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(token.to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{AppConfig, SecurityConfig};
use crate::database::Store;
use crate::handlers;
use crate::middleware::jwt_auth_middleware;

/// Shared by every handler; all mutable state lives in the store
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: AppConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}

/// Full application: public routes, token-protected API, global layers
pub fn app(state: AppState) -> Router {
    let protected = api_routes().route_layer(middleware::from_fn_with_state(
        state.clone(),
        jwt_auth_middleware,
    ));

    let mut router = Router::new()
        // Public
        .route("/", get(handlers::system::root))
        .route("/health", get(handlers::system::health))
        // Protected API
        .nest("/api/v1", protected)
        .layer(DefaultBodyLimit::max(state.config.api.max_request_size_bytes));

    if state.config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    if state.config.security.enable_cors {
        router = router.layer(cors_layer(&state.config.security));
    }

    router.with_state(state)
}

/// Resource routes without the JWT layer; handlers then answer "Please Log In"
pub fn api_routes() -> Router<AppState> {
    use handlers::{city, comment, place};

    Router::new()
        .route("/citys/add", post(city::add_city))
        .route("/citys/all", get(city::list_city))
        .route("/citys/update/:city_id", put(city::update_city))
        .route("/citys/delete/:city_id", delete(city::delete_city))
        .route("/places/add", post(place::add_place))
        .route("/places/all", get(place::list_place))
        .route("/places/update/:place_id", put(place::update_place))
        .route("/places/delete/:place_id", delete(place::delete_place))
        .route("/comments/add", post(comment::add_comment))
        .route("/comments/all", get(comment::list_comments))
        .route("/comments/delete/:comment_id", delete(comment::delete_comment))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if security.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use crate::auth::{generate_jwt, Claims, Permission};
use crate::config::AppConfig;
use crate::database::{MemoryStore, Store};
use crate::{app, AppState};

/// In-process application over a fresh in-memory store
pub struct TestContext {
    pub state: AppState,
    router: Router,
}

impl TestContext {
    pub fn new() -> Self {
        let mut config = AppConfig::development();
        config.api.enable_request_logging = false;
        Self::with_config(config)
    }

    pub fn with_config(config: AppConfig) -> Self {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let state = AppState::new(store, config);
        let router = app(state.clone());
        Self { state, router }
    }

    pub fn store(&self) -> &dyn Store {
        self.state.store.as_ref()
    }

    /// Signed token for `username` holding exactly `permissions`
    pub fn token(&self, username: &str, permissions: &[Permission]) -> String {
        let claims = Claims::new(
            format!("user-{}", username),
            username.to_string(),
            permissions.iter().map(|p| p.as_str().to_string()).collect(),
            1,
        )
        .expect("claims");
        generate_jwt(&claims, &self.state.config.security.jwt_secret).expect("token")
    }

    pub fn admin_token(&self) -> String {
        self.token("admin", &Permission::ALL)
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        send_to(self.router.clone(), method, uri, token, body).await
    }
}

/// Drive any router with one request and decode the JSON reply
pub async fn send_to(
    router: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request");

    let response = router.oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

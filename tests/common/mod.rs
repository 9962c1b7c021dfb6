use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use tourism_api::auth::{generate_jwt, Claims, Permission};
use tourism_api::config::AppConfig;
use tourism_api::database::MemoryStore;
use tourism_api::{app, AppState};

/// Server running on its own port with a fresh in-memory store
pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
    secret: String,
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut config = AppConfig::development();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = port;
        config.security.jwt_secret = "integration-secret".to_string();
        let secret = config.security.jwt_secret.clone();

        let listener = tokio::net::TcpListener::bind(config.bind_addr())
            .await
            .context("failed to bind test port")?;
        let state = AppState::new(Arc::new(MemoryStore::new()), config);
        tokio::spawn(async move {
            let _ = axum::serve(listener, app(state)).await;
        });

        let server = Self {
            base_url,
            client: reqwest::Client::new(),
            secret,
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = tokio::time::Instant::now() + timeout;
        while tokio::time::Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn token(&self, username: &str, permissions: &[Permission]) -> String {
        let claims = Claims::new(
            username.to_string(),
            username.to_string(),
            permissions.iter().map(|p| p.as_str().to_string()).collect(),
            1,
        )
        .expect("failed to build test claims");
        generate_jwt(&claims, &self.secret).expect("failed to sign test token")
    }
}

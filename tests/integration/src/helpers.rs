//! Test helpers for integration tests
//!
//! Provides utilities for spawning test servers and making HTTP requests.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use chat_common::{AppConfig, AppSettings, CorsConfig, Environment, GatewayConfig, JwtConfig};
use chat_core::Identity;
use chat_gateway::server::{bind, run_server};
use chat_gateway::{create_app, create_gateway_state, GatewayState};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::ws::WsClient;

/// Secret shared by test servers and the tokens tests mint
pub const TEST_JWT_SECRET: &str = "integration-test-secret";

/// Test server instance that manages lifecycle
///
/// Shuts the server down when dropped.
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    state: GatewayState,
    shutdown: Option<oneshot::Sender<()>>,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a new test server
    pub async fn start() -> Result<Self> {
        Self::start_with_config(test_config()).await
    }

    /// Start a test server with custom config
    ///
    /// The configured port is ignored; the server binds an ephemeral one.
    pub async fn start_with_config(config: AppConfig) -> Result<Self> {
        let state = create_gateway_state(config);
        let app = create_app(state.clone());

        let listener = bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            let shutdown = async {
                let _ = shutdown_rx.await;
            };
            run_server(app, listener, shutdown).await.ok();
        });

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            addr,
            client,
            state,
            shutdown: Some(shutdown_tx),
            _handle: handle,
        })
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get the gateway URL
    pub fn ws_url(&self) -> String {
        format!("ws://{}/gateway", self.addr)
    }

    /// Open a gateway connection and read its Hello
    pub async fn connect(&self) -> Result<WsClient> {
        WsClient::connect(&self.ws_url()).await
    }

    /// Open a gateway connection and join as `identity`
    pub async fn join(&self, identity: &Identity) -> Result<WsClient> {
        let mut client = self.connect().await?;
        client.join(identity).await?;
        client.recv_event("activeUsers").await?;
        Ok(client)
    }

    /// Mint a token the server accepts
    pub fn token_for(&self, identity: &Identity) -> Result<String> {
        Ok(self.state.jwt().issue_token(identity)?)
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.get(&url).send().await?)
    }

    /// Make a GET request with auth token
    pub async fn get_auth(&self, path: &str, token: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {token}"))
            .send()
            .await?)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

/// Create a test configuration
///
/// Built in code so tests never depend on the environment.
pub fn test_config() -> AppConfig {
    AppConfig {
        app: AppSettings {
            name: "chat-integration".to_string(),
            env: Environment::Development,
        },
        gateway: GatewayConfig::default(),
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            token_expiry: 3600,
        },
        cors: CorsConfig::default(),
    }
}

/// Test configuration with a short heartbeat window
pub fn fast_heartbeat_config(interval_ms: u64, timeout_ms: u64) -> AppConfig {
    let mut config = test_config();
    config.gateway.heartbeat_interval_ms = interval_ms;
    config.gateway.heartbeat_timeout_ms = timeout_ms;
    config
}

/// Test configuration that requires a token on join
pub fn join_token_config() -> AppConfig {
    let mut config = test_config();
    config.gateway.require_join_token = true;
    config
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(response: Response, expected_status: StatusCode) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(response.json().await?)
}

/// Assert response status without parsing body
pub async fn assert_status(response: Response, expected_status: StatusCode) -> Result<()> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(())
}

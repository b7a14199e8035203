//! Gateway server setup
//!
//! Provides the main WebSocket server configuration and routes.

mod handler;
mod state;

pub use handler::gateway_handler;
pub use state::GatewayState;

use crate::connection::ConnectionManager;
use crate::engine::LifecycleController;
use crate::http::{health_check, list_messages};
use axum::{
    http::{HeaderValue, Method},
    routing::get,
    Router,
};
use chat_common::{AppConfig, AppError, JwtService};
use chat_state::RoomState;
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

/// Create the gateway router
pub fn create_router() -> Router<GatewayState> {
    Router::new()
        .route("/gateway", get(gateway_handler))
        .route("/api/messages", get(list_messages))
        .route("/health", get(health_check))
}

/// CORS for the configured browser origins
fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(AllowHeaders::mirror_request())
}

/// Build the complete application
pub fn create_app(state: GatewayState) -> Router {
    let cors = cors_layer(state.config());

    create_router()
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the engine and create `GatewayState`
///
/// Must be called from within a tokio runtime.
pub fn create_gateway_state(config: AppConfig) -> GatewayState {
    let room = RoomState::new_shared();
    let connections = ConnectionManager::new_shared();

    let (engine, _controller) =
        LifecycleController::new(room.clone(), connections.clone()).spawn(config.gateway.command_buffer);

    let jwt = JwtService::new(&config.jwt.secret, config.jwt.token_expiry);

    tracing::info!(
        outbound_buffer = config.gateway.outbound_buffer,
        command_buffer = config.gateway.command_buffer,
        require_join_token = config.gateway.require_join_token,
        "Engine started"
    );

    GatewayState::new(engine, room, connections, jwt, config)
}

/// Bind the listening socket
pub async fn bind(addr: SocketAddr) -> Result<TcpListener, AppError> {
    TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))
}

/// Serve `app` on `listener` until `shutdown` resolves
pub async fn run_server<F>(app: Router, listener: TcpListener, shutdown: F) -> Result<(), AppError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener
        .local_addr()
        .map_err(|e| AppError::Config(format!("Failed to read local address: {e}")))?;

    tracing::info!("Gateway listening on ws://{}/gateway", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(AppError::internal)?;

    tracing::info!("Gateway stopped");
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    tracing::info!("Shutdown signal received");
}

/// Run the complete gateway server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr: SocketAddr = config
        .gateway
        .address()
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid gateway address {}: {e}", config.gateway.address())))?;

    let state = create_gateway_state(config);
    let app = create_app(state);

    let listener = bind(addr).await?;
    run_server(app, listener, shutdown_signal()).await
}

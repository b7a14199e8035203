//! # chat-gateway
//!
//! Realtime session and broadcast engine for a single chat room, served
//! over a WebSocket gateway with a small HTTP surface beside it.

pub mod broadcast;
pub mod connection;
pub mod engine;
pub mod events;
pub mod handlers;
pub mod http;
pub mod protocol;
pub mod server;

pub use engine::{EngineError, EngineHandle, LifecycleController};
pub use server::{create_app, create_gateway_state, run, GatewayState};

//! Individual WebSocket connection
//!
//! The engine owns the lifecycle state; the socket tasks only read it. Once
//! closed, the outbound sender is dropped so the socket's writer drains and exits.

use crate::protocol::GatewayMessage;
use chat_core::ConnectionId;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Lifecycle state of a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    /// Transport open, no identity yet
    Connected,
    /// Joined, identity registered
    Active,
    /// Terminal
    Closed,
}

/// Why an outbound message was not queued
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    #[error("connection closed")]
    Closed,
    #[error("outbound queue full")]
    Full,
}

impl<T> From<mpsc::error::TrySendError<T>> for DeliveryError {
    fn from(err: mpsc::error::TrySendError<T>) -> Self {
        match err {
            mpsc::error::TrySendError::Full(_) => Self::Full,
            mpsc::error::TrySendError::Closed(_) => Self::Closed,
        }
    }
}

/// A single WebSocket connection
pub struct Connection {
    /// Unique connection ID
    id: ConnectionId,

    /// Current lifecycle state
    state: RwLock<ConnectionState>,

    /// Outbound queue; `None` once closed
    sender: RwLock<Option<mpsc::Sender<GatewayMessage>>>,

    /// Last dispatch sequence number handed out
    sequence: AtomicU64,

    /// Set when the outbound queue overflowed
    lagging: AtomicBool,

    /// Last heartbeat received
    last_heartbeat: Mutex<Instant>,

    /// Connection creation time
    created_at: Instant,
}

impl Connection {
    /// Create a new connection in the `Connected` state
    pub fn new(id: ConnectionId, sender: mpsc::Sender<GatewayMessage>) -> Arc<Self> {
        Arc::new(Self {
            id,
            state: RwLock::new(ConnectionState::Connected),
            sender: RwLock::new(Some(sender)),
            sequence: AtomicU64::new(0),
            lagging: AtomicBool::new(false),
            last_heartbeat: Mutex::new(Instant::now()),
            created_at: Instant::now(),
        })
    }

    /// Get the connection ID
    pub fn id(&self) -> &ConnectionId {
        &self.id
    }

    /// Get the current state
    pub fn state(&self) -> ConnectionState {
        *self.state.read()
    }

    /// Set the lifecycle state
    pub(crate) fn set_state(&self, state: ConnectionState) {
        *self.state.write() = state;
    }

    /// Queue a dispatch stamped with this connection's next sequence number
    ///
    /// A slot is reserved before the number is taken, so sequence numbers seen
    /// by the client have no gaps.
    pub fn dispatch(&self, event_type: &str, payload: &Value) -> Result<u64, DeliveryError> {
        let guard = self.sender.read();
        let sender = guard.as_ref().ok_or(DeliveryError::Closed)?;
        let permit = sender.try_reserve()?;

        let seq = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        permit.send(GatewayMessage::dispatch(event_type, seq, payload.clone()));
        Ok(seq)
    }

    /// Queue an unsequenced message (errors, heartbeat ACKs)
    pub fn push(&self, message: GatewayMessage) -> Result<(), DeliveryError> {
        let guard = self.sender.read();
        let sender = guard.as_ref().ok_or(DeliveryError::Closed)?;
        sender.try_send(message)?;
        Ok(())
    }

    /// Last sequence number handed out
    pub fn current_sequence(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }

    /// Mark the connection closed and drop its outbound sender
    pub(crate) fn close(&self) {
        self.set_state(ConnectionState::Closed);
        self.sender.write().take();
    }

    /// Check if the outbound queue is gone
    pub fn is_closed(&self) -> bool {
        self.sender
            .read()
            .as_ref()
            .map_or(true, mpsc::Sender::is_closed)
    }

    /// Flag the connection as unable to keep up
    pub(crate) fn mark_lagging(&self) -> bool {
        !self.lagging.swap(true, Ordering::SeqCst)
    }

    /// Check the lagging flag
    pub fn is_lagging(&self) -> bool {
        self.lagging.load(Ordering::SeqCst)
    }

    /// Record a heartbeat received
    pub fn record_heartbeat(&self) {
        *self.last_heartbeat.lock() = Instant::now();
    }

    /// Get time since last heartbeat
    pub fn time_since_heartbeat(&self) -> Duration {
        self.last_heartbeat.lock().elapsed()
    }

    /// Get connection age
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("state", &self.state())
            .field("sequence", &self.current_sequence())
            .field("lagging", &self.is_lagging())
            .finish_non_exhaustive()
    }
}

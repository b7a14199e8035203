//! Gateway message format
//!
//! Defines the envelope shared by every WebSocket frame.

use super::{CloseCode, ErrorPayload, HelloPayload, JoinPayload, OpCode, SendMessagePayload, TypingPayload};
use chat_core::DomainError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Gateway message format
///
/// All messages sent over the WebSocket connection follow this format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayMessage {
    /// Operation code
    pub op: OpCode,

    /// Event type (only for op=0 Dispatch)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,

    /// Sequence number (only for op=0 Dispatch)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s: Option<u64>,

    /// Event data payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d: Option<Value>,
}

impl GatewayMessage {
    // === Server Messages ===

    /// Create a Dispatch message (op=0)
    #[must_use]
    pub fn dispatch(event_type: impl Into<String>, sequence: u64, data: Value) -> Self {
        Self {
            op: OpCode::Dispatch,
            t: Some(event_type.into()),
            s: Some(sequence),
            d: Some(data),
        }
    }

    /// Create a Hello message (op=10)
    #[must_use]
    pub fn hello(payload: HelloPayload) -> Self {
        Self {
            op: OpCode::Hello,
            t: None,
            s: None,
            d: serde_json::to_value(payload).ok(),
        }
    }

    /// Create a Heartbeat ACK message (op=11)
    #[must_use]
    pub fn heartbeat_ack() -> Self {
        Self {
            op: OpCode::HeartbeatAck,
            t: None,
            s: None,
            d: None,
        }
    }

    /// Create an Error message (op=8) for a rejected request
    #[must_use]
    pub fn error(err: &DomainError) -> Self {
        Self {
            op: OpCode::Error,
            t: None,
            s: None,
            d: serde_json::to_value(ErrorPayload::from(err)).ok(),
        }
    }

    // === Parsing Client Messages ===

    /// Try to parse as a Join payload (op=2)
    pub fn as_join(&self) -> Option<JoinPayload> {
        if self.op != OpCode::Join {
            return None;
        }
        self.d.as_ref().and_then(|d| serde_json::from_value(d.clone()).ok())
    }

    /// Try to parse as a SendMessage payload (op=3)
    pub fn as_send_message(&self) -> Option<SendMessagePayload> {
        if self.op != OpCode::SendMessage {
            return None;
        }
        self.payload_or_default()
    }

    /// Try to parse as a Typing / StopTyping payload (op=4, op=5)
    pub fn as_typing(&self) -> Option<TypingPayload> {
        if !matches!(self.op, OpCode::Typing | OpCode::StopTyping) {
            return None;
        }
        self.payload_or_default()
    }

    /// Try to parse the heartbeat sequence number (op=1)
    pub fn as_heartbeat_seq(&self) -> Option<Option<u64>> {
        if self.op != OpCode::Heartbeat {
            return None;
        }
        Some(self.d.as_ref().and_then(Value::as_u64))
    }

    /// Absent or null `d` reads as the default payload
    fn payload_or_default<T>(&self) -> Option<T>
    where
        T: DeserializeOwned + Default,
    {
        match &self.d {
            None | Some(Value::Null) => Some(T::default()),
            Some(d) => serde_json::from_value(d.clone()).ok(),
        }
    }

    // === Utilities ===

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Code and reason for a close frame
    #[must_use]
    pub fn close_frame(code: CloseCode) -> (u16, String) {
        (code.as_u16(), code.description().to_string())
    }
}

impl std::fmt::Display for GatewayMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(t) = &self.t {
            write!(f, "GatewayMessage(op={}, t={}", self.op, t)?;
            if let Some(s) = self.s {
                write!(f, ", s={s}")?;
            }
            write!(f, ")")
        } else {
            write!(f, "GatewayMessage(op={})", self.op)
        }
    }
}

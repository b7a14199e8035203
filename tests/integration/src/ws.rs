//! Gateway test client
//!
//! Thin wrapper over a tokio-tungstenite socket that speaks the gateway's
//! JSON envelope and reads with a timeout so a missing frame fails the test
//! instead of hanging it.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use chat_core::Identity;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

/// How long to wait for an expected frame
const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// One server frame
#[derive(Debug, Clone, Deserialize)]
pub struct Frame {
    pub op: u8,
    #[serde(default)]
    pub t: Option<String>,
    #[serde(default)]
    pub s: Option<u64>,
    #[serde(default)]
    pub d: Value,
}

impl Frame {
    /// Check if this is a dispatch of the named event
    pub fn is_event(&self, name: &str) -> bool {
        self.op == 0 && self.t.as_deref() == Some(name)
    }
}

/// What the next read produced
enum Incoming {
    Frame(Frame),
    Closed(Option<u16>),
}

/// WebSocket client for the gateway
pub struct WsClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    /// Hello payload received on connect
    pub hello: Value,
}

impl WsClient {
    /// Connect and wait for Hello
    pub async fn connect(url: &str) -> Result<Self> {
        let (stream, _) = connect_async(url).await.context("WebSocket connect failed")?;
        let mut client = Self {
            stream,
            hello: Value::Null,
        };

        let hello = client.recv().await?;
        if hello.op != 10 {
            bail!("Expected Hello, got {hello:?}");
        }
        client.hello = hello.d;
        Ok(client)
    }

    /// Send a raw text frame
    pub async fn send_text(&mut self, text: impl Into<String>) -> Result<()> {
        self.stream.send(Message::Text(text.into())).await?;
        Ok(())
    }

    /// Send an envelope with the given op and payload
    pub async fn send_op(&mut self, op: u8, d: Value) -> Result<()> {
        self.send_text(json!({ "op": op, "d": d }).to_string()).await
    }

    /// Join as `identity` without a token
    pub async fn join(&mut self, identity: &Identity) -> Result<()> {
        self.send_op(
            2,
            json!({ "userId": identity.user_id, "username": identity.username }),
        )
        .await
    }

    /// Join as `identity` presenting `token`
    pub async fn join_with_token(&mut self, identity: &Identity, token: &str) -> Result<()> {
        self.send_op(
            2,
            json!({ "userId": identity.user_id, "username": identity.username, "token": token }),
        )
        .await
    }

    /// Send a chat message
    pub async fn send_message(&mut self, content: &str) -> Result<()> {
        self.send_op(3, json!({ "content": content })).await
    }

    /// Signal typing
    pub async fn typing(&mut self, identity: &Identity) -> Result<()> {
        self.send_op(4, json!({ "id": identity.user_id, "username": identity.username }))
            .await
    }

    /// Signal typing stopped
    pub async fn stop_typing(&mut self, identity: &Identity) -> Result<()> {
        self.send_op(5, json!({ "id": identity.user_id, "username": identity.username }))
            .await
    }

    /// Send a heartbeat carrying the last seen sequence
    pub async fn heartbeat(&mut self, last_seq: Option<u64>) -> Result<()> {
        self.send_op(1, json!(last_seq)).await
    }

    /// Next frame, failing on close or timeout
    pub async fn recv(&mut self) -> Result<Frame> {
        match self.next_incoming(RECV_TIMEOUT).await? {
            Some(Incoming::Frame(frame)) => Ok(frame),
            Some(Incoming::Closed(code)) => bail!("Connection closed with code {code:?}"),
            None => bail!("Timed out waiting for a frame"),
        }
    }

    /// Skip frames until a dispatch of `name`, returning its payload
    pub async fn recv_event(&mut self, name: &str) -> Result<Value> {
        Ok(self.recv_event_frame(name).await?.d)
    }

    /// Skip frames until a dispatch of `name`
    pub async fn recv_event_frame(&mut self, name: &str) -> Result<Frame> {
        loop {
            let frame = self.recv().await?;
            if frame.is_event(name) {
                return Ok(frame);
            }
        }
    }

    /// Skip frames until an Error (op 8), returning its code
    pub async fn recv_error(&mut self) -> Result<String> {
        loop {
            let frame = self.recv().await?;
            if frame.op == 8 {
                return frame.d["code"]
                    .as_str()
                    .map(ToString::to_string)
                    .context("Error frame without code");
            }
        }
    }

    /// Skip frames until the server closes, returning the close code
    pub async fn expect_close(&mut self) -> Result<Option<u16>> {
        loop {
            match self.next_incoming(RECV_TIMEOUT).await? {
                Some(Incoming::Frame(_)) => continue,
                Some(Incoming::Closed(code)) => return Ok(code),
                None => bail!("Timed out waiting for close"),
            }
        }
    }

    /// Fail if any frame arrives within `wait`
    pub async fn expect_silence(&mut self, wait: Duration) -> Result<()> {
        match self.next_incoming(wait).await? {
            None => Ok(()),
            Some(Incoming::Frame(frame)) => bail!("Expected no frames, got {frame:?}"),
            Some(Incoming::Closed(code)) => bail!("Expected no frames, connection closed with {code:?}"),
        }
    }

    /// Close the socket from the client side
    pub async fn close(mut self) -> Result<()> {
        self.stream.close(None).await?;
        Ok(())
    }

    async fn next_incoming(&mut self, wait: Duration) -> Result<Option<Incoming>> {
        let deadline = tokio::time::Instant::now() + wait;

        loop {
            let next = match tokio::time::timeout_at(deadline, self.stream.next()).await {
                Ok(next) => next,
                Err(_) => return Ok(None),
            };

            match next {
                Some(Ok(Message::Text(text))) => {
                    let frame = serde_json::from_str(&text).with_context(|| format!("Bad frame: {text}"))?;
                    return Ok(Some(Incoming::Frame(frame)));
                }
                Some(Ok(Message::Close(frame))) => {
                    return Ok(Some(Incoming::Closed(frame.map(|f| u16::from(f.code)))));
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => bail!("WebSocket error: {e}"),
                None => return Ok(Some(Incoming::Closed(None))),
            }
        }
    }
}

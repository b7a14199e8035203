//! Gateway Integration Tests
//!
//! Each test starts its own server on an ephemeral port; nothing external is
//! required.
//!
//! Run with: cargo test -p integration-tests --test gateway_tests

use std::time::Duration;

use integration_tests::{
    fast_heartbeat_config, identity, join_token_config, MessageResponse, TestServer, TypingResponse,
    UserResponse, WsClient,
};
use serde_json::{json, Value};

const QUIET: Duration = Duration::from_millis(200);

fn users(payload: Value) -> Vec<UserResponse> {
    serde_json::from_value(payload).unwrap()
}

// ============================================================================
// Connection Tests
// ============================================================================

#[tokio::test]
async fn test_hello_advertises_heartbeat_interval() {
    let server = TestServer::start().await.unwrap();
    let client = server.connect().await.unwrap();

    assert_eq!(client.hello["heartbeat_interval"], 45_000);
}

#[tokio::test]
async fn test_heartbeat_is_acked() {
    let server = TestServer::start().await.unwrap();
    let mut client = server.connect().await.unwrap();

    client.heartbeat(None).await.unwrap();
    let frame = client.recv().await.unwrap();
    assert_eq!(frame.op, 11);
    assert_eq!(frame.s, None);
}

#[tokio::test]
async fn test_missed_heartbeats_close_the_session() {
    let server = TestServer::start_with_config(fast_heartbeat_config(50, 150)).await.unwrap();
    let alice = identity("alice");
    let bob = identity("bob");

    let mut a = server.join(&alice).await.unwrap();
    let mut b = server.join(&bob).await.unwrap();

    // Keep alice alive while bob stays silent
    let keepalive = tokio::spawn(async move {
        let left = loop {
            a.heartbeat(None).await.unwrap();
            tokio::time::sleep(Duration::from_millis(40)).await;
            let Ok(frame) = a.recv().await else { break None };
            if frame.is_event("userLeft") {
                break Some(frame.d);
            }
        };
        (a, left)
    });

    assert_eq!(b.expect_close().await.unwrap(), Some(4009));

    let (_a, left) = keepalive.await.unwrap();
    let left: UserResponse = serde_json::from_value(left.unwrap()).unwrap();
    assert_eq!(left.username, "bob");
}

// ============================================================================
// Presence Tests
// ============================================================================

#[tokio::test]
async fn test_join_broadcasts_presence() {
    let server = TestServer::start().await.unwrap();
    let alice = identity("alice");
    let bob = identity("bob");

    let mut a = server.join(&alice).await.unwrap();

    let mut b = server.connect().await.unwrap();
    b.join(&bob).await.unwrap();

    let joined: UserResponse = serde_json::from_value(a.recv_event("userJoined").await.unwrap()).unwrap();
    assert_eq!(joined.username, "bob");
    assert_eq!(joined.user_id, bob.user_id.to_string());

    let snapshot = users(a.recv_event("activeUsers").await.unwrap());
    let names: Vec<_> = snapshot.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, vec!["alice", "bob"]);

    // The joiner gets the snapshot but not its own userJoined
    let first = b.recv().await.unwrap();
    assert!(first.is_event("activeUsers"), "unexpected frame {first:?}");
    assert_eq!(users(first.d).len(), 2);
}

#[tokio::test]
async fn test_chat_scenario() {
    let server = TestServer::start().await.unwrap();
    let alice = identity("alice");
    let bob = identity("bob");

    let mut a = server.join(&alice).await.unwrap();
    let mut b = server.join(&bob).await.unwrap();
    a.recv_event("activeUsers").await.unwrap();

    a.send_message("hi").await.unwrap();

    for client in [&mut a, &mut b] {
        let message: MessageResponse =
            serde_json::from_value(client.recv_event("newMessage").await.unwrap()).unwrap();
        assert_eq!(message.id, 1);
        assert_eq!(message.content, "hi");
        assert_eq!(message.username, "alice");
        assert_eq!(message.sender_id, alice.user_id.to_string());
    }

    b.close().await.unwrap();

    let left: UserResponse = serde_json::from_value(a.recv_event("userLeft").await.unwrap()).unwrap();
    assert_eq!(left.username, "bob");

    let snapshot = users(a.recv_event("activeUsers").await.unwrap());
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].username, "alice");
}

#[tokio::test]
async fn test_dispatch_sequence_starts_at_one() {
    let server = TestServer::start().await.unwrap();
    let mut client = server.connect().await.unwrap();

    client.join(&identity("alice")).await.unwrap();
    client.send_message("one").await.unwrap();
    client.send_message("two").await.unwrap();

    let mut seqs = vec![];
    for _ in 0..3 {
        seqs.push(client.recv().await.unwrap().s.unwrap());
    }
    assert_eq!(seqs, vec![1, 2, 3]);
}

// ============================================================================
// Rejection Tests
// ============================================================================

#[tokio::test]
async fn test_message_before_join_is_rejected() {
    let server = TestServer::start().await.unwrap();
    let mut a = server.join(&identity("alice")).await.unwrap();
    let mut stranger = server.connect().await.unwrap();

    stranger.send_message("hello?").await.unwrap();
    assert_eq!(stranger.recv_error().await.unwrap(), "NOT_JOINED");

    a.expect_silence(QUIET).await.unwrap();

    // Still usable after the rejection
    stranger.heartbeat(None).await.unwrap();
    assert_eq!(stranger.recv().await.unwrap().op, 11);
}

#[tokio::test]
async fn test_empty_message_is_rejected() {
    let server = TestServer::start().await.unwrap();
    let alice = identity("alice");
    let mut a = server.join(&alice).await.unwrap();
    let mut b = server.join(&identity("bob")).await.unwrap();
    a.recv_event("activeUsers").await.unwrap();

    a.send_message("   ").await.unwrap();
    assert_eq!(a.recv_error().await.unwrap(), "INVALID_MESSAGE");

    a.send_op(3, json!({})).await.unwrap();
    assert_eq!(a.recv_error().await.unwrap(), "INVALID_MESSAGE");

    b.expect_silence(QUIET).await.unwrap();

    let token = server.token_for(&alice).unwrap();
    let response = server.get_auth("/api/messages", &token).await.unwrap();
    let history: Vec<MessageResponse> = response.json().await.unwrap();
    assert!(history.is_empty());
}

#[tokio::test]
async fn test_server_only_op_closes_with_unknown_opcode() {
    let server = TestServer::start().await.unwrap();
    let mut client = server.connect().await.unwrap();

    client.send_op(11, Value::Null).await.unwrap();
    assert_eq!(client.expect_close().await.unwrap(), Some(4001));
}

#[tokio::test]
async fn test_undecodable_frames_close_with_decode_error() {
    let server = TestServer::start().await.unwrap();

    let mut garbage = server.connect().await.unwrap();
    garbage.send_text("{not json").await.unwrap();
    assert_eq!(garbage.expect_close().await.unwrap(), Some(4002));

    let mut unknown_op = server.connect().await.unwrap();
    unknown_op.send_op(99, Value::Null).await.unwrap();
    assert_eq!(unknown_op.expect_close().await.unwrap(), Some(4002));

    let mut bad_join = server.connect().await.unwrap();
    bad_join.send_op(2, json!({ "username": 7 })).await.unwrap();
    assert_eq!(bad_join.expect_close().await.unwrap(), Some(4002));
}

// ============================================================================
// Typing Tests
// ============================================================================

#[tokio::test]
async fn test_typing_is_relayed_to_others() {
    let server = TestServer::start().await.unwrap();
    let alice = identity("alice");
    let mut a = server.join(&alice).await.unwrap();
    let mut b = server.join(&identity("bob")).await.unwrap();
    a.recv_event("activeUsers").await.unwrap();

    a.typing(&alice).await.unwrap();
    let typing: TypingResponse = serde_json::from_value(b.recv_event("userTyping").await.unwrap()).unwrap();
    assert_eq!(typing.username, "alice");
    assert_eq!(typing.id, alice.user_id.to_string());

    a.stop_typing(&alice).await.unwrap();
    let stopped: TypingResponse =
        serde_json::from_value(b.recv_event("userStoppedTyping").await.unwrap()).unwrap();
    assert_eq!(stopped, typing);

    a.expect_silence(QUIET).await.unwrap();
}

#[tokio::test]
async fn test_disconnect_while_typing_clears_indicator() {
    let server = TestServer::start().await.unwrap();
    let alice = identity("alice");
    let mut a = server.join(&alice).await.unwrap();
    let mut b = server.join(&identity("bob")).await.unwrap();
    a.recv_event("activeUsers").await.unwrap();

    a.typing(&alice).await.unwrap();
    b.recv_event("userTyping").await.unwrap();

    a.close().await.unwrap();

    let next = b.recv().await.unwrap();
    assert!(next.is_event("userStoppedTyping"), "unexpected frame {next:?}");
    assert!(b.recv().await.unwrap().is_event("userLeft"));
    assert!(b.recv().await.unwrap().is_event("activeUsers"));
}

// ============================================================================
// Join Token Tests
// ============================================================================

#[tokio::test]
async fn test_join_token_required() {
    let server = TestServer::start_with_config(join_token_config()).await.unwrap();
    let alice = identity("alice");

    let mut missing = server.connect().await.unwrap();
    missing.join(&alice).await.unwrap();
    assert_eq!(missing.expect_close().await.unwrap(), Some(4004));

    let token = server.token_for(&identity("mallory")).unwrap();
    let mut mismatched = server.connect().await.unwrap();
    mismatched.join_with_token(&alice, &token).await.unwrap();
    assert_eq!(mismatched.expect_close().await.unwrap(), Some(4004));

    let token = server.token_for(&alice).unwrap();
    let mut ok = server.connect().await.unwrap();
    ok.join_with_token(&alice, &format!("Bearer {token}")).await.unwrap();
    let snapshot = users(ok.recv_event("activeUsers").await.unwrap());
    assert_eq!(snapshot[0].username, "alice");
}

// ============================================================================
// HTTP Tests
// ============================================================================

#[tokio::test]
async fn test_history_requires_authorization() {
    let server = TestServer::start().await.unwrap();

    let response = server.get("/api/messages").await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);
    let body: integration_tests::ErrorBody = response.json().await.unwrap();
    assert_eq!(body.error.code, "MISSING_AUTHORIZATION");

    let response = server.get_auth("/api/messages", "garbage").await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);
    let body: integration_tests::ErrorBody = response.json().await.unwrap();
    assert_eq!(body.error.code, "INVALID_TOKEN");
}

#[tokio::test]
async fn test_history_returns_messages_in_order() {
    let server = TestServer::start().await.unwrap();
    let alice = identity("alice");
    let mut a = server.join(&alice).await.unwrap();

    for content in ["first", "second", "third"] {
        a.send_message(content).await.unwrap();
        a.recv_event("newMessage").await.unwrap();
    }

    let token = server.token_for(&alice).unwrap();
    let response = server.get_auth("/api/messages", &token).await.unwrap();
    let history: Vec<MessageResponse> =
        integration_tests::assert_json(response, reqwest::StatusCode::OK).await.unwrap();

    let contents: Vec<_> = history.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["first", "second", "third"]);
    let ids: Vec<_> = history.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert!(!history[0].timestamp.is_empty());
}

#[tokio::test]
async fn test_health_reports_counters() {
    let server = TestServer::start().await.unwrap();
    let mut a = server.join(&identity("alice")).await.unwrap();
    let _idle: WsClient = server.connect().await.unwrap();

    a.send_message("hi").await.unwrap();
    a.recv_event("newMessage").await.unwrap();

    let response = server.get("/health").await.unwrap();
    let health: integration_tests::HealthResponse =
        integration_tests::assert_json(response, reqwest::StatusCode::OK).await.unwrap();

    assert_eq!(health.status, "ok");
    assert_eq!(health.connections, 2);
    assert_eq!(health.online, 1);
    assert_eq!(health.messages, 1);
}

//! Integration tests for the IPC session client against an in-memory peer.

use tokio::io::AsyncWriteExt;

use claude_presence::ipc::codec::{encode, read_frame, Opcode};
use claude_presence::ipc::{ClientState, IpcClient};
use claude_presence::models::activity::Activity;
use claude_presence::AppError;

use super::test_helpers::{read_command, ready_client};

#[tokio::test]
async fn handshake_sends_version_and_client_id() {
    let (local, mut peer) = tokio::io::duplex(4096);
    peer.write_all(&encode(Opcode::Frame, b"{}").expect("encode"))
        .await
        .expect("write ack");

    let mut client = IpcClient::new("987654321");
    client
        .connect_channel(Box::new(local))
        .await
        .expect("handshake succeeds");

    let frame = read_frame(&mut peer).await.expect("handshake frame");
    let json: serde_json::Value = serde_json::from_slice(&frame.payload).expect("json");

    assert_eq!(frame.opcode, 0);
    assert_eq!(json, serde_json::json!({ "v": 1, "client_id": "987654321" }));
    assert_eq!(client.state(), ClientState::Ready);
}

#[tokio::test]
async fn publish_sends_set_activity_command() {
    let (mut client, mut peer) = ready_client().await;
    let activity = Activity::new()
        .details("Working on: app (main)")
        .state("Opus 4.5 | 1.0K tokens | $0.0150");

    client.publish(&activity).await.expect("publish");
    let (frame, json) = read_command(&mut peer).await;

    assert_eq!(frame.opcode, 1);
    assert_eq!(json["cmd"], "SET_ACTIVITY");
    assert_eq!(json["args"]["pid"], std::process::id());
    assert_eq!(
        json["args"]["activity"],
        serde_json::json!({
            "details": "Working on: app (main)",
            "state": "Opus 4.5 | 1.0K tokens | $0.0150",
        })
    );
    assert!(
        json["nonce"].as_str().is_some_and(|n| !n.is_empty()),
        "nonce must be a non-empty string"
    );
}

#[tokio::test]
async fn publish_does_not_wait_for_a_reply() {
    let (mut client, mut peer) = ready_client().await;

    // The peer never answers; both publishes must still complete.
    client.publish(&Activity::new().details("one")).await.expect("first");
    client.publish(&Activity::new().details("two")).await.expect("second");

    let (_, first) = read_command(&mut peer).await;
    let (_, second) = read_command(&mut peer).await;
    assert_eq!(first["args"]["activity"]["details"], "one");
    assert_eq!(second["args"]["activity"]["details"], "two");
}

#[tokio::test]
async fn publish_before_connect_is_not_connected() {
    let mut client = IpcClient::new("1");

    let err = client
        .publish(&Activity::new().details("x"))
        .await
        .expect_err("must fail");

    assert!(matches!(err, AppError::NotConnected));
    assert_eq!(client.state(), ClientState::Disconnected);
}

#[tokio::test]
async fn publish_after_close_is_not_connected() {
    let (mut client, _peer) = ready_client().await;
    client.close().await;

    let err = client
        .publish(&Activity::new().details("x"))
        .await
        .expect_err("must fail");

    assert!(matches!(err, AppError::NotConnected));
}

#[tokio::test]
async fn close_is_idempotent_from_any_state() {
    let mut fresh = IpcClient::new("1");
    fresh.close().await;
    fresh.close().await;
    assert_eq!(fresh.state(), ClientState::Closed);

    let (mut client, mut peer) = ready_client().await;
    client.close().await;
    client.close().await;
    assert_eq!(client.state(), ClientState::Closed);

    // The peer observes end of stream after close.
    let err = read_frame(&mut peer).await.expect_err("eof");
    assert!(matches!(err, AppError::Frame(_)));
}

#[tokio::test]
async fn peer_hanging_up_before_ack_fails_handshake() {
    let (local, mut peer) = tokio::io::duplex(4096);
    let mut client = IpcClient::new("1");

    let connect = tokio::spawn(async move {
        let result = client.connect_channel(Box::new(local)).await;
        (client, result)
    });

    // Consume the handshake, then hang up without acknowledging.
    read_frame(&mut peer).await.expect("handshake frame");
    drop(peer);

    let (client, result) = connect.await.expect("join");
    let err = result.expect_err("handshake must fail");
    assert!(matches!(err, AppError::Handshake(_)), "got {err:?}");
    assert_eq!(client.state(), ClientState::Closed);
}

#[tokio::test]
async fn malformed_ack_header_fails_handshake() {
    let (local, mut peer) = tokio::io::duplex(4096);
    // Announces a payload far larger than the frame limit.
    let mut bogus = Vec::new();
    bogus.extend_from_slice(&1_u32.to_le_bytes());
    bogus.extend_from_slice(&u32::MAX.to_le_bytes());
    peer.write_all(&bogus).await.expect("write bogus ack");

    let mut client = IpcClient::new("1");
    let err = client
        .connect_channel(Box::new(local))
        .await
        .expect_err("must fail");

    assert!(matches!(err, AppError::Handshake(_)));
    assert_eq!(client.state(), ClientState::Closed);
}

#[tokio::test]
async fn connecting_twice_is_rejected() {
    let (mut client, _peer) = ready_client().await;
    let (other, _other_peer) = tokio::io::duplex(64);

    let err = client
        .connect_channel(Box::new(other))
        .await
        .expect_err("second connect must fail");

    assert!(matches!(err, AppError::Handshake(_)));
    assert_eq!(client.state(), ClientState::Ready, "existing channel is kept");
}

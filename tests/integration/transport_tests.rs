//! End-to-end endpoint resolution against real Unix-domain listeners.
#![cfg(unix)]

use std::path::Path;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::UnixListener;

use claude_presence::ipc::codec::{encode, read_frame, Opcode};
use claude_presence::ipc::{ClientState, IpcClient, Platform, TransportResolver};
use claude_presence::AppError;

fn resolver_for(dir: &Path) -> TransportResolver {
    TransportResolver::new(Platform::SocketFile {
        dirs: vec![dir.to_path_buf()],
    })
}

#[tokio::test]
async fn no_endpoint_is_transport_not_found() {
    let temp = tempfile::tempdir().expect("tempdir");

    let result = resolver_for(temp.path()).resolve_and_connect().await;

    assert!(matches!(result, Err(AppError::TransportNotFound(_))));
}

#[tokio::test]
async fn lowest_live_index_wins() {
    let temp = tempfile::tempdir().expect("tempdir");
    let low = UnixListener::bind(temp.path().join("discord-ipc-1")).expect("bind 1");
    let _high = UnixListener::bind(temp.path().join("discord-ipc-4")).expect("bind 4");

    let _channel = resolver_for(temp.path())
        .resolve_and_connect()
        .await
        .expect("endpoint found");

    tokio::time::timeout(Duration::from_secs(5), low.accept())
        .await
        .expect("index 1 must receive the connection")
        .expect("accept");
}

#[tokio::test]
async fn stale_socket_file_is_skipped() {
    let temp = tempfile::tempdir().expect("tempdir");
    // A socket file whose listener is gone refuses connections.
    drop(UnixListener::bind(temp.path().join("discord-ipc-0")).expect("bind 0"));
    let live = UnixListener::bind(temp.path().join("discord-ipc-2")).expect("bind 2");

    let _channel = resolver_for(temp.path())
        .resolve_and_connect()
        .await
        .expect("endpoint found");

    tokio::time::timeout(Duration::from_secs(5), live.accept())
        .await
        .expect("index 2 must receive the connection")
        .expect("accept");
}

#[tokio::test]
async fn sandboxed_endpoint_is_found() {
    let temp = tempfile::tempdir().expect("tempdir");
    let snap_dir = temp.path().join("snap.discord");
    std::fs::create_dir_all(&snap_dir).expect("snap dir");
    let listener = UnixListener::bind(snap_dir.join("discord-ipc-0")).expect("bind");

    let _channel = resolver_for(temp.path())
        .resolve_and_connect()
        .await
        .expect("endpoint found");

    tokio::time::timeout(Duration::from_secs(5), listener.accept())
        .await
        .expect("sandboxed endpoint must receive the connection")
        .expect("accept");
}

#[tokio::test]
async fn client_connects_and_publishes_over_unix_socket() {
    let temp = tempfile::tempdir().expect("tempdir");
    let listener = UnixListener::bind(temp.path().join("discord-ipc-0")).expect("bind");

    let peer = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.expect("accept");
        let handshake = read_frame(&mut stream).await.expect("handshake");
        stream
            .write_all(&encode(Opcode::Frame, b"{\"evt\":\"READY\"}").expect("encode"))
            .await
            .expect("ack");
        let command = read_frame(&mut stream).await.expect("command");
        (handshake, command)
    });

    let mut client = IpcClient::new("42");
    client
        .connect(&resolver_for(temp.path()))
        .await
        .expect("connect");
    assert_eq!(client.state(), ClientState::Ready);

    client
        .publish(&claude_presence::models::activity::Activity::new().details("hello"))
        .await
        .expect("publish");

    let (handshake, command) = peer.await.expect("join");
    assert_eq!(handshake.opcode, 0);
    assert_eq!(command.opcode, 1);
    let json: serde_json::Value = serde_json::from_slice(&command.payload).expect("json");
    assert_eq!(json["args"]["activity"]["details"], "hello");

    client.close().await;
}

//! Unit tests for the Discord IPC frame codec.
//!
//! Covers:
//! - header layout and length field
//! - two-read frame decoding from a byte stream
//! - short header and short payload reads

use claude_presence::ipc::codec::{
    encode, read_frame, write_frame, Opcode, HEADER_LEN, MAX_PAYLOAD_BYTES,
};
use claude_presence::AppError;

// ── Encoding ─────────────────────────────────────────────────────────────────

/// The length field always equals the payload length and the payload
/// follows the header unchanged.
#[test]
fn encoded_length_field_matches_payload() {
    let payload = br#"{"v":1,"client_id":"123"}"#;
    let bytes = encode(Opcode::Handshake, payload).expect("encode");

    assert_eq!(bytes.len(), HEADER_LEN + payload.len());
    assert_eq!(&bytes[0..4], &0_u32.to_le_bytes(), "opcode must be 0");
    let length = u32::from_le_bytes(bytes[4..8].try_into().expect("4 bytes"));
    assert_eq!(length as usize, payload.len());
    assert_eq!(&bytes[HEADER_LEN..], payload);
}

/// An empty payload still produces a full header.
#[test]
fn empty_payload_encodes_header_only() {
    let bytes = encode(Opcode::Frame, b"").expect("encode");
    assert_eq!(&bytes[..], &[1, 0, 0, 0, 0, 0, 0, 0]);
}

// ── Stream decoding ──────────────────────────────────────────────────────────

/// `read_frame` recovers the payload written by `write_frame`.
#[tokio::test]
async fn read_frame_recovers_written_payload() {
    let (mut writer, mut reader) = tokio::io::duplex(1024);
    write_frame(&mut writer, Opcode::Frame, b"{\"cmd\":\"SET_ACTIVITY\"}")
        .await
        .expect("write");

    let frame = read_frame(&mut reader).await.expect("read");

    assert_eq!(frame.opcode, 1);
    assert_eq!(&frame.payload[..], b"{\"cmd\":\"SET_ACTIVITY\"}");
}

/// Two back-to-back frames are read one at a time.
#[tokio::test]
async fn consecutive_frames_are_read_separately() {
    let mut raw = encode(Opcode::Handshake, b"first").expect("encode").to_vec();
    raw.extend_from_slice(&encode(Opcode::Frame, b"second").expect("encode"));
    let mut stream = &raw[..];

    let first = read_frame(&mut stream).await.expect("first");
    let second = read_frame(&mut stream).await.expect("second");

    assert_eq!((first.opcode, &first.payload[..]), (0, &b"first"[..]));
    assert_eq!((second.opcode, &second.payload[..]), (1, &b"second"[..]));
}

/// Fewer than eight header bytes is a frame error.
#[tokio::test]
async fn short_header_is_a_frame_error() {
    let mut stream: &[u8] = &[1, 0, 0];
    let err = read_frame(&mut stream).await.expect_err("must fail");
    assert!(matches!(err, AppError::Frame(_)), "got {err:?}");
}

/// A payload shorter than the announced length is a frame error.
#[tokio::test]
async fn short_payload_is_a_frame_error() {
    let mut raw = encode(Opcode::Frame, b"0123456789").expect("encode").to_vec();
    raw.truncate(HEADER_LEN + 4);
    let mut stream = &raw[..];

    let err = read_frame(&mut stream).await.expect_err("must fail");
    assert!(matches!(err, AppError::Frame(_)), "got {err:?}");
}

/// A header announcing more than the maximum payload is rejected before any
/// payload read.
#[tokio::test]
async fn oversized_length_is_rejected() {
    let mut raw = Vec::new();
    raw.extend_from_slice(&1_u32.to_le_bytes());
    raw.extend_from_slice(&u32::try_from(MAX_PAYLOAD_BYTES + 1).expect("fits").to_le_bytes());
    let mut stream = &raw[..];

    let err = read_frame(&mut stream).await.expect_err("must fail");
    assert!(err.to_string().contains("too large"), "got {err}");
}

//! Binary frame codec for the Discord IPC channel.
//!
//! Every message is one frame: a fixed 8-byte header of two little-endian
//! `u32` values `(opcode, length)` followed by exactly `length` bytes of
//! UTF-8 JSON payload.
//!
//! ```text
//! +----------------+----------------+-----------------------+
//! | opcode (u32LE) | length (u32LE) | payload (length bytes)|
//! +----------------+----------------+-----------------------+
//! ```
//!
//! There is no resynchronization: a header whose length cannot be satisfied
//! is fatal to the channel it was read from.
//!
//! [`read_frame`] and [`write_frame`] talk to a channel directly, one frame
//! per call.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::{AppError, Result};

/// Size of the `(opcode, length)` header in bytes.
pub const HEADER_LEN: usize = 8;

/// Largest payload accepted from the peer: 1 MiB.
///
/// A header announcing more than this is treated as corrupt rather than
/// allocated.
pub const MAX_PAYLOAD_BYTES: usize = 1_048_576;

/// Frame opcodes used by this client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Opcode {
    /// Initial `{v, client_id}` handshake.
    Handshake = 0,
    /// Command or dispatch message.
    Frame = 1,
}

impl From<Opcode> for u32 {
    fn from(op: Opcode) -> Self {
        op as u32
    }
}

/// One decoded frame. The opcode is kept raw so that peer replies with
/// opcodes this client never sends still decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Raw opcode from the header.
    pub opcode: u32,
    /// Payload bytes; `payload.len()` equals the header length field.
    pub payload: Bytes,
}

/// Prepend the 8-byte header to `payload`.
///
/// # Errors
///
/// Returns [`AppError::Frame`] if the payload length does not fit in a `u32`.
pub fn encode(opcode: Opcode, payload: &[u8]) -> Result<Bytes> {
    let mut dst = BytesMut::with_capacity(HEADER_LEN + payload.len());
    put_frame(u32::from(opcode), payload, &mut dst)?;
    Ok(dst.freeze())
}

/// Parse a header into `(opcode, length)`.
///
/// # Errors
///
/// Returns [`AppError::Frame`] when the announced length exceeds
/// [`MAX_PAYLOAD_BYTES`].
pub fn parse_header(header: [u8; HEADER_LEN]) -> Result<(u32, usize)> {
    let mut buf = &header[..];
    let opcode = buf.get_u32_le();
    let length = buf.get_u32_le() as usize;
    if length > MAX_PAYLOAD_BYTES {
        return Err(AppError::Frame(format!(
            "frame too large: {length} bytes exceeds {MAX_PAYLOAD_BYTES}"
        )));
    }
    Ok((opcode, length))
}

/// Read exactly one frame: one 8-byte header read, one payload read.
///
/// # Errors
///
/// Returns [`AppError::Frame`] on a short read, a channel error, or a
/// corrupt header.
pub async fn read_frame<R>(reader: &mut R) -> Result<Frame>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut header = [0_u8; HEADER_LEN];
    reader
        .read_exact(&mut header)
        .await
        .map_err(|err| AppError::Frame(format!("header read failed: {err}")))?;

    let (opcode, length) = parse_header(header)?;

    let mut payload = vec![0_u8; length];
    reader
        .read_exact(&mut payload)
        .await
        .map_err(|err| AppError::Frame(format!("payload read failed: {err}")))?;

    Ok(Frame {
        opcode,
        payload: Bytes::from(payload),
    })
}

/// Write one frame as a single buffer and flush it.
///
/// # Errors
///
/// Returns [`AppError::Frame`] on a short write or channel error.
pub async fn write_frame<W>(writer: &mut W, opcode: Opcode, payload: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let bytes = encode(opcode, payload)?;
    writer
        .write_all(&bytes)
        .await
        .map_err(|err| AppError::Frame(format!("write failed: {err}")))?;
    writer
        .flush()
        .await
        .map_err(|err| AppError::Frame(format!("flush failed: {err}")))
}

// ── Private helper ────────────────────────────────────────────────────────────

fn put_frame(opcode: u32, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    let length = u32::try_from(payload.len())
        .map_err(|_| AppError::Frame(format!("payload too large: {} bytes", payload.len())))?;
    dst.reserve(HEADER_LEN + payload.len());
    dst.put_u32_le(opcode);
    dst.put_u32_le(length);
    dst.put_slice(payload);
    Ok(())
}

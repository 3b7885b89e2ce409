//! IPC session client: handshake, activity publishing, shutdown.
//!
//! ```text
//! Disconnected ──connect()──▶ Handshaking ──ack──▶ Ready ──close()──▶ Closed
//!        │                         │
//!        └──────── close() ────────┴──(failure)──▶ Closed
//! ```
//!
//! Only `Ready` accepts [`IpcClient::publish`]. Publishing is fire-and-forget:
//! the peer's reply to `SET_ACTIVITY` is never read.

use chrono::Utc;
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::ipc::codec::{read_frame, write_frame, Opcode};
use crate::ipc::transport::{BoxedChannel, TransportResolver};
use crate::models::activity::{Activity, ActivityPayload};
use crate::{AppError, Result};

/// Protocol version sent in the handshake.
const PROTOCOL_VERSION: u32 = 1;

/// Lifecycle state of an [`IpcClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    /// No channel has been opened yet.
    Disconnected,
    /// Channel open, waiting for the handshake acknowledgement.
    Handshaking,
    /// Handshake acknowledged; activities may be published.
    Ready,
    /// Channel closed, either explicitly or after a failed handshake.
    Closed,
}

#[derive(Debug, Serialize)]
struct Handshake<'a> {
    v: u32,
    client_id: &'a str,
}

#[derive(Debug, Serialize)]
struct Command<'a> {
    cmd: &'static str,
    args: SetActivityArgs<'a>,
    nonce: String,
}

#[derive(Debug, Serialize)]
struct SetActivityArgs<'a> {
    pid: u32,
    activity: ActivityPayload<'a>,
}

/// Owns the single channel to the peer.
pub struct IpcClient {
    client_id: String,
    state: ClientState,
    channel: Option<BoxedChannel>,
}

impl std::fmt::Debug for IpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IpcClient")
            .field("client_id", &self.client_id)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl IpcClient {
    /// Create a disconnected client for a Discord application id.
    #[must_use]
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            state: ClientState::Disconnected,
            channel: None,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ClientState {
        self.state
    }

    /// Resolve the endpoint and perform the handshake.
    ///
    /// Endpoint retries happen inside the resolver; a handshake failure is
    /// not retried.
    ///
    /// # Errors
    ///
    /// - [`AppError::TransportNotFound`] when no endpoint answers.
    /// - [`AppError::Handshake`] when the handshake cannot be sent or
    ///   acknowledged; the channel is closed.
    pub async fn connect(&mut self, resolver: &TransportResolver) -> Result<()> {
        let channel = resolver.resolve_and_connect().await?;
        self.connect_channel(channel).await
    }

    /// Perform the handshake over an already-open channel.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Handshake`] when the client is not `Disconnected`,
    /// or when the handshake frame cannot be written or its acknowledgement
    /// cannot be read. On failure the channel is shut down and the client
    /// moves to `Closed`.
    pub async fn connect_channel(&mut self, mut channel: BoxedChannel) -> Result<()> {
        if self.state != ClientState::Disconnected {
            return Err(AppError::Handshake(format!(
                "cannot connect from state {:?}",
                self.state
            )));
        }
        self.state = ClientState::Handshaking;

        match handshake(&mut channel, &self.client_id).await {
            Ok(()) => {
                self.channel = Some(channel);
                self.state = ClientState::Ready;
                info!(client_id = %self.client_id, "discord ipc handshake complete");
                Ok(())
            }
            Err(err) => {
                if let Err(shutdown_err) = channel.shutdown().await {
                    debug!(%shutdown_err, "channel shutdown after failed handshake");
                }
                self.state = ClientState::Closed;
                Err(AppError::Handshake(err.to_string()))
            }
        }
    }

    /// Send a `SET_ACTIVITY` command without waiting for a reply.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotConnected`] outside the `Ready` state; nothing is sent.
    /// - [`AppError::Serialization`] if the payload cannot be encoded.
    /// - [`AppError::Frame`] if the frame write fails.
    pub async fn publish(&mut self, activity: &Activity) -> Result<()> {
        let channel = match (self.state, self.channel.as_mut()) {
            (ClientState::Ready, Some(channel)) => channel,
            _ => return Err(AppError::NotConnected),
        };

        let command = Command {
            cmd: "SET_ACTIVITY",
            args: SetActivityArgs {
                pid: std::process::id(),
                activity: activity.to_payload(),
            },
            nonce: next_nonce(),
        };
        let payload = serde_json::to_vec(&command)?;

        write_frame(channel, Opcode::Frame, &payload).await?;
        debug!(nonce = %command.nonce, bytes = payload.len(), "activity published");
        Ok(())
    }

    /// Close the channel. Safe to call in any state, any number of times.
    pub async fn close(&mut self) {
        if let Some(mut channel) = self.channel.take() {
            if let Err(err) = channel.shutdown().await {
                warn!(%err, "error while closing discord ipc channel");
            }
            info!("discord ipc channel closed");
        }
        self.state = ClientState::Closed;
    }
}

async fn handshake(channel: &mut BoxedChannel, client_id: &str) -> Result<()> {
    let payload = serde_json::to_vec(&Handshake {
        v: PROTOCOL_VERSION,
        client_id,
    })?;
    write_frame(channel, Opcode::Handshake, &payload).await?;

    // The acknowledgement only has to frame correctly; its content is ignored.
    let ack = read_frame(channel).await?;
    debug!(
        opcode = ack.opcode,
        bytes = ack.payload.len(),
        "handshake acknowledged"
    );
    Ok(())
}

/// Best-effort unique nonce from the wall clock in nanoseconds.
fn next_nonce() -> String {
    let now = Utc::now();
    now.timestamp_nanos_opt()
        .unwrap_or_else(|| now.timestamp_micros())
        .to_string()
}

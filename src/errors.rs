//! Error types shared across the application.

use std::fmt::{Display, Formatter};

/// Shared application result type.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error enumeration covering all domain failure modes.
///
/// Unreadable status records, unparseable transcript lines and the absence of
/// an active session are deliberately not represented here: they surface as
/// `None` from the session readers.
#[derive(Debug)]
pub enum AppError {
    /// Configuration parsing or validation failure.
    Config(String),
    /// File-system or I/O operation failure.
    Io(String),
    /// Every IPC endpoint candidate was exhausted without a live channel.
    TransportNotFound(String),
    /// Handshake frame could not be sent or acknowledged.
    Handshake(String),
    /// `publish` was called outside the `Ready` state.
    NotConnected,
    /// Short read/write or channel failure during a frame exchange.
    Frame(String),
    /// JSON serialization of an outbound payload failed.
    Serialization(String),
    /// File-system watch subscription failure.
    Watch(String),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Io(msg) => write!(f, "io: {msg}"),
            Self::TransportNotFound(msg) => write!(f, "transport not found: {msg}"),
            Self::Handshake(msg) => write!(f, "handshake failed: {msg}"),
            Self::NotConnected => write!(f, "not connected"),
            Self::Frame(msg) => write!(f, "frame: {msg}"),
            Self::Serialization(msg) => write!(f, "serialization: {msg}"),
            Self::Watch(msg) => write!(f, "watch: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("invalid config: {err}"))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

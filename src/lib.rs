#![forbid(unsafe_code)]

//! `claude-presence` publishes Claude Code session activity to Discord
//! Rich Presence over the local Discord IPC endpoint.

pub mod config;
pub mod errors;
pub mod format;
pub mod ipc;
pub mod models;
pub mod presence;
pub mod scheduler;
pub mod session;
pub mod watcher;

pub use config::PresenceConfig;
pub use errors::{AppError, Result};

//! Discord IPC client layer.
//!
//! Resolves the local endpoint the Discord desktop client exposes, speaks the
//! length-prefixed frame protocol over it, and publishes Rich Presence
//! activities.

pub mod client;
pub mod codec;
pub mod transport;

pub use client::{ClientState, IpcClient};
pub use transport::{BoxedChannel, Channel, Platform, TransportResolver};

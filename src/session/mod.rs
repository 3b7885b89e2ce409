//! Session state derivation from the Live Status Record and transcript logs.

pub mod git;
pub mod path_codec;
pub mod selector;
pub mod status;
pub mod transcript;

pub use selector::{SessionContext, SessionSelector, SourceMode};

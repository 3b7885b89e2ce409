//! Live Status Record written by the Claude Code statusline integration.
//!
//! The statusline wrapper dumps Claude Code's statusline JSON to a file under
//! the Claude config directory on every render. The record is read-only to
//! this crate; a missing file, invalid JSON, or an empty `session_id` all
//! mean "not available". A `null` field reads as its zero value.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};
use tracing::debug;

/// Treat an explicit JSON `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Model block of the statusline payload.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct StatusModel {
    /// Model id, e.g. `claude-opus-4-5-20251101`.
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    /// Display name chosen by Claude Code, e.g. `Opus 4.5`.
    #[serde(deserialize_with = "null_as_default")]
    pub display_name: String,
}

/// Workspace block of the statusline payload.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct StatusWorkspace {
    /// Directory the session is currently in.
    #[serde(deserialize_with = "null_as_default")]
    pub current_dir: String,
    /// Directory the session was started in.
    #[serde(deserialize_with = "null_as_default")]
    pub project_dir: String,
}

/// Cost block of the statusline payload.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct StatusCost {
    /// Cumulative session cost in USD.
    #[serde(deserialize_with = "null_as_default")]
    pub total_cost_usd: f64,
    /// Wall-clock session duration.
    #[serde(deserialize_with = "null_as_default")]
    pub total_duration_ms: u64,
    /// Time spent waiting on the API.
    #[serde(deserialize_with = "null_as_default")]
    pub total_api_duration_ms: u64,
}

/// Context-window block of the statusline payload.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct StatusContextWindow {
    /// Cumulative input tokens.
    #[serde(deserialize_with = "null_as_default")]
    pub total_input_tokens: u64,
    /// Cumulative output tokens.
    #[serde(deserialize_with = "null_as_default")]
    pub total_output_tokens: u64,
}

/// Parsed Live Status Record. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct LiveStatusRecord {
    /// Claude Code session id; empty means no active session.
    #[serde(deserialize_with = "null_as_default")]
    pub session_id: String,
    /// Working directory of the session.
    #[serde(deserialize_with = "null_as_default")]
    pub cwd: String,
    /// Active model.
    #[serde(deserialize_with = "null_as_default")]
    pub model: StatusModel,
    /// Workspace directories.
    #[serde(deserialize_with = "null_as_default")]
    pub workspace: StatusWorkspace,
    /// Cumulative cost.
    #[serde(deserialize_with = "null_as_default")]
    pub cost: StatusCost,
    /// Cumulative token counts.
    #[serde(deserialize_with = "null_as_default")]
    pub context_window: StatusContextWindow,
}

impl LiveStatusRecord {
    /// Project path: the workspace project dir, else the working directory.
    #[must_use]
    pub fn project_path(&self) -> PathBuf {
        if self.workspace.project_dir.is_empty() {
            PathBuf::from(&self.cwd)
        } else {
            PathBuf::from(&self.workspace.project_dir)
        }
    }

    /// Input plus output tokens.
    #[must_use]
    pub fn total_tokens(&self) -> u64 {
        self.context_window
            .total_input_tokens
            .saturating_add(self.context_window.total_output_tokens)
    }
}

/// Read the record at `path`, returning `None` when it is unavailable.
pub async fn read_status_record(path: &Path) -> Option<LiveStatusRecord> {
    let raw = match tokio::fs::read(path).await {
        Ok(raw) => raw,
        Err(err) => {
            debug!(path = %path.display(), %err, "live status record not readable");
            return None;
        }
    };

    let record: LiveStatusRecord = match serde_json::from_slice(&raw) {
        Ok(record) => record,
        Err(err) => {
            debug!(path = %path.display(), %err, "live status record is not valid json");
            return None;
        }
    };

    (!record.session_id.is_empty()).then_some(record)
}

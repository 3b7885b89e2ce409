//! Normalized, source-agnostic session summary.

use std::path::PathBuf;

use chrono::{DateTime, Utc};

/// Display name used when a project path has no usable final component.
pub const UNKNOWN_PROJECT: &str = "Unknown Project";

/// One read of the active session, built fresh per update cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    /// Final component of the project path.
    pub project_name: String,
    /// Absolute project path.
    pub project_path: PathBuf,
    /// Current git branch of the project, if any.
    pub git_branch: Option<String>,
    /// Human-readable model name.
    pub model_name: String,
    /// Input plus output tokens.
    pub total_tokens: u64,
    /// Total cost in USD.
    pub total_cost: f64,
    /// Process-wide presence start time.
    pub started_at: DateTime<Utc>,
}

/// Derive a project display name from its path.
///
/// ```
/// use std::path::Path;
/// use claude_presence::models::snapshot::project_name;
///
/// assert_eq!(project_name(Path::new("/home/me/app")), "app");
/// assert_eq!(project_name(Path::new("")), "Unknown Project");
/// ```
#[must_use]
pub fn project_name(path: &std::path::Path) -> String {
    match path.file_name().and_then(|name| name.to_str()) {
        Some(name) if !name.is_empty() && name != "." => name.to_owned(),
        _ => UNKNOWN_PROJECT.to_owned(),
    }
}

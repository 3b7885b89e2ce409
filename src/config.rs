//! Presence configuration parsing, validation, and path derivation.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::{AppError, Result};

/// Discord application identifier registered for the presence.
pub const DEFAULT_CLIENT_ID: &str = "1455326944060248250";

/// File name of the statusline-written Live Status Record.
pub const DEFAULT_STATUS_FILE: &str = "discord-presence-data.json";

/// Directory under the Claude config dir holding transcript logs.
const PROJECTS_DIR: &str = "projects";

fn default_client_id() -> String {
    DEFAULT_CLIENT_ID.into()
}

fn default_poll_interval_seconds() -> u64 {
    3
}

fn default_status_file() -> String {
    DEFAULT_STATUS_FILE.into()
}

fn default_large_text() -> Option<String> {
    Some("Clawd Code - Discord Rich Presence for Claude Code".into())
}

/// Static presentation fields attached to every published activity.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct DisplayConfig {
    /// Asset key of the large image.
    #[serde(default)]
    pub large_image: Option<String>,
    /// Hover text of the large image.
    #[serde(default = "default_large_text")]
    pub large_text: Option<String>,
    /// Asset key of the small image.
    #[serde(default)]
    pub small_image: Option<String>,
    /// Hover text of the small image.
    #[serde(default)]
    pub small_text: Option<String>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            large_image: None,
            large_text: default_large_text(),
            small_image: None,
            small_text: None,
        }
    }
}

/// Configuration parsed from an optional `presence.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct PresenceConfig {
    /// Discord application id sent in the handshake.
    #[serde(default = "default_client_id")]
    pub client_id: String,
    /// Fixed re-derivation interval, independent of file events.
    #[serde(default = "default_poll_interval_seconds")]
    pub poll_interval_seconds: u64,
    /// Claude Code configuration directory; `$HOME/.claude` when unset.
    #[serde(default)]
    pub claude_dir: Option<PathBuf>,
    /// File name of the Live Status Record inside `claude_dir`.
    #[serde(default = "default_status_file")]
    pub status_file: String,
    /// Presentation fields.
    #[serde(default)]
    pub display: DisplayConfig,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            client_id: default_client_id(),
            poll_interval_seconds: default_poll_interval_seconds(),
            claude_dir: None,
            status_file: default_status_file(),
            display: DisplayConfig::default(),
        }
    }
}

impl PresenceConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the Claude configuration directory.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when no directory is configured and the
    /// home directory cannot be determined.
    pub fn claude_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.claude_dir {
            return Ok(dir.clone());
        }
        dirs::home_dir()
            .map(|home| home.join(".claude"))
            .ok_or_else(|| AppError::Config("cannot determine home directory".into()))
    }

    /// Absolute path of the Live Status Record.
    ///
    /// # Errors
    ///
    /// Propagates [`Self::claude_dir`] failures.
    pub fn status_path(&self) -> Result<PathBuf> {
        Ok(self.claude_dir()?.join(&self.status_file))
    }

    /// Root of the transcript log tree.
    ///
    /// # Errors
    ///
    /// Propagates [`Self::claude_dir`] failures.
    pub fn projects_dir(&self) -> Result<PathBuf> {
        Ok(self.claude_dir()?.join(PROJECTS_DIR))
    }

    /// Poll interval as a [`Duration`].
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    fn validate(&self) -> Result<()> {
        if self.client_id.trim().is_empty() {
            return Err(AppError::Config("client_id must not be empty".into()));
        }

        if self.poll_interval_seconds == 0 {
            return Err(AppError::Config(
                "poll_interval_seconds must be greater than zero".into(),
            ));
        }

        if self.status_file.trim().is_empty() || self.status_file.contains(['/', '\\']) {
            return Err(AppError::Config(
                "status_file must be a bare file name".into(),
            ));
        }

        Ok(())
    }
}

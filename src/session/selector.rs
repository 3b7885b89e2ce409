//! Session Source Selector.
//!
//! Two imperfect sources describe the active Claude Code session:
//!
//! 1. **Live Status Record**: already-aggregated metrics pushed by the
//!    statusline wrapper. Authoritative whenever it names a session.
//! 2. **Transcript logs**: the most recently modified `*.jsonl` under the
//!    projects tree, aggregated locally.
//!
//! Every [`SessionSelector::read_session`] call re-derives the snapshot from
//! scratch (the transcript cursor only saves re-parsing). The two sources are
//! never blended within one snapshot.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use glob::{MatchOptions, Pattern};
use tracing::{debug, info, warn};

use crate::models::snapshot::{project_name, SessionSnapshot};
use crate::session::git;
use crate::session::path_codec::decode_project_dir;
use crate::session::status::read_status_record;
use crate::session::transcript::{TranscriptAggregator, TranscriptLog};

/// Suffix identifying transcript log files.
pub const TRANSCRIPT_SUFFIX: &str = "jsonl";

/// Which source produced the most recent snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SourceMode {
    /// Live Status Record.
    #[default]
    Primary,
    /// Transcript log fallback.
    Fallback,
}

/// Per-run state shared by the scheduler and the selector.
///
/// Lives exactly as long as the scheduler loop. Only `started_at` affects
/// data; the rest controls one-time informational notices.
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// Elapsed-time anchor for every snapshot, fixed at startup.
    pub started_at: DateTime<Utc>,
    /// Source that produced the last snapshot.
    pub source_mode: SourceMode,
    /// Whether the statusline setup tip has been logged.
    pub tip_shown: bool,
}

impl SessionContext {
    /// Create a context anchored at `started_at`.
    #[must_use]
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            source_mode: SourceMode::Primary,
            tip_shown: false,
        }
    }
}

/// Chooses between the live record and the transcript fallback.
#[derive(Debug)]
pub struct SessionSelector {
    status_path: PathBuf,
    projects_dir: PathBuf,
    aggregator: TranscriptAggregator,
}

impl SessionSelector {
    /// Create a selector over a status record path and a transcript tree.
    #[must_use]
    pub fn new(status_path: impl Into<PathBuf>, projects_dir: impl Into<PathBuf>) -> Self {
        Self {
            status_path: status_path.into(),
            projects_dir: projects_dir.into(),
            aggregator: TranscriptAggregator::new(),
        }
    }

    /// Path of the Live Status Record.
    #[must_use]
    pub fn status_path(&self) -> &Path {
        &self.status_path
    }

    /// Produce the current snapshot, or `None` when neither source has one.
    pub async fn read_session(&mut self, ctx: &mut SessionContext) -> Option<SessionSnapshot> {
        if let Some(snapshot) = self.read_live_status(ctx.started_at).await {
            if ctx.source_mode == SourceMode::Fallback {
                ctx.source_mode = SourceMode::Primary;
                info!("now using statusline data (more accurate)");
            }
            return Some(snapshot);
        }

        let projects_dir = self.projects_dir.clone();
        let log = match tokio::task::spawn_blocking(move || find_latest_transcript(&projects_dir))
            .await
        {
            Ok(found) => found?,
            Err(err) => {
                warn!(%err, "transcript discovery task failed");
                return None;
            }
        };

        ctx.source_mode = SourceMode::Fallback;
        if !ctx.tip_shown {
            ctx.tip_shown = true;
            info!(
                "tip: for more accurate token and cost data, configure the statusline wrapper \
                 (see https://github.com/tsanva/cc-discord-presence#statusline-setup)"
            );
        }

        debug!(transcript = %log.path.display(), "using transcript fallback");
        self.aggregator.aggregate(&log, ctx.started_at).await
    }

    async fn read_live_status(&self, started_at: DateTime<Utc>) -> Option<SessionSnapshot> {
        let record = read_status_record(&self.status_path).await?;
        let project_path = record.project_path();

        Some(SessionSnapshot {
            project_name: project_name(&project_path),
            git_branch: git::current_branch(&project_path).await,
            model_name: record.model.display_name.clone(),
            total_tokens: record.total_tokens(),
            total_cost: record.cost.total_cost_usd,
            started_at,
            project_path,
        })
    }
}

/// Find the most recently modified transcript under `projects_dir`.
///
/// Walks the directory synchronously; async callers run it on the blocking
/// pool.
///
/// The project path is decoded from the first directory component below
/// `projects_dir`. Ties on modification time go to the lexically greatest
/// path so the choice is deterministic.
#[must_use]
pub fn find_latest_transcript(projects_dir: &Path) -> Option<TranscriptLog> {
    if !projects_dir.is_dir() {
        debug!(dir = %projects_dir.display(), "projects directory does not exist");
        return None;
    }

    let pattern = format!(
        "{}/**/*.{TRANSCRIPT_SUFFIX}",
        Pattern::escape(&projects_dir.to_string_lossy())
    );
    let options = MatchOptions {
        require_literal_leading_dot: false,
        ..MatchOptions::new()
    };
    let entries = match glob::glob_with(&pattern, options) {
        Ok(entries) => entries,
        Err(err) => {
            debug!(%err, "invalid transcript glob pattern");
            return None;
        }
    };

    let mut latest: Option<(SystemTime, PathBuf)> = None;
    for path in entries.filter_map(std::result::Result::ok) {
        let Ok(meta) = path.metadata() else {
            continue;
        };
        if !meta.is_file() {
            continue;
        }
        let Ok(modified) = meta.modified() else {
            continue;
        };

        let newer = latest
            .as_ref()
            .map_or(true, |(best, best_path)| (modified, &path) > (*best, best_path));
        if newer {
            latest = Some((modified, path));
        }
    }

    let (_, path) = latest?;
    let encoded = path
        .strip_prefix(projects_dir)
        .ok()
        .and_then(|rel| rel.components().next())
        .map(|first| first.as_os_str().to_string_lossy().into_owned())
        .unwrap_or_default();

    Some(TranscriptLog {
        project_path: decode_project_dir(&encoded),
        path,
    })
}

//! Transcript Aggregator: derives session totals from a JSONL transcript.
//!
//! Each line of a transcript is one JSON record. Only a few fields matter:
//!
//! | Field                          | Use                                     |
//! |--------------------------------|-----------------------------------------|
//! | `type`                         | `assistant` lines carry usage           |
//! | `cwd`                          | first non-empty value is the project    |
//! | `message.model`                | last non-empty value on an assistant line |
//! | `message.usage.input_tokens`   | summed over assistant lines             |
//! | `message.usage.output_tokens`  | summed over assistant lines             |
//!
//! Lines that fail to parse are skipped. Lines have no length ceiling.
//!
//! The aggregator remembers how far into the current log it has read, so a
//! tick on an unchanged or appended log parses only the new lines. The read
//! position is only trusted while the file is the same file (device and inode
//! on Unix), is at least as long as the position, and still has the same
//! bytes at its start and just before the position. Anything else is read
//! from the start.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncSeekExt, BufReader};
use tracing::debug;

use crate::models::pricing::{calculate_cost, format_model_name};
use crate::models::snapshot::{project_name, SessionSnapshot};
use crate::session::git;
use crate::{AppError, Result};

/// Role tag of turns that carry model and usage data.
const ASSISTANT_TYPE: &str = "assistant";

/// Bytes compared at the start of the log and just before the read position.
const FINGERPRINT_BYTES: u64 = 256;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TranscriptLine {
    #[serde(rename = "type")]
    kind: Option<String>,
    cwd: Option<String>,
    message: Option<LineMessage>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LineMessage {
    model: Option<String>,
    usage: Option<LineUsage>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LineUsage {
    input_tokens: Option<u64>,
    output_tokens: Option<u64>,
}

/// Running totals over the lines read so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscriptTotals {
    /// Sum of assistant input tokens.
    pub input_tokens: u64,
    /// Sum of assistant output tokens.
    pub output_tokens: u64,
    /// Model id of the most recent assistant line that named one.
    pub last_model: Option<String>,
    /// First non-empty working directory seen on any line.
    pub cwd: Option<String>,
}

impl TranscriptTotals {
    fn observe(&mut self, line: TranscriptLine) {
        if self.cwd.is_none() {
            if let Some(cwd) = line.cwd.filter(|cwd| !cwd.is_empty()) {
                self.cwd = Some(cwd);
            }
        }

        if line.kind.as_deref() != Some(ASSISTANT_TYPE) {
            return;
        }
        let Some(message) = line.message else {
            return;
        };
        let Some(model) = message.model.filter(|model| !model.is_empty()) else {
            return;
        };

        self.last_model = Some(model);
        if let Some(usage) = message.usage {
            self.input_tokens = self
                .input_tokens
                .saturating_add(usage.input_tokens.unwrap_or(0));
            self.output_tokens = self
                .output_tokens
                .saturating_add(usage.output_tokens.unwrap_or(0));
        }
    }
}

/// A transcript log selected for aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptLog {
    /// Path of the `.jsonl` file.
    pub path: PathBuf,
    /// Project path decoded from the enclosing directory name.
    pub project_path: PathBuf,
}

/// Device and inode of an open file, where the platform exposes them.
type FileIdentity = Option<(u64, u64)>;

#[cfg(unix)]
fn file_identity(meta: &std::fs::Metadata) -> FileIdentity {
    use std::os::unix::fs::MetadataExt;
    Some((meta.dev(), meta.ino()))
}

#[cfg(not(unix))]
fn file_identity(_meta: &std::fs::Metadata) -> FileIdentity {
    None
}

#[derive(Debug)]
struct ReadCursor {
    path: PathBuf,
    identity: FileIdentity,
    offset: u64,
    head: Vec<u8>,
    tail: Vec<u8>,
    totals: TranscriptTotals,
}

impl ReadCursor {
    fn start(path: &Path, identity: FileIdentity) -> Self {
        Self {
            path: path.to_path_buf(),
            identity,
            offset: 0,
            head: Vec::new(),
            tail: Vec::new(),
            totals: TranscriptTotals::default(),
        }
    }

    /// Whether the consumed prefix of `file` is still the one this cursor
    /// summed.
    async fn still_valid(
        &self,
        file: &mut File,
        path: &Path,
        identity: FileIdentity,
        len: u64,
    ) -> std::io::Result<bool> {
        if self.path != path || self.identity != identity || self.offset > len {
            return Ok(false);
        }
        if read_span(file, 0, self.head.len() as u64).await? != self.head {
            return Ok(false);
        }
        let tail_start = self.offset - self.tail.len() as u64;
        Ok(read_span(file, tail_start, self.tail.len() as u64).await? == self.tail)
    }

    /// Record the bytes around the consumed prefix.
    async fn refresh_fingerprint(&mut self, file: &mut File) -> std::io::Result<()> {
        let span = self.offset.min(FINGERPRINT_BYTES);
        self.head = read_span(file, 0, span).await?;
        self.tail = read_span(file, self.offset - span, span).await?;
        Ok(())
    }
}

/// Read up to `len` bytes starting at `start`.
async fn read_span(file: &mut File, start: u64, len: u64) -> std::io::Result<Vec<u8>> {
    file.seek(SeekFrom::Start(start)).await?;
    let mut buf = Vec::new();
    (&mut *file).take(len).read_to_end(&mut buf).await?;
    Ok(buf)
}

/// Incremental transcript reader.
#[derive(Debug, Default)]
pub struct TranscriptAggregator {
    cursor: Option<ReadCursor>,
}

impl TranscriptAggregator {
    /// Create an aggregator with no read position.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from `log`, or `None` when no assistant turn with a
    /// model id has been seen or the file cannot be read.
    ///
    /// The snapshot's start time is `started_at`, never a log timestamp.
    pub async fn aggregate(
        &mut self,
        log: &TranscriptLog,
        started_at: DateTime<Utc>,
    ) -> Option<SessionSnapshot> {
        let totals = match self.read_totals(&log.path).await {
            Ok(totals) => totals,
            Err(err) => {
                debug!(%err, "transcript not readable");
                return None;
            }
        };

        let model_id = totals.last_model.as_deref()?;

        let project_path = totals
            .cwd
            .as_ref()
            .map_or_else(|| log.project_path.clone(), PathBuf::from);

        Some(SessionSnapshot {
            project_name: project_name(&project_path),
            git_branch: git::current_branch(&project_path).await,
            model_name: format_model_name(model_id),
            total_tokens: totals.input_tokens.saturating_add(totals.output_tokens),
            total_cost: calculate_cost(model_id, totals.input_tokens, totals.output_tokens),
            started_at,
            project_path,
        })
    }

    /// Bring the totals for `path` up to date and return a copy.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Io`] when the file cannot be opened or read.
    pub async fn read_totals(&mut self, path: &Path) -> Result<TranscriptTotals> {
        let io_err =
            |err: std::io::Error| AppError::Io(format!("{}: {err}", path.display()));

        let mut file = File::open(path).await.map_err(io_err)?;
        let meta = file.metadata().await.map_err(io_err)?;
        let identity = file_identity(&meta);
        let len = meta.len();

        let reusable = match self.cursor.take() {
            Some(cursor) => {
                let valid = cursor
                    .still_valid(&mut file, path, identity, len)
                    .await
                    .map_err(io_err)?;
                valid.then_some(cursor)
            }
            None => None,
        };
        let mut cursor = reusable.unwrap_or_else(|| ReadCursor::start(path, identity));

        file.seek(SeekFrom::Start(cursor.offset))
            .await
            .map_err(io_err)?;
        let mut reader = BufReader::new(file);
        let mut buf = Vec::new();

        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .await
                .map_err(io_err)?;
            if read == 0 {
                break;
            }

            let complete = buf.last() == Some(&b'\n');
            match serde_json::from_slice::<TranscriptLine>(&buf) {
                Ok(line) => cursor.totals.observe(line),
                // A trailing line without its newline may still be mid-write.
                Err(_) if !complete => break,
                Err(_) => {}
            }
            cursor.offset += read as u64;
        }

        let mut file = reader.into_inner();
        cursor
            .refresh_fingerprint(&mut file)
            .await
            .map_err(io_err)?;

        let totals = cursor.totals.clone();
        self.cursor = Some(cursor);
        Ok(totals)
    }
}

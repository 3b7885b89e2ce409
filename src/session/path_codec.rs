//! Project directory name encoding used by the transcript log tree.
//!
//! Claude Code stores each project's transcripts under a directory named
//! after the project's absolute path, with `/` replaced by `-` and each
//! literal `-` escaped as `--`:
//!
//! ```text
//! /Users/foo/my-project  ⇄  -Users-foo-my--project
//! ```
//!
//! Decoding must collapse `--` pairs before turning single dashes back into
//! separators, otherwise escaped dashes would be split into path components.

use std::path::PathBuf;

/// Stand-in for an escaped dash while single dashes are decoded. NUL cannot
/// occur in a real path.
const PLACEHOLDER: char = '\0';

/// Encode an absolute `/`-separated path into a directory name.
#[must_use]
pub fn encode_path(path: &str) -> String {
    path.replace('-', "--").replace('/', "-")
}

/// Decode a directory name back into the project path string.
///
/// ```
/// use claude_presence::session::path_codec::decode_path;
///
/// assert_eq!(
///     decode_path("-Users-foo--bar-my----special----project"),
///     "/Users/foo-bar/my--special--project",
/// );
/// ```
#[must_use]
pub fn decode_path(encoded: &str) -> String {
    encoded
        .replace("--", &PLACEHOLDER.to_string())
        .replace('-', "/")
        .replace(PLACEHOLDER, "-")
}

/// Decode a directory name into a [`PathBuf`].
#[must_use]
pub fn decode_project_dir(encoded: &str) -> PathBuf {
    PathBuf::from(decode_path(encoded))
}

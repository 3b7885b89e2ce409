//! Current-branch lookup for a project directory.
//!
//! Best-effort: a missing `git` binary or a path outside any repository
//! yields `None` rather than an error.

use std::path::Path;

use tokio::process::Command;
use tracing::debug;

/// Return the checked-out branch of the repository containing `project_path`.
///
/// A repository without commits has no resolvable `HEAD` (depending on the
/// git version `rev-parse` fails or prints `HEAD`), so both cases fall back
/// to `symbolic-ref --short HEAD`. A detached checkout reports `HEAD`.
pub async fn current_branch(project_path: &Path) -> Option<String> {
    if project_path.as_os_str().is_empty() {
        return None;
    }

    let branch = git_stdout(project_path, &["rev-parse", "--abbrev-ref", "HEAD"]).await;
    if let Some(ref name) = branch {
        if name != "HEAD" {
            return branch;
        }
    }

    git_stdout(project_path, &["symbolic-ref", "--short", "HEAD"])
        .await
        .or(branch)
}

/// Run `git -C <dir> <args>` and return trimmed, non-empty stdout on success.
async fn git_stdout(dir: &Path, args: &[&str]) -> Option<String> {
    let output = match Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .kill_on_drop(true)
        .output()
        .await
    {
        Ok(output) => output,
        Err(err) => {
            debug!(%err, "git not runnable");
            return None;
        }
    };

    if !output.status.success() {
        return None;
    }

    let text = String::from_utf8_lossy(&output.stdout).trim().to_owned();
    (!text.is_empty()).then_some(text)
}

//! Rendering a [`SessionSnapshot`] into a Rich Presence [`Activity`].

use crate::config::DisplayConfig;
use crate::format::format_number;
use crate::models::activity::Activity;
use crate::models::snapshot::SessionSnapshot;

/// First presence line: project and, when known, branch.
#[must_use]
pub fn details_line(snapshot: &SessionSnapshot) -> String {
    match snapshot.git_branch.as_deref() {
        Some(branch) if !branch.is_empty() => {
            format!("Working on: {} ({branch})", snapshot.project_name)
        }
        _ => format!("Working on: {}", snapshot.project_name),
    }
}

/// Second presence line: `model | tokens | cost`.
#[must_use]
pub fn state_line(snapshot: &SessionSnapshot) -> String {
    format!(
        "{} | {} tokens | ${:.4}",
        snapshot.model_name,
        format_number(snapshot.total_tokens),
        snapshot.total_cost
    )
}

/// Build the activity published for `snapshot`.
#[must_use]
pub fn render_activity(snapshot: &SessionSnapshot, display: &DisplayConfig) -> Activity {
    let mut activity = Activity::new()
        .details(details_line(snapshot))
        .state(state_line(snapshot))
        .start_time(snapshot.started_at);

    if let Some(ref key) = display.large_image {
        activity = activity.large_image(key.as_str());
    }
    if let Some(ref text) = display.large_text {
        activity = activity.large_text(text.as_str());
    }
    if let Some(ref key) = display.small_image {
        activity = activity.small_image(key.as_str());
    }
    if let Some(ref text) = display.small_text {
        activity = activity.small_text(text.as_str());
    }
    activity
}

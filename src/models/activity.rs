//! Rich Presence activity model and its wire rendering.
//!
//! [`Activity`] is built with chained setters. Empty strings are normalized
//! to "absent" at construction time, and [`Activity::to_payload`] renders a
//! borrowed wire view in which every absent field is omitted entirely:
//!
//! - `assets` appears only when at least one image/text field is set;
//! - `timestamps` appears only when a start time is set.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Outbound presentation model for one presence update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Activity {
    details: Option<String>,
    state: Option<String>,
    large_image: Option<String>,
    large_text: Option<String>,
    small_image: Option<String>,
    small_text: Option<String>,
    start_time: Option<DateTime<Utc>>,
}

/// Map an empty string to `None`.
fn non_empty(value: impl Into<String>) -> Option<String> {
    let value = value.into();
    (!value.is_empty()).then_some(value)
}

impl Activity {
    /// Create an empty activity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// First line shown under the application name.
    #[must_use]
    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = non_empty(details);
        self
    }

    /// Second line shown under the details.
    #[must_use]
    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.state = non_empty(state);
        self
    }

    /// Asset key of the large image.
    #[must_use]
    pub fn large_image(mut self, key: impl Into<String>) -> Self {
        self.large_image = non_empty(key);
        self
    }

    /// Hover text of the large image.
    #[must_use]
    pub fn large_text(mut self, text: impl Into<String>) -> Self {
        self.large_text = non_empty(text);
        self
    }

    /// Asset key of the small image.
    #[must_use]
    pub fn small_image(mut self, key: impl Into<String>) -> Self {
        self.small_image = non_empty(key);
        self
    }

    /// Hover text of the small image.
    #[must_use]
    pub fn small_text(mut self, text: impl Into<String>) -> Self {
        self.small_text = non_empty(text);
        self
    }

    /// Anchor for the elapsed-time counter.
    #[must_use]
    pub fn start_time(mut self, start: DateTime<Utc>) -> Self {
        self.start_time = Some(start);
        self
    }

    /// Render the wire view of this activity.
    #[must_use]
    pub fn to_payload(&self) -> ActivityPayload<'_> {
        let assets = Assets {
            large_image: self.large_image.as_deref(),
            large_text: self.large_text.as_deref(),
            small_image: self.small_image.as_deref(),
            small_text: self.small_text.as_deref(),
        };

        ActivityPayload {
            details: self.details.as_deref(),
            state: self.state.as_deref(),
            assets: (!assets.is_empty()).then_some(assets),
            timestamps: self.start_time.map(|start| Timestamps {
                start: start.timestamp(),
            }),
        }
    }
}

/// Borrowed wire representation of an [`Activity`].
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ActivityPayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    assets: Option<Assets<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamps: Option<Timestamps>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct Assets<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    large_image: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    large_text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    small_image: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    small_text: Option<&'a str>,
}

impl Assets<'_> {
    fn is_empty(&self) -> bool {
        self.large_image.is_none()
            && self.large_text.is_none()
            && self.small_image.is_none()
            && self.small_text.is_none()
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct Timestamps {
    /// Unix seconds.
    start: i64,
}

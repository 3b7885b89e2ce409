//! Unit tests for `Activity` wire rendering.

use chrono::{TimeZone, Utc};
use serde_json::json;

use claude_presence::models::activity::Activity;

fn render(activity: &Activity) -> serde_json::Value {
    serde_json::to_value(activity.to_payload()).expect("serialize")
}

#[test]
fn fully_populated_activity_renders_every_field() {
    let start = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).single().expect("valid time");
    let activity = Activity::new()
        .details("Working on: app")
        .state("Opus 4.5 | 1.2K tokens | $0.0100")
        .large_image("clawd")
        .large_text("Clawd Code")
        .small_image("dot")
        .small_text("online")
        .start_time(start);

    assert_eq!(
        render(&activity),
        json!({
            "details": "Working on: app",
            "state": "Opus 4.5 | 1.2K tokens | $0.0100",
            "assets": {
                "large_image": "clawd",
                "large_text": "Clawd Code",
                "small_image": "dot",
                "small_text": "online",
            },
            "timestamps": { "start": start.timestamp() },
        })
    );
}

#[test]
fn assets_object_is_omitted_without_asset_fields() {
    let json = render(&Activity::new().details("d").state("s"));

    assert_eq!(json, json!({ "details": "d", "state": "s" }));
}

#[test]
fn single_asset_field_produces_assets_object() {
    let json = render(&Activity::new().large_text("hover"));

    assert_eq!(json, json!({ "assets": { "large_text": "hover" } }));
}

#[test]
fn timestamps_are_omitted_without_start_time() {
    let json = render(&Activity::new().details("d"));

    assert!(json.get("timestamps").is_none());
}

#[test]
fn absent_fields_are_not_rendered_as_null() {
    let text = serde_json::to_string(&Activity::new().state("s").to_payload()).expect("json");

    assert!(!text.contains("null"), "payload must omit absent fields: {text}");
    assert!(!text.contains("\"\""), "payload must omit empty strings: {text}");
}

#[test]
fn empty_setter_clears_a_previous_value() {
    let activity = Activity::new().details("first").details("");

    assert_eq!(render(&activity), json!({}));
}

//! Unit tests for model pricing and display names.

use claude_presence::models::pricing::{
    calculate_cost, format_model_name, pricing_for, MODELS, REFERENCE_MODEL,
};

#[test]
fn unknown_model_costs_the_same_as_reference_model() {
    let unknown = calculate_cost("claude-mystery-9", 1_000_000, 1_000_000);
    let reference = calculate_cost(REFERENCE_MODEL, 1_000_000, 1_000_000);

    assert!((unknown - reference).abs() < f64::EPSILON);
    assert!((reference - 18.0).abs() < 1e-9, "sonnet 4 is 3 + 15 per million");
}

#[test]
fn zero_tokens_cost_nothing_for_every_model() {
    for (id, _, _) in MODELS {
        assert!(calculate_cost(id, 0, 0).abs() < f64::EPSILON, "{id}");
    }
}

#[test]
fn opus_rates_apply_per_million_tokens() {
    let cost = calculate_cost("claude-opus-4-5-20251101", 500_000, 100_000);

    // 0.5 * 15 + 0.1 * 75
    assert!((cost - 15.0).abs() < 1e-9, "got {cost}");
}

#[test]
fn every_table_entry_has_pricing_and_display_name() {
    for (id, pricing, name) in MODELS {
        assert_eq!(pricing_for(id), Some(*pricing));
        assert_eq!(format_model_name(id), *name);
    }
}

#[test]
fn known_ids_map_to_configured_display_names() {
    assert_eq!(format_model_name("claude-opus-4-5-20251101"), "Opus 4.5");
    assert_eq!(format_model_name("claude-sonnet-4-5-20241022"), "Sonnet 4.5");
    assert_eq!(format_model_name("claude-sonnet-4-20250514"), "Sonnet 4");
    assert_eq!(format_model_name("claude-haiku-4-5-20241022"), "Haiku 4.5");
}

#[test]
fn unmapped_ids_fall_back_to_family_name() {
    assert_eq!(format_model_name("claude-opus-5-20260101"), "Opus");
    assert_eq!(format_model_name("claude-sonnet-9"), "Sonnet");
    assert_eq!(format_model_name("claude-3-haiku-20240307"), "Haiku");
    assert_eq!(format_model_name("gpt-4o"), "Claude");
    assert_eq!(format_model_name(""), "Claude");
}

#[test]
fn unknown_ids_have_no_table_pricing() {
    assert_eq!(pricing_for("claude-opus-5-20260101"), None);
}

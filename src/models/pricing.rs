//! Model pricing and display-name tables.
//!
//! Prices are USD per million tokens. Update both tables together when new
//! model ids ship; every priced id must also have a display name.

/// Input/output price pair for one model, USD per million tokens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPricing {
    /// Price per million input tokens.
    pub input: f64,
    /// Price per million output tokens.
    pub output: f64,
}

/// Model id whose rates apply when a transcript names an unknown model.
pub const REFERENCE_MODEL: &str = "claude-sonnet-4-20250514";

/// Known model ids with their rates and display names.
pub const MODELS: &[(&str, ModelPricing, &str)] = &[
    (
        "claude-opus-4-5-20251101",
        ModelPricing {
            input: 15.0,
            output: 75.0,
        },
        "Opus 4.5",
    ),
    (
        "claude-sonnet-4-5-20241022",
        ModelPricing {
            input: 3.0,
            output: 15.0,
        },
        "Sonnet 4.5",
    ),
    (
        REFERENCE_MODEL,
        ModelPricing {
            input: 3.0,
            output: 15.0,
        },
        "Sonnet 4",
    ),
    (
        "claude-haiku-4-5-20241022",
        ModelPricing {
            input: 1.0,
            output: 5.0,
        },
        "Haiku 4.5",
    ),
];

const REFERENCE_PRICING: ModelPricing = ModelPricing {
    input: 3.0,
    output: 15.0,
};

/// Look up the rates for `model_id`, if it is a known model.
#[must_use]
pub fn pricing_for(model_id: &str) -> Option<ModelPricing> {
    MODELS
        .iter()
        .find(|(id, _, _)| *id == model_id)
        .map(|(_, pricing, _)| *pricing)
}

/// Compute the USD cost of a token count, falling back to the reference
/// model's rates for unknown ids.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn calculate_cost(model_id: &str, input_tokens: u64, output_tokens: u64) -> f64 {
    let pricing = pricing_for(model_id)
        .or_else(|| pricing_for(REFERENCE_MODEL))
        .unwrap_or(REFERENCE_PRICING);

    let input_cost = input_tokens as f64 / 1_000_000.0 * pricing.input;
    let output_cost = output_tokens as f64 / 1_000_000.0 * pricing.output;
    input_cost + output_cost
}

/// Map a model id to its display name.
///
/// Unknown ids fall back to the model family found in the id, then to
/// `"Claude"`.
#[must_use]
pub fn format_model_name(model_id: &str) -> String {
    if let Some((_, _, name)) = MODELS.iter().find(|(id, _, _)| *id == model_id) {
        return (*name).to_owned();
    }

    let family = if model_id.contains("opus") {
        "Opus"
    } else if model_id.contains("sonnet") {
        "Sonnet"
    } else if model_id.contains("haiku") {
        "Haiku"
    } else {
        "Claude"
    };
    family.to_owned()
}

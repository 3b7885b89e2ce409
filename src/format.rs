//! Human-readable number formatting for the presence state line.

/// Format a token count with a `K`/`M` suffix and one decimal place.
///
/// ```
/// use claude_presence::format::format_number;
///
/// assert_eq!(format_number(999), "999");
/// assert_eq!(format_number(1_000), "1.0K");
/// assert_eq!(format_number(1_500_000), "1.5M");
/// ```
#[must_use]
#[allow(clippy::cast_precision_loss)] // Token counts stay far below 2^52.
pub fn format_number(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

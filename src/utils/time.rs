//! Elapsed-time rendering for watch messages.

use std::time::Duration;

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;

/// Render a duration as `1d 2h 3m 4s`, dropping zero-valued units.
///
/// Sub-second remainders are truncated; a duration below one second renders
/// as `0s`.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let units = [
        (total / DAY, "d"),
        (total % DAY / HOUR, "h"),
        (total % HOUR / MINUTE, "m"),
        (total % MINUTE, "s"),
    ];

    let parts: Vec<String> = units
        .iter()
        .filter(|(value, _)| *value > 0)
        .map(|(value, unit)| format!("{}{}", value, unit))
        .collect();

    if parts.is_empty() {
        "0s".to_string()
    } else {
        parts.join(" ")
    }
}

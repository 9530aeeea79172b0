use chrono::Duration;
use crate::constants::MAX_TIME_DECIMALS;

/// Parse an OCIT time value in seconds (`30`, `12.5`) into a `Duration`
///
/// Values are kept as integer milliseconds so that boundaries coming from
/// different signal groups compare exactly.
///
/// # Errors
///
/// Returns a description of the problem if the value is empty, signed, has
/// more than three decimals, or contains anything other than digits and a
/// single decimal point.
pub fn parse_seconds(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty time value".to_string());
    }
    if s.starts_with('-') {
        return Err(format!("negative time value '{s}'"));
    }

    let (whole, fraction) = s.split_once('.').unwrap_or((s, ""));
    if whole.is_empty() && fraction.is_empty() {
        return Err(format!("invalid time value '{s}'"));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("invalid time value '{s}'"));
    }
    if fraction.len() > MAX_TIME_DECIMALS {
        return Err(format!("time value '{s}' is more precise than a millisecond"));
    }

    let seconds: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| format!("time value '{s}' out of range"))?
    };
    // Right-pad the fraction to exactly three digits: "5" -> 500 ms
    let millis: i64 = if fraction.is_empty() {
        0
    } else {
        format!("{fraction:0<3}").parse().map_err(|_| format!("invalid time value '{s}'"))?
    };

    seconds
        .checked_mul(1000)
        .and_then(|ms| ms.checked_add(millis))
        .and_then(Duration::try_milliseconds)
        .ok_or_else(|| format!("time value '{s}' out of range"))
}

/// Format a `Duration` as seconds the way SUMO expects it
///
/// Whole seconds print without a decimal point, fractional values print
/// with trailing zeros removed (`2.5`, `0.125`).
#[must_use]
pub fn format_seconds(duration: Duration) -> String {
    let total_ms = duration.num_milliseconds();
    let sign = if total_ms < 0 { "-" } else { "" };
    let total_ms = total_ms.unsigned_abs();
    let seconds = total_ms / 1000;
    let millis = total_ms % 1000;

    if millis == 0 {
        format!("{sign}{seconds}")
    } else {
        let fraction = format!("{millis:03}");
        format!("{sign}{seconds}.{}", fraction.trim_end_matches('0'))
    }
}

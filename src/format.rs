//! Display formatting for dashboard numbers. No business logic lives here.

use chrono::NaiveDateTime;

use crate::timezone::TimezoneConfig;

/// Placeholder shown when a value is missing or not meaningful.
pub const NOT_AVAILABLE: &str = "N/A";

/// Format a pace as `M'SS"` per kilometer, or `N/A` when non-positive.
pub fn format_pace(seconds_per_km: f64) -> String {
    if !(seconds_per_km.is_finite() && seconds_per_km > 0.0) {
        return NOT_AVAILABLE.to_string();
    }
    let minutes = (seconds_per_km / 60.0).floor() as u64;
    let seconds = (seconds_per_km % 60.0).floor() as u64;
    format!("{}'{:02}\"", minutes, seconds)
}

/// Format a duration as `H:MM:SS` (one hour or more) or `M:SS`, or `N/A` when non-positive.
pub fn format_duration(total_seconds: f64) -> String {
    if !(total_seconds.is_finite() && total_seconds > 0.0) {
        return NOT_AVAILABLE.to_string();
    }
    let total = total_seconds.floor() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

/// Format a local datetime as `MM/DD`.
pub fn format_local_date(dt: &NaiveDateTime) -> String {
    dt.format("%m/%d").to_string()
}

/// Format a raw timestamp as a local `MM/DD` date, or `N/A` if it cannot be parsed.
pub fn format_date(raw: &str, tz: &TimezoneConfig) -> String {
    tz.normalize(raw)
        .map(|dt| format_local_date(&dt))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Format meters as kilometers with one decimal, e.g. `21.1 km`.
pub fn format_distance_km(meters: f64) -> String {
    format!("{:.1} km", meters / 1000.0)
}

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

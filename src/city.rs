//! Human-readable location labels for activities.
//!
//! This is a presentation heuristic, not a geocoder. The first match wins:
//! 1. explicit `location_city`
//! 2. city parsed from a `(GMT+08:00) Asia/Shanghai` style timezone string
//! 3. explicit `location_country`
//! 4. `"Unknown"`

use crate::activity::Activity;

/// Label used when nothing better is available.
pub const UNKNOWN_CITY: &str = "Unknown";

/// Continent prefixes recognised in timezone strings, in match order.
/// The flag marks prefixes whose city part uses underscores for spaces.
const CONTINENT_PREFIXES: &[(&str, bool)] = &[
    ("Asia/", false),
    ("Europe/", false),
    ("America/", true),
    ("Australia/", false),
];

/// Derive a location label for an activity.
pub fn extract_city(activity: &Activity) -> String {
    if let Some(city) = non_empty(activity.location_city.as_deref()) {
        return city.to_string();
    }

    if let Some(city) = non_empty(activity.timezone.as_deref()).and_then(city_from_timezone) {
        return city;
    }

    if let Some(country) = non_empty(activity.location_country.as_deref()) {
        return country.to_string();
    }

    UNKNOWN_CITY.to_string()
}

/// Parse the city out of a timezone annotation such as `(GMT-05:00) America/New_York`.
pub fn city_from_timezone(timezone: &str) -> Option<String> {
    CONTINENT_PREFIXES
        .iter()
        .find(|(prefix, _)| timezone.contains(prefix))
        .map(|(prefix, underscores_are_spaces)| {
            // Text after the last occurrence of the prefix
            let tail = timezone.rsplit(prefix).next().unwrap_or_default();
            let city = tail.trim_matches(')');
            if *underscores_are_spaces {
                city.replace('_', " ")
            } else {
                city.to_string()
            }
        })
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

//! SVG calendar visualizations.
//!
//! Two encodings share one input, a [`DailyIntensityMap`]:
//! - [`RadialRenderer`]: a clock face with one angular slice per day whose
//!   length and color follow the day's distance relative to the year's maximum
//! - [`GridRenderer`]: a week-per-column heatmap colored by absolute distance,
//!   in a large standalone layout and a compact layout sized to sit next to
//!   the clock
//!
//! Both render every day of the year, so an empty year still produces a
//! complete figure. Output depends only on the map and the config, so the same
//! input always yields byte-identical markup.
//!
//! ## Example
//! ```rust
//! use fitflow::calendar::DailyIntensityMap;
//! use fitflow::render::{CalendarRenderer, GridConfig, GridRenderer, RadialRenderer};
//!
//! let map = DailyIntensityMap::empty(2024).unwrap();
//! let clock = RadialRenderer::default().render(&map);
//! let heatmap = GridRenderer::new(GridConfig::compact()).render(&map);
//! assert!(clock.ends_with("</svg>"));
//! assert_eq!(heatmap.matches("<rect x=").count(), 366);
//! ```

use crate::calendar::{DailyIntensityMap, DayIntensity};

pub mod grid;
pub mod radial;

pub use grid::{GridConfig, GridRenderer, GridVariant};
pub use radial::{RadialConfig, RadialRenderer};

/// Short month names for grid labels.
pub(crate) const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Full month names for clock labels.
pub(crate) const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

// ============================================================================
// Strategy Traits
// ============================================================================

/// Renders a full-year calendar to SVG markup.
pub trait CalendarRenderer {
    fn render(&self, map: &DailyIntensityMap) -> String;
}

/// Maps a day's intensity to a fill color.
pub trait ColorScale {
    /// `max_distance_km` is the year's largest daily distance, already
    /// guarded against zero by the caller.
    fn color(&self, day: &DayIntensity, max_distance_km: f64) -> &'static str;
}

// ============================================================================
// Color Scales
// ============================================================================

/// Six-step palette keyed by the ratio of a day's distance to the year's maximum.
#[derive(Debug, Clone, Copy, Default)]
pub struct RelativeScale;

/// Upper bounds (exclusive) of the first five relative steps.
const RELATIVE_STEPS: [(f64, &str); 5] = [
    (0.1, "#4bddff"),
    (0.3, "#46fff6"),
    (0.5, "#ffe200"),
    (0.7, "#3effb2"),
    (0.9, "#72ff27"),
];
const RELATIVE_MAX_COLOR: &str = "#ffda00";

impl RelativeScale {
    /// Color for an intensity ratio in 0..=1.
    pub fn ratio_color(ratio: f64) -> &'static str {
        RELATIVE_STEPS
            .iter()
            .find(|(bound, _)| ratio < *bound)
            .map(|(_, color)| *color)
            .unwrap_or(RELATIVE_MAX_COLOR)
    }
}

impl ColorScale for RelativeScale {
    fn color(&self, day: &DayIntensity, max_distance_km: f64) -> &'static str {
        Self::ratio_color(day.distance_km / max_distance_km)
    }
}

/// Eight-step palette keyed by absolute daily kilometers, independent of the year's maximum.
#[derive(Debug, Clone, Copy, Default)]
pub struct AbsoluteScale;

/// Color for days without distance.
pub const EMPTY_DAY_COLOR: &str = "#444444";

/// Upper bounds (exclusive, km) of the non-empty steps below the maximum.
const ABSOLUTE_STEPS: [(f64, &str); 6] = [
    (1.0, "#f4ec5e"),
    (2.0, "#f4ea5c"),
    (3.0, "#fff300"),
    (4.0, "#ffef00"),
    (5.0, "#ffe900"),
    (7.0, "#ffeb00"),
];
const ABSOLUTE_MAX_COLOR: &str = "red";

impl AbsoluteScale {
    /// Color for a daily distance in kilometers.
    pub fn distance_color(distance_km: f64) -> &'static str {
        if distance_km <= 0.0 {
            return EMPTY_DAY_COLOR;
        }
        ABSOLUTE_STEPS
            .iter()
            .find(|(bound, _)| distance_km < *bound)
            .map(|(_, color)| *color)
            .unwrap_or(ABSOLUTE_MAX_COLOR)
    }
}

impl ColorScale for AbsoluteScale {
    fn color(&self, day: &DayIntensity, _max_distance_km: f64) -> &'static str {
        Self::distance_color(day.distance_km)
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Escape text content for inclusion in SVG.
pub(crate) fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Divisor for relative intensity: the year's maximum, or 1 for an all-zero year.
pub(crate) fn intensity_divisor(map: &DailyIntensityMap) -> f64 {
    let max = map.max_distance_km();
    if max > 0.0 {
        max
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_thresholds() {
        assert_eq!(RelativeScale::ratio_color(0.0), "#4bddff");
        assert_eq!(RelativeScale::ratio_color(0.09), "#4bddff");
        assert_eq!(RelativeScale::ratio_color(0.1), "#46fff6");
        assert_eq!(RelativeScale::ratio_color(0.3), "#ffe200");
        assert_eq!(RelativeScale::ratio_color(0.5), "#3effb2");
        assert_eq!(RelativeScale::ratio_color(0.7), "#72ff27");
        assert_eq!(RelativeScale::ratio_color(0.9), "#ffda00");
        assert_eq!(RelativeScale::ratio_color(1.0), "#ffda00");
    }

    #[test]
    fn test_relative_scale_uses_max() {
        let day = DayIntensity {
            distance_km: 5.0,
            count: 1,
        };
        assert_eq!(RelativeScale.color(&day, 10.0), "#3effb2");
        assert_eq!(RelativeScale.color(&day, 5.0), "#ffda00");
    }

    #[test]
    fn test_absolute_thresholds() {
        assert_eq!(AbsoluteScale::distance_color(0.0), EMPTY_DAY_COLOR);
        assert_eq!(AbsoluteScale::distance_color(0.5), "#f4ec5e");
        assert_eq!(AbsoluteScale::distance_color(1.0), "#f4ea5c");
        assert_eq!(AbsoluteScale::distance_color(2.5), "#fff300");
        assert_eq!(AbsoluteScale::distance_color(3.0), "#ffef00");
        assert_eq!(AbsoluteScale::distance_color(4.99), "#ffe900");
        assert_eq!(AbsoluteScale::distance_color(6.9), "#ffeb00");
        assert_eq!(AbsoluteScale::distance_color(7.0), "red");
        assert_eq!(AbsoluteScale::distance_color(42.2), "red");
    }

    #[test]
    fn test_absolute_scale_ignores_max() {
        let day = DayIntensity {
            distance_km: 3.5,
            count: 1,
        };
        assert_eq!(AbsoluteScale.color(&day, 3.5), AbsoluteScale.color(&day, 100.0));
    }

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("a<b & \"c\""), "a&lt;b &amp; &quot;c&quot;");
    }

    #[test]
    fn test_intensity_divisor_never_zero() {
        let map = DailyIntensityMap::empty(2023).unwrap();
        assert_eq!(intensity_divisor(&map), 1.0);
    }
}

//! Timezone resolution and timestamp normalization.
//!
//! A single fixed UTC offset is resolved once per run and then handed to every
//! component that needs local-time interpretation. Nothing here reads global
//! state, so all components of a run observe the same offset.
//!
//! Timestamps come in two flavours:
//! - strings ending in `Z` are UTC and get shifted by the configured offset
//! - everything else is already local wall-clock time and is taken as-is
//!
//! ## Example
//! ```rust
//! use fitflow::TimezoneConfig;
//!
//! let tz = TimezoneConfig::default(); // UTC+8, Asia/Shanghai
//! let local = tz.normalize("2024-01-01T12:00:00Z").unwrap();
//! assert_eq!(local.to_string(), "2024-01-01 20:00:00");
//! ```

use std::path::Path;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use log::{debug, warn};

use crate::config::{DashboardConfig, TimezoneSection};
use crate::error::{FitflowError, OptionExt, Result};

/// Offset applied when no usable configuration exists.
pub const DEFAULT_OFFSET_HOURS: i32 = 8;

/// Zone name paired with [`DEFAULT_OFFSET_HOURS`].
pub const DEFAULT_TIMEZONE_NAME: &str = "Asia/Shanghai";

/// Smallest offset accepted from configuration.
pub const MIN_OFFSET_HOURS: i32 = -12;

/// Largest offset accepted from configuration.
pub const MAX_OFFSET_HOURS: i32 = 14;

/// Formats tried, in order, for timestamps without a zone marker.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Resolved local timezone: whole hours east of UTC plus a display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimezoneConfig {
    offset_hours: i32,
    name: String,
}

impl Default for TimezoneConfig {
    fn default() -> Self {
        Self {
            offset_hours: DEFAULT_OFFSET_HOURS,
            name: DEFAULT_TIMEZONE_NAME.to_string(),
        }
    }
}

impl TimezoneConfig {
    /// Create a timezone with an explicit offset.
    ///
    /// Fails when the offset lies outside -12..=14 hours.
    pub fn new(offset_hours: i32, name: impl Into<String>) -> Result<Self> {
        if !(MIN_OFFSET_HOURS..=MAX_OFFSET_HOURS).contains(&offset_hours) {
            return Err(FitflowError::Config {
                message: format!("timezone offset {} is out of range", offset_hours),
            });
        }
        Ok(Self {
            offset_hours,
            name: name.into(),
        })
    }

    /// Resolve the timezone from a dashboard config file.
    ///
    /// Never fails: a missing or unreadable file, bad JSON, or a missing or
    /// invalid `TIMEZONE` block all fall back to [`TimezoneConfig::default`].
    pub fn resolve(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            debug!(
                "[Timezone] No config at {}, using {}",
                path.display(),
                DEFAULT_TIMEZONE_NAME
            );
            return Self::default();
        }
        match DashboardConfig::load(path) {
            Ok(config) => Self::from_dashboard_config(&config),
            Err(e) => {
                warn!(
                    "[Timezone] Failed to load timezone config from {}: {}",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Resolve the timezone from an already-parsed config, falling back per field.
    pub fn from_dashboard_config(config: &DashboardConfig) -> Self {
        match &config.timezone {
            Some(section) => Self::from_section(section),
            None => Self::default(),
        }
    }

    fn from_section(section: &TimezoneSection) -> Self {
        let offset_hours = match section.offset {
            Some(offset) => match i32::try_from(offset)
                .ok()
                .filter(|o| (MIN_OFFSET_HOURS..=MAX_OFFSET_HOURS).contains(o))
            {
                Some(valid) => valid,
                None => {
                    warn!(
                        "[Timezone] Offset {} out of range, using UTC+{}",
                        offset, DEFAULT_OFFSET_HOURS
                    );
                    return Self::default();
                }
            },
            None => DEFAULT_OFFSET_HOURS,
        };
        let name = section
            .name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| DEFAULT_TIMEZONE_NAME.to_string());

        Self { offset_hours, name }
    }

    /// Hours east of UTC.
    pub fn offset_hours(&self) -> i32 {
        self.offset_hours
    }

    /// Display name of the zone.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Offset rendered as `UTC+8` / `UTC-5`.
    pub fn offset_label(&self) -> String {
        format!("UTC{:+}", self.offset_hours)
    }

    /// Shift a UTC wall-clock value into local time.
    pub fn to_local(&self, utc: NaiveDateTime) -> Option<NaiveDateTime> {
        utc.checked_add_signed(Duration::hours(i64::from(self.offset_hours)))
    }

    /// Today's date in this timezone.
    pub fn today(&self) -> NaiveDate {
        let now = Utc::now().naive_utc();
        self.to_local(now).unwrap_or(now).date()
    }

    /// Convert a raw activity timestamp into local wall-clock time.
    ///
    /// A trailing `Z` marks UTC, which is shifted by the configured offset.
    /// Any other string is already local and is never shifted. Returns `None`
    /// for empty or malformed input.
    pub fn normalize(&self, raw: &str) -> Option<NaiveDateTime> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        match trimmed.strip_suffix(|c: char| c == 'Z' || c == 'z') {
            Some(utc) => parse_naive(utc).and_then(|dt| self.to_local(dt)),
            None => parse_naive(trimmed)
                .or_else(|| {
                    // Explicit numeric offset: keep its own wall clock
                    DateTime::parse_from_rfc3339(trimmed)
                        .ok()
                        .map(|dt| dt.naive_local())
                })
                .or_else(|| {
                    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                        .ok()
                        .and_then(|d| d.and_hms_opt(0, 0, 0))
                }),
        }
    }

    /// Like [`normalize`](Self::normalize), reporting the failure as an error.
    pub fn try_normalize(&self, raw: &str) -> Result<NaiveDateTime> {
        self.normalize(raw).ok_or_timestamp(raw)
    }
}

fn parse_naive(value: &str) -> Option<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

/// Format a local datetime as `YYYY-MM-DD HH:MM:SS`.
pub fn format_local_datetime(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_utc_marker_is_shifted() {
        let tz = TimezoneConfig::default();
        assert_eq!(
            tz.normalize("2024-01-01T12:00:00Z"),
            Some(dt("2024-01-01 20:00:00"))
        );
    }

    #[test]
    fn test_local_string_is_not_shifted() {
        let tz = TimezoneConfig::default();
        assert_eq!(
            tz.normalize("2024-01-01T20:00:00"),
            Some(dt("2024-01-01 20:00:00"))
        );
        assert_eq!(
            tz.normalize("2024-01-01 07:30:00"),
            Some(dt("2024-01-01 07:30:00"))
        );
    }

    #[test]
    fn test_shift_crosses_midnight() {
        let tz = TimezoneConfig::default();
        assert_eq!(
            tz.normalize("2023-12-31T18:30:00Z"),
            Some(dt("2024-01-01 02:30:00"))
        );

        let west = TimezoneConfig::new(-5, "America/New_York").unwrap();
        assert_eq!(
            west.normalize("2024-01-01T03:00:00Z"),
            Some(dt("2023-12-31 22:00:00"))
        );
    }

    #[test]
    fn test_fractional_seconds_and_offsets() {
        let tz = TimezoneConfig::default();
        assert_eq!(
            tz.normalize("2024-03-05T06:07:08.250Z").map(|d| d.date()),
            NaiveDate::from_ymd_opt(2024, 3, 5)
        );
        // Explicit offsets keep their own wall clock
        assert_eq!(
            tz.normalize("2024-03-05T06:07:08+02:00"),
            Some(dt("2024-03-05 06:07:08"))
        );
        assert_eq!(tz.normalize("2024-03-05"), Some(dt("2024-03-05 00:00:00")));
    }

    #[test]
    fn test_malformed_timestamps() {
        let tz = TimezoneConfig::default();
        assert_eq!(tz.normalize(""), None);
        assert_eq!(tz.normalize("   "), None);
        assert_eq!(tz.normalize("yesterday"), None);
        assert_eq!(tz.normalize("2024-13-01T00:00:00Z"), None);
        assert!(matches!(
            tz.try_normalize("nope"),
            Err(FitflowError::Timestamp { .. })
        ));
    }

    #[test]
    fn test_new_rejects_out_of_range() {
        assert!(TimezoneConfig::new(15, "x").is_err());
        assert!(TimezoneConfig::new(-13, "x").is_err());
        assert!(TimezoneConfig::new(-12, "x").is_ok());
    }

    #[test]
    fn test_offset_label() {
        assert_eq!(TimezoneConfig::default().offset_label(), "UTC+8");
        assert_eq!(TimezoneConfig::new(-5, "x").unwrap().offset_label(), "UTC-5");
        assert_eq!(TimezoneConfig::new(0, "UTC").unwrap().offset_label(), "UTC+0");
    }

    #[test]
    fn test_resolve_missing_file_uses_default() {
        let tz = TimezoneConfig::resolve("/nonexistent/fitflow/config.js");
        assert_eq!(tz, TimezoneConfig::default());
    }

    #[test]
    fn test_resolve_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"const CONFIG = {{"TIMEZONE": {{"offset": -3, "name": "America/Sao_Paulo"}}}};"#
        )
        .unwrap();

        let tz = TimezoneConfig::resolve(file.path());
        assert_eq!(tz.offset_hours(), -3);
        assert_eq!(tz.name(), "America/Sao_Paulo");
    }

    #[test]
    fn test_resolve_corrupt_file_uses_default() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "const CONFIG = {{ not json").unwrap();
        assert_eq!(TimezoneConfig::resolve(file.path()), TimezoneConfig::default());
    }

    #[test]
    fn test_partial_section_fallbacks() {
        let config = DashboardConfig::parse(r#"{"TIMEZONE": {"offset": 2}}"#).unwrap();
        let tz = TimezoneConfig::from_dashboard_config(&config);
        assert_eq!(tz.offset_hours(), 2);
        assert_eq!(tz.name(), DEFAULT_TIMEZONE_NAME);

        let config = DashboardConfig::parse(r#"{"TIMEZONE": {"offset": 99, "name": "Mars"}}"#)
            .unwrap();
        assert_eq!(
            TimezoneConfig::from_dashboard_config(&config),
            TimezoneConfig::default()
        );

        let config = DashboardConfig::parse(r#"{"TIMEZONE": {"name": "Asia/Tokyo"}}"#).unwrap();
        let tz = TimezoneConfig::from_dashboard_config(&config);
        assert_eq!(tz.offset_hours(), DEFAULT_OFFSET_HOURS);
        assert_eq!(tz.name(), "Asia/Tokyo");
    }

    #[test]
    fn test_format_local_datetime() {
        assert_eq!(
            format_local_datetime(&dt("2024-07-04 05:06:07")),
            "2024-07-04 05:06:07"
        );
    }
}

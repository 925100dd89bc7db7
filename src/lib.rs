//! # Fitflow
//!
//! Running statistics and calendar visualizations for a personal activity dashboard.
//!
//! This library provides:
//! - Timestamp normalization against one fixed, configurable UTC offset
//! - Per-year and all-time running statistics (pace, heart rate, streaks)
//! - Circular "clock" and week-grid heatmap calendars rendered to SVG
//!
//! ## Features
//!
//! - **`parallel`** - Render per-year artifacts in parallel with rayon
//!
//! ## Quick Start
//!
//! ```rust
//! use fitflow::{parse_activities, Pipeline, RunContext, TimezoneConfig};
//!
//! let json = r#"[
//!     {"id": 1, "type": "Run", "start_date_local": "2024-03-01T07:00:00",
//!      "distance": 10000.0, "moving_time": 3000, "average_heartrate": 150.0},
//!     {"id": 2, "type": "Run", "start_date_local": "2024-03-02T23:30:00Z",
//!      "distance": 5000.0, "moving_time": 1400}
//! ]"#;
//!
//! let activities = parse_activities(json).unwrap();
//! let tz = TimezoneConfig::default();
//! let ctx = RunContext::new(tz, chrono::NaiveDate::from_ymd_opt(2024, 3, 3).unwrap());
//!
//! let artifacts = Pipeline::new(ctx).run(&activities);
//! let summary = &artifacts.summaries["2024"];
//! assert_eq!(summary.total_activities, 2);
//! assert_eq!(summary.avg_heart_rate.to_string(), "150");
//!
//! for (name, contents) in artifacts.file_outputs().unwrap() {
//!     println!("{}: {} bytes", name, contents.len());
//! }
//! ```

// Unified error handling
pub mod error;
pub use error::{FitflowError, OptionExt, Result};

// Dashboard configuration file
pub mod config;
pub use config::DashboardConfig;

// Fixed-offset timezone and timestamp normalization
pub mod timezone;
pub use timezone::{format_local_datetime, TimezoneConfig};

// Activity records
pub mod activity;
pub use activity::{normalize_activities, parse_activities, Activity, NormalizedActivity};

// Location labels
pub mod city;
pub use city::extract_city;

// Display formatting
pub mod format;
pub use format::{format_date, format_duration, format_local_date, format_pace};

// Consecutive-day streaks
pub mod streak;
pub use streak::{activity_streak, calculate_streak};

// Per-year statistics
pub mod stats;
pub use stats::{
    available_years, raw_stats, yearly_summaries, BestPacePolicy, RawStats, YearFilter,
    YearSummary, ALL_KEY,
};

// Full-year daily intensity
pub mod calendar;
pub use calendar::{DailyIntensityMap, DayIntensity};

// SVG calendars
pub mod render;
pub use render::{CalendarRenderer, GridConfig, GridRenderer, RadialConfig, RadialRenderer};

// End-to-end run
pub mod pipeline;
pub use pipeline::{DashboardArtifacts, Pipeline, RunContext, YearVisuals};

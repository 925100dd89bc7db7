//! Per-year running statistics.
//!
//! Activities are normalized, filtered to eligible records (more than 1 km and
//! more than 3 minutes), then bucketed by local calendar year. Two outputs are
//! built from a bucket:
//! - [`YearSummary`]: display strings for the dashboard's yearly cards
//! - [`RawStats`]: unformatted numbers, including the current streak
//!
//! ## Best pace
//! The two outputs deliberately use different best-pace rules, selected with
//! [`BestPacePolicy`]. The summary card reports the fastest eligible activity
//! with no lower bound, falling back to the longest activity. The raw record
//! ignores paces at or below 3:00/km, which are GPS glitches in practice, and
//! reports 0 when nothing qualifies.
//!
//! ## Example
//! ```rust
//! use fitflow::{normalize_activities, yearly_summaries, Activity, TimezoneConfig};
//!
//! let activities = vec![Activity {
//!     id: "1".to_string(),
//!     start_date_local: Some("2024-05-01T07:00:00".to_string()),
//!     distance: Some(10_000.0),
//!     moving_time: Some(3000.0),
//!     ..Default::default()
//! }];
//! let tz = TimezoneConfig::default();
//! let normalized = normalize_activities(&activities, &tz);
//! let summaries = yearly_summaries(&normalized);
//! assert_eq!(summaries["2024"].avg_pace, "5'00\"");
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;
use log::debug;
use serde::{Serialize, Serializer};

use crate::activity::{NormalizedActivity, MIN_ELIGIBLE_DISTANCE_M};
use crate::city::extract_city;
use crate::format::{
    format_distance_km, format_duration, format_local_date, format_pace, round1, NOT_AVAILABLE,
};
use crate::streak::activity_streak;

/// Output key for the all-years selection.
pub const ALL_KEY: &str = "all";

/// Paces at or below this many seconds per km are rejected by [`BestPacePolicy::SanityBounded`].
pub const BEST_PACE_SANITY_FLOOR: f64 = 180.0;

// ============================================================================
// Selection
// ============================================================================

/// Which activities a statistics pass covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearFilter {
    /// A single local calendar year
    Year(i32),
    /// Every year
    All,
}

impl YearFilter {
    pub fn matches(&self, year: i32) -> bool {
        match self {
            YearFilter::Year(y) => *y == year,
            YearFilter::All => true,
        }
    }

    /// Output key: the 4-digit year, or `all`.
    pub fn key(&self) -> String {
        match self {
            YearFilter::Year(y) => y.to_string(),
            YearFilter::All => ALL_KEY.to_string(),
        }
    }
}

/// Rule for picking the best pace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BestPacePolicy {
    /// Fastest activity over 1 km, no lower bound
    Unbounded,
    /// Fastest activity over 1 km whose pace is above [`BEST_PACE_SANITY_FLOOR`]
    SanityBounded,
}

impl BestPacePolicy {
    fn accepts(&self, pace: f64) -> bool {
        match self {
            BestPacePolicy::Unbounded => true,
            BestPacePolicy::SanityBounded => pace > BEST_PACE_SANITY_FLOOR,
        }
    }
}

// ============================================================================
// Year Bucket
// ============================================================================

/// Accumulated eligible activities for one selection.
#[derive(Debug, Clone, Default)]
pub struct YearBucket<'a> {
    /// Contributing activities, in input order
    pub activities: Vec<NormalizedActivity<'a>>,
    pub total_distance_km: f64,
    pub total_time_s: f64,
    pub heart_rates: Vec<f64>,
}

impl<'a> YearBucket<'a> {
    fn push(&mut self, activity: NormalizedActivity<'a>) {
        self.total_distance_km += activity.activity.distance_km();
        self.total_time_s += activity.activity.duration_s();
        if let Some(hr) = activity.activity.heart_rate() {
            self.heart_rates.push(hr);
        }
        self.activities.push(activity);
    }

    pub fn count(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    /// Average pace in seconds per km (0 with no distance).
    pub fn avg_pace(&self) -> f64 {
        if self.total_distance_km > 0.0 {
            self.total_time_s / self.total_distance_km
        } else {
            0.0
        }
    }

    /// Mean over activities that report a heart rate.
    pub fn avg_heart_rate(&self) -> Option<f64> {
        if self.heart_rates.is_empty() {
            None
        } else {
            Some(self.heart_rates.iter().sum::<f64>() / self.heart_rates.len() as f64)
        }
    }

    /// Longest activity by distance; the first one wins a tie.
    pub fn longest(&self) -> Option<&NormalizedActivity<'a>> {
        self.activities.iter().fold(None, |best, a| match best {
            Some(b) if a.activity.distance_m() <= b.activity.distance_m() => Some(b),
            _ => Some(a),
        })
    }

    /// Fastest activity over 1 km under `policy`, with its pace; the first one wins a tie.
    pub fn fastest(&self, policy: BestPacePolicy) -> Option<(&NormalizedActivity<'a>, f64)> {
        self.activities
            .iter()
            .filter(|a| a.activity.distance_m() > MIN_ELIGIBLE_DISTANCE_M)
            .filter_map(|a| a.activity.pace_sec_per_km().map(|pace| (a, pace)))
            .filter(|(_, pace)| policy.accepts(*pace))
            .fold(None, |best, (a, pace)| match best {
                Some((_, best_pace)) if pace >= best_pace => best,
                _ => Some((a, pace)),
            })
    }
}

/// Bucket eligible activities by local year. Years without eligible activities are absent.
pub fn bucket_by_year<'a>(activities: &[NormalizedActivity<'a>]) -> BTreeMap<i32, YearBucket<'a>> {
    let mut buckets: BTreeMap<i32, YearBucket<'a>> = BTreeMap::new();
    for activity in activities.iter().filter(|a| a.activity.is_eligible()) {
        buckets.entry(activity.year()).or_default().push(*activity);
    }
    for (year, bucket) in &buckets {
        debug!(
            "[Stats] {}: {} activities, {:.1} km",
            year,
            bucket.count(),
            bucket.total_distance_km
        );
    }
    buckets
}

/// Collect eligible activities for one selection. `None` when nothing qualifies.
pub fn aggregate<'a>(
    activities: &[NormalizedActivity<'a>],
    filter: YearFilter,
) -> Option<YearBucket<'a>> {
    let mut bucket = YearBucket::default();
    for activity in activities
        .iter()
        .filter(|a| filter.matches(a.year()) && a.activity.is_eligible())
    {
        bucket.push(*activity);
    }
    (!bucket.is_empty()).then_some(bucket)
}

/// Every local year that has at least one normalized activity, ascending.
pub fn available_years(activities: &[NormalizedActivity<'_>]) -> Vec<i32> {
    activities
        .iter()
        .map(|a| a.year())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

// ============================================================================
// Formatted Summary
// ============================================================================

/// Average heart rate for display: whole bpm, or `N/A`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartRateDisplay {
    Bpm(u32),
    NotAvailable,
}

impl HeartRateDisplay {
    fn from_average(avg: Option<f64>) -> Self {
        match avg {
            // Truncated, not rounded
            Some(hr) if hr > 0.0 => HeartRateDisplay::Bpm(hr as u32),
            _ => HeartRateDisplay::NotAvailable,
        }
    }
}

impl fmt::Display for HeartRateDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeartRateDisplay::Bpm(bpm) => write!(f, "{}", bpm),
            HeartRateDisplay::NotAvailable => f.write_str(NOT_AVAILABLE),
        }
    }
}

impl Serialize for HeartRateDisplay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            HeartRateDisplay::Bpm(bpm) => serializer.serialize_u32(*bpm),
            HeartRateDisplay::NotAvailable => serializer.serialize_str(NOT_AVAILABLE),
        }
    }
}

/// Display-ready statistics for one year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearSummary {
    pub total_activities: usize,
    /// Kilometers, rounded to one decimal
    pub total_distance: f64,
    pub avg_pace: String,
    pub best_pace: String,
    pub avg_heart_rate: HeartRateDisplay,

    pub longest_distance: String,
    pub longest_date: String,
    pub longest_duration: String,
    pub longest_pace: String,
    pub longest_city: String,

    pub fastest_pace: String,
    pub fastest_date: String,
    pub fastest_distance: String,
    pub fastest_duration: String,
    pub fastest_city: String,
}

impl YearSummary {
    /// Build the summary for a bucket. `None` for an empty bucket.
    pub fn from_bucket(bucket: &YearBucket<'_>) -> Option<Self> {
        let longest = bucket.longest()?;
        let longest_pace = longest.activity.pace_sec_per_km().unwrap_or(0.0);
        let (fastest, best_pace) = bucket
            .fastest(BestPacePolicy::Unbounded)
            .unwrap_or((longest, longest_pace));

        Some(Self {
            total_activities: bucket.count(),
            total_distance: round1(bucket.total_distance_km),
            avg_pace: format_pace(bucket.avg_pace()),
            best_pace: format_pace(best_pace),
            avg_heart_rate: HeartRateDisplay::from_average(bucket.avg_heart_rate()),

            longest_distance: format_distance_km(longest.activity.distance_m()),
            longest_date: format_local_date(&longest.local),
            longest_duration: format_duration(longest.activity.duration_s()),
            longest_pace: format_pace(longest_pace),
            longest_city: extract_city(longest.activity),

            fastest_pace: format_pace(best_pace),
            fastest_date: format_local_date(&fastest.local),
            fastest_distance: format_distance_km(fastest.activity.distance_m()),
            fastest_duration: format_duration(fastest.activity.duration_s()),
            fastest_city: extract_city(fastest.activity),
        })
    }
}

/// Summaries keyed by year string, for every year with eligible activities.
pub fn yearly_summaries(activities: &[NormalizedActivity<'_>]) -> BTreeMap<String, YearSummary> {
    bucket_by_year(activities)
        .iter()
        .filter_map(|(year, bucket)| {
            YearSummary::from_bucket(bucket).map(|summary| (year.to_string(), summary))
        })
        .collect()
}

// ============================================================================
// Raw Statistics
// ============================================================================

/// Unformatted statistics for one selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RawStats {
    pub total_activities: usize,
    /// Kilometers, unrounded
    pub total_distance: f64,
    /// Seconds
    pub total_time: f64,
    /// Seconds per km
    pub avg_pace: f64,
    /// Seconds per km, sanity-bounded; 0 when nothing qualifies
    pub best_pace: f64,
    /// Mean bpm; 0 without samples
    pub avg_heart_rate: f64,
    /// Current consecutive-day streak
    pub streak: u32,
}

impl RawStats {
    pub fn from_bucket(bucket: &YearBucket<'_>, today: NaiveDate) -> Self {
        Self {
            total_activities: bucket.count(),
            total_distance: bucket.total_distance_km,
            total_time: bucket.total_time_s,
            avg_pace: bucket.avg_pace(),
            best_pace: bucket
                .fastest(BestPacePolicy::SanityBounded)
                .map(|(_, pace)| pace)
                .unwrap_or(0.0),
            avg_heart_rate: bucket.avg_heart_rate().unwrap_or(0.0),
            streak: activity_streak(&bucket.activities, today),
        }
    }
}

/// Raw statistics for a selection; `None` when it has no eligible activities.
pub fn raw_stats(
    activities: &[NormalizedActivity<'_>],
    filter: YearFilter,
    today: NaiveDate,
) -> Option<RawStats> {
    aggregate(activities, filter).map(|bucket| RawStats::from_bucket(&bucket, today))
}

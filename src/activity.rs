//! Activity records and per-record normalization.
//!
//! Records arrive as the raw JSON store written by the sync job (Strava field
//! names). Each record is normalized independently: a record whose timestamp
//! cannot be interpreted is dropped from every date-dependent computation
//! without affecting the rest of the batch.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use log::{debug, warn};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Result;
use crate::timezone::TimezoneConfig;

/// Minimum distance (meters) for an activity to count toward pace statistics.
pub const MIN_ELIGIBLE_DISTANCE_M: f64 = 1000.0;

/// Minimum duration (seconds) for an activity to count toward pace statistics.
pub const MIN_ELIGIBLE_DURATION_S: f64 = 180.0;

/// One recorded exercise session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// Provider activity ID (numeric IDs are kept as their decimal string)
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,
    /// Activity title
    #[serde(default)]
    pub name: Option<String>,
    /// Sport type (Run, Ride, ...)
    #[serde(rename = "type", default)]
    pub sport_type: Option<String>,
    /// Start timestamp, ISO-8601; a trailing `Z` marks UTC
    #[serde(default)]
    pub start_date_local: Option<String>,
    /// Distance in meters
    #[serde(default)]
    pub distance: Option<f64>,
    /// Moving time in seconds
    #[serde(default)]
    pub moving_time: Option<f64>,
    /// Elapsed time in seconds (used when moving time is missing)
    #[serde(default)]
    pub elapsed_time: Option<f64>,
    /// Average heart rate in bpm
    #[serde(default)]
    pub average_heartrate: Option<f64>,
    #[serde(default)]
    pub location_city: Option<String>,
    #[serde(default)]
    pub location_country: Option<String>,
    /// Timezone annotation, e.g. `(GMT+08:00) Asia/Shanghai`
    #[serde(default)]
    pub timezone: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Unsigned(u64),
    Signed(i64),
    Text(String),
}

fn deserialize_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<RawId>::deserialize(deserializer)? {
        Some(RawId::Unsigned(n)) => n.to_string(),
        Some(RawId::Signed(n)) => n.to_string(),
        Some(RawId::Text(s)) => s,
        None => String::new(),
    })
}

impl Activity {
    /// Distance in meters (0 when absent).
    pub fn distance_m(&self) -> f64 {
        self.distance.unwrap_or(0.0)
    }

    /// Distance in kilometers.
    pub fn distance_km(&self) -> f64 {
        self.distance_m() / 1000.0
    }

    /// Authoritative duration in seconds: moving time, else elapsed time.
    pub fn duration_s(&self) -> f64 {
        match self.moving_time {
            Some(t) if t > 0.0 => t,
            _ => self.elapsed_time.unwrap_or(0.0),
        }
    }

    /// Whether the activity passes the distance/duration thresholds for pace statistics.
    pub fn is_eligible(&self) -> bool {
        self.distance_m() > MIN_ELIGIBLE_DISTANCE_M && self.duration_s() > MIN_ELIGIBLE_DURATION_S
    }

    /// Pace in seconds per kilometer, if the activity has a distance.
    pub fn pace_sec_per_km(&self) -> Option<f64> {
        let km = self.distance_km();
        if km > 0.0 {
            Some(self.duration_s() / km)
        } else {
            None
        }
    }

    /// Heart-rate sample, if present. Zero counts as absent.
    pub fn heart_rate(&self) -> Option<f64> {
        self.average_heartrate.filter(|hr| *hr > 0.0)
    }
}

/// An activity paired with its resolved local start time.
#[derive(Debug, Clone, Copy)]
pub struct NormalizedActivity<'a> {
    pub activity: &'a Activity,
    pub local: NaiveDateTime,
}

impl<'a> NormalizedActivity<'a> {
    /// Normalize one record, returning `None` when its timestamp is missing or malformed.
    pub fn new(activity: &'a Activity, tz: &TimezoneConfig) -> Option<Self> {
        let raw = match activity.start_date_local.as_deref() {
            Some(raw) if !raw.trim().is_empty() => raw,
            _ => {
                debug!("[Normalizer] Activity {} has no start date", activity.id);
                return None;
            }
        };
        match tz.try_normalize(raw) {
            Ok(local) => Some(Self { activity, local }),
            Err(e) => {
                warn!("[Normalizer] Skipping activity {}: {}", activity.id, e);
                None
            }
        }
    }

    /// Local calendar year.
    pub fn year(&self) -> i32 {
        self.local.year()
    }

    /// Local calendar date.
    pub fn date(&self) -> NaiveDate {
        self.local.date()
    }
}

/// Normalize a batch, dropping records that fail without aborting the rest.
pub fn normalize_activities<'a>(
    activities: &'a [Activity],
    tz: &TimezoneConfig,
) -> Vec<NormalizedActivity<'a>> {
    let normalized: Vec<_> = activities
        .iter()
        .filter_map(|a| NormalizedActivity::new(a, tz))
        .collect();

    if normalized.len() < activities.len() {
        debug!(
            "[Normalizer] {} of {} activities skipped",
            activities.len() - normalized.len(),
            activities.len()
        );
    }
    normalized
}

/// Decode the raw activity store (a JSON array of records).
///
/// Only a store that is not a JSON array fails. A record that does not decode
/// (wrong field types, `null`) is logged and skipped.
pub fn parse_activities(json: &str) -> Result<Vec<Activity>> {
    let records: Vec<serde_json::Value> = serde_json::from_str(json)?;
    let total = records.len();

    let activities: Vec<Activity> = records
        .into_iter()
        .enumerate()
        .filter_map(|(idx, record)| match serde_json::from_value(record) {
            Ok(activity) => Some(activity),
            Err(e) => {
                warn!("[Normalizer] Skipping record {}: {}", idx, e);
                None
            }
        })
        .collect();

    if activities.len() < total {
        debug!(
            "[Normalizer] Decoded {} of {} records",
            activities.len(),
            total
        );
    }
    Ok(activities)
}

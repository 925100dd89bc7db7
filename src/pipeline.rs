//! One dashboard run: activities in, statistics and SVG artifacts out.
//!
//! A [`RunContext`] freezes the timezone and "today" for the whole run. Every
//! stage reads that one value, so date bucketing, streaks and calendars agree
//! even when per-year rendering runs on the rayon pool.
//!
//! ## Example
//! ```rust
//! use chrono::NaiveDate;
//! use fitflow::{Activity, Pipeline, RunContext, TimezoneConfig};
//!
//! let activities = vec![Activity {
//!     id: "1".to_string(),
//!     start_date_local: Some("2024-05-01T07:00:00".to_string()),
//!     distance: Some(5_000.0),
//!     moving_time: Some(1_500.0),
//!     ..Default::default()
//! }];
//! let today = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
//! let ctx = RunContext::new(TimezoneConfig::default(), today);
//!
//! let artifacts = Pipeline::new(ctx).run(&activities);
//! assert_eq!(artifacts.raw_stats["all"].streak, 1);
//! assert!(artifacts.visuals.contains_key("2024"));
//! ```

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate};
use log::{debug, info, warn};
use serde::Serialize;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::activity::{normalize_activities, Activity, NormalizedActivity};
use crate::calendar::DailyIntensityMap;
use crate::error::Result;
use crate::render::{CalendarRenderer, GridConfig, GridRenderer, RadialConfig, RadialRenderer};
use crate::stats::{
    available_years, raw_stats, yearly_summaries, RawStats, YearFilter, YearSummary, ALL_KEY,
};
use crate::timezone::TimezoneConfig;

/// Frozen per-run inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct RunContext {
    pub timezone: TimezoneConfig,
    /// Local calendar date that streaks count back from
    pub today: NaiveDate,
}

impl RunContext {
    pub fn new(timezone: TimezoneConfig, today: NaiveDate) -> Self {
        Self { timezone, today }
    }

    /// Context for the current moment in the configured timezone.
    pub fn now(timezone: TimezoneConfig) -> Self {
        let today = timezone.today();
        Self { timezone, today }
    }
}

/// The three calendar renderings for one key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearVisuals {
    pub clock: String,
    pub heatmap: String,
    pub compact_heatmap: String,
}

/// Everything a run produces, keyed by year string or [`ALL_KEY`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardArtifacts {
    pub summaries: BTreeMap<String, YearSummary>,
    pub raw_stats: BTreeMap<String, RawStats>,
    pub visuals: BTreeMap<String, YearVisuals>,
}

impl DashboardArtifacts {
    /// `(file_name, contents)` pairs in the dashboard's naming, sorted by kind then key.
    pub fn file_outputs(&self) -> Result<Vec<(String, String)>> {
        let mut files = Vec::with_capacity(1 + self.raw_stats.len() + 3 * self.visuals.len());
        files.push((
            "stats.json".to_string(),
            serde_json::to_string_pretty(&self.summaries)?,
        ));
        for (key, stats) in &self.raw_stats {
            files.push((
                format!("stats_{}.json", key),
                serde_json::to_string_pretty(stats)?,
            ));
        }
        for (key, visuals) in &self.visuals {
            files.push((format!("clock_{}.svg", key), visuals.clock.clone()));
            files.push((format!("heatmap_{}.svg", key), visuals.heatmap.clone()));
            files.push((
                format!("nike_heatmap_{}.svg", key),
                visuals.compact_heatmap.clone(),
            ));
        }
        Ok(files)
    }
}

/// Statistics and visualization run over one frozen context.
#[derive(Debug, Clone)]
pub struct Pipeline {
    ctx: RunContext,
    clock: RadialRenderer,
    heatmap: GridRenderer,
    compact_heatmap: GridRenderer,
}

impl Pipeline {
    pub fn new(ctx: RunContext) -> Self {
        Self::with_clock_size(ctx, RadialConfig::default().size)
    }

    /// Clock of the given size, with the compact heatmap fitted to the same height.
    pub fn with_clock_size(ctx: RunContext, size: f64) -> Self {
        Self {
            ctx,
            clock: RadialRenderer::new(RadialConfig::with_size(size)),
            heatmap: GridRenderer::new(GridConfig::standalone()),
            compact_heatmap: GridRenderer::new(GridConfig::compact_with_height(size)),
        }
    }

    pub fn context(&self) -> &RunContext {
        &self.ctx
    }

    /// Run for every year that has activities.
    pub fn run(&self, activities: &[Activity]) -> DashboardArtifacts {
        let normalized = normalize_activities(activities, &self.ctx.timezone);
        let years = available_years(&normalized);
        self.run_normalized(&normalized, &years)
    }

    /// Run for the given years only. Selected years without data still get
    /// visuals; their statistics are omitted. A year the calendar cannot
    /// represent is skipped with a warning.
    pub fn run_years(&self, activities: &[Activity], years: &[i32]) -> DashboardArtifacts {
        let normalized = normalize_activities(activities, &self.ctx.timezone);
        self.run_normalized(&normalized, years)
    }

    fn run_normalized(
        &self,
        activities: &[NormalizedActivity<'_>],
        years: &[i32],
    ) -> DashboardArtifacts {
        let years: BTreeSet<i32> = years.iter().copied().collect();
        info!(
            "[Pipeline] Starting run: {} activities, {} years, {}, today {}",
            activities.len(),
            years.len(),
            self.ctx.timezone.offset_label(),
            self.ctx.today
        );

        let summaries: BTreeMap<String, YearSummary> = yearly_summaries(activities)
            .into_iter()
            .filter(|(key, _)| key.parse::<i32>().is_ok_and(|y| years.contains(&y)))
            .collect();

        let mut raw: BTreeMap<String, RawStats> = years
            .iter()
            .map(|&year| YearFilter::Year(year))
            .filter_map(|filter| {
                raw_stats(activities, filter, self.ctx.today).map(|stats| (filter.key(), stats))
            })
            .collect();
        // The all-time record is always present, zeroed without data
        raw.insert(
            YearFilter::All.key(),
            raw_stats(activities, YearFilter::All, self.ctx.today).unwrap_or_default(),
        );

        let mut jobs: Vec<(String, i32)> = years.iter().map(|y| (y.to_string(), *y)).collect();
        jobs.push((ALL_KEY.to_string(), self.ctx.today.year()));

        #[cfg(feature = "parallel")]
        let rendered: Vec<_> = jobs
            .par_iter()
            .map(|(key, year)| (key, *year, self.render_year(activities, key, *year)))
            .collect();
        #[cfg(not(feature = "parallel"))]
        let rendered: Vec<_> = jobs
            .iter()
            .map(|(key, year)| (key, *year, self.render_year(activities, key, *year)))
            .collect();

        let visuals: BTreeMap<String, YearVisuals> = rendered
            .into_iter()
            .filter_map(|(key, year, result)| match result {
                Ok(visuals) => Some((key.clone(), visuals)),
                Err(e) => {
                    warn!("[Pipeline] Skipping visuals for {} ({}): {}", key, year, e);
                    None
                }
            })
            .collect();

        info!(
            "[Pipeline] Finished: {} summaries, {} raw records, {} visual sets",
            summaries.len(),
            raw.len(),
            visuals.len()
        );

        DashboardArtifacts {
            summaries,
            raw_stats: raw,
            visuals,
        }
    }

    fn render_year(
        &self,
        activities: &[NormalizedActivity<'_>],
        key: &str,
        year: i32,
    ) -> Result<YearVisuals> {
        let map = DailyIntensityMap::build(activities, year)?;
        debug!(
            "[Pipeline] Rendering {} ({}): {:.1} km",
            key,
            year,
            map.total_distance_km()
        );
        Ok(YearVisuals {
            clock: self.clock.render(&map),
            heatmap: self.heatmap.render(&map),
            compact_heatmap: self.compact_heatmap.render(&map),
        })
    }
}

//! Full-year daily intensity map.
//!
//! The map always holds every date of its year exactly once (365 or 366
//! entries), including days without activity, so visualizations never have
//! to special-case missing dates. Weeks start on Monday.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use crate::activity::NormalizedActivity;
use crate::error::{FitflowError, Result};

/// Distance and activity count for one date.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DayIntensity {
    /// Accumulated distance in kilometers
    pub distance_km: f64,
    /// Number of contributing activities
    pub count: u32,
}

/// A date with its grid position in the year's week layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridDay {
    pub date: NaiveDate,
    /// Week column, 0-based from the week holding January 1st
    pub week: usize,
    /// Weekday row, Monday = 0
    pub row: usize,
    pub intensity: DayIntensity,
}

/// Whether `year` has a February 29th.
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// 365 or 366.
pub fn days_in_year(year: i32) -> u32 {
    if is_leap_year(year) {
        366
    } else {
        365
    }
}

/// Number of days in a month (1-12).
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// Date-keyed distance/count aggregate for one calendar year.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyIntensityMap {
    year: i32,
    first_day: NaiveDate,
    days: BTreeMap<NaiveDate, DayIntensity>,
}

impl DailyIntensityMap {
    /// A map for `year` with every day at zero.
    pub fn empty(year: i32) -> Result<Self> {
        let first_day =
            NaiveDate::from_ymd_opt(year, 1, 1).ok_or(FitflowError::InvalidYear { year })?;
        let days = first_day
            .iter_days()
            .take_while(|d| d.year() == year)
            .map(|d| (d, DayIntensity::default()))
            .collect();
        Ok(Self {
            year,
            first_day,
            days,
        })
    }

    /// Accumulate every normalized activity that falls in `year`.
    ///
    /// All activities count here, eligible for pace statistics or not.
    pub fn build(activities: &[NormalizedActivity<'_>], year: i32) -> Result<Self> {
        let mut map = Self::empty(year)?;
        for activity in activities.iter().filter(|a| a.year() == year) {
            if let Some(day) = map.days.get_mut(&activity.date()) {
                day.distance_km += activity.activity.distance_km();
                day.count += 1;
            }
        }
        Ok(map)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn get(&self, date: NaiveDate) -> Option<&DayIntensity> {
        self.days.get(&date)
    }

    /// Days in calendar order.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, DayIntensity)> + '_ {
        self.days.iter().map(|(d, i)| (*d, *i))
    }

    pub fn total_distance_km(&self) -> f64 {
        self.days.values().map(|d| d.distance_km).sum()
    }

    /// Largest single-day distance (0 for an empty year).
    pub fn max_distance_km(&self) -> f64 {
        self.days
            .values()
            .map(|d| d.distance_km)
            .fold(0.0, f64::max)
    }

    /// Week column and weekday row of a date in this year.
    pub fn grid_position(&self, date: NaiveDate) -> (usize, usize) {
        let offset = self.first_day.weekday().num_days_from_monday() as usize;
        let week = (date.ordinal0() as usize + offset) / 7;
        let row = date.weekday().num_days_from_monday() as usize;
        (week, row)
    }

    /// Number of week columns the year spans (53 or 54).
    pub fn week_count(&self) -> usize {
        self.days
            .keys()
            .next_back()
            .map(|last| self.grid_position(*last).0 + 1)
            .unwrap_or(0)
    }

    /// Every day with its grid position, in calendar order.
    pub fn grid_days(&self) -> Vec<GridDay> {
        self.iter()
            .map(|(date, intensity)| {
                let (week, row) = self.grid_position(date);
                GridDay {
                    date,
                    week,
                    row,
                    intensity,
                }
            })
            .collect()
    }

    /// `(week, month)` for the week in which each month first appears.
    pub fn month_starts(&self) -> Vec<(usize, u32)> {
        self.days
            .keys()
            .filter(|d| d.day() == 1)
            .map(|d| (self.grid_position(*d).0, d.month()))
            .collect()
    }
}

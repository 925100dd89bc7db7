//! Current consecutive-day activity streak.
//!
//! A streak is alive when the most recent active date is today or yesterday;
//! it then counts back one day at a time until the first gap.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::activity::NormalizedActivity;

/// Count the current streak over a set of active dates.
///
/// Several activities on one date count once. `today` is the caller's local date.
pub fn calculate_streak<I>(dates: I, today: NaiveDate) -> u32
where
    I: IntoIterator<Item = NaiveDate>,
{
    let unique: BTreeSet<NaiveDate> = dates.into_iter().collect();
    let mut descending = unique.iter().rev();

    let Some(&latest) = descending.next() else {
        return 0;
    };
    let yesterday = today.pred_opt();
    if latest != today && Some(latest) != yesterday {
        return 0;
    }

    let mut streak = 1;
    let mut previous = latest;
    for &date in descending {
        if previous.pred_opt() != Some(date) {
            break;
        }
        streak += 1;
        previous = date;
    }
    streak
}

/// Current streak over normalized activities.
pub fn activity_streak(activities: &[NormalizedActivity<'_>], today: NaiveDate) -> u32 {
    calculate_streak(activities.iter().map(|a| a.date()), today)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(calculate_streak(Vec::new(), date(2024, 6, 10)), 0);
    }

    #[test]
    fn test_today_only() {
        let today = date(2024, 6, 10);
        assert_eq!(calculate_streak(vec![today], today), 1);
    }

    #[test]
    fn test_today_and_yesterday() {
        let today = date(2024, 6, 10);
        assert_eq!(calculate_streak(vec![today, date(2024, 6, 9)], today), 2);
    }

    #[test]
    fn test_gap_stops_count() {
        let today = date(2024, 6, 10);
        assert_eq!(calculate_streak(vec![today, date(2024, 6, 7)], today), 1);
    }

    #[test]
    fn test_stale_streak_is_zero() {
        let today = date(2024, 6, 10);
        let dates = vec![date(2024, 6, 8), date(2024, 6, 7), date(2024, 6, 6)];
        assert_eq!(calculate_streak(dates, today), 0);
    }

    #[test]
    fn test_streak_from_yesterday_with_duplicates() {
        let today = date(2024, 3, 1);
        // Leap day boundary, duplicates collapse
        let dates = vec![
            date(2024, 2, 29),
            date(2024, 2, 29),
            date(2024, 2, 28),
            date(2024, 2, 27),
            date(2024, 2, 25),
        ];
        assert_eq!(calculate_streak(dates, today), 3);
    }

    #[test]
    fn test_streak_across_year_boundary() {
        let today = date(2024, 1, 1);
        let dates = vec![date(2024, 1, 1), date(2023, 12, 31), date(2023, 12, 30)];
        assert_eq!(calculate_streak(dates, today), 3);
    }
}

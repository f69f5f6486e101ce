//! Trailing one-year recency window.

use chrono::{Datelike, NaiveDate};

use crate::models::RawRecord;

/// First day still inside the window: the same calendar day one year before
/// `today`. Feb 29 has no counterpart in the previous year and rolls over to
/// Mar 1, the way setting the year field on a leap day does.
pub fn window_start(today: NaiveDate) -> NaiveDate {
    let year = today.year() - 1;
    today.with_year(year).unwrap_or_else(|| {
        NaiveDate::from_ymd_opt(year, 3, 1).expect("March 1 exists in every year")
    })
}

/// Keep records watched on or after [`window_start`], preserving order.
pub fn filter_recent(records: Vec<RawRecord>, today: NaiveDate) -> Vec<RawRecord> {
    let start = window_start(today);
    records
        .into_iter()
        .filter(|r| r.watched_date >= start)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WatchKind;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(title: &str, watched: NaiveDate) -> RawRecord {
        RawRecord {
            title: title.into(),
            watched_date: watched,
            kind: WatchKind::Movie,
        }
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let today = date(2024, 3, 15);
        let kept = filter_recent(
            vec![
                record("old", date(2023, 3, 14)),
                record("edge", date(2023, 3, 15)),
                record("new", date(2024, 3, 1)),
            ],
            today,
        );
        let titles: Vec<&str> = kept.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["edge", "new"]);
    }

    #[test]
    fn test_calendar_year_not_fixed_duration() {
        // 2024 is a leap year: 2024-03-15 minus 365 days is 2023-03-16.
        assert_eq!(window_start(date(2024, 3, 15)), date(2023, 3, 15));
        assert_eq!(window_start(date(2025, 1, 1)), date(2024, 1, 1));
    }

    #[test]
    fn test_leap_day_rolls_forward() {
        assert_eq!(window_start(date(2024, 2, 29)), date(2023, 3, 1));
    }

    #[test]
    fn test_preserves_order() {
        let today = date(2024, 6, 1);
        let kept = filter_recent(
            vec![
                record("b", date(2024, 5, 1)),
                record("a", date(2024, 1, 1)),
                record("c", date(2024, 5, 31)),
            ],
            today,
        );
        let titles: Vec<&str> = kept.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["b", "a", "c"]);
    }
}

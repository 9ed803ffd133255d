//! Reporting periods and time buckets.

use std::str::FromStr;

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PeriodError {
    #[error("period start {start} is after end {end}")]
    Inverted { start: NaiveDate, end: NaiveDate },

    #[error("unknown granularity '{0}'; expected day, week, or month")]
    UnknownGranularity(String),
}

/// An inclusive date range. `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Period {
    start: NaiveDate,
    end: NaiveDate,
}

impl Period {
    /// # Errors
    ///
    /// Returns [`PeriodError::Inverted`] if `start` is after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, PeriodError> {
        if start > end {
            return Err(PeriodError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    /// A single-day period.
    #[must_use]
    pub fn day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    #[must_use]
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    #[must_use]
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    #[must_use]
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        self.contains_date(timestamp.date_naive())
    }

    /// Split the period into consecutive buckets that cover it exactly.
    ///
    /// The first and last buckets are clipped to the period edges, so a
    /// weekly split of a period starting on a Wednesday yields a short first
    /// bucket ending on Sunday.
    #[must_use]
    pub fn buckets(&self, granularity: Granularity) -> Vec<Period> {
        let mut out = Vec::new();
        let mut cursor = self.start;
        loop {
            let bucket_end = granularity.bucket_end(cursor).min(self.end);
            out.push(Period {
                start: cursor,
                end: bucket_end,
            });
            match bucket_end.succ_opt() {
                Some(next) if next <= self.end => cursor = next,
                _ => break,
            }
        }
        out
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}..{}", self.start, self.end)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Granularity {
    Day,
    Week,
    Month,
}

impl Granularity {
    /// Last day of the bucket containing `date`. Weeks start on Monday.
    fn bucket_end(self, date: NaiveDate) -> NaiveDate {
        match self {
            Granularity::Day => date,
            Granularity::Week => {
                let remaining = 6 - u64::from(date.weekday().num_days_from_monday());
                date.checked_add_days(Days::new(remaining))
                    .unwrap_or(NaiveDate::MAX)
            }
            Granularity::Month => {
                let (year, month) = if date.month() == 12 {
                    (date.year() + 1, 1)
                } else {
                    (date.year(), date.month() + 1)
                };
                NaiveDate::from_ymd_opt(year, month, 1)
                    .and_then(|first| first.pred_opt())
                    .unwrap_or(NaiveDate::MAX)
            }
        }
    }
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Granularity::Day => write!(f, "day"),
            Granularity::Week => write!(f, "week"),
            Granularity::Month => write!(f, "month"),
        }
    }
}

impl FromStr for Granularity {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" | "daily" => Ok(Granularity::Day),
            "week" | "weekly" => Ok(Granularity::Week),
            "month" | "monthly" => Ok(Granularity::Month),
            _ => Err(PeriodError::UnknownGranularity(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn inverted_period_is_rejected() {
        let err = Period::new(date(2026, 3, 2), date(2026, 3, 1)).unwrap_err();
        assert!(matches!(err, PeriodError::Inverted { .. }));
    }

    #[test]
    fn contains_is_inclusive_on_both_ends() {
        let p = Period::new(date(2026, 1, 1), date(2026, 1, 31)).unwrap();
        assert!(p.contains_date(date(2026, 1, 1)));
        assert!(p.contains_date(date(2026, 1, 31)));
        assert!(!p.contains_date(date(2026, 2, 1)));
    }

    #[test]
    fn monthly_buckets_follow_calendar_months() {
        let p = Period::new(date(2026, 1, 1), date(2026, 3, 31)).unwrap();
        let buckets = p.buckets(Granularity::Month);
        assert_eq!(buckets.len(), 3);
        assert_eq!(buckets[1].start(), date(2026, 2, 1));
        assert_eq!(buckets[1].end(), date(2026, 2, 28));
        assert_eq!(buckets[2].end(), date(2026, 3, 31));
    }

    #[test]
    fn monthly_buckets_cross_year_boundary() {
        let p = Period::new(date(2025, 12, 15), date(2026, 1, 10)).unwrap();
        let buckets = p.buckets(Granularity::Month);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].end(), date(2025, 12, 31));
        assert_eq!(buckets[1].start(), date(2026, 1, 1));
        assert_eq!(buckets[1].end(), date(2026, 1, 10));
    }

    #[test]
    fn weekly_buckets_start_on_monday_and_clip_edges() {
        // 2026-01-07 is a Wednesday.
        let p = Period::new(date(2026, 1, 7), date(2026, 1, 20)).unwrap();
        let buckets = p.buckets(Granularity::Week);
        assert_eq!(buckets.len(), 3);
        assert_eq!(buckets[0].end(), date(2026, 1, 11));
        assert_eq!(buckets[1].start(), date(2026, 1, 12));
        assert_eq!(buckets[1].end(), date(2026, 1, 18));
        assert_eq!(buckets[2].end(), date(2026, 1, 20));
    }

    #[test]
    fn daily_buckets_cover_every_day() {
        let p = Period::new(date(2026, 1, 30), date(2026, 2, 2)).unwrap();
        assert_eq!(p.buckets(Granularity::Day).len(), 4);
    }

    #[test]
    fn single_day_period_has_one_bucket() {
        let p = Period::day(date(2026, 5, 5));
        assert_eq!(p.buckets(Granularity::Month), vec![p]);
    }

    #[test]
    fn granularity_parses_aliases() {
        assert_eq!("Weekly".parse::<Granularity>().unwrap(), Granularity::Week);
        assert!("fortnight".parse::<Granularity>().is_err());
    }
}

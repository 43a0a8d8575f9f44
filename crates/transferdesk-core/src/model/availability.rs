// ── Availability and date periods ──

use std::fmt;

use chrono::{Days, NaiveDate};
use serde::Serialize;
use transferdesk_api::AvailabilityRow;

use crate::error::CoreError;

/// Fleet capacity for one calendar day.
///
/// `is_available` is always `available_vehicles > 0`; constructors
/// recompute it instead of trusting the backend's flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AvailabilityDay {
    pub date: NaiveDate,
    pub available_vehicles: u32,
    pub is_available: bool,
}

impl AvailabilityDay {
    pub fn new(date: NaiveDate, available_vehicles: u32) -> Self {
        Self {
            date,
            available_vehicles,
            is_available: available_vehicles > 0,
        }
    }

    /// Placeholder for a day the backend did not report.
    pub fn unavailable(date: NaiveDate) -> Self {
        Self::new(date, 0)
    }
}

impl From<AvailabilityRow> for AvailabilityDay {
    fn from(row: AvailabilityRow) -> Self {
        // Negative counts would only come from a broken function; treat as none.
        let count = u32::try_from(row.available_vehicles.max(0)).unwrap_or(u32::MAX);
        Self::new(row.date, count)
    }
}

// ── Period ──────────────────────────────────────────────────────────

/// Inclusive date range with `start <= end`.
///
/// Same-day periods are valid. The only way to build one is
/// [`Period::new`], so the ordering invariant holds everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Period {
    start: NaiveDate,
    end: NaiveDate,
}

impl Period {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, CoreError> {
        if end < start {
            return Err(CoreError::validation(format!(
                "end date {end} is before start date {start}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Single-day period.
    pub fn day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of calendar days covered, both ends included.
    pub fn len_days(&self) -> u64 {
        // start <= end, so the difference is non-negative.
        self.end
            .signed_duration_since(self.start)
            .num_days()
            .unsigned_abs()
            + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Every date in the period, ascending.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    /// Window of `days` days after `today`, inclusive of both ends.
    pub fn window(today: NaiveDate, days: u32) -> Self {
        let end = today
            .checked_add_days(Days::new(u64::from(days)))
            .unwrap_or(NaiveDate::MAX);
        Self { start: today, end }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{} to {}", self.start, self.end)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn period_rejects_reversed_range() {
        let err = Period::new(date(2025, 3, 5), date(2025, 3, 1)).unwrap_err();
        assert!(matches!(err, CoreError::ValidationFailed { .. }));
    }

    #[test]
    fn same_day_period_is_one_day_long() {
        let p = Period::new(date(2025, 3, 1), date(2025, 3, 1)).unwrap();
        assert_eq!(p.len_days(), 1);
        assert_eq!(p.to_string(), "2025-03-01");
    }

    #[test]
    fn period_days_are_inclusive() {
        let p = Period::new(date(2025, 2, 27), date(2025, 3, 2)).unwrap();
        let days: Vec<_> = p.days().collect();
        assert_eq!(days.len(), 4);
        assert_eq!(days.first(), Some(&date(2025, 2, 27)));
        assert_eq!(days.last(), Some(&date(2025, 3, 2)));
        assert_eq!(p.to_string(), "2025-02-27 to 2025-03-02");
    }

    #[test]
    fn window_spans_today_plus_days() {
        let w = Period::window(date(2025, 1, 1), 60);
        assert_eq!(w.end(), date(2025, 3, 2));
        assert_eq!(w.len_days(), 61);
    }

    #[test]
    fn row_conversion_recomputes_flag() {
        let row = AvailabilityRow {
            date: date(2025, 3, 1),
            available_vehicles: 0,
            is_available: true,
        };
        let day = AvailabilityDay::from(row);
        assert!(!day.is_available);

        let negative = AvailabilityRow {
            date: date(2025, 3, 1),
            available_vehicles: -3,
            is_available: false,
        };
        assert_eq!(AvailabilityDay::from(negative).available_vehicles, 0);
    }
}

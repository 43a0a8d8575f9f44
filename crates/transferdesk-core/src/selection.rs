// ── Calendar selection state machine ──
//
// Two-click period picker over an immutable list of availability days.
// First available click sets the start, a later-or-equal available click
// completes the period, an earlier one restarts it. Unavailable days
// never change the state.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::trace;

use crate::model::{AvailabilityDay, Period};

/// Selection progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SelectionState {
    #[default]
    Empty,
    Partial {
        start: NaiveDate,
    },
    Complete {
        period: Period,
    },
}

impl SelectionState {
    /// Apply one click. Returns the period when this click completes one.
    pub fn click(&mut self, date: NaiveDate, is_available: bool) -> Option<Period> {
        if !is_available {
            return None;
        }

        match *self {
            Self::Partial { start } if date >= start => {
                let period = Period::new(start, date).ok()?;
                *self = Self::Complete { period };
                Some(period)
            }
            Self::Empty | Self::Partial { .. } | Self::Complete { .. } => {
                *self = Self::Partial { start: date };
                None
            }
        }
    }

    /// Whether `date` should be highlighted.
    ///
    /// True for the start, the end, and any day strictly between them.
    pub fn is_in_selection(&self, date: NaiveDate) -> bool {
        match self {
            Self::Empty => false,
            Self::Partial { start } => date == *start,
            Self::Complete { period } => period.contains(date),
        }
    }

    pub fn start(&self) -> Option<NaiveDate> {
        match self {
            Self::Empty => None,
            Self::Partial { start } => Some(*start),
            Self::Complete { period } => Some(period.start()),
        }
    }

    pub fn end(&self) -> Option<NaiveDate> {
        match self {
            Self::Complete { period } => Some(period.end()),
            Self::Empty | Self::Partial { .. } => None,
        }
    }

    /// The completed period, if any.
    pub fn period(&self) -> Option<Period> {
        match self {
            Self::Complete { period } => Some(*period),
            Self::Empty | Self::Partial { .. } => None,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::Empty;
    }

    /// One-line prompt describing the current selection.
    pub fn status_line(&self) -> Option<String> {
        match self {
            Self::Empty => None,
            Self::Partial { start } => Some(format!("Start date {start}, select the end date")),
            Self::Complete { period } => Some(format!(
                "Selected period: {} to {}",
                period.start(),
                period.end()
            )),
        }
    }
}

// ── Calendar ────────────────────────────────────────────────────────

/// One rendered day of the calendar grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalendarCell {
    pub day: AvailabilityDay,
    pub selected: bool,
}

/// Availability days plus the user's in-progress selection.
///
/// The day list is fixed for the calendar's lifetime; loading new
/// availability means building a new calendar, which starts `Empty`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReservationCalendar {
    days: Vec<AvailabilityDay>,
    selection: SelectionState,
}

impl ReservationCalendar {
    /// `days` must be ascending with one entry per date, as produced by
    /// an [`AvailabilityProvider`](crate::AvailabilityProvider).
    pub fn new(days: Vec<AvailabilityDay>) -> Self {
        Self {
            days,
            selection: SelectionState::Empty,
        }
    }

    pub fn days(&self) -> &[AvailabilityDay] {
        &self.days
    }

    pub fn selection(&self) -> SelectionState {
        self.selection
    }

    pub fn day(&self, date: NaiveDate) -> Option<&AvailabilityDay> {
        self.days
            .binary_search_by_key(&date, |d| d.date)
            .ok()
            .and_then(|idx| self.days.get(idx))
    }

    /// Raw state-machine event.
    pub fn click(&mut self, date: NaiveDate, is_available: bool) -> Option<Period> {
        let completed = self.selection.click(date, is_available);
        trace!(%date, is_available, selection = ?self.selection, "calendar click");
        completed
    }

    /// Click a day using its loaded availability.
    ///
    /// Dates outside the loaded window count as unavailable.
    pub fn click_day(&mut self, date: NaiveDate) -> Option<Period> {
        let is_available = self.day(date).is_some_and(|d| d.is_available);
        self.click(date, is_available)
    }

    pub fn is_in_selection(&self, date: NaiveDate) -> bool {
        self.selection.is_in_selection(date)
    }

    pub fn reset(&mut self) {
        self.selection.reset();
    }

    pub fn status_line(&self) -> Option<String> {
        self.selection.status_line()
    }

    /// Every day with its highlight flag.
    pub fn cells(&self) -> impl Iterator<Item = CalendarCell> + '_ {
        self.days.iter().map(|day| CalendarCell {
            day: *day,
            selected: self.selection.is_in_selection(day.date),
        })
    }

    /// Sunday-first rows of seven cells.
    ///
    /// The first row is padded with `None` up to the weekday of the first
    /// day; the last row is padded after the final day.
    pub fn weeks(&self) -> Vec<[Option<CalendarCell>; 7]> {
        let Some(first) = self.days.first() else {
            return Vec::new();
        };
        let lead = usize::try_from(first.date.weekday().num_days_from_sunday()).unwrap_or(0);

        let padded: Vec<Option<CalendarCell>> = std::iter::repeat_n(None, lead)
            .chain(self.cells().map(Some))
            .collect();

        padded
            .chunks(7)
            .map(|chunk| {
                let mut row = [None; 7];
                for (slot, cell) in row.iter_mut().zip(chunk) {
                    *slot = *cell;
                }
                row
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn calendar() -> ReservationCalendar {
        // 2025-03-01 is a Saturday.
        ReservationCalendar::new(vec![
            AvailabilityDay::new(date(2025, 3, 1), 2),
            AvailabilityDay::new(date(2025, 3, 2), 0),
            AvailabilityDay::new(date(2025, 3, 3), 1),
            AvailabilityDay::new(date(2025, 3, 4), 1),
            AvailabilityDay::new(date(2025, 3, 5), 3),
        ])
    }

    #[test]
    fn two_clicks_complete_a_period() {
        let mut state = SelectionState::Empty;
        assert_eq!(state.click(date(2025, 3, 1), true), None);
        assert_eq!(
            state,
            SelectionState::Partial {
                start: date(2025, 3, 1)
            }
        );

        let period = state.click(date(2025, 3, 5), true).unwrap();
        assert_eq!(period.start(), date(2025, 3, 1));
        assert_eq!(period.end(), date(2025, 3, 5));
        assert_eq!(state.period(), Some(period));
    }

    #[test]
    fn earlier_click_restarts_selection() {
        let mut state = SelectionState::Partial {
            start: date(2025, 3, 10),
        };
        assert_eq!(state.click(date(2025, 3, 5), true), None);
        assert_eq!(
            state,
            SelectionState::Partial {
                start: date(2025, 3, 5)
            }
        );
    }

    #[test]
    fn same_day_completes_single_day_period() {
        let mut state = SelectionState::Empty;
        state.click(date(2025, 3, 1), true);
        let period = state.click(date(2025, 3, 1), true).unwrap();
        assert_eq!(period.len_days(), 1);
    }

    #[test]
    fn unavailable_click_never_transitions() {
        for mut state in [
            SelectionState::Empty,
            SelectionState::Partial {
                start: date(2025, 3, 1),
            },
            SelectionState::Complete {
                period: Period::new(date(2025, 3, 1), date(2025, 3, 3)).unwrap(),
            },
        ] {
            let before = state;
            assert_eq!(state.click(date(2025, 3, 2), false), None);
            assert_eq!(state, before);
        }
    }

    #[test]
    fn click_after_complete_starts_over() {
        let mut state = SelectionState::Complete {
            period: Period::new(date(2025, 3, 1), date(2025, 3, 3)).unwrap(),
        };
        assert_eq!(state.click(date(2025, 3, 9), true), None);
        assert_eq!(state.start(), Some(date(2025, 3, 9)));
        assert_eq!(state.end(), None);
    }

    #[test]
    fn highlight_covers_inclusive_range() {
        let mut cal = calendar();
        cal.click_day(date(2025, 3, 1));
        assert!(cal.is_in_selection(date(2025, 3, 1)));
        assert!(!cal.is_in_selection(date(2025, 3, 3)));

        cal.click_day(date(2025, 3, 4));
        let selected: Vec<_> = cal
            .cells()
            .filter(|c| c.selected)
            .map(|c| c.day.date)
            .collect();
        assert_eq!(
            selected,
            vec![
                date(2025, 3, 1),
                date(2025, 3, 2),
                date(2025, 3, 3),
                date(2025, 3, 4)
            ]
        );
    }

    #[test]
    fn click_day_uses_loaded_availability() {
        let mut cal = calendar();
        cal.click_day(date(2025, 3, 2));
        assert_eq!(cal.selection(), SelectionState::Empty);

        // Outside the loaded window.
        cal.click_day(date(2025, 4, 1));
        assert_eq!(cal.selection(), SelectionState::Empty);
    }

    #[test]
    fn reset_clears_selection() {
        let mut cal = calendar();
        cal.click_day(date(2025, 3, 1));
        cal.click_day(date(2025, 3, 3));
        cal.reset();
        assert_eq!(cal.selection(), SelectionState::Empty);
        assert_eq!(cal.status_line(), None);
    }

    #[test]
    fn status_line_follows_state() {
        let mut cal = calendar();
        cal.click_day(date(2025, 3, 1));
        assert_eq!(
            cal.status_line().as_deref(),
            Some("Start date 2025-03-01, select the end date")
        );
        cal.click_day(date(2025, 3, 5));
        assert_eq!(
            cal.status_line().as_deref(),
            Some("Selected period: 2025-03-01 to 2025-03-05")
        );
    }

    #[test]
    fn weeks_are_sunday_first_and_padded() {
        let weeks = calendar().weeks();
        assert_eq!(weeks.len(), 2);

        // Saturday lands in the last column of the first row.
        let first = weeks[0];
        assert!(first[..6].iter().all(Option::is_none));
        assert_eq!(first[6].unwrap().day.date, date(2025, 3, 1));

        // Sunday 2025-03-02 opens the second row.
        let second = weeks[1];
        assert_eq!(second[0].unwrap().day.date, date(2025, 3, 2));
        assert_eq!(second[3].unwrap().day.date, date(2025, 3, 5));
        assert!(second[4..].iter().all(Option::is_none));
    }

    #[test]
    fn empty_calendar_has_no_weeks() {
        assert!(ReservationCalendar::default().weeks().is_empty());
    }
}

// ── Availability provider ──
//
// Fetches per-day vehicle capacity for a date range. Whatever the
// backend returns (gaps, duplicates, out-of-range rows, any order), the
// provider hands back exactly one `AvailabilityDay` per calendar day of
// the requested range, ascending.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, warn};
use transferdesk_api::RestClient;

use crate::error::CoreError;
use crate::model::{AvailabilityDay, Period};

/// Days after today shown in the reservation calendar.
pub const DEFAULT_WINDOW_DAYS: u32 = 60;

/// Largest window, in days after the first, a single fetch may cover.
pub const MAX_WINDOW_DAYS: u32 = 366;

/// Source of per-day vehicle availability.
///
/// Implementors supply raw rows through [`fetch_rows`](Self::fetch_rows);
/// the provided [`fetch_range`](Self::fetch_range) validates the range
/// and normalises the result, so every provider upholds the one-row-per-day
/// contract.
pub trait AvailabilityProvider: Send + Sync {
    /// Raw rows for `start..=end`, in whatever shape the source produces.
    fn fetch_rows(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> impl Future<Output = Result<Vec<AvailabilityDay>, CoreError>> + Send;

    /// One day per date in `start..=end`, ascending.
    ///
    /// Fails with `ValidationFailed` before any I/O when `start > end` or
    /// when the range spans more than [`MAX_WINDOW_DAYS`] days past `start`.
    fn fetch_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> impl Future<Output = Result<Vec<AvailabilityDay>, CoreError>> + Send {
        async move {
            let period = Period::new(start, end)?;
            if period.len_days() > u64::from(MAX_WINDOW_DAYS) + 1 {
                return Err(CoreError::validation(format!(
                    "{period} spans {} days, more than the {MAX_WINDOW_DAYS}-day limit",
                    period.len_days()
                )));
            }
            let rows = self.fetch_rows(start, end).await?;
            Ok(normalize_days(period, rows))
        }
    }

    /// Today plus the following `days` days.
    fn fetch_window(
        &self,
        today: NaiveDate,
        days: u32,
    ) -> impl Future<Output = Result<Vec<AvailabilityDay>, CoreError>> + Send {
        let window = Period::window(today, days);
        self.fetch_range(window.start(), window.end())
    }
}

/// Coerce backend rows into exactly one entry per day of `period`.
///
/// Rows outside the period are dropped, the first row for a duplicated
/// date wins, and missing dates become unavailable days.
pub fn normalize_days(
    period: Period,
    rows: impl IntoIterator<Item = AvailabilityDay>,
) -> Vec<AvailabilityDay> {
    let mut by_date = BTreeMap::new();
    let mut dropped = 0_usize;
    for row in rows {
        if period.contains(row.date) {
            by_date.entry(row.date).or_insert(row);
        } else {
            dropped += 1;
        }
    }
    if dropped > 0 {
        debug!(dropped, %period, "ignoring availability rows outside the range");
    }

    period
        .days()
        .map(|date| {
            by_date.remove(&date).map_or_else(
                || AvailabilityDay::unavailable(date),
                |d| AvailabilityDay::new(d.date, d.available_vehicles),
            )
        })
        .collect()
}

// ── REST-backed provider ─────────────────────────────────────────────

/// Calls the backend's `check_vehicle_availability` function.
#[derive(Clone)]
pub struct RestAvailability {
    client: Arc<RestClient>,
}

impl RestAvailability {
    pub fn new(client: Arc<RestClient>) -> Self {
        Self { client }
    }
}

impl AvailabilityProvider for RestAvailability {
    async fn fetch_rows(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AvailabilityDay>, CoreError> {
        let rows = self
            .client
            .check_vehicle_availability(start, end)
            .await
            .inspect_err(|e| warn!(error = %e, %start, %end, "availability lookup failed"))?;
        debug!(rows = rows.len(), %start, %end, "availability fetched");
        Ok(rows.into_iter().map(AvailabilityDay::from).collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use pretty_assertions::assert_eq;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Returns a fixed set of rows and counts calls.
    struct FixedRows {
        rows: Vec<AvailabilityDay>,
        calls: AtomicUsize,
    }

    impl FixedRows {
        fn new(rows: Vec<AvailabilityDay>) -> Self {
            Self {
                rows,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl AvailabilityProvider for FixedRows {
        async fn fetch_rows(
            &self,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<Vec<AvailabilityDay>, CoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.rows.clone())
        }
    }

    #[tokio::test]
    async fn range_yields_one_day_per_date_in_order() {
        let provider = FixedRows::new(vec![
            AvailabilityDay::new(date(2025, 3, 3), 1),
            AvailabilityDay::new(date(2025, 3, 1), 2),
            AvailabilityDay::new(date(2025, 3, 1), 9),
            AvailabilityDay::new(date(2025, 2, 28), 4),
            AvailabilityDay::new(date(2025, 3, 9), 4),
        ]);

        let days = provider
            .fetch_range(date(2025, 3, 1), date(2025, 3, 4))
            .await
            .unwrap();

        let summary: Vec<_> = days
            .iter()
            .map(|d| (d.date, d.available_vehicles, d.is_available))
            .collect();
        assert_eq!(
            summary,
            vec![
                (date(2025, 3, 1), 2, true),
                (date(2025, 3, 2), 0, false),
                (date(2025, 3, 3), 1, true),
                (date(2025, 3, 4), 0, false),
            ]
        );
    }

    #[tokio::test]
    async fn empty_result_fills_every_day_as_unavailable() {
        let provider = FixedRows::new(Vec::new());
        let days = provider
            .fetch_range(date(2025, 3, 1), date(2025, 3, 1))
            .await
            .unwrap();
        assert_eq!(days, vec![AvailabilityDay::unavailable(date(2025, 3, 1))]);
    }

    #[tokio::test]
    async fn reversed_range_fails_without_fetching() {
        let provider = FixedRows::new(Vec::new());
        let err = provider
            .fetch_range(date(2025, 3, 2), date(2025, 3, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationFailed { .. }));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn oversized_range_fails_without_fetching() {
        let provider = FixedRows::new(Vec::new());
        let err = provider
            .fetch_window(date(2025, 1, 1), u32::MAX)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationFailed { .. }));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);

        let days = provider
            .fetch_window(date(2025, 1, 1), MAX_WINDOW_DAYS)
            .await
            .unwrap();
        assert_eq!(days.len(), 367);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn window_covers_sixty_one_days() {
        let provider = FixedRows::new(Vec::new());
        let days = provider
            .fetch_window(date(2025, 1, 1), DEFAULT_WINDOW_DAYS)
            .await
            .unwrap();
        assert_eq!(days.len(), 61);
        assert_eq!(days.last().unwrap().date, date(2025, 3, 2));
    }
}

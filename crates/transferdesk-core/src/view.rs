// ── Reservation list view-model ──
//
// Observable load state for the agency's request list. Consumers read a
// snapshot or subscribe to changes through a `watch` channel. Each
// refresh takes a generation token, so only the newest refresh may
// publish its outcome.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::generation::RequestGeneration;
use crate::model::PackageReservation;
use crate::reservation::{ReservationService, ReservationStore};

/// Outcome of an asynchronous load.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState<T> {
    #[default]
    Loading,
    Failed(String),
    Ready(T),
}

impl<T> LoadState<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::Loading | Self::Failed(_) => None,
        }
    }
}

/// What the reservation list currently shows.
///
/// `Failed` and `Empty` are distinct: an error is never rendered as
/// "no reservations yet".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ListState {
    #[default]
    Loading,
    Failed(String),
    Empty,
    Loaded(Arc<Vec<PackageReservation>>),
}

impl ListState {
    pub fn rows(&self) -> &[PackageReservation] {
        match self {
            Self::Loaded(rows) => rows,
            Self::Loading | Self::Failed(_) | Self::Empty => &[],
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

/// Observable reservation list.
pub struct ReservationListView {
    state: watch::Sender<ListState>,
    generation: RequestGeneration,
}

impl Default for ReservationListView {
    fn default() -> Self {
        Self::new()
    }
}

impl ReservationListView {
    /// Starts in `Loading` until the first refresh resolves.
    pub fn new() -> Self {
        let (state, _) = watch::channel(ListState::Loading);
        Self {
            state,
            generation: RequestGeneration::new(),
        }
    }

    /// Current snapshot.
    pub fn state(&self) -> ListState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ListState> {
        self.state.subscribe()
    }

    /// Reload the agency's requests.
    ///
    /// Returns the state this refresh published, or `None` when a newer
    /// refresh started while this one was in flight and its result was
    /// discarded.
    pub async fn refresh<S: ReservationStore>(
        &self,
        service: &ReservationService<S>,
        agency_id: &str,
    ) -> Option<ListState> {
        let token = self.generation.begin();
        self.state.send_replace(ListState::Loading);

        let result = service.list_reservations(agency_id).await;
        if !self.generation.is_current(token) {
            debug!(?token, "discarding stale reservation list response");
            return None;
        }

        let next = match result {
            Ok(rows) if rows.is_empty() => ListState::Empty,
            Ok(rows) => ListState::Loaded(Arc::new(rows)),
            Err(e) => {
                warn!(error = %e, "could not load reservations");
                ListState::Failed(e.to_string())
            }
        };
        self.state.send_replace(next.clone());
        Some(next)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::future::Future;
    use std::sync::Mutex;

    use chrono::NaiveDate;
    use tokio::sync::oneshot;
    use tokio_test::{assert_pending, assert_ready, task};

    use super::*;
    use crate::error::CoreError;
    use crate::model::{NewReservation, ReservationId, ReservationStatus};
    use crate::reservation::memory::MemoryStore;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    async fn seeded() -> ReservationService<MemoryStore> {
        let service = ReservationService::new(MemoryStore::default());
        service
            .create_reservation("Tour", date(1), date(2), None, "A1")
            .await
            .unwrap();
        service
    }

    #[tokio::test]
    async fn starts_loading_then_shows_rows() {
        let view = ReservationListView::new();
        assert!(view.state().is_loading());

        let service = seeded().await;
        let state = view.refresh(&service, "A1").await.unwrap();
        assert_eq!(state.rows().len(), 1);
        assert_eq!(view.state(), state);
    }

    #[tokio::test]
    async fn no_rows_is_empty_and_no_agency_is_empty() {
        let view = ReservationListView::new();
        let service = seeded().await;

        assert_eq!(view.refresh(&service, "B2").await, Some(ListState::Empty));
        assert_eq!(view.refresh(&service, "").await, Some(ListState::Empty));
    }

    #[tokio::test]
    async fn failure_is_distinct_from_empty() {
        let view = ReservationListView::new();
        let service = seeded().await;
        service.store().fail_next("connection reset");

        let state = view.refresh(&service, "A1").await.unwrap();
        assert!(matches!(state, ListState::Failed(ref msg) if msg.contains("connection reset")));
    }

    #[tokio::test]
    async fn subscribers_observe_transitions() {
        let view = ReservationListView::new();
        let mut rx = view.subscribe();
        let service = seeded().await;

        view.refresh(&service, "A1").await;
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().rows().len(), 1);
    }

    /// Store whose listings block until the test releases them, in order.
    struct GatedStore {
        gates: Mutex<Vec<oneshot::Receiver<Vec<PackageReservation>>>>,
    }

    impl ReservationStore for GatedStore {
        fn insert(
            &self,
            _reservation: &NewReservation,
        ) -> impl Future<Output = Result<ReservationId, CoreError>> + Send {
            async { Err(CoreError::Internal("read-only".into())) }
        }

        fn list_for_agency(
            &self,
            _agency_id: &str,
        ) -> impl Future<Output = Result<Vec<PackageReservation>, CoreError>> + Send {
            let gate = self.gates.lock().unwrap().remove(0);
            async move { gate.await.map_err(|e| CoreError::Internal(e.to_string())) }
        }

        fn get(
            &self,
            _id: &ReservationId,
        ) -> impl Future<Output = Result<Option<PackageReservation>, CoreError>> + Send {
            async { Ok(None) }
        }

        fn update_status(
            &self,
            _id: &ReservationId,
            _from: ReservationStatus,
            _to: ReservationStatus,
        ) -> impl Future<Output = Result<Option<PackageReservation>, CoreError>> + Send {
            async { Ok(None) }
        }
    }

    #[tokio::test]
    async fn stale_response_never_overwrites_newer_state() {
        let (old_tx, old_rx) = oneshot::channel();
        let (new_tx, new_rx) = oneshot::channel();
        let service = ReservationService::new(GatedStore {
            gates: Mutex::new(vec![old_rx, new_rx]),
        });
        let view = ReservationListView::new();

        let fresh = seeded().await.store().rows();

        // Start both requests (older first), then resolve the newer one first.
        let mut older = task::spawn(view.refresh(&service, "A1"));
        let mut newer = task::spawn(view.refresh(&service, "A1"));
        assert_pending!(older.poll());
        assert_pending!(newer.poll());

        new_tx.send(fresh.clone()).unwrap();
        let applied = assert_ready!(newer.poll());
        old_tx.send(Vec::new()).unwrap();
        let discarded = assert_ready!(older.poll());

        assert_eq!(applied.unwrap().rows(), fresh.as_slice());
        assert_eq!(discarded, None);
        assert_eq!(view.state().rows(), fresh.as_slice());
    }
}

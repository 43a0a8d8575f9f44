// ── Portal facade ──
//
// One agency session's view of the reservation flow: load availability,
// pick a period on the calendar, submit it, and keep the request list
// current. Staff sessions additionally moderate requests.

use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::Mutex;
use tracing::{debug, info};
use transferdesk_api::{ApiKeys, RestClient};

use crate::availability::{AvailabilityProvider, RestAvailability};
use crate::config::PortalConfig;
use crate::error::CoreError;
use crate::generation::RequestGeneration;
use crate::model::{
    AvailabilityDay, NewReservation, PackageReservation, Period, ReservationId, SessionContext,
};
use crate::moderation::ModerationAction;
use crate::reservation::{ReservationService, ReservationStore, RestReservationStore};
use crate::selection::{ReservationCalendar, SelectionState};
use crate::view::{ListState, LoadState, ReservationListView};

type SubmittedHook = Box<dyn Fn(&ReservationId) + Send + Sync>;

/// Entry point for consumers.
///
/// Cheaply cloneable via `Arc<PortalInner>`. Calendar and list state are
/// owned by this portal and never shared across sessions.
pub struct Portal<P, S> {
    inner: Arc<PortalInner<P, S>>,
}

impl<P, S> Clone for Portal<P, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct PortalInner<P, S> {
    session: SessionContext,
    window_days: u32,
    provider: P,
    service: ReservationService<S>,
    calendar: Mutex<LoadState<ReservationCalendar>>,
    availability_generation: RequestGeneration,
    reservations: ReservationListView,
    on_submitted: Mutex<Vec<SubmittedHook>>,
}

impl Portal<RestAvailability, RestReservationStore> {
    /// Build a REST-backed portal. Does not perform any request.
    pub fn connect(config: &PortalConfig, session: SessionContext) -> Result<Self, CoreError> {
        let mut keys = ApiKeys::anonymous(config.anon_key.clone());
        if let Some(token) = &session.access_token {
            keys = keys.with_access_token(token.clone());
        }

        let client = Arc::new(RestClient::new(
            config.url.as_str(),
            &keys,
            &config.transport(),
        )?);
        debug!(base_url = %client.base_url(), user = %session.user_id, "portal client ready");

        Ok(Self::new(
            session,
            config.window_days,
            RestAvailability::new(Arc::clone(&client)),
            RestReservationStore::new(client),
        ))
    }
}

impl<P: AvailabilityProvider, S: ReservationStore> Portal<P, S> {
    pub fn new(session: SessionContext, window_days: u32, provider: P, store: S) -> Self {
        Self {
            inner: Arc::new(PortalInner {
                session,
                window_days,
                provider,
                service: ReservationService::new(store),
                calendar: Mutex::new(LoadState::Loading),
                availability_generation: RequestGeneration::new(),
                reservations: ReservationListView::new(),
                on_submitted: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn session(&self) -> &SessionContext {
        &self.inner.session
    }

    /// Days after the first day covered by [`load_availability`](Self::load_availability).
    pub fn window_days(&self) -> u32 {
        self.inner.window_days
    }

    pub fn provider(&self) -> &P {
        &self.inner.provider
    }

    pub fn service(&self) -> &ReservationService<S> {
        &self.inner.service
    }

    pub fn reservations(&self) -> &ReservationListView {
        &self.inner.reservations
    }

    // ── Availability and calendar ────────────────────────────────────

    /// Load the availability window starting at `today`.
    ///
    /// A successful load replaces the calendar, which clears any selection.
    /// Results of a load superseded by a newer one are dropped.
    pub async fn load_availability(&self, today: NaiveDate) -> Result<(), CoreError> {
        let token = self.inner.availability_generation.begin();
        *self.inner.calendar.lock().await = LoadState::Loading;

        let result = self
            .inner
            .provider
            .fetch_window(today, self.inner.window_days)
            .await;

        if !self.inner.availability_generation.is_current(token) {
            debug!(?token, "discarding stale availability response");
            return Ok(());
        }

        let mut calendar = self.inner.calendar.lock().await;
        match result {
            Ok(days) => {
                debug!(days = days.len(), %today, "availability loaded");
                *calendar = LoadState::Ready(ReservationCalendar::new(days));
                Ok(())
            }
            Err(e) => {
                *calendar = LoadState::Failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Snapshot of the calendar state.
    pub async fn calendar(&self) -> LoadState<ReservationCalendar> {
        self.inner.calendar.lock().await.clone()
    }

    /// Loaded days, empty until availability has loaded.
    pub async fn days(&self) -> Vec<AvailabilityDay> {
        self.inner
            .calendar
            .lock()
            .await
            .ready()
            .map(|c| c.days().to_vec())
            .unwrap_or_default()
    }

    /// Click a calendar day. Returns the period when the click completes one.
    pub async fn click_day(&self, date: NaiveDate) -> Result<Option<Period>, CoreError> {
        let mut calendar = self.inner.calendar.lock().await;
        match &mut *calendar {
            LoadState::Ready(calendar) => Ok(calendar.click_day(date)),
            LoadState::Loading | LoadState::Failed(_) => Err(CoreError::validation(
                "availability has not been loaded yet",
            )),
        }
    }

    pub async fn selection(&self) -> SelectionState {
        self.inner
            .calendar
            .lock()
            .await
            .ready()
            .map(ReservationCalendar::selection)
            .unwrap_or_default()
    }

    pub async fn reset_selection(&self) {
        if let LoadState::Ready(calendar) = &mut *self.inner.calendar.lock().await {
            calendar.reset();
        }
    }

    // ── Submission ───────────────────────────────────────────────────

    /// Register a callback fired after every successful submission.
    pub async fn on_submitted<F>(&self, hook: F)
    where
        F: Fn(&ReservationId) + Send + Sync + 'static,
    {
        self.inner.on_submitted.lock().await.push(Box::new(hook));
    }

    /// Submit the completed selection as a reservation request.
    ///
    /// On success the selection is cleared, submission hooks run, and the
    /// reservation list is refreshed.
    pub async fn submit(
        &self,
        title: &str,
        observation: Option<&str>,
    ) -> Result<ReservationId, CoreError> {
        let agency_id = self.inner.session.require_agency()?;
        let period = self
            .selection()
            .await
            .period()
            .ok_or_else(|| CoreError::validation("select a start and an end date first"))?;

        let reservation = NewReservation::new(title, period, observation, agency_id)?;
        let id = self.inner.service.submit(&reservation).await?;
        info!(%id, user = self.inner.session.display_name(), "reservation request submitted");

        self.reset_selection().await;
        for hook in self.inner.on_submitted.lock().await.iter() {
            hook(&id);
        }
        self.refresh_reservations().await;
        Ok(id)
    }

    // ── Reservation list ─────────────────────────────────────────────

    /// Reload the session's request list and return the resulting state.
    ///
    /// When a newer refresh overtook this one, the current state is
    /// returned instead.
    pub async fn refresh_reservations(&self) -> ListState {
        let agency_id = self.inner.session.agency_id();
        match self
            .inner
            .reservations
            .refresh(&self.inner.service, agency_id)
            .await
        {
            Some(state) => state,
            None => self.inner.reservations.state(),
        }
    }

    // ── Moderation ───────────────────────────────────────────────────

    /// Confirm or cancel a request (staff sessions only).
    pub async fn moderate(
        &self,
        id: &ReservationId,
        action: ModerationAction,
    ) -> Result<PackageReservation, CoreError> {
        let updated = self
            .inner
            .service
            .moderate(&self.inner.session, id, action)
            .await?;
        info!(
            %id,
            status = %updated.status,
            by = self.inner.session.display_name(),
            "moderation applied"
        );
        Ok(updated)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::reservation::memory::MemoryStore;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    /// Every day available except the 2nd of each month.
    struct MostlyAvailable;

    impl AvailabilityProvider for MostlyAvailable {
        async fn fetch_rows(
            &self,
            start: NaiveDate,
            end: NaiveDate,
        ) -> Result<Vec<AvailabilityDay>, CoreError> {
            use chrono::Datelike;
            Ok(Period::new(start, end)?
                .days()
                .map(|d| AvailabilityDay::new(d, u32::from(d.day() != 2)))
                .collect())
        }
    }

    struct Unreachable;

    impl AvailabilityProvider for Unreachable {
        async fn fetch_rows(
            &self,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<Vec<AvailabilityDay>, CoreError> {
            Err(CoreError::ConnectionFailed {
                url: "http://localhost".into(),
                reason: "refused".into(),
            })
        }
    }

    fn portal() -> Portal<MostlyAvailable, MemoryStore> {
        Portal::new(
            SessionContext::agency("u1", "A1"),
            30,
            MostlyAvailable,
            MemoryStore::default(),
        )
    }

    #[tokio::test]
    async fn full_flow_submits_clears_selection_and_refreshes() {
        let portal = portal();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        portal
            .on_submitted(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .await;

        portal.load_availability(date(1)).await.unwrap();
        assert_eq!(portal.days().await.len(), 31);

        assert_eq!(portal.click_day(date(3)).await.unwrap(), None);
        let period = portal.click_day(date(6)).await.unwrap().unwrap();
        assert_eq!(period.len_days(), 4);

        let id = portal.submit("Tour X", Some("Group of 12")).await.unwrap();

        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(portal.selection().await, SelectionState::Empty);
        let state = portal.reservations().state();
        assert_eq!(state.rows().len(), 1);
        assert_eq!(state.rows()[0].id, id);
    }

    #[tokio::test]
    async fn unavailable_day_is_ignored() {
        let portal = portal();
        portal.load_availability(date(1)).await.unwrap();
        assert_eq!(portal.click_day(date(2)).await.unwrap(), None);
        assert_eq!(portal.selection().await, SelectionState::Empty);
    }

    #[tokio::test]
    async fn submit_without_complete_selection_fails() {
        let portal = portal();
        portal.load_availability(date(1)).await.unwrap();
        portal.click_day(date(3)).await.unwrap();

        let err = portal.submit("Tour X", None).await.unwrap_err();
        assert!(matches!(err, CoreError::ValidationFailed { .. }));
        assert_eq!(
            portal.service().store().inserts.load(Ordering::SeqCst),
            0
        );
    }

    #[tokio::test]
    async fn failed_submission_keeps_selection() {
        let portal = portal();
        portal.load_availability(date(1)).await.unwrap();
        portal.click_day(date(3)).await.unwrap();
        portal.click_day(date(4)).await.unwrap();
        portal.service().store().fail_next("constraint");

        assert!(portal.submit("Tour X", None).await.is_err());
        assert!(portal.selection().await.period().is_some());
    }

    #[tokio::test]
    async fn click_before_load_is_rejected() {
        let portal = portal();
        assert!(portal.click_day(date(3)).await.is_err());
    }

    #[tokio::test]
    async fn failed_load_is_reported_not_empty() {
        let portal = Portal::new(
            SessionContext::agency("u1", "A1"),
            30,
            Unreachable,
            MemoryStore::default(),
        );
        let err = portal.load_availability(date(1)).await.unwrap_err();
        assert!(matches!(err, CoreError::ConnectionFailed { .. }));
        assert!(matches!(portal.calendar().await, LoadState::Failed(_)));
    }

    #[tokio::test]
    async fn session_without_agency_cannot_submit_and_lists_nothing() {
        let portal = Portal::new(
            SessionContext {
                user_id: "staff".into(),
                is_admin: true,
                ..SessionContext::default()
            },
            30,
            MostlyAvailable,
            MemoryStore::default(),
        );
        portal.load_availability(date(1)).await.unwrap();
        portal.click_day(date(3)).await.unwrap();
        portal.click_day(date(4)).await.unwrap();

        assert!(matches!(
            portal.submit("Tour", None).await,
            Err(CoreError::ValidationFailed { .. })
        ));
        assert_eq!(portal.refresh_reservations().await, ListState::Empty);
        assert_eq!(portal.service().store().lists.load(Ordering::SeqCst), 0);
    }
}

// ── Reservation submission and listing ──
//
// `ReservationService` owns the business rules (boundary validation,
// empty-agency short-circuit, logging); persistence sits behind the
// `ReservationStore` trait so the rules can be exercised without HTTP.

use std::future::Future;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, warn};
use transferdesk_api::RestClient;

use crate::error::CoreError;
use crate::model::{
    NewReservation, PackageReservation, Period, ReservationId, ReservationStatus,
};

/// Persistence for package requests.
pub trait ReservationStore: Send + Sync {
    /// Insert a pending request and return the generated id.
    fn insert(
        &self,
        reservation: &NewReservation,
    ) -> impl Future<Output = Result<ReservationId, CoreError>> + Send;

    /// Agency-created requests of `agency_id`, newest first.
    fn list_for_agency(
        &self,
        agency_id: &str,
    ) -> impl Future<Output = Result<Vec<PackageReservation>, CoreError>> + Send;

    fn get(
        &self,
        id: &ReservationId,
    ) -> impl Future<Output = Result<Option<PackageReservation>, CoreError>> + Send;

    /// Set `to` only if the row is still in status `from`.
    ///
    /// `Ok(None)` means no row matched (gone, or changed concurrently).
    fn update_status(
        &self,
        id: &ReservationId,
        from: ReservationStatus,
        to: ReservationStatus,
    ) -> impl Future<Output = Result<Option<PackageReservation>, CoreError>> + Send;
}

// ── REST-backed store ────────────────────────────────────────────────

/// `packages` table over PostgREST.
#[derive(Clone)]
pub struct RestReservationStore {
    client: Arc<RestClient>,
}

impl RestReservationStore {
    pub fn new(client: Arc<RestClient>) -> Self {
        Self { client }
    }
}

impl ReservationStore for RestReservationStore {
    async fn insert(&self, reservation: &NewReservation) -> Result<ReservationId, CoreError> {
        let id = self.client.insert_package(&reservation.to_row()).await?;
        Ok(ReservationId::from(id))
    }

    async fn list_for_agency(&self, agency_id: &str) -> Result<Vec<PackageReservation>, CoreError> {
        self.client
            .list_agency_packages(agency_id)
            .await?
            .into_iter()
            .map(PackageReservation::try_from)
            .collect()
    }

    async fn get(&self, id: &ReservationId) -> Result<Option<PackageReservation>, CoreError> {
        self.client
            .get_package(id.as_str())
            .await?
            .map(PackageReservation::try_from)
            .transpose()
    }

    async fn update_status(
        &self,
        id: &ReservationId,
        from: ReservationStatus,
        to: ReservationStatus,
    ) -> Result<Option<PackageReservation>, CoreError> {
        self.client
            .update_package_status(id.as_str(), from.as_ref(), to.as_ref())
            .await?
            .map(PackageReservation::try_from)
            .transpose()
    }
}

// ── Service ─────────────────────────────────────────────────────────

/// Submission, listing, and lookup of reservation requests.
pub struct ReservationService<S> {
    store: S,
}

impl<S: ReservationStore> ReservationService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validate and insert a pending request.
    ///
    /// Validation failures return before touching the store. Store errors
    /// propagate unchanged; nothing is retried.
    pub async fn create_reservation(
        &self,
        title: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        observation: Option<&str>,
        agency_id: &str,
    ) -> Result<ReservationId, CoreError> {
        let period = Period::new(start_date, end_date)?;
        let reservation = NewReservation::new(title, period, observation, agency_id)?;
        self.submit(&reservation).await
    }

    /// Insert an already-validated request.
    pub async fn submit(&self, reservation: &NewReservation) -> Result<ReservationId, CoreError> {
        let id = self
            .store
            .insert(reservation)
            .await
            .inspect_err(|e| {
                warn!(error = %e, agency = reservation.agency_id(), "reservation insert failed");
            })?;
        info!(
            %id,
            agency = reservation.agency_id(),
            period = %reservation.period(),
            "reservation request submitted"
        );
        Ok(id)
    }

    /// The agency's own requests, newest first. Empty agency id yields an
    /// empty list without a store call.
    pub async fn list_reservations(
        &self,
        agency_id: &str,
    ) -> Result<Vec<PackageReservation>, CoreError> {
        let agency_id = agency_id.trim();
        if agency_id.is_empty() {
            debug!("no agency linked; skipping reservation listing");
            return Ok(Vec::new());
        }
        let rows = self
            .store
            .list_for_agency(agency_id)
            .await
            .inspect_err(|e| {
                warn!(error = %e, agency = agency_id, "reservation listing failed");
            })?;
        debug!(count = rows.len(), agency = agency_id, "reservations listed");
        Ok(rows)
    }

    pub async fn get_reservation(&self, id: &ReservationId) -> Result<PackageReservation, CoreError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| CoreError::NotFound {
                entity_type: "reservation".into(),
                identifier: id.to_string(),
            })
    }
}

// ── In-memory store (tests) ──────────────────────────────────────────

//! Domain layer between `transferdesk-api` and UI consumers (CLI).
//!
//! This crate owns the reservation portal's business rules:
//!
//! - **[`AvailabilityProvider`]**: fetches per-day vehicle availability for
//!   an inclusive date range and normalises it to exactly one
//!   [`AvailabilityDay`] per calendar day. [`RestAvailability`] calls the
//!   backend's `check_vehicle_availability` function.
//!
//! - **[`ReservationCalendar`]** / **[`SelectionState`]**: the two-click
//!   period picker layered over an immutable day list. Completing a
//!   selection yields a [`Period`].
//!
//! - **[`ReservationService`]**: validates and submits reservation requests,
//!   lists an agency's requests, and moderates their status (staff only).
//!   Storage sits behind the [`ReservationStore`] trait.
//!
//! - **[`ReservationListView`]**: observable list state
//!   (`Loading` / `Failed` / `Empty` / `Loaded`) with stale-response
//!   protection via [`RequestGeneration`] tokens.
//!
//! - **[`Portal`]**: facade wiring the flow together for one
//!   [`SessionContext`]: availability → selection → submission → list refresh.

pub mod availability;
pub mod config;
pub mod error;
pub mod generation;
pub mod model;
pub mod moderation;
pub mod portal;
pub mod reservation;
pub mod selection;
pub mod view;

// ── Primary re-exports ──────────────────────────────────────────────
pub use availability::{
    AvailabilityProvider, DEFAULT_WINDOW_DAYS, MAX_WINDOW_DAYS, RestAvailability,
};
pub use config::{PortalConfig, TlsVerification};
pub use error::CoreError;
pub use generation::{Generation, RequestGeneration};
pub use moderation::ModerationAction;
pub use portal::Portal;
pub use reservation::{ReservationService, ReservationStore, RestReservationStore};
pub use selection::{CalendarCell, ReservationCalendar, SelectionState};
pub use view::{ListState, LoadState, ReservationListView};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    AvailabilityDay, BadgeColor, NewReservation, PackageReservation, Period, ReservationId,
    ReservationStatus, SessionContext,
};

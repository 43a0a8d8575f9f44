// ── Domain model ──
//
// Canonical representations of the portal's entities. Wire rows from
// `transferdesk-api` are converted into these at the core boundary;
// consumers (CLI) depend only on this module.

pub mod availability;
pub mod reservation;
pub mod session;

// ── Re-exports ──────────────────────────────────────────────────────

pub use availability::{AvailabilityDay, Period};
pub use reservation::{
    BadgeColor, NewReservation, PackageReservation, ReservationId, ReservationStatus,
};
pub use session::SessionContext;

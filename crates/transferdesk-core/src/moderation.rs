// ── Staff moderation ──
//
// Staff confirm or cancel agency requests. The transition table lives on
// `ReservationStatus`; the write is conditional on the status we read,
// so two staff members racing on the same request cannot both win.

use serde::Serialize;
use tracing::{info, warn};

use crate::error::CoreError;
use crate::model::{PackageReservation, ReservationId, ReservationStatus, SessionContext};
use crate::reservation::{ReservationService, ReservationStore};

/// What a staff member does to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ModerationAction {
    Confirm,
    Cancel,
}

impl ModerationAction {
    pub fn target(self) -> ReservationStatus {
        match self {
            Self::Confirm => ReservationStatus::Confirmed,
            Self::Cancel => ReservationStatus::Cancelled,
        }
    }
}

impl<S: ReservationStore> ReservationService<S> {
    /// Apply a staff decision to a request.
    ///
    /// Non-staff sessions and disallowed transitions fail before any write.
    pub async fn moderate(
        &self,
        session: &SessionContext,
        id: &ReservationId,
        action: ModerationAction,
    ) -> Result<PackageReservation, CoreError> {
        session.require_admin(&format!("{action} reservation"))?;

        let current = self.get_reservation(id).await?;
        let target = action.target();
        if !current.status.can_transition_to(target) {
            return Err(CoreError::InvalidTransition {
                from: current.status,
                to: target,
            });
        }

        let Some(updated) = self
            .store()
            .update_status(id, current.status, target)
            .await?
        else {
            warn!(%id, from = %current.status, "reservation changed while moderating");
            return Err(CoreError::Rejected {
                message: format!("reservation {id} was modified concurrently; reload and retry"),
            });
        };

        info!(%id, from = %current.status, to = %target, by = %session.user_id, "reservation moderated");
        Ok(updated)
    }
}

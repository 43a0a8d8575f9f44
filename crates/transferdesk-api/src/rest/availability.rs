// Availability RPC
//
// Per-day vehicle availability is computed server-side by a Postgres
// function; the client only forwards the date range.

use chrono::NaiveDate;
use tracing::debug;

use super::client::RestClient;
use super::models::{AvailabilityParams, AvailabilityRow};
use crate::error::Error;

/// Name of the stored procedure computing per-day vehicle availability.
pub const AVAILABILITY_RPC: &str = "check_vehicle_availability";

impl RestClient {
    /// Fetch per-day vehicle availability for an inclusive date range.
    ///
    /// `POST /rest/v1/rpc/check_vehicle_availability` with
    /// `{"p_start_date": "...", "p_end_date": "..."}`. Rows come back as
    /// the function produced them; ordering and gap-filling are the
    /// caller's concern. A `null` result decodes as no rows.
    pub async fn check_vehicle_availability(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AvailabilityRow>, Error> {
        debug!(%start, %end, "checking vehicle availability");
        let rows: Option<Vec<AvailabilityRow>> = self
            .rpc(
                AVAILABILITY_RPC,
                &AvailabilityParams {
                    p_start_date: start,
                    p_end_date: end,
                },
            )
            .await?;
        Ok(rows.unwrap_or_default())
    }
}

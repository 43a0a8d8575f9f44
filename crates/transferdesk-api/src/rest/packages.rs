// `packages` table endpoints
//
// Agency reservation requests are rows in `packages` flagged with
// `created_by_agency = true`. Staff moderation updates `status` in place.

use tracing::debug;

use super::client::{RETURN_REPRESENTATION, RestClient};
use super::models::{InsertedId, NewPackageRow, PackageRow, StatusPatch};
use super::query::Query;
use crate::error::Error;

/// Table holding reservation requests.
pub const PACKAGES_TABLE: &str = "packages";

/// Columns projected when listing an agency's reservations.
pub const RESERVATION_COLUMNS: &str = "id,title,start_date,end_date,observation,status,created_at";

/// Columns projected when reading a single reservation for moderation.
const DETAIL_COLUMNS: &str = "id,title,start_date,end_date,observation,status,created_at,agency_id,created_by_agency,vehicle_id,driver_id";

impl RestClient {
    /// Insert one reservation request and return the store-assigned id.
    ///
    /// `POST /rest/v1/packages?select=id` with `Prefer: return=representation`.
    pub async fn insert_package(&self, row: &NewPackageRow) -> Result<String, Error> {
        debug!(agency_id = %row.agency_id, title = %row.title, "inserting package");
        let rows: Vec<InsertedId> = self
            .post(
                PACKAGES_TABLE,
                &Query::new().select("id"),
                row,
                Some(RETURN_REPRESENTATION),
            )
            .await?;

        rows.into_iter()
            .next()
            .map(|r| r.id)
            .ok_or_else(|| Error::EmptyInsert {
                table: PACKAGES_TABLE.into(),
            })
    }

    /// List the reservations an agency submitted, newest first.
    ///
    /// `GET /rest/v1/packages?agency_id=eq.{id}&created_by_agency=eq.true&order=created_at.desc`
    pub async fn list_agency_packages(&self, agency_id: &str) -> Result<Vec<PackageRow>, Error> {
        debug!(agency_id, "listing agency packages");
        let query = Query::new()
            .select(RESERVATION_COLUMNS)
            .eq("agency_id", agency_id)
            .eq("created_by_agency", true)
            .order_desc("created_at");
        let rows: Option<Vec<PackageRow>> = self.get(PACKAGES_TABLE, &query).await?;
        Ok(rows.unwrap_or_default())
    }

    /// Fetch a single reservation by id.
    pub async fn get_package(&self, id: &str) -> Result<Option<PackageRow>, Error> {
        debug!(id, "fetching package");
        let query = Query::new().select(DETAIL_COLUMNS).eq("id", id).limit(1);
        let rows: Option<Vec<PackageRow>> = self.get(PACKAGES_TABLE, &query).await?;
        Ok(rows.unwrap_or_default().into_iter().next())
    }

    /// Move a reservation from one status to another.
    ///
    /// `PATCH /rest/v1/packages?id=eq.{id}&status=eq.{from}` with
    /// `{"status": to}`. The `from` filter makes the update conditional:
    /// when someone else already moved the row, nothing matches and
    /// `Ok(None)` is returned.
    pub async fn update_package_status(
        &self,
        id: &str,
        from: &str,
        to: &str,
    ) -> Result<Option<PackageRow>, Error> {
        debug!(id, from, to, "updating package status");
        let query = Query::new()
            .select(DETAIL_COLUMNS)
            .eq("id", id)
            .eq("status", from);
        let rows: Option<Vec<PackageRow>> = self
            .patch(
                PACKAGES_TABLE,
                &query,
                &StatusPatch { status: to.into() },
                Some(RETURN_REPRESENTATION),
            )
            .await?;
        Ok(rows.unwrap_or_default().into_iter().next())
    }
}

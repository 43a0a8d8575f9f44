// Wire types for the portal's tables and RPC functions.
//
// These mirror the JSON PostgREST sends and receives. Domain types with
// invariants live in `transferdesk-core`; these stay permissive so a
// slightly unexpected row still decodes.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One row of `check_vehicle_availability`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityRow {
    pub date: NaiveDate,
    pub available_vehicles: i64,
    #[serde(default)]
    pub is_available: bool,
}

/// Arguments of `check_vehicle_availability`.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct AvailabilityParams {
    pub p_start_date: NaiveDate,
    pub p_end_date: NaiveDate,
}

/// Insert payload for an agency-submitted row in `packages`.
///
/// `vehicle_id` and `driver_id` serialize as explicit `null`; they are
/// assigned later by staff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPackageRow {
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub observation: Option<String>,
    pub agency_id: String,
    pub created_by_agency: bool,
    pub status: String,
    pub vehicle_id: Option<String>,
    pub driver_id: Option<String>,
}

/// A row read back from `packages`.
///
/// Listing projects only the agency-facing columns, so everything beyond
/// the core period fields is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRow {
    pub id: String,
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub observation: Option<String>,
    pub status: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub agency_id: Option<String>,
    #[serde(default)]
    pub created_by_agency: Option<bool>,
    #[serde(default)]
    pub vehicle_id: Option<String>,
    #[serde(default)]
    pub driver_id: Option<String>,
}

/// `select=id` projection returned by an insert.
#[derive(Debug, Deserialize)]
pub(crate) struct InsertedId {
    pub id: String,
}

/// Body of a status-only `PATCH` on `packages`.
#[derive(Debug, Clone, Serialize)]
pub struct StatusPatch {
    pub status: String,
}

/// PostgREST / Postgres error body: `{message, code, details, hint}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
    #[serde(default)]
    pub hint: Option<serde_json::Value>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_package_row_keeps_explicit_nulls() {
        let row = NewPackageRow {
            title: "Tour X".into(),
            start_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 3, 5).unwrap(),
            observation: None,
            agency_id: "A1".into(),
            created_by_agency: true,
            status: "pending".into(),
            vehicle_id: None,
            driver_id: None,
        };
        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["start_date"], "2025-03-01");
        assert_eq!(value["vehicle_id"], serde_json::Value::Null);
        assert!(value.as_object().unwrap().contains_key("driver_id"));
    }

    #[test]
    fn package_row_decodes_listing_projection() {
        let row: PackageRow = serde_json::from_value(json!({
            "id": "9b7f0c2e-6d55-4c4a-9d0e-2f1f5e3c1a10",
            "title": "Tour X",
            "start_date": "2025-03-01",
            "end_date": "2025-03-05",
            "observation": null,
            "status": "pending",
            "created_at": "2025-02-10T13:45:12.123456+00:00"
        }))
        .unwrap();
        assert_eq!(row.title, "Tour X");
        assert!(row.created_at.is_some());
        assert!(row.agency_id.is_none());
    }

    #[test]
    fn availability_row_without_flag_defaults_false() {
        let row: AvailabilityRow =
            serde_json::from_value(json!({"date": "2025-03-01", "available_vehicles": 2}))
                .unwrap();
        assert!(!row.is_available);
        assert_eq!(row.available_vehicles, 2);
    }
}

// ── Reservation requests ──

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use transferdesk_api::{NewPackageRow, PackageRow};

use super::availability::Period;
use crate::error::CoreError;

// ── ReservationId ───────────────────────────────────────────────────

/// Backend-generated identifier of a `packages` row (UUID text).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReservationId(String);

impl ReservationId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReservationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ReservationId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ReservationId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ── Status ──────────────────────────────────────────────────────────

/// Lifecycle of a package request.
///
/// Agencies only ever create `Pending` rows. Staff moderation moves them
/// to `Confirmed` or `Cancelled`; operations drive the rest.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

/// Badge color used when rendering a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeColor {
    Yellow,
    Green,
    Blue,
    Gray,
    Red,
}

impl ReservationStatus {
    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Confirmed => "Confirmed",
            Self::InProgress => "In progress",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    pub fn badge(self) -> BadgeColor {
        match self {
            Self::Pending => BadgeColor::Yellow,
            Self::Confirmed => BadgeColor::Green,
            Self::InProgress => BadgeColor::Blue,
            Self::Completed => BadgeColor::Gray,
            Self::Cancelled => BadgeColor::Red,
        }
    }

    /// Whether staff moderation may move a request from `self` to `target`.
    pub fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::Confirmed | Self::Cancelled)
                | (Self::Confirmed, Self::Cancelled)
        )
    }
}

// ── Stored reservation ──────────────────────────────────────────────

/// A package request as read back from the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageReservation {
    pub id: ReservationId,
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub observation: Option<String>,
    pub status: ReservationStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub agency_id: Option<String>,
    pub created_by_agency: bool,
    pub vehicle_id: Option<String>,
    pub driver_id: Option<String>,
}

impl PackageReservation {
    /// The reserved period, if the stored dates are ordered.
    pub fn period(&self) -> Option<Period> {
        Period::new(self.start_date, self.end_date).ok()
    }
}

impl TryFrom<PackageRow> for PackageReservation {
    type Error = CoreError;

    fn try_from(row: PackageRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<ReservationStatus>().map_err(|_| {
            CoreError::Internal(format!(
                "package {} has unknown status '{}'",
                row.id, row.status
            ))
        })?;
        Ok(Self {
            id: ReservationId(row.id),
            title: row.title,
            start_date: row.start_date,
            end_date: row.end_date,
            observation: row.observation.filter(|o| !o.is_empty()),
            status,
            created_at: row.created_at,
            agency_id: row.agency_id,
            // Agency listings filter on this column without projecting it.
            created_by_agency: row.created_by_agency.unwrap_or(true),
            vehicle_id: row.vehicle_id,
            driver_id: row.driver_id,
        })
    }
}

// ── New reservation ─────────────────────────────────────────────────

/// A validated reservation request, ready to insert.
///
/// Built only through [`NewReservation::new`], which trims the title and
/// observation and rejects empty titles or agency ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewReservation {
    title: String,
    period: Period,
    observation: Option<String>,
    agency_id: String,
}

impl NewReservation {
    pub fn new(
        title: &str,
        period: Period,
        observation: Option<&str>,
        agency_id: &str,
    ) -> Result<Self, CoreError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(CoreError::validation("title is required"));
        }
        let agency_id = agency_id.trim();
        if agency_id.is_empty() {
            return Err(CoreError::validation(
                "no agency is linked to this account",
            ));
        }
        let observation = observation
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_owned);

        Ok(Self {
            title: title.to_owned(),
            period,
            observation,
            agency_id: agency_id.to_owned(),
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn observation(&self) -> Option<&str> {
        self.observation.as_deref()
    }

    pub fn agency_id(&self) -> &str {
        &self.agency_id
    }

    /// Insert payload: agency-created, pending, no vehicle or driver yet.
    pub fn to_row(&self) -> NewPackageRow {
        NewPackageRow {
            title: self.title.clone(),
            start_date: self.period.start(),
            end_date: self.period.end(),
            observation: self.observation.clone(),
            agency_id: self.agency_id.clone(),
            created_by_agency: true,
            status: ReservationStatus::Pending.to_string(),
            vehicle_id: None,
            driver_id: None,
        }
    }
}

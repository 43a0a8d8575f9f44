// ── Signed-in user context ──

use secrecy::SecretString;

use crate::error::CoreError;

/// Who is using the portal.
///
/// Provided by the host (CLI profile or an embedding app); the portal
/// never authenticates on its own.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub user_id: String,
    pub full_name: Option<String>,
    /// Agency the user books for. `None` for staff without an agency.
    pub agency_id: Option<String>,
    /// Staff flag; gates status moderation.
    pub is_admin: bool,
    /// Supabase access token (JWT) for row-level security.
    pub access_token: Option<SecretString>,
}

impl SessionContext {
    pub fn agency(user_id: impl Into<String>, agency_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            agency_id: Some(agency_id.into()),
            ..Self::default()
        }
    }

    /// Agency id, or `""` when none is linked.
    pub fn agency_id(&self) -> &str {
        self.agency_id.as_deref().unwrap_or_default()
    }

    pub fn require_agency(&self) -> Result<&str, CoreError> {
        match self.agency_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => Ok(id),
            _ => Err(CoreError::validation(
                "no agency is linked to this account",
            )),
        }
    }

    pub fn require_admin(&self, operation: &str) -> Result<(), CoreError> {
        if self.is_admin {
            Ok(())
        } else {
            Err(CoreError::PermissionDenied {
                operation: format!("{operation} requires a staff account"),
            })
        }
    }

    /// Display name, falling back to the user id.
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.user_id)
    }
}

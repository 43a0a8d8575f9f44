// ── Core error types ──
//
// User-facing errors from transferdesk-core. Consumers never see HTTP
// status codes or PostgREST payloads directly; the
// `From<transferdesk_api::Error>` impl translates transport-layer errors
// into domain variants.

use thiserror::Error;

use crate::model::ReservationStatus;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach backend at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Backend request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// Gateway errors and dropped connections that may clear on their own.
    #[error("Backend temporarily unavailable: {message}")]
    Unavailable { message: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Entity not found: {entity_type} with id {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Permission denied: {operation}")]
    PermissionDenied { operation: String },

    #[error("Cannot move reservation from {from} to {to}")]
    InvalidTransition {
        from: ReservationStatus,
        to: ReservationStatus,
    },

    #[error("Operation rejected by backend: {message}")]
    Rejected { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// SQLSTATE or PostgREST code (e.g. `PGRST202`).
        code: Option<String>,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a `ValidationFailed` error.
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<transferdesk_api::Error> for CoreError {
    fn from(err: transferdesk_api::Error) -> Self {
        use transferdesk_api::Error as ApiError;

        if err.is_transient() && matches!(err, ApiError::Rest { .. }) {
            return CoreError::Unavailable {
                message: err.to_string(),
            };
        }

        let constraint_violation = err.is_constraint_violation();
        match err {
            ApiError::Authentication { message } => CoreError::AuthenticationFailed { message },
            ApiError::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            ApiError::Unauthorized => CoreError::AuthenticationFailed {
                message: "anon key or access token rejected -- sign in again".into(),
            },
            ApiError::Transport(ref e) => {
                if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(ToString::to_string)
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        code: None,
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            ApiError::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            ApiError::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            ApiError::Rest {
                status,
                message,
                code,
                details,
                ..
            } => {
                if constraint_violation {
                    // Integrity constraint (SQLSTATE class 23): FK, not-null, check.
                    CoreError::Rejected {
                        message: match details {
                            Some(details) => format!("{message} ({details})"),
                            None => message,
                        },
                    }
                } else if status == 403 || code.as_deref() == Some("42501") {
                    // Row-level security denial.
                    CoreError::PermissionDenied { operation: message }
                } else {
                    CoreError::Api {
                        message,
                        code,
                        status: Some(status),
                    }
                }
            }
            ApiError::EmptyInsert { table } => {
                CoreError::Internal(format!("insert into '{table}' returned no id"))
            }
            ApiError::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use transferdesk_config::ConfigError;
use transferdesk_core::{CoreError, ReservationStatus};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the backend at {url}")]
    #[diagnostic(
        code(transferdesk::connection_failed),
        help(
            "Check the project URL and your network connection.\n\
             URL: {url}\n\
             Self-hosted with a private CA? Set ca_cert in your profile or pass --insecure."
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(transferdesk::auth_failed),
        help(
            "Your access token may have expired.\n\
             Run: transferdesk config set-token --profile {profile}"
        )
    )]
    AuthFailed { profile: String, message: String },

    #[error("No anon key configured for profile '{profile}'")]
    #[diagnostic(
        code(transferdesk::no_credentials),
        help(
            "Configure the project with: transferdesk config init\n\
             Or pass --anon-key / set TRANSFERDESK_ANON_KEY."
        )
    )]
    NoCredentials { profile: String },

    #[error("Permission denied: {operation}")]
    #[diagnostic(
        code(transferdesk::permission_denied),
        help("Confirming and cancelling requests is reserved for staff accounts.")
    )]
    PermissionDenied { operation: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(transferdesk::not_found),
        help("Run: transferdesk {list_command} to see your {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("Reservation is {from}; it cannot become {to}")]
    #[diagnostic(
        code(transferdesk::invalid_transition),
        help("Pending requests can be confirmed or cancelled; confirmed ones can only be cancelled.")
    )]
    InvalidTransition {
        from: ReservationStatus,
        to: ReservationStatus,
    },

    #[error("Request rejected: {message}")]
    #[diagnostic(code(transferdesk::rejected))]
    Rejected { message: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error ({code}): {message}")]
    #[diagnostic(code(transferdesk::api_error))]
    ApiError { code: String, message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(transferdesk::validation))]
    Validation { field: String, reason: String },

    #[error("{message}")]
    #[diagnostic(
        code(transferdesk::date_unavailable),
        help("Run: transferdesk availability to see which days have free vehicles")
    )]
    DateUnavailable { message: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(transferdesk::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: transferdesk config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration file not found")]
    #[diagnostic(
        code(transferdesk::no_config),
        help(
            "Create one with: transferdesk config init\n\
             Expected at: {path}\n\
             Or pass --url and --anon-key."
        )
    )]
    NoConfig { path: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(transferdesk::config))]
    Config { message: String },

    #[error("Keyring error: {message}")]
    #[diagnostic(
        code(transferdesk::keyring),
        help("Store the secret in the config file or an environment variable instead.")
    )]
    Keyring { message: String },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Operation '{action}' requires confirmation")]
    #[diagnostic(
        code(transferdesk::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("Request timed out after {timeout_secs}s")]
    #[diagnostic(
        code(transferdesk::timeout),
        help("Increase the timeout with --timeout or try again later.")
    )]
    Timeout { timeout_secs: u64 },

    #[error("Backend temporarily unavailable: {message}")]
    #[diagnostic(
        code(transferdesk::unavailable),
        help("The service is busy or restarting. Try again in a moment.")
    )]
    ServiceUnavailable { message: String },

    // ── IO ────────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::ServiceUnavailable { .. } => {
                exit_code::CONNECTION
            }
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::PermissionDenied { .. } => exit_code::PERMISSION,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::InvalidTransition { .. } | Self::Rejected { .. } => exit_code::CONFLICT,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. }
            | Self::DateUnavailable { .. }
            | Self::NonInteractiveRequiresYes { .. }
            | Self::ProfileNotFound { .. }
            | Self::NoConfig { .. }
            | Self::Config { .. } => exit_code::USAGE,
            Self::ApiError { .. } | Self::Keyring { .. } | Self::Io(_) => exit_code::GENERAL,
        }
    }

    /// Attach the active profile name to authentication failures.
    pub fn with_profile(self, profile: &str) -> Self {
        match self {
            Self::AuthFailed { message, .. } => Self::AuthFailed {
                profile: profile.into(),
                message,
            },
            other => other,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed {
                profile: "default".into(),
                message,
            },

            CoreError::Timeout { timeout_secs } => CliError::Timeout { timeout_secs },

            CoreError::Unavailable { message } => CliError::ServiceUnavailable { message },

            CoreError::NotFound {
                entity_type,
                identifier,
            } => CliError::NotFound {
                list_command: format!("{entity_type}s list"),
                resource_type: entity_type,
                identifier,
            },

            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::PermissionDenied { operation } => CliError::PermissionDenied { operation },

            CoreError::InvalidTransition { from, to } => CliError::InvalidTransition { from, to },

            CoreError::Rejected { message } => CliError::Rejected { message },

            CoreError::Api { message, code, .. } => CliError::ApiError {
                code: code.unwrap_or_else(|| "unknown".into()),
                message,
            },

            CoreError::Config { message } => CliError::Config { message },

            CoreError::Internal(message) => CliError::ApiError {
                code: "internal".into(),
                message,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::ProfileNotFound { profile } => CliError::ProfileNotFound {
                name: profile,
                available: "(none)".into(),
            },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::Keyring(message) => CliError::Keyring { message },
            ConfigError::Io(e) => CliError::Io(e),
            other @ (ConfigError::Serialization(_) | ConfigError::Figment(_)) => {
                CliError::Config {
                    message: other.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_error_class() {
        let cases = [
            (
                CliError::from(CoreError::ValidationFailed {
                    message: "bad".into(),
                }),
                exit_code::USAGE,
            ),
            (
                CliError::from(CoreError::AuthenticationFailed {
                    message: "expired".into(),
                }),
                exit_code::AUTH,
            ),
            (
                CliError::from(CoreError::PermissionDenied {
                    operation: "confirm".into(),
                }),
                exit_code::PERMISSION,
            ),
            (
                CliError::from(CoreError::Rejected {
                    message: "fk".into(),
                }),
                exit_code::CONFLICT,
            ),
            (
                CliError::from(CoreError::Timeout { timeout_secs: 30 }),
                exit_code::TIMEOUT,
            ),
            (
                CliError::from(CoreError::Unavailable {
                    message: "503".into(),
                }),
                exit_code::CONNECTION,
            ),
            (
                CliError::from(CoreError::ConnectionFailed {
                    url: "http://x".into(),
                    reason: "refused".into(),
                }),
                exit_code::CONNECTION,
            ),
        ];
        for (err, code) in cases {
            assert_eq!(err.exit_code(), code, "{err}");
        }
    }

    #[test]
    fn timeout_message_names_the_limit() {
        let err = CliError::from(CoreError::Timeout { timeout_secs: 30 });
        assert_eq!(err.to_string(), "Request timed out after 30s");
    }

    #[test]
    fn auth_errors_name_the_profile() {
        let err = CliError::from(CoreError::AuthenticationFailed {
            message: "expired".into(),
        })
        .with_profile("agency");
        assert!(matches!(err, CliError::AuthFailed { ref profile, .. } if profile == "agency"));
    }
}

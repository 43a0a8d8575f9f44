use thiserror::Error;

/// Top-level error type for the `transferdesk-api` crate.
///
/// Covers every failure mode of the REST surface: key/token problems,
/// transport, PostgREST rejections, and payload decoding.
/// `transferdesk-core` maps these into user-facing errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Key or token could not be turned into a request header.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The backend rejected the anon key or the access token (HTTP 401).
    #[error("Unauthorized -- anon key or access token rejected")]
    Unauthorized,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// No response within the configured request timeout.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── PostgREST ───────────────────────────────────────────────────
    /// Structured error returned by PostgREST or the RPC function.
    ///
    /// `code` is the Postgres SQLSTATE (e.g. `23505`) or a PostgREST
    /// code (e.g. `PGRST116`) when the body carried one.
    #[error("REST API error (HTTP {status}): {message}")]
    Rest {
        status: u16,
        message: String,
        code: Option<String>,
        details: Option<String>,
        hint: Option<String>,
    },

    /// An insert with `return=representation` came back without a row.
    #[error("Insert into '{table}' returned no rows")]
    EmptyInsert { table: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    ///
    /// Nothing retries automatically; core reports these as a temporarily
    /// unavailable backend.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Rest { status, .. } => *status == 503 || *status == 504,
            _ => false,
        }
    }

    /// Returns `true` for Postgres integrity constraint violations
    /// (SQLSTATE class 23: not-null, foreign key, unique, check).
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, Self::Rest { code: Some(code), .. } if code.starts_with("23"))
    }
}

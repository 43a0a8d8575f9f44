// ── Runtime connection configuration ──
//
// Describes *how* to reach the Supabase project. Carries key material and
// transport tuning but never touches disk; the CLI builds a `PortalConfig`
// from its profile and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::availability::DEFAULT_WINDOW_DAYS;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file (self-hosted projects).
    CustomCa(std::path::PathBuf),
    /// Skip verification. Local development only.
    DangerAcceptInvalid,
}

/// Configuration for connecting to a single project.
///
/// Built by the CLI, passed to [`Portal::connect`](crate::Portal::connect).
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// Project URL (e.g., `https://abc.supabase.co`).
    pub url: Url,
    /// Public anon key sent as `apikey` on every request.
    pub anon_key: SecretString,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
    /// Days after today covered by the availability window.
    pub window_days: u32,
}

impl PortalConfig {
    /// Config with default transport settings and a 60-day window.
    pub fn new(url: Url, anon_key: SecretString) -> Self {
        Self {
            url,
            anon_key,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            window_days: DEFAULT_WINDOW_DAYS,
        }
    }

    pub(crate) fn transport(&self) -> transferdesk_api::TransportConfig {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => transferdesk_api::TlsMode::System,
            TlsVerification::CustomCa(path) => transferdesk_api::TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => transferdesk_api::TlsMode::DangerAcceptInvalid,
        };
        transferdesk_api::TransportConfig {
            tls,
            timeout: self.timeout,
        }
    }
}

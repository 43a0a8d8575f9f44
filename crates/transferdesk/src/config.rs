//! CLI configuration -- thin wrapper around `transferdesk_config`.
//!
//! Re-exports the shared types and adds resolution that respects
//! `GlobalOpts` flag overrides (--url, --anon-key, --agency, etc.).

use std::time::Duration;

use secrecy::SecretString;

use transferdesk_core::{PortalConfig, SessionContext, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use transferdesk_config::{
    Config, Defaults, Profile, config_path, load_config, load_config_or_default, save_config,
    store_access_token, store_anon_key, validate_window_days,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Everything needed to open a portal for this invocation.
pub struct ResolvedPortal {
    pub profile: String,
    pub config: PortalConfig,
    pub session: SessionContext,
}

/// Build the portal connection and session for this invocation.
///
/// Profile values are the base; CLI flags take priority. Without a
/// profile, `--url` and `--anon-key` alone are enough.
pub fn resolve_portal(global: &GlobalOpts) -> Result<ResolvedPortal, CliError> {
    let cfg = load_config()?;
    let profile_name = active_profile_name(global, &cfg);

    if let Some(profile) = cfg.profiles.get(&profile_name) {
        let (config, session) = resolve_profile(profile, &profile_name, &cfg.defaults, global)?;
        return Ok(ResolvedPortal {
            profile: profile_name,
            config,
            session,
        });
    }

    // An explicitly requested profile must exist.
    if global.profile.is_some() {
        let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
        available.sort();
        return Err(CliError::ProfileNotFound {
            name: profile_name,
            available: if available.is_empty() {
                "(none)".into()
            } else {
                available.join(", ")
            },
        });
    }

    // No profile -- build from flags / env vars alone.
    let url_str = global.url.as_deref().ok_or_else(|| CliError::NoConfig {
        path: config_path().display().to_string(),
    })?;
    let url = transferdesk_config::parse_project_url(url_str)?;
    let anon_key = global
        .anon_key
        .clone()
        .map(SecretString::from)
        .ok_or_else(|| CliError::NoCredentials {
            profile: profile_name.clone(),
        })?;

    let mut portal = PortalConfig::new(url, anon_key);
    portal.tls = if global.insecure {
        TlsVerification::DangerAcceptInvalid
    } else {
        TlsVerification::SystemDefaults
    };
    portal.timeout = Duration::from_secs(global.timeout.unwrap_or(cfg.defaults.timeout));
    portal.window_days = validate_window_days(cfg.defaults.window_days)?;

    let session = SessionContext {
        agency_id: global.agency.clone(),
        access_token: global.access_token.clone().map(SecretString::from),
        ..SessionContext::default()
    };
    Ok(ResolvedPortal {
        profile: profile_name,
        config: portal,
        session,
    })
}

/// Translate a `Profile` + global flags into portal config and session.
pub fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
    global: &GlobalOpts,
) -> Result<(PortalConfig, SessionContext), CliError> {
    // 1. URL and anon key (flag > profile chain)
    let mut effective = profile.clone();
    if let Some(ref url) = global.url {
        effective.url.clone_from(url);
    }
    if let Some(ref key) = global.anon_key {
        effective.anon_key = Some(key.clone());
    }
    let mut portal =
        transferdesk_config::profile_to_portal_config(&effective, profile_name, defaults)?;
    if let Some(ref key) = global.anon_key {
        portal.anon_key = SecretString::from(key.clone());
    }

    // 2. TLS and timeout overrides
    if global.insecure {
        portal.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        portal.timeout = Duration::from_secs(secs);
    }

    // 3. Session (flag > profile)
    let mut session = transferdesk_config::profile_to_session(profile, profile_name);
    if let Some(ref agency) = global.agency {
        session.agency_id = Some(agency.clone());
    }
    if let Some(ref token) = global.access_token {
        session.access_token = Some(SecretString::from(token.clone()));
    }

    Ok((portal, session))
}

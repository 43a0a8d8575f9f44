//! Shared configuration for transferdesk.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext), and
//! translation to `transferdesk_core::PortalConfig` / `SessionContext`.
//! The CLI layers its `GlobalOpts` overrides on top of this crate.
//!
//! Configuration merges, lowest precedence first: built-in defaults, the
//! TOML file at [`config_path`], and `TRANSFERDESK_*` environment
//! variables (nested keys separated by `__`, e.g.
//! `TRANSFERDESK_DEFAULTS__TIMEOUT=10`).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use transferdesk_core::{
    DEFAULT_WINDOW_DAYS, MAX_WINDOW_DAYS, PortalConfig, SessionContext, TlsVerification,
};

/// Keyring service name under which secrets are stored.
pub const KEYRING_SERVICE: &str = "transferdesk";

/// Overrides the config file location (tests, CI).
pub const CONFIG_PATH_ENV: &str = "TRANSFERDESK_CONFIG";

/// Access token fallback when the profile names no variable.
pub const ACCESS_TOKEN_ENV: &str = "TRANSFERDESK_ACCESS_TOKEN";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{profile}' not found")]
    ProfileNotFound { profile: String },

    #[error("no anon key configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("keyring error: {0}")]
    Keyring(String),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

impl From<keyring::Error> for ConfigError {
    fn from(err: keyring::Error) -> Self {
        Self::Keyring(err.to_string())
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named project profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Look up a profile by name.
    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound {
                profile: name.into(),
            })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_window_days")]
    pub window_days: u32,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
            window_days: default_window_days(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_window_days() -> u32 {
    DEFAULT_WINDOW_DAYS
}

/// A named Supabase project profile plus the signed-in user.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Project URL (e.g., "https://abc.supabase.co").
    pub url: String,

    /// Public anon key (plaintext -- prefer keyring or env var).
    pub anon_key: Option<String>,

    /// Environment variable name containing the anon key.
    pub anon_key_env: Option<String>,

    /// User access token (plaintext -- prefer keyring).
    pub access_token: Option<String>,

    /// Environment variable name containing the access token.
    pub access_token_env: Option<String>,

    /// Agency the user books for.
    pub agency_id: Option<String>,

    /// Auth user id.
    #[serde(default)]
    pub user_id: String,

    pub full_name: Option<String>,

    /// Staff account (may moderate requests).
    #[serde(default)]
    pub is_admin: bool,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout.
    pub timeout: Option<u64>,

    /// Override the availability window.
    pub window_days: Option<u32>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: `$TRANSFERDESK_CONFIG`, else the
/// platform config directory.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("com", "transferdesk", "transferdesk").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("transferdesk");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the full Config from `path` + environment.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("TRANSFERDESK_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution (without CLI flags) ───────────────────────

fn keyring_get(profile_name: &str, secret: &str) -> Option<SecretString> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/{secret}")).ok()?;
    entry.get_password().ok().map(SecretString::from)
}

fn env_get(name: &str) -> Option<SecretString> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .map(SecretString::from)
}

/// Resolve the anon key: named env var, keyring, then plaintext.
pub fn resolve_anon_key(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    profile
        .anon_key_env
        .as_deref()
        .and_then(env_get)
        .or_else(|| keyring_get(profile_name, "anon-key"))
        .or_else(|| profile.anon_key.clone().map(SecretString::from))
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })
}

/// Resolve the user's access token, if any: env var, keyring, then
/// plaintext. Absent means requests run with the anon role.
pub fn resolve_access_token(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    profile
        .access_token_env
        .as_deref()
        .and_then(env_get)
        .or_else(|| env_get(ACCESS_TOKEN_ENV))
        .or_else(|| keyring_get(profile_name, "access-token"))
        .or_else(|| profile.access_token.clone().map(SecretString::from))
}

/// Store the access token in the system keyring.
pub fn store_access_token(profile_name: &str, token: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/access-token"))?;
    entry.set_password(token)?;
    Ok(())
}

/// Store the anon key in the system keyring.
pub fn store_anon_key(profile_name: &str, key: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/anon-key"))?;
    entry.set_password(key)?;
    Ok(())
}

// ── Translation to core types ───────────────────────────────────────

/// Parse and validate a project URL.
pub fn parse_project_url(raw: &str) -> Result<url::Url, ConfigError> {
    let url: url::Url = raw.parse().map_err(|_| ConfigError::Validation {
        field: "url".into(),
        reason: format!("invalid URL: {raw}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "url".into(),
            reason: format!("expected http or https, got '{}'", url.scheme()),
        });
    }
    Ok(url)
}

/// Check a calendar window length against the fetch limit.
pub fn validate_window_days(days: u32) -> Result<u32, ConfigError> {
    if days > MAX_WINDOW_DAYS {
        return Err(ConfigError::Validation {
            field: "window_days".into(),
            reason: format!("must be at most {MAX_WINDOW_DAYS}, got {days}"),
        });
    }
    Ok(days)
}

/// Build a `PortalConfig` from a profile and global defaults -- no CLI
/// flag overrides.
pub fn profile_to_portal_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<PortalConfig, ConfigError> {
    let url = parse_project_url(&profile.url)?;
    let anon_key = resolve_anon_key(profile, profile_name)?;

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    Ok(PortalConfig {
        url,
        anon_key,
        tls,
        timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
        window_days: validate_window_days(profile.window_days.unwrap_or(defaults.window_days))?,
    })
}

/// Build the session context for a profile's user.
pub fn profile_to_session(profile: &Profile, profile_name: &str) -> SessionContext {
    SessionContext {
        user_id: profile.user_id.clone(),
        full_name: profile.full_name.clone(),
        agency_id: profile
            .agency_id
            .clone()
            .filter(|id| !id.trim().is_empty()),
        is_admin: profile.is_admin,
        access_token: resolve_access_token(profile, profile_name),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use figment::Jail;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    const SAMPLE: &str = r#"
default_profile = "agency"

[defaults]
timeout = 15

[profiles.agency]
url = "https://abc.supabase.co"
anon_key = "anon-plain"
agency_id = "A1"
user_id = "u1"
full_name = "Ana Tours"

[profiles.staff]
url = "https://abc.supabase.co"
anon_key_env = "STAFF_ANON"
user_id = "s1"
is_admin = true
insecure = true
window_days = 90
"#;

    #[test]
    fn loads_profiles_and_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", SAMPLE)?;
            let config = load_config_from(Path::new("config.toml")).unwrap();

            assert_eq!(config.default_profile.as_deref(), Some("agency"));
            assert_eq!(config.defaults.timeout, 15);
            assert_eq!(config.defaults.window_days, 60);
            assert!(config.profile("staff").unwrap().is_admin);
            assert!(matches!(
                config.profile("nope"),
                Err(ConfigError::ProfileNotFound { .. })
            ));
            Ok(())
        });
    }

    #[test]
    fn env_overrides_nested_keys() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", SAMPLE)?;
            jail.set_env("TRANSFERDESK_DEFAULTS__TIMEOUT", "5");
            jail.set_env("TRANSFERDESK_PROFILES__AGENCY__AGENCY_ID", "A9");

            let config = load_config_from(Path::new("config.toml")).unwrap();
            assert_eq!(config.defaults.timeout, 5);
            assert_eq!(
                config.profile("agency").unwrap().agency_id.as_deref(),
                Some("A9")
            );
            Ok(())
        });
    }

    #[test]
    fn missing_file_yields_defaults() {
        Jail::expect_with(|_jail| {
            let config = load_config_from(Path::new("absent.toml")).unwrap();
            assert!(config.profiles.is_empty());
            assert_eq!(config.defaults.output, "table");
            Ok(())
        });
    }

    #[test]
    fn portal_config_applies_profile_overrides() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", SAMPLE)?;
            jail.set_env("STAFF_ANON", "anon-from-env");
            let config = load_config_from(Path::new("config.toml")).unwrap();

            let staff = profile_to_portal_config(
                config.profile("staff").unwrap(),
                "staff",
                &config.defaults,
            )
            .unwrap();
            assert_eq!(staff.anon_key.expose_secret(), "anon-from-env");
            assert_eq!(staff.tls, TlsVerification::DangerAcceptInvalid);
            assert_eq!(staff.window_days, 90);
            assert_eq!(staff.timeout, Duration::from_secs(15));

            let agency = profile_to_portal_config(
                config.profile("agency").unwrap(),
                "agency",
                &config.defaults,
            )
            .unwrap();
            assert_eq!(agency.tls, TlsVerification::SystemDefaults);
            assert_eq!(agency.window_days, DEFAULT_WINDOW_DAYS);
            Ok(())
        });
    }

    #[test]
    fn session_carries_agency_and_staff_flag() {
        let profile = Profile {
            url: "https://abc.supabase.co".into(),
            agency_id: Some(" ".into()),
            user_id: "s1".into(),
            is_admin: true,
            ..Profile::default()
        };
        let session = profile_to_session(&profile, "test-no-keyring");
        assert!(session.is_admin);
        assert_eq!(session.agency_id, None);
    }

    #[test]
    fn oversized_window_is_rejected() {
        let profile = Profile {
            url: "https://abc.supabase.co".into(),
            anon_key: Some("anon".into()),
            window_days: Some(4_000_000),
            ..Profile::default()
        };
        let result = profile_to_portal_config(&profile, "test-no-keyring", &Defaults::default());
        assert!(matches!(
            result,
            Err(ConfigError::Validation { ref field, .. }) if field == "window_days"
        ));
        assert_eq!(validate_window_days(MAX_WINDOW_DAYS).unwrap(), MAX_WINDOW_DAYS);
    }

    #[test]
    fn rejects_non_http_urls() {
        assert!(matches!(
            parse_project_url("ftp://abc"),
            Err(ConfigError::Validation { .. })
        ));
        assert!(parse_project_url("http://localhost:54321").is_ok());
    }

    #[test]
    fn save_then_load_keeps_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.profiles.insert(
            "default".into(),
            Profile {
                url: "https://abc.supabase.co".into(),
                agency_id: Some("A1".into()),
                ..Profile::default()
            },
        );
        save_config_to(&config, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(
            loaded.profile("default").unwrap().agency_id.as_deref(),
            Some("A1")
        );
    }
}

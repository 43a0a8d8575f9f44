//! Config subcommand handlers.

use dialoguer::{Confirm, Input, Select};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

const REDACTED: &str = "****";

// ── Helpers ─────────────────────────────────────────────────────────

/// Copy of the config with stored secrets masked.
fn redact(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    for profile in cfg.profiles.values_mut() {
        if profile.anon_key.is_some() {
            profile.anon_key = Some(REDACTED.into());
        }
        if profile.access_token.is_some() {
            profile.access_token = Some(REDACTED.into());
        }
    }
    cfg
}

/// Format an already-redacted config as TOML-like text.
fn format_config(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "insecure = {}", cfg.defaults.insecure);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);
    let _ = writeln!(out, "window_days = {}", cfg.defaults.window_days);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "url = \"{}\"", p.url);
        let optional = [
            ("anon_key", p.anon_key.as_deref()),
            ("anon_key_env", p.anon_key_env.as_deref()),
            ("access_token", p.access_token.as_deref()),
            ("access_token_env", p.access_token_env.as_deref()),
            ("agency_id", p.agency_id.as_deref()),
            ("full_name", p.full_name.as_deref()),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                let _ = writeln!(out, "{key} = \"{value}\"");
            }
        }
        if !p.user_id.is_empty() {
            let _ = writeln!(out, "user_id = \"{}\"", p.user_id);
        }
        let _ = writeln!(out, "is_admin = {}", p.is_admin);
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if let Some(days) = p.window_days {
            let _ = writeln!(out, "window_days = {days}");
        }
    }

    out
}

fn save_config(cfg: &Config) -> Result<(), CliError> {
    config::save_config(cfg)?;
    Ok(())
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn available_profiles(cfg: &Config) -> String {
    let mut names: Vec<_> = cfg.profiles.keys().cloned().collect();
    names.sort();
    if names.is_empty() {
        "(none)".into()
    } else {
        names.join(", ")
    }
}

fn parse_value<T: std::str::FromStr>(field: &str, value: &str, hint: &str) -> Result<T, CliError> {
    value.parse().map_err(|_| CliError::Validation {
        field: field.into(),
        reason: hint.into(),
    })
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("transferdesk configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            // 1. Profile name
            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            // 2. Project URL
            let url: String = Input::new()
                .with_prompt("Project URL")
                .default("https://your-project.supabase.co".into())
                .interact_text()
                .map_err(prompt_err)?;
            transferdesk_config::parse_project_url(&url)?;

            // 3. Anon key
            let key = rpassword::prompt_password("Anon key: ").map_err(prompt_err)?;
            if key.trim().is_empty() {
                return Err(CliError::Validation {
                    field: "anon_key".into(),
                    reason: "anon key cannot be empty".into(),
                });
            }
            let choices = &[
                "Store in system keyring (recommended)",
                "Save to config file (plaintext)",
            ];
            let storage = Select::new()
                .with_prompt("Where to store the anon key?")
                .items(choices)
                .default(0)
                .interact()
                .map_err(prompt_err)?;
            let anon_key = if storage == 0 {
                config::store_anon_key(&profile_name, key.trim())?;
                eprintln!("   ✓ Anon key stored in system keyring");
                None
            } else {
                Some(key.trim().to_owned())
            };

            // 4. Who is booking
            let agency_id: String = Input::new()
                .with_prompt("Agency ID (blank for staff accounts)")
                .allow_empty(true)
                .interact_text()
                .map_err(prompt_err)?;
            let user_id: String = Input::new()
                .with_prompt("User ID")
                .allow_empty(true)
                .interact_text()
                .map_err(prompt_err)?;
            let full_name: String = Input::new()
                .with_prompt("Full name")
                .allow_empty(true)
                .interact_text()
                .map_err(prompt_err)?;
            let is_admin = Confirm::new()
                .with_prompt("Staff account (can confirm and cancel requests)?")
                .default(false)
                .interact()
                .map_err(prompt_err)?;

            // 5. Build profile and merge into the existing config
            let non_empty = |s: String| {
                let s = s.trim().to_owned();
                (!s.is_empty()).then_some(s)
            };
            let profile = Profile {
                url,
                anon_key,
                agency_id: non_empty(agency_id),
                user_id: user_id.trim().to_owned(),
                full_name: non_empty(full_name),
                is_admin,
                ..Profile::default()
            };

            let mut cfg = config::load_config_or_default();
            cfg.profiles.insert(profile_name.clone(), profile);
            cfg.default_profile = Some(profile_name.clone());

            // 6. Write config
            save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", config_path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Sign-in token: transferdesk config set-token");
            eprintln!("  Test it: transferdesk availability");

            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = redact(&config::load_config_or_default());
            let out = output::render_single(&global.output, &cfg, format_config, |_| {
                "config".into()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            let profile = cfg.profiles.entry(profile_name.clone()).or_default();

            match key.as_str() {
                "url" => {
                    transferdesk_config::parse_project_url(&value)?;
                    profile.url = value;
                }
                "anon_key_env" | "anon-key-env" => profile.anon_key_env = Some(value),
                "access_token_env" | "access-token-env" => profile.access_token_env = Some(value),
                "agency_id" | "agency-id" => profile.agency_id = Some(value),
                "user_id" | "user-id" => profile.user_id = value,
                "full_name" | "full-name" => profile.full_name = Some(value),
                "is_admin" | "is-admin" => {
                    profile.is_admin = parse_value("is_admin", &value, "must be 'true' or 'false'")?;
                }
                "insecure" => {
                    profile.insecure = Some(parse_value(
                        "insecure",
                        &value,
                        "must be 'true' or 'false'",
                    )?);
                }
                "timeout" => {
                    profile.timeout = Some(parse_value(
                        "timeout",
                        &value,
                        "must be a number (seconds)",
                    )?);
                }
                "window_days" | "window-days" => {
                    let days = parse_value("window_days", &value, "must be a number of days")?;
                    profile.window_days = Some(config::validate_window_days(days)?);
                }
                "ca_cert" | "ca-cert" => profile.ca_cert = Some(value.into()),
                other => {
                    return Err(CliError::Validation {
                        field: other.into(),
                        reason: format!(
                            "unknown config key '{other}'. Valid keys: url, anon_key_env, \
                             access_token_env, agency_id, user_id, full_name, is_admin, \
                             insecure, timeout, ca_cert, window_days"
                        ),
                    });
                }
            }

            save_config(&cfg)?;
            output::notify(&format!("✓ Set {key} on profile '{profile_name}'"), global.quiet);
            Ok(())
        }

        // ── SetToken ────────────────────────────────────────────────
        ConfigCommand::SetToken { token } => {
            let cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            if !cfg.profiles.contains_key(&profile_name) {
                return Err(CliError::ProfileNotFound {
                    name: profile_name,
                    available: available_profiles(&cfg),
                });
            }

            let token = match token {
                Some(token) => token,
                None => rpassword::prompt_password("Access token: ").map_err(prompt_err)?,
            };
            if token.trim().is_empty() {
                return Err(CliError::Validation {
                    field: "token".into(),
                    reason: "access token cannot be empty".into(),
                });
            }

            config::store_access_token(&profile_name, token.trim())?;
            output::notify(
                &format!("✓ Access token stored in system keyring for profile '{profile_name}'"),
                global.quiet,
            );
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: transferdesk config init");
            } else {
                let mut names: Vec<_> = cfg.profiles.keys().collect();
                names.sort();
                for name in names {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();

            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    name,
                    available: available_profiles(&cfg),
                });
            }

            cfg.default_profile = Some(name.clone());
            save_config(&cfg)?;
            output::notify(&format!("✓ Default profile set to '{name}'"), global.quiet);
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config_with_secrets() -> Config {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "agency".into(),
            Profile {
                url: "https://abc.supabase.co".into(),
                anon_key: Some("eyJ-secret".into()),
                access_token: Some("jwt-secret".into()),
                agency_id: Some("A1".into()),
                ..Profile::default()
            },
        );
        cfg
    }

    #[test]
    fn redaction_masks_keys_and_tokens() {
        let text = format_config(&redact(&config_with_secrets()));
        assert!(!text.contains("eyJ-secret"));
        assert!(!text.contains("jwt-secret"));
        assert!(text.contains("anon_key = \"****\""));
        assert!(text.contains("agency_id = \"A1\""));
        assert!(text.contains("[profiles.agency]"));
    }

    #[test]
    fn parse_value_reports_field() {
        let err = parse_value::<u64>("timeout", "soon", "must be a number").unwrap_err();
        assert!(matches!(err, CliError::Validation { ref field, .. } if field == "timeout"));
    }
}

//! Shared helpers for command handlers.

use std::io::IsTerminal;

use chrono::NaiveDate;

use crate::error::CliError;

/// Today's date in the local time zone.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Fails instead of prompting when stdin is not a terminal.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Shorten a UUID for table display.
pub fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_id_keeps_first_block() {
        assert_eq!(short_id("5f0c6c1e-2b1a-4d0c-8a51-0d8c3b7f4e21"), "5f0c6c1e");
        assert_eq!(short_id("p1"), "p1");
    }

    #[test]
    fn yes_flag_skips_prompt() {
        assert!(confirm("Cancel?", true).unwrap_or(false));
    }
}

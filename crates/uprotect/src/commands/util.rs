//! Shared helpers for command handlers.

use std::io::IsTerminal;

use chrono::{DateTime, Utc};
use owo_colors::{AnsiColors, OwoColorize};

use crate::error::CliError;

/// Ask the user to confirm `message`. `--yes` skips the prompt; without
/// a terminal on stdin there is nobody to answer, so `action` comes back
/// as a confirmation-required error instead of a hung prompt.
pub fn confirm(action: &str, message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))
}

/// One line of watch output: local time, subject, message.
pub fn watch_line(at: DateTime<Utc>, subject: &str, message: &str) -> String {
    format!(
        "{} {subject:<24} {message}",
        at.with_timezone(&chrono::Local).format("%H:%M:%S")
    )
}

/// Colorize `text` when `enabled`, otherwise pass it through.
pub fn paint(text: &str, color: AnsiColors, enabled: bool) -> String {
    if enabled {
        text.color(color).to_string()
    } else {
        text.to_owned()
    }
}

//! Application configuration.
//!
//! Handles loading configuration from environment variables and .env files.

use std::env;
use std::time::Duration;

use dotenv::dotenv;

use crate::constants::{env as keys, timing};
use crate::error::{Error, Result};

/// How lyric lines are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayStyle {
    /// Clear the screen and center each line.
    #[default]
    Center,
    /// Print each line on its own row.
    Plain,
}

/// Configuration for the application.
#[derive(Debug, Clone)]
pub struct Config {
    /// The application name
    app_name: String,
    /// The application version
    app_version: String,
    /// Player name or path; `None` means auto-detect
    pub player: Option<String>,
    /// Rendering style for lyrics
    pub display: DisplayStyle,
    /// Show a countdown before the first lyric
    pub countdown: bool,
    /// Pause after the last lyric of each pass
    pub tail: Duration,
}

impl Config {
    /// Get the application name.
    #[must_use]
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Get the application version.
    #[must_use]
    pub fn app_version(&self) -> &str {
        &self.app_version
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: env!("CARGO_PKG_NAME").to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            player: None,
            display: DisplayStyle::Center,
            countdown: true,
            tail: Duration::from_millis(timing::DEFAULT_TAIL_MS),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn load() -> Result<Self> {
        // Try to load .env file if present
        dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let player = lookup(keys::PLAYER)
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());

        let display = match lookup(keys::DISPLAY) {
            Some(style) => parse_display(&style)?,
            None => defaults.display,
        };

        let countdown = match lookup(keys::COUNTDOWN) {
            Some(flag) => parse_bool(&flag).ok_or_else(|| {
                Error::config(
                    format!("{} must be true or false, got '{flag}'", keys::COUNTDOWN),
                    "Use true/false, yes/no or 1/0",
                )
            })?,
            None => defaults.countdown,
        };

        let tail = match lookup(keys::TAIL_MS) {
            Some(ms) => Duration::from_millis(ms.trim().parse::<u64>().map_err(|_| {
                Error::config(
                    format!("{} must be a whole number of milliseconds, got '{ms}'", keys::TAIL_MS),
                    "Try a value such as 500",
                )
            })?),
            None => defaults.tail,
        };

        Ok(Self { player, display, countdown, tail, ..defaults })
    }
}

fn parse_display(value: &str) -> Result<DisplayStyle> {
    match value.trim().to_ascii_lowercase().as_str() {
        "center" | "centre" => Ok(DisplayStyle::Center),
        "plain" => Ok(DisplayStyle::Plain),
        other => Err(Error::config(
            format!("unknown {} '{other}'", keys::DISPLAY),
            "Use 'center' or 'plain'",
        )),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

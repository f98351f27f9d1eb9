//! Process configuration parsed from environment variables.
//!
//! DESIGN
//! ======
//! Everything the server needs at startup is read once into a `Config` and
//! shared through `AppState`. The cooldown is always milliseconds, both in
//! the environment and in every comparison made against it.

use std::path::PathBuf;
use std::time::Duration;

use crate::services::oauth::DiscordConfig;

pub const DEFAULT_PORT: u16 = 2000;
pub const DEFAULT_CANVAS_SIZE: u32 = 64;
pub const DEFAULT_COOLDOWN_MS: u64 = 5000;
pub const DEFAULT_STATIC_DIR: &str = "public";

/// Number of entries in the fixed color palette.
pub const PALETTE_SIZE: u32 = 16;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {var}: {value:?} is not a valid {expected}")]
    Invalid { var: &'static str, value: String, expected: &'static str },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Side length of the square canvas.
    pub canvas_size: u32,
    /// Minimum time between two successful placements by one session.
    pub cooldown: Duration,
    pub static_dir: PathBuf,
    /// OAuth variant. `None` disables `/login` and `/token`.
    pub discord: Option<DiscordConfig>,
}

impl Config {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `PORT`: default 2000
    /// - `CANVAS_SIZE`: default 64, must be at least 1
    /// - `COOLDOWN`: milliseconds, default 5000
    /// - `STATIC_DIR`: default `public`
    /// - `DISCORD_*`: see [`DiscordConfig::from_env`]
    ///
    /// # Errors
    ///
    /// Returns an error naming the variable if a value is set but unparseable.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = env_parse("PORT", DEFAULT_PORT, "port number")?;
        let canvas_size = env_parse("CANVAS_SIZE", DEFAULT_CANVAS_SIZE, "positive integer")?;
        if canvas_size == 0 {
            return Err(ConfigError::Invalid {
                var: "CANVAS_SIZE",
                value: canvas_size.to_string(),
                expected: "positive integer",
            });
        }
        let cooldown_ms = env_parse("COOLDOWN", DEFAULT_COOLDOWN_MS, "duration in milliseconds")?;
        let static_dir = std::env::var("STATIC_DIR").unwrap_or_else(|_| DEFAULT_STATIC_DIR.into());

        Ok(Self {
            port,
            canvas_size,
            cooldown: Duration::from_millis(cooldown_ms),
            static_dir: PathBuf::from(static_dir),
            discord: DiscordConfig::from_env(),
        })
    }
}

fn env_parse<T>(var: &'static str, default: T, expected: &'static str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { var, value: raw, expected }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

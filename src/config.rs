//! Application-level configuration loading: round timings and coordinator sizing.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "TAP_RALLY_CONFIG_PATH";

const DEFAULT_COUNTDOWN_SECS: u64 = 3;
const DEFAULT_DURATION_SECS: u64 = 10;
const DEFAULT_GRACE_SECS: u64 = 5;
const DEFAULT_COMMAND_BUFFER: usize = 64;

/// Timing of one round: a client-side countdown, the playing time, then a grace window for
/// late results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundTimings {
    /// Client-side countdown announced in `game_start`.
    pub countdown: Duration,
    /// Playing time, measured from the start command.
    pub duration: Duration,
    /// Window after the playing time in which late results are still accepted.
    pub grace: Duration,
}

impl Default for RoundTimings {
    fn default() -> Self {
        Self {
            countdown: Duration::from_secs(DEFAULT_COUNTDOWN_SECS),
            duration: Duration::from_secs(DEFAULT_DURATION_SECS),
            grace: Duration::from_secs(DEFAULT_GRACE_SECS),
        }
    }
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    round: RoundTimings,
    command_buffer: usize,
}

impl AppConfig {
    /// Build a configuration directly, bypassing the config file.
    pub fn new(round: RoundTimings, command_buffer: usize) -> Self {
        Self {
            round,
            command_buffer: command_buffer.max(1),
        }
    }

    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(app_config) => {
                    info!(
                        path = %path.display(),
                        duration_secs = app_config.round.duration.as_secs(),
                        grace_secs = app_config.round.grace.as_secs(),
                        "loaded config"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    fn from_json(contents: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }

    /// Timings applied to every round.
    pub fn round(&self) -> RoundTimings {
        self.round
    }

    /// Capacity of each room's command queue.
    pub fn command_buffer(&self) -> usize {
        self.command_buffer
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new(RoundTimings::default(), DEFAULT_COMMAND_BUFFER)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    round: RawRound,
    command_buffer: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRound {
    countdown_secs: Option<u64>,
    duration_secs: Option<u64>,
    grace_secs: Option<u64>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let round = RoundTimings {
            countdown: Duration::from_secs(
                value.round.countdown_secs.unwrap_or(DEFAULT_COUNTDOWN_SECS),
            ),
            duration: Duration::from_secs(
                value.round.duration_secs.unwrap_or(DEFAULT_DURATION_SECS),
            ),
            grace: Duration::from_secs(value.round.grace_secs.unwrap_or(DEFAULT_GRACE_SECS)),
        };
        Self::new(
            round,
            value.command_buffer.unwrap_or(DEFAULT_COMMAND_BUFFER),
        )
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_game_rules() {
        let config = AppConfig::default();
        assert_eq!(config.round().countdown, Duration::from_secs(3));
        assert_eq!(config.round().duration, Duration::from_secs(10));
        assert_eq!(config.round().grace, Duration::from_secs(5));
        assert_eq!(config.command_buffer(), 64);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config =
            AppConfig::from_json(r#"{"round": {"durationSecs": 30}, "commandBuffer": 8}"#)
                .unwrap();
        assert_eq!(config.round().duration, Duration::from_secs(30));
        assert_eq!(config.round().grace, Duration::from_secs(5));
        assert_eq!(config.command_buffer(), 8);
    }

    #[test]
    fn empty_object_is_default() {
        let config = AppConfig::from_json("{}").unwrap();
        assert_eq!(config.round(), RoundTimings::default());
    }

    #[test]
    fn zero_buffer_is_clamped() {
        assert_eq!(AppConfig::new(RoundTimings::default(), 0).command_buffer(), 1);
    }
}

//! Game configuration
//!
//! Loaded from `config.toml` in the OS config directory (or the file named by
//! `BUZZBOARD_CONFIG`). Every field has a default, so a missing file, a
//! partial file, or a file that fails to parse all yield a playable setup.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable that overrides the config file location
pub const CONFIG_ENV: &str = "BUZZBOARD_CONFIG";

/// Smallest and largest supported player counts
pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 5;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of players seated at the start (2-5)
    pub players: usize,
    /// Whether a remote host judges answers
    pub hosted: bool,
    pub timing: TimingConfig,
    pub questions: QuestionConfig,
    pub relay: RelayConfig,
    pub buzzers: BuzzerConfig,
    pub media: MediaConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            players: 3,
            hosted: false,
            timing: TimingConfig::default(),
            questions: QuestionConfig::default(),
            relay: RelayConfig::default(),
            buzzers: BuzzerConfig::default(),
            media: MediaConfig::default(),
        }
    }
}

/// Countdowns and pacing, all in milliseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Window in which players may ring in after the clue is read
    pub ring_in_ms: u64,
    /// Time the rung-in player has to respond
    pub response_ms: u64,
    /// Penalty for pressing before the light is green
    pub lockout_ms: u64,
    /// Response time on a daily double
    pub daily_double_ms: u64,
    /// Length of the final-round think music
    pub final_think_ms: u64,
    /// Minimum time each category stays on screen during the intro
    pub intro_dwell_ms: u64,
    /// Target frame time of the main loop
    pub frame_ms: u64,
    /// Pause between failed question fetches
    pub retry_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            ring_in_ms: 5000,
            response_ms: 5000,
            lockout_ms: 250,
            daily_double_ms: 6000,
            final_think_ms: 30000,
            intro_dwell_ms: 1500,
            frame_ms: 33,
            retry_ms: 1000,
        }
    }
}

impl TimingConfig {
    pub fn lockout(&self) -> Duration {
        Duration::from_millis(self.lockout_ms)
    }

    pub fn frame(&self) -> Duration {
        Duration::from_millis(self.frame_ms.max(1))
    }

    pub fn retry(&self) -> Duration {
        Duration::from_millis(self.retry_ms)
    }
}

/// Where clues come from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestionConfig {
    /// Endpoint returning a full game (two rounds plus the final clue)
    pub api_url: String,
    /// Endpoint returning a single clue for tie-breaks
    pub single_url: String,
    /// Use the embedded bank instead of the network
    pub offline: bool,
    /// HTTP timeout for a single fetch
    pub timeout_secs: u64,
}

impl Default for QuestionConfig {
    fn default() -> Self {
        Self {
            api_url: "http://mathnerd7.pythonanywhere.com/api".to_string(),
            single_url: "http://mathnerd7.pythonanywhere.com/one".to_string(),
            offline: false,
            timeout_secs: 120,
        }
    }
}

/// Remote host relay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// First port to try; the relay walks upward if it is taken
    pub port: u16,
    /// Advertise the relay over mDNS so the host companion can find it
    pub advertise: bool,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            port: 8081,
            advertise: true,
        }
    }
}

/// Physical buzzer box
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuzzerConfig {
    /// Character device that emits one player digit per line
    pub device: Option<PathBuf>,
}

/// Speech output
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// External text-to-speech program, called with the text as its last argument
    pub tts_command: Option<String>,
}

impl Config {
    /// Load the config from the default location, falling back to defaults
    pub fn load() -> Self {
        match Self::path() {
            Some(path) => Self::load_or_default(&path),
            None => {
                tracing::warn!("no config directory available, using defaults");
                Self::default()
            }
        }
    }

    /// Load from `path`; a missing or broken file yields the defaults
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            tracing::info!(path = %path.display(), "no config file found, using defaults");
            return Self::default();
        }
        match Self::load_from(path) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config");
                config
            }
            Err(e) => {
                tracing::warn!(error = %e, "config unusable, using defaults");
                Self::default()
            }
        }
    }

    /// Load from `path`, reporting read and parse failures
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(config.sanitized())
    }

    /// Resolved config file location
    pub fn path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        crate::project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Clamp values that would make the game unplayable
    pub fn sanitized(mut self) -> Self {
        self.players = self.players.clamp(MIN_PLAYERS, MAX_PLAYERS);
        self
    }
}

//! Configuration loading and typed config structures for Vignette.
//!
//! The canonical configuration lives in `vignette-config.yaml` at the
//! project root. This module defines strongly-typed structs that mirror the
//! YAML structure, and provides a loader that reads and parses the file.
//! Every field has a default, so an empty file is a valid configuration.

use std::path::Path;

use serde::Deserialize;

use crate::supervisor::DEFAULT_MAX_LINK_DEPTH;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct VignetteConfig {
    /// Event supervisor and event variant settings.
    #[serde(default)]
    pub events: EventsConfig,

    /// Tick loop settings for the engine binary.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl VignetteConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// The `VIGNETTE_LOG` environment variable overrides `logging.level`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.logging.apply_env_overrides();
        Ok(config)
    }
}

/// Event supervisor and event variant settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EventsConfig {
    /// Length of the fade-out played before a map transition swaps maps.
    #[serde(default = "default_map_fade_out_ms")]
    pub map_fade_out_ms: u32,

    /// Maximum nesting of synchronous link cascades within one transition.
    #[serde(default = "default_max_link_depth")]
    pub max_link_depth: usize,

    /// Music used by encounter events that do not name their own.
    #[serde(default = "default_battle_music")]
    pub battle_music: String,

    /// Backdrop used by encounter events that do not name their own.
    #[serde(default = "default_battle_background")]
    pub battle_background: String,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            map_fade_out_ms: default_map_fade_out_ms(),
            max_link_depth: default_max_link_depth(),
            battle_music: default_battle_music(),
            battle_background: default_battle_background(),
        }
    }
}

/// Tick loop settings for the engine binary.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EngineConfig {
    /// Real-time milliseconds per tick, also used as the elapsed time fed
    /// to the supervisor each tick.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u32,

    /// Stop after this many ticks even if events are still scheduled.
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,

    /// Seed for the random source handed to events.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Sleep for `tick_interval_ms` between ticks. When false, ticks run
    /// back to back while still feeding `tick_interval_ms` as elapsed time.
    #[serde(default = "default_realtime")]
    pub realtime: bool,

    /// How long the headless dialogue box keeps a dialogue open.
    #[serde(default = "default_dialogue_ms")]
    pub dialogue_ms: u32,

    /// How long the headless audio device plays a clip.
    #[serde(default = "default_clip_ms")]
    pub clip_ms: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            max_ticks: default_max_ticks(),
            seed: default_seed(),
            realtime: default_realtime(),
            dialogue_ms: default_dialogue_ms(),
            clip_ms: default_clip_ms(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl LoggingConfig {
    /// Apply environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("VIGNETTE_LOG") {
            self.level = val;
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

const fn default_map_fade_out_ms() -> u32 {
    1000
}

const fn default_max_link_depth() -> usize {
    DEFAULT_MAX_LINK_DEPTH
}

fn default_battle_music() -> String {
    String::from("mus/Confrontation.ogg")
}

fn default_battle_background() -> String {
    String::from("img/backdrops/battle/desert.png")
}

const fn default_tick_interval_ms() -> u32 {
    16
}

const fn default_max_ticks() -> u64 {
    10_000
}

const fn default_seed() -> u64 {
    42
}

const fn default_realtime() -> bool {
    true
}

const fn default_dialogue_ms() -> u32 {
    1500
}

const fn default_clip_ms() -> u32 {
    800
}

fn default_log_level() -> String {
    String::from("info")
}

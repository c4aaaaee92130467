//! Game configuration (match rules, mouse feel, tuning overrides). Loaded
//! from config.ron at startup.

use locomotion::MovementConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Persistent game settings. Loaded from `config.ron` in the current directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Fixed simulation rate in ticks per second.
    #[serde(default = "default_tick_rate")]
    pub tick_rate: u32,
    /// Captures needed to win the match.
    #[serde(default = "default_score_limit")]
    pub score_limit: u32,
    /// Mouse sensitivity multiplier (1.0 = default).
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f32,
    /// Scales the tackled player's knockback impulse.
    #[serde(default = "default_tackle_force")]
    pub tackle_force: f32,
    /// How far above the ground a dropped or spawned flag starts.
    #[serde(default = "default_respawn_height")]
    pub respawn_height: f32,
    /// Character movement tuning. Every field has a sensible default, so a
    /// config file only needs the values it overrides.
    #[serde(default)]
    pub movement: MovementConfig,
}

fn default_tick_rate() -> u32 {
    50
}
fn default_score_limit() -> u32 {
    3
}
fn default_sensitivity() -> f32 {
    1.0
}
fn default_tackle_force() -> f32 {
    5.0
}
fn default_respawn_height() -> f32 {
    5.0
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tick_rate: default_tick_rate(),
            score_limit: default_score_limit(),
            sensitivity: default_sensitivity(),
            tackle_force: default_tackle_force(),
            respawn_height: default_respawn_height(),
            movement: MovementConfig::default(),
        }
    }
}

/// Problems reading a config file. A missing file is not an error; the
/// defaults cover it.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config at {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
}

impl GameConfig {
    /// Load config from `config.ron`. If the file is missing or invalid,
    /// returns default config.
    pub fn load() -> Self {
        let path = config_path();
        if !path.is_file() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("{}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Load config from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save current config to `config.ron`. Logs on error.
    pub fn save(&self) {
        let path = config_path();
        if let Ok(s) = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()) {
            if let Err(e) = std::fs::write(&path, s) {
                log::warn!("Could not write config to {:?}: {}", path, e);
            }
        }
    }

    /// Seconds per simulation tick.
    pub fn dt(&self) -> f32 {
        1.0 / self.tick_rate as f32
    }
}

fn config_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("config.ron")
}

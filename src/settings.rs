//! Game settings
//!
//! Plain JSON, every field optional. Anything left out falls back to the
//! defaults below.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::sim::RoundConfig;

/// Screen timings and starting purse
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameTimings {
    /// Day intro auto-advances after this long
    pub intro_secs: f32,
    /// Chaos banner stays up this long before returning to service
    pub chaos_banner_secs: f32,
    pub starting_coins: u32,
}

impl Default for GameTimings {
    fn default() -> Self {
        Self {
            intro_secs: 3.0,
            chaos_banner_secs: 3.0,
            starting_coins: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }
}

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base RNG seed; each day plays with `seed + day`
    pub seed: u64,
    pub round: RoundConfig,
    pub game: GameTimings,
    pub audio: AudioSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: 0xC0FFEE,
            round: RoundConfig::default(),
            game: GameTimings::default(),
            audio: AudioSettings::default(),
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Can't read settings {}: {}, using defaults", path.display(), e);
                return Self::default();
            }
        };
        match Self::from_json(&json) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Bad settings in {}: {}, using defaults", path.display(), e);
                Self::default()
            }
        }
    }
}

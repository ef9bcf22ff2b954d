//! Application settings management
//!
//! User preferences persisted between runs. The API key is supplied per
//! run via flag or environment variable and is never written to disk.

use crate::config::gemini::DEFAULT_VOICE;
use crate::data::storage;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use stillpoint::config::audio::MAX_VOLUME;

/// Settings data file name
const SETTINGS_FILE: &str = "settings.json";

/// Settings file format version for migrations
const SETTINGS_VERSION: u32 = 1;

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// File format version
    #[serde(default = "default_version")]
    pub version: u32,

    /// Prebuilt narration voice name
    #[serde(default = "default_voice")]
    pub voice: String,

    /// Narration volume (0.0 - 2.0, values above 1.0 amplify)
    #[serde(default = "default_volume")]
    pub volume: f32,
}

fn default_version() -> u32 {
    SETTINGS_VERSION
}

fn default_voice() -> String {
    DEFAULT_VOICE.to_string()
}

fn default_volume() -> f32 {
    1.0
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            voice: default_voice(),
            volume: default_volume(),
        }
    }
}

impl Settings {
    /// Create default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from default storage location
    pub fn load() -> Result<Self> {
        match storage::load::<Settings>(SETTINGS_FILE)? {
            Some(settings) => Ok(settings),
            None => Ok(Self::default()),
        }
    }

    /// Load settings from a specific path
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        match storage::load_from::<Settings>(path)? {
            Some(settings) => Ok(settings),
            None => Ok(Self::default()),
        }
    }

    /// Save settings to default storage location
    pub fn save(&self) -> Result<()> {
        storage::save(SETTINGS_FILE, self)
    }

    /// Save settings to a specific path
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        storage::save_to(path, self)
    }

    /// Set volume, clamped to the engine's supported range
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, MAX_VOLUME);
    }
}

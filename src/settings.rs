//! Game settings and preferences
//!
//! Stored as JSON in the user's data directory, separate from scores.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::audio::AudioManager;
use crate::consts::STARTING_LIVES;
use crate::persistence::{self, PersistenceError};
use crate::sim::state::RunConfig;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error("starting_lives must be at least 1")]
    NoLives,
    #[error("{name} must be within 0.0..=1.0, got {value}")]
    VolumeOutOfRange { name: &'static str, value: f32 },
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Fixed run seed; `None` picks one per run
    pub seed: Option<u64>,

    // === Rules ===
    /// Unlimited bombs (false grants a per-stage stock)
    pub unlimited_bombs: bool,
    pub starting_lives: u8,

    // === Audio ===
    pub sfx_enabled: bool,
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: None,

            unlimited_bombs: true,
            starting_lives: STARTING_LIVES,

            sfx_enabled: true,
            master_volume: 0.8,
            sfx_volume: 1.0,
        }
    }
}

impl Settings {
    pub const FILE_NAME: &'static str = "settings.json";

    pub fn default_path() -> Result<PathBuf, SettingsError> {
        Ok(persistence::data_file(Self::FILE_NAME)?)
    }

    /// Load and validate; a missing file gives defaults
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let settings = match persistence::read_json::<Settings>(path)? {
            Some(settings) => {
                log::info!("Loaded settings from {:?}", path);
                settings
            }
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Load from the platform data directory
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_from(&Self::default_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        self.validate()?;
        persistence::write_json(path, self)?;
        log::info!("Settings saved");
        Ok(())
    }

    pub fn save(&self) -> Result<(), SettingsError> {
        self.save_to(&Self::default_path()?)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.starting_lives == 0 {
            return Err(SettingsError::NoLives);
        }
        for (name, value) in [
            ("master_volume", self.master_volume),
            ("sfx_volume", self.sfx_volume),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(SettingsError::VolumeOutOfRange { name, value });
            }
        }
        Ok(())
    }

    /// Rules handed to the simulation
    pub fn run_config(&self) -> RunConfig {
        RunConfig {
            unlimited_bombs: self.unlimited_bombs,
            starting_lives: self.starting_lives.max(1),
        }
    }

    pub fn apply_audio(&self, audio: &mut AudioManager) {
        audio.set_master_volume(self.master_volume);
        audio.set_sfx_volume(self.sfx_volume);
        audio.set_muted(!self.sfx_enabled);
    }
}

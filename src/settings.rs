//! Durable volume settings.
//!
//! Settings are saved to `~/.config/atelier/audio.toml`.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::AudioError;

/// Serialized master state and per-sound volumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredAudio {
    /// Settings format version (for future migration).
    #[serde(default = "default_version")]
    pub version: u32,
    pub master_volume: f64,
    pub muted: bool,
    /// Individual volume per sound id.
    #[serde(default)]
    pub sound_volumes: BTreeMap<String, f64>,
}

fn default_version() -> u32 {
    1
}

impl Default for StoredAudio {
    fn default() -> Self {
        Self {
            version: 1,
            master_volume: 0.5,
            muted: false,
            sound_volumes: BTreeMap::new(),
        }
    }
}

impl StoredAudio {
    /// Clamp every stored volume into 0.0–1.0. A hand-edited file must not
    /// be able to push the effective volume out of range.
    fn sanitized(mut self) -> Self {
        self.master_volume = self.master_volume.clamp(0.0, 1.0);
        for volume in self.sound_volumes.values_mut() {
            *volume = volume.clamp(0.0, 1.0);
        }
        self
    }
}

/// Where settings live on disk.
pub struct SettingsStore {
    path: Option<PathBuf>,
}

impl SettingsStore {
    /// The per-user config location, `~/.config/atelier/audio.toml`.
    pub fn default_location() -> Self {
        let path = dirs::config_dir().map(|p| p.join("atelier").join("audio.toml"));
        if path.is_none() {
            warn!("Could not determine config directory, settings will not persist");
        }
        Self { path }
    }

    /// Store settings at an explicit path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// A store that never touches disk.
    pub fn disabled() -> Self {
        Self { path: None }
    }

    /// Load settings from disk, or return defaults if not found.
    pub fn load(&self) -> StoredAudio {
        let Some(path) = &self.path else {
            return StoredAudio::default();
        };

        if !path.exists() {
            info!("No audio settings file found, using defaults");
            return StoredAudio::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<StoredAudio>(&content) {
                Ok(stored) => {
                    info!("Loaded audio settings from {:?}", path);
                    stored.sanitized()
                }
                Err(e) => {
                    warn!("Failed to parse audio settings: {}, using defaults", e);
                    StoredAudio::default()
                }
            },
            Err(e) => {
                warn!("Failed to read audio settings: {}, using defaults", e);
                StoredAudio::default()
            }
        }
    }

    /// Save settings to disk. A store without a path is a no-op.
    pub fn save(&self, stored: &StoredAudio) -> Result<(), AudioError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let io_error = |e: std::io::Error| AudioError::SettingsIo {
            path: path.clone(),
            reason: e.to_string(),
        };

        if let Some(dir) = path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir).map_err(io_error)?;
            }
        }

        let content = toml::to_string_pretty(stored).map_err(|e| AudioError::SettingsIo {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        fs::write(path, content).map_err(io_error)?;
        Ok(())
    }
}

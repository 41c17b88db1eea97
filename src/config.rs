//! Per-sound configuration and the stock sound set.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::AudioError;

/// Configuration for a single registered sound.
///
/// `src` lists candidate source files in preference order; the first one that
/// decodes wins. `volume` is the sound's base multiplier, layered under the
/// master volume when the effective playback volume is computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundConfig {
    /// Display label for UI controls.
    pub label: String,
    /// Candidate source files, first-available-wins.
    pub src: Vec<String>,
    /// Base volume multiplier (0.0–1.0).
    pub volume: f64,
    /// Loop playback until explicitly stopped.
    #[serde(default)]
    pub looped: bool,
    /// Start playing as soon as the sound is registered.
    #[serde(default)]
    pub autoplay: bool,
    /// Decode at registration instead of at first play.
    #[serde(default = "default_preload")]
    pub preload: bool,
    /// Maximum simultaneously playing instances.
    #[serde(default = "default_pool")]
    pub pool: usize,
}

fn default_preload() -> bool {
    true
}

fn default_pool() -> usize {
    5
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            label: String::new(),
            src: Vec::new(),
            volume: 0.5,
            looped: false,
            autoplay: false,
            preload: true,
            pool: 5,
        }
    }
}

impl SoundConfig {
    /// Create a config with the given label, sources, and base volume.
    pub fn new(label: impl Into<String>, src: Vec<String>, volume: f64) -> Self {
        Self {
            label: label.into(),
            src,
            volume,
            ..Default::default()
        }
    }

    /// Check structural constraints. Out-of-range volumes are not an error
    /// here; they are clamped when the sound is registered.
    pub fn validate(&self, id: &str) -> Result<(), AudioError> {
        if id.is_empty() {
            return Err(AudioError::InvalidConfig {
                id: id.to_string(),
                reason: "sound id must not be empty".to_string(),
            });
        }
        if self.label.is_empty() {
            return Err(AudioError::InvalidConfig {
                id: id.to_string(),
                reason: "label must not be empty".to_string(),
            });
        }
        if self.src.is_empty() {
            return Err(AudioError::InvalidConfig {
                id: id.to_string(),
                reason: "at least one source file is required".to_string(),
            });
        }
        if self.pool == 0 {
            return Err(AudioError::InvalidConfig {
                id: id.to_string(),
                reason: "pool must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// A complete audio configuration: master volume plus a set of sounds.
/// Input for [`crate::SoundManager::load_from_config`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfiguration {
    /// Master volume multiplier (0.0–1.0).
    #[serde(default = "default_master_volume")]
    pub master_volume: f64,
    /// Sounds keyed by id.
    pub sounds: BTreeMap<String, SoundConfig>,
}

fn default_master_volume() -> f64 {
    0.5
}

/// The stock interaction sounds the portfolio UI ships with, in display order.
pub fn default_sounds() -> Vec<(String, SoundConfig)> {
    fn sources(paths: &[&str]) -> Vec<String> {
        paths.iter().map(|p| p.to_string()).collect()
    }

    vec![
        (
            "click".to_string(),
            SoundConfig::new(
                "Click Sound",
                sources(&["sfx/click.ogg", "sfx/click.mp3"]),
                0.25,
            ),
        ),
        (
            "hover".to_string(),
            SoundConfig::new(
                "Hover Sound",
                sources(&["sfx/hovering.ogg", "sfx/hovering.mp3"]),
                0.5,
            ),
        ),
        (
            "hover2".to_string(),
            SoundConfig::new(
                "Hover Sound 2",
                sources(&["sfx/hovering2.ogg", "sfx/hovering2.mp3"]),
                0.25,
            ),
        ),
        (
            "scroll".to_string(),
            SoundConfig::new("Scroll Sound", sources(&["sfx/scrolling.ogg"]), 0.25),
        ),
        (
            "hover3".to_string(),
            SoundConfig::new(
                "Typewriter Hover",
                sources(&[
                    "sfx/hard-typewriter-click.ogg",
                    "sfx/hard-typewriter-click.mp3",
                ]),
                0.25,
            ),
        ),
        (
            "typewriter_click".to_string(),
            SoundConfig::new(
                "Typewriter Click",
                sources(&[
                    "sfx/soft-typewriter-click.ogg",
                    "sfx/soft-typewriter-click.mp3",
                ]),
                0.25,
            ),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = SoundConfig::default();
        assert_eq!(config.volume, 0.5);
        assert!(!config.looped);
        assert!(!config.autoplay);
        assert!(config.preload);
        assert_eq!(config.pool, 5);
    }

    #[test]
    fn validate_rejects_empty_label() {
        let config = SoundConfig::new("", vec!["sfx/click.ogg".to_string()], 0.25);
        assert!(config.validate("click").is_err());
    }

    #[test]
    fn validate_rejects_empty_sources() {
        let config = SoundConfig::new("Click Sound", Vec::new(), 0.25);
        assert!(config.validate("click").is_err());
    }

    #[test]
    fn validate_rejects_empty_id() {
        let config = SoundConfig::new("Click Sound", vec!["sfx/click.ogg".to_string()], 0.25);
        assert!(config.validate("").is_err());
    }

    #[test]
    fn validate_rejects_zero_pool() {
        let mut config = SoundConfig::new("Click Sound", vec!["sfx/click.ogg".to_string()], 0.25);
        config.pool = 0;
        assert!(config.validate("click").is_err());
    }

    #[test]
    fn validate_accepts_out_of_range_volume() {
        // Out-of-range volume is clamped at registration, not rejected.
        let config = SoundConfig::new("Click Sound", vec!["sfx/click.ogg".to_string()], 3.0);
        assert!(config.validate("click").is_ok());
    }

    #[test]
    fn stock_sounds() {
        let sounds = default_sounds();
        assert_eq!(sounds.len(), 6);
        for (id, config) in &sounds {
            assert!(config.validate(id).is_ok());
        }

        let (id, click) = &sounds[0];
        assert_eq!(id, "click");
        assert_eq!(click.label, "Click Sound");
        assert_eq!(click.src.len(), 2);
        assert_eq!(click.volume, 0.25);
    }

    #[test]
    fn configuration_toml_round_trip() {
        let mut sounds = BTreeMap::new();
        sounds.insert(
            "click".to_string(),
            SoundConfig::new("Click Sound", vec!["sfx/click.ogg".to_string()], 0.25),
        );
        let config = AudioConfiguration {
            master_volume: 0.75,
            sounds,
        };

        let text = toml::to_string_pretty(&config).unwrap();
        let loaded: AudioConfiguration = toml::from_str(&text).unwrap();
        assert_eq!(loaded.master_volume, 0.75);
        assert_eq!(loaded.sounds["click"], config.sounds["click"]);
    }
}

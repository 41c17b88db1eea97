//! Thin wrapper around kira's playback primitives.
//!
//! Owns the backend, the decoded sound data, and the live handles. All
//! volume decisions are made by the caller; this layer only applies them.

use std::collections::HashMap;

use kira::manager::backend::DefaultBackend;
use kira::manager::{AudioManager, AudioManagerSettings};
use kira::sound::static_sound::{StaticSoundData, StaticSoundHandle, StaticSoundSettings};
use kira::sound::PlaybackState;
use kira::tween::Tween;
use tracing::debug;

use crate::config::SoundConfig;
use crate::error::AudioError;

/// Playback engine for registered sounds, backed by kira.
pub struct PlaybackEngine {
    manager: AudioManager<DefaultBackend>,
    prepared: HashMap<String, StaticSoundData>,
    active: HashMap<String, Vec<StaticSoundHandle>>,
}

impl PlaybackEngine {
    pub fn new() -> Result<Self, AudioError> {
        let manager = AudioManager::<DefaultBackend>::new(AudioManagerSettings::default())
            .map_err(|e| AudioError::InitFailed(e.to_string()))?;

        Ok(Self {
            manager,
            prepared: HashMap::new(),
            active: HashMap::new(),
        })
    }

    /// Decode a sound's data ahead of its first play so playback has no
    /// latency. Replaces any previously prepared data for the id.
    pub fn prepare(&mut self, id: &str, config: &SoundConfig) -> Result<(), AudioError> {
        let data = load_first_available(id, &config.src)?;
        self.prepared.insert(id.to_string(), data);
        Ok(())
    }

    /// Start one instance of a sound at the given volume. Reaps finished
    /// instances first; when the pool is full, the oldest instance is
    /// stopped to make room.
    pub fn play(&mut self, id: &str, config: &SoundConfig, volume: f64) -> Result<(), AudioError> {
        let data = match self.prepared.get(id) {
            Some(data) => data.clone(),
            None => {
                let data = load_first_available(id, &config.src)?;
                self.prepared.insert(id.to_string(), data.clone());
                data
            }
        };

        let handles = self.active.entry(id.to_string()).or_default();
        handles.retain(|h| h.state() != PlaybackState::Stopped);
        while handles.len() >= config.pool {
            let mut oldest = handles.remove(0);
            oldest.stop(Tween::default());
        }

        let mut settings = StaticSoundSettings::new().volume(volume);
        if config.looped {
            settings = settings.loop_region(..);
        }
        let data = data.with_settings(settings);

        let handle = self
            .manager
            .play(data)
            .map_err(|e| AudioError::PlaybackFailed(e.to_string()))?;
        handles.push(handle);
        Ok(())
    }

    /// Push a new volume to every live instance of a sound.
    pub fn set_volume(&mut self, id: &str, volume: f64) {
        if let Some(handles) = self.active.get_mut(id) {
            for handle in handles.iter_mut() {
                handle.set_volume(volume, Tween::default());
            }
        }
    }

    /// Stop all live instances of a sound.
    pub fn stop_all(&mut self, id: &str) {
        if let Some(handles) = self.active.get_mut(id) {
            for handle in handles.iter_mut() {
                handle.stop(Tween::default());
            }
            handles.clear();
        }
    }

    /// Remove handles for instances that have finished playing.
    pub fn cleanup(&mut self) {
        for handles in self.active.values_mut() {
            handles.retain(|h| h.state() != PlaybackState::Stopped);
        }
    }
}

/// Try each candidate source in order, returning the first that decodes.
fn load_first_available(id: &str, sources: &[String]) -> Result<StaticSoundData, AudioError> {
    let mut reason = String::from("no sources given");
    for source in sources {
        match StaticSoundData::from_file(source) {
            Ok(data) => return Ok(data),
            Err(e) => {
                debug!("Source '{}' for sound '{}' unavailable: {}", source, id, e);
                reason = e.to_string();
            }
        }
    }
    Err(AudioError::LoadFailed {
        id: id.to_string(),
        reason,
    })
}

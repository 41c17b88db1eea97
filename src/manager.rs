//! The sound manager: single authoritative source for "how loud is
//! everything".
//!
//! Construct one at application start and hand it by reference to the UI
//! event handlers. Besides backend startup and config validation, nothing
//! here ever fails toward the caller; a sound that cannot play degrades to
//! silence with a logged warning.

use tracing::{info, warn};

use crate::config::{self, AudioConfiguration, SoundConfig};
use crate::error::AudioError;
use crate::playback::PlaybackEngine;
use crate::settings::{SettingsStore, StoredAudio};
use crate::state::{AudioEvent, AudioState, SetOutcome, SoundEntry, SubscriptionId};

pub struct SoundManager {
    state: AudioState,
    playback: PlaybackEngine,
    store: SettingsStore,
}

impl SoundManager {
    /// Start the audio backend with the stock sound set and per-user
    /// persisted volumes.
    pub fn new() -> Result<Self, AudioError> {
        Self::with_sounds(config::default_sounds())
    }

    /// Start the audio backend with a custom sound set.
    pub fn with_sounds(sounds: Vec<(String, SoundConfig)>) -> Result<Self, AudioError> {
        Self::with_store(SettingsStore::default_location(), sounds)
    }

    /// Start the audio backend with an explicit settings store. Persisted
    /// master volume, mute flag, and individual volumes override the
    /// configs' base volumes.
    pub fn with_store(
        store: SettingsStore,
        sounds: Vec<(String, SoundConfig)>,
    ) -> Result<Self, AudioError> {
        let playback = PlaybackEngine::new()?;
        let stored = store.load();

        let mut manager = Self {
            state: AudioState::new(),
            playback,
            store,
        };
        manager.state.set_master_volume(stored.master_volume);
        manager.state.set_muted(stored.muted);

        for (id, sound) in sounds {
            manager.install(&id, sound, &stored)?;
        }

        info!(
            "Sound manager initialized with {} sounds",
            manager.state.all_sounds().len()
        );
        Ok(manager)
    }

    // ---- Registration ----

    /// Register a sound, overwriting any existing entry with the same id.
    /// The underlying resource is prepared eagerly (unless `preload` is off)
    /// so the first play has no latency. Config validation is the only
    /// error path; a source that fails to decode is retried at play time.
    pub fn register_sound(&mut self, id: &str, sound: SoundConfig) -> Result<(), AudioError> {
        self.install(id, sound, &StoredAudio::default())?;
        self.persist();
        Ok(())
    }

    fn install(&mut self, id: &str, sound: SoundConfig, stored: &StoredAudio) -> Result<(), AudioError> {
        sound.validate(id)?;

        if self.state.get(id).is_some() {
            self.playback.stop_all(id);
        }
        if sound.preload {
            if let Err(e) = self.playback.prepare(id, &sound) {
                warn!("Failed to prepare sound '{}': {}, will retry at play", id, e);
            }
        }

        let autoplay = sound.autoplay;
        self.state.register(id, sound);
        if let Some(&volume) = stored.sound_volumes.get(id) {
            self.state.set_individual_volume(id, volume);
        }
        if autoplay {
            self.play(id);
        }
        Ok(())
    }

    // ---- Playback ----

    /// Play one instance of a sound at its current effective volume.
    /// Fire-and-forget: unknown ids and playback failures are logged and
    /// swallowed so a UI event handler can never be broken by audio.
    pub fn play(&mut self, id: &str) {
        let Some(sound) = self.state.sound_config(id).cloned() else {
            warn!("Cannot play unknown sound '{}'", id);
            return;
        };
        let volume = self.state.effective_volume(id);
        if let Err(e) = self.playback.play(id, &sound, volume) {
            warn!("Playback of '{}' failed: {}", id, e);
        }
    }

    /// Call periodically to reap finished sound instances.
    pub fn update(&mut self) {
        self.playback.cleanup();
    }

    // ---- Volume control ----

    /// Set the master volume, clamped into 0.0–1.0. Every registered
    /// sound's live instances are rescaled immediately.
    pub fn set_master_volume(&mut self, volume: f64) -> SetOutcome {
        let outcome = self.state.set_master_volume(volume);
        self.rescale_all();
        self.persist();
        outcome
    }

    /// Set one sound's volume multiplier, clamped into 0.0–1.0. A warning
    /// no-op for unknown ids.
    pub fn set_individual_volume(&mut self, id: &str, volume: f64) -> SetOutcome {
        let outcome = self.state.set_individual_volume(id, volume);
        if outcome == SetOutcome::NotFound {
            warn!("Cannot set volume for unknown sound '{}'", id);
            return outcome;
        }
        let effective = self.state.effective_volume(id);
        self.playback.set_volume(id, effective);
        self.persist();
        outcome
    }

    pub fn mute(&mut self) {
        self.state.set_muted(true);
        self.rescale_all();
        self.persist();
    }

    pub fn unmute(&mut self) {
        self.state.set_muted(false);
        self.rescale_all();
        self.persist();
    }

    /// Flip the mute flag, returning the new value. Multipliers are left
    /// untouched; unmuting restores volumes from current state.
    pub fn toggle_mute(&mut self) -> bool {
        let muted = self.state.toggle_mute();
        self.rescale_all();
        self.persist();
        muted
    }

    // ---- Bulk operations ----

    /// Replace the registry and master volume from a complete configuration.
    /// All configs are validated before anything is touched.
    pub fn load_from_config(&mut self, configuration: AudioConfiguration) -> Result<(), AudioError> {
        for (id, sound) in &configuration.sounds {
            sound.validate(id)?;
        }

        self.stop_everything();
        let master_volume = configuration.master_volume;
        let sounds: Vec<(String, SoundConfig)> = configuration.sounds.into_iter().collect();
        self.state.replace(master_volume, sounds);
        self.prepare_registered();
        self.persist();
        Ok(())
    }

    /// Back to the stock sound set, master volume 0.5, unmuted.
    pub fn reset_to_defaults(&mut self) {
        self.stop_everything();
        self.state.replace(0.5, config::default_sounds());
        self.prepare_registered();
        self.persist();
    }

    // ---- Accessors ----

    pub fn master_volume(&self) -> f64 {
        self.state.master_volume()
    }

    pub fn is_muted(&self) -> bool {
        self.state.is_muted()
    }

    /// The actual output level for one sound right now.
    pub fn effective_volume(&self, id: &str) -> f64 {
        self.state.effective_volume(id)
    }

    /// A sound's volume multiplier, 0.0 for unknown ids.
    pub fn sound_volume(&self, id: &str) -> f64 {
        self.state.sound_volume(id)
    }

    /// A sound's display label, empty for unknown ids.
    pub fn sound_label(&self, id: &str) -> &str {
        self.state.sound_label(id)
    }

    pub fn sound_config(&self, id: &str) -> Option<&SoundConfig> {
        self.state.sound_config(id)
    }

    /// All registered sounds in registration order, for UI controls.
    pub fn all_sounds(&self) -> &[SoundEntry] {
        self.state.all_sounds()
    }

    // ---- Change notification ----

    /// Subscribe to state changes; the callback fires synchronously on
    /// every mutation.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&AudioEvent) + 'static,
    {
        self.state.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.state.unsubscribe(id)
    }

    // ---- Internals ----

    fn rescale_all(&mut self) {
        for entry in self.state.all_sounds() {
            self.playback
                .set_volume(&entry.id, self.state.effective_volume(&entry.id));
        }
    }

    fn stop_everything(&mut self) {
        let ids: Vec<String> = self.state.all_sounds().iter().map(|e| e.id.clone()).collect();
        for id in ids {
            self.playback.stop_all(&id);
        }
    }

    fn prepare_registered(&mut self) {
        for entry in self.state.all_sounds() {
            if !entry.config.preload {
                continue;
            }
            if let Err(e) = self.playback.prepare(&entry.id, &entry.config) {
                warn!(
                    "Failed to prepare sound '{}': {}, will retry at play",
                    entry.id, e
                );
            }
        }
    }

    fn persist(&self) {
        let mut stored = StoredAudio {
            master_volume: self.state.master_volume(),
            muted: self.state.is_muted(),
            ..Default::default()
        };
        for entry in self.state.all_sounds() {
            stored
                .sound_volumes
                .insert(entry.id.clone(), entry.individual_volume);
        }
        if let Err(e) = self.store.save(&stored) {
            warn!("Failed to save audio settings: {}", e);
        }
    }
}

//! Volume and mute state, independent of any audio backend.
//!
//! Effective playback volume for a sound is always
//! `individual × master`, clamped to 0.0–1.0, and 0.0 while muted.
//! Muting never alters the multipliers, only their application.

use crate::config::SoundConfig;

/// Outcome of a state mutation, for callers that want to know whether their
/// input was applied verbatim. Safe to ignore; nothing here ever panics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    /// Applied exactly as given.
    Applied,
    /// Applied after clamping into 0.0–1.0.
    Clamped,
    /// The referenced sound is not registered; nothing changed.
    NotFound,
}

/// Change notification fired synchronously after each state mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioEvent {
    MasterVolumeChanged(f64),
    MuteChanged(bool),
    SoundVolumeChanged { id: String, volume: f64 },
    SoundRegistered(String),
    Reset,
}

/// Handle returned by [`AudioState::subscribe`], used to unsubscribe.
pub type SubscriptionId = u64;

/// A registered sound with its config and volume multiplier.
#[derive(Debug, Clone)]
pub struct SoundEntry {
    pub id: String,
    pub config: SoundConfig,
    /// Per-sound volume multiplier (0.0–1.0), layered under the master volume.
    pub individual_volume: f64,
}

/// The registry of sounds plus the master volume and mute flag.
///
/// Purely in-memory state; playback and persistence are wired up by
/// [`crate::SoundManager`]. Registered entries live for the whole session,
/// re-registering an id overwrites its entry in place.
pub struct AudioState {
    master_volume: f64,
    muted: bool,
    sounds: Vec<SoundEntry>,
    subscribers: Vec<(SubscriptionId, Box<dyn FnMut(&AudioEvent)>)>,
    next_subscription: SubscriptionId,
}

fn clamp_unit(volume: f64) -> f64 {
    volume.clamp(0.0, 1.0)
}

impl Default for AudioState {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioState {
    pub fn new() -> Self {
        Self {
            master_volume: 0.5,
            muted: false,
            sounds: Vec::new(),
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    // ---- Mutations ----

    /// Register a sound, overwriting any existing entry with the same id.
    /// The config's base volume becomes the individual multiplier, clamped.
    pub fn register(&mut self, id: &str, config: SoundConfig) -> SetOutcome {
        let volume = clamp_unit(config.volume);
        let outcome = if volume == config.volume {
            SetOutcome::Applied
        } else {
            SetOutcome::Clamped
        };

        let entry = SoundEntry {
            id: id.to_string(),
            config,
            individual_volume: volume,
        };
        match self.sounds.iter_mut().find(|s| s.id == id) {
            Some(existing) => *existing = entry,
            None => self.sounds.push(entry),
        }

        self.emit(AudioEvent::SoundRegistered(id.to_string()));
        outcome
    }

    pub fn set_master_volume(&mut self, volume: f64) -> SetOutcome {
        let clamped = clamp_unit(volume);
        self.master_volume = clamped;
        self.emit(AudioEvent::MasterVolumeChanged(clamped));
        if clamped == volume {
            SetOutcome::Applied
        } else {
            SetOutcome::Clamped
        }
    }

    pub fn set_individual_volume(&mut self, id: &str, volume: f64) -> SetOutcome {
        let clamped = clamp_unit(volume);
        let Some(entry) = self.sounds.iter_mut().find(|s| s.id == id) else {
            return SetOutcome::NotFound;
        };
        entry.individual_volume = clamped;

        self.emit(AudioEvent::SoundVolumeChanged {
            id: id.to_string(),
            volume: clamped,
        });
        if clamped == volume {
            SetOutcome::Applied
        } else {
            SetOutcome::Clamped
        }
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        self.emit(AudioEvent::MuteChanged(muted));
    }

    /// Flip the mute flag, returning the new value.
    pub fn toggle_mute(&mut self) -> bool {
        let muted = !self.muted;
        self.set_muted(muted);
        muted
    }

    /// Replace the whole registry and master state in one step.
    pub fn replace(&mut self, master_volume: f64, sounds: Vec<(String, SoundConfig)>) {
        self.master_volume = clamp_unit(master_volume);
        self.muted = false;
        self.sounds = sounds
            .into_iter()
            .map(|(id, config)| SoundEntry {
                individual_volume: clamp_unit(config.volume),
                id,
                config,
            })
            .collect();
        self.emit(AudioEvent::Reset);
    }

    // ---- Accessors ----

    pub fn master_volume(&self) -> f64 {
        self.master_volume
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// The actual output level for one sound: individual × master, clamped,
    /// 0.0 while muted or for unknown ids.
    pub fn effective_volume(&self, id: &str) -> f64 {
        if self.muted {
            return 0.0;
        }
        match self.get(id) {
            Some(entry) => clamp_unit(entry.individual_volume * self.master_volume),
            None => 0.0,
        }
    }

    /// Individual multiplier for a sound, 0.0 for unknown ids.
    pub fn sound_volume(&self, id: &str) -> f64 {
        self.get(id).map_or(0.0, |entry| entry.individual_volume)
    }

    /// Display label for a sound, empty for unknown ids.
    pub fn sound_label(&self, id: &str) -> &str {
        self.get(id).map_or("", |entry| entry.config.label.as_str())
    }

    pub fn sound_config(&self, id: &str) -> Option<&SoundConfig> {
        self.get(id).map(|entry| &entry.config)
    }

    pub fn get(&self, id: &str) -> Option<&SoundEntry> {
        self.sounds.iter().find(|s| s.id == id)
    }

    /// All registered sounds in registration order, for rendering UI controls.
    pub fn all_sounds(&self) -> &[SoundEntry] {
        &self.sounds
    }

    // ---- Change notification ----

    /// Subscribe to state changes. The callback runs synchronously inside
    /// every mutation, on the caller's thread.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&AudioEvent) + 'static,
    {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Remove a subscription. Returns false if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    fn emit(&mut self, event: AudioEvent) {
        for (_, callback) in &mut self.subscribers {
            callback(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    fn sound(label: &str, volume: f64) -> SoundConfig {
        SoundConfig::new(label, vec![format!("sfx/{label}.ogg")], volume)
    }

    #[test]
    fn master_volume_read_back_is_clamped() {
        let mut state = AudioState::new();
        for (input, expected) in [(0.3, 0.3), (1.5, 1.0), (-0.2, 0.0), (0.0, 0.0), (1.0, 1.0)] {
            state.set_master_volume(input);
            assert_eq!(state.master_volume(), expected);
        }
    }

    #[test]
    fn set_master_volume_reports_clamping() {
        let mut state = AudioState::new();
        assert_eq!(state.set_master_volume(0.7), SetOutcome::Applied);
        assert_eq!(state.set_master_volume(1.7), SetOutcome::Clamped);
        assert_eq!(state.master_volume(), 1.0);
    }

    #[test]
    fn effective_volume_is_product_of_multipliers() {
        let mut state = AudioState::new();
        state.register("click", sound("click", 0.25));
        state.set_master_volume(0.8);
        state.set_individual_volume("click", 0.5);
        assert!((state.effective_volume("click") - 0.4).abs() < f64::EPSILON);

        state.set_muted(true);
        assert_eq!(state.effective_volume("click"), 0.0);
        state.set_muted(false);
        assert!((state.effective_volume("click") - 0.4).abs() < f64::EPSILON);
    }

    #[test]
    fn double_toggle_restores_effective_volumes() {
        let mut state = AudioState::new();
        state.register("click", sound("click", 0.25));
        state.register("hover", sound("hover", 0.5));
        state.set_master_volume(0.9);

        let before: Vec<f64> = ["click", "hover"]
            .iter()
            .map(|id| state.effective_volume(id))
            .collect();

        assert!(state.toggle_mute());
        assert_eq!(state.effective_volume("click"), 0.0);
        assert!(!state.toggle_mute());

        let after: Vec<f64> = ["click", "hover"]
            .iter()
            .map(|id| state.effective_volume(id))
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn muting_does_not_touch_multipliers() {
        let mut state = AudioState::new();
        state.register("click", sound("click", 0.25));
        state.set_muted(true);
        assert_eq!(state.sound_volume("click"), 0.25);
        assert_eq!(state.master_volume(), 0.5);
    }

    #[test]
    fn reregistration_overwrites() {
        let mut state = AudioState::new();
        state.register("click", sound("old click", 0.25));
        state.register("click", sound("new click", 0.75));

        assert_eq!(state.all_sounds().len(), 1);
        assert_eq!(state.sound_label("click"), "new click");
        assert_eq!(state.sound_volume("click"), 0.75);
    }

    #[test]
    fn registration_clamps_base_volume() {
        let mut state = AudioState::new();
        assert_eq!(state.register("loud", sound("loud", 2.0)), SetOutcome::Clamped);
        assert_eq!(state.sound_volume("loud"), 1.0);
    }

    #[test]
    fn unknown_id_volume_set_is_a_no_op() {
        let mut state = AudioState::new();
        state.register("click", sound("click", 0.25));

        let outcome = state.set_individual_volume("nonexistent", 0.9);
        assert_eq!(outcome, SetOutcome::NotFound);
        assert_eq!(state.all_sounds().len(), 1);
        assert_eq!(state.sound_volume("nonexistent"), 0.0);
    }

    #[test]
    fn unknown_id_accessors_return_sentinels() {
        let state = AudioState::new();
        assert_eq!(state.sound_label("nonexistent"), "");
        assert_eq!(state.sound_volume("nonexistent"), 0.0);
        assert_eq!(state.effective_volume("nonexistent"), 0.0);
        assert!(state.sound_config("nonexistent").is_none());
    }

    #[test]
    fn volume_scenario_from_defaults() {
        // click at 0.25 against the default master of 0.5, then louder,
        // then muted and back.
        let mut state = AudioState::new();
        state.register("click", sound("click", 0.25));
        assert!((state.effective_volume("click") - 0.125).abs() < f64::EPSILON);

        state.set_master_volume(1.0);
        assert!((state.effective_volume("click") - 0.25).abs() < f64::EPSILON);

        state.set_muted(true);
        assert_eq!(state.effective_volume("click"), 0.0);

        state.set_muted(false);
        assert!((state.effective_volume("click") - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn replace_resets_registry_and_master() {
        let mut state = AudioState::new();
        state.register("click", sound("click", 0.25));
        state.set_muted(true);

        state.replace(0.8, vec![("hover".to_string(), sound("hover", 0.5))]);
        assert_eq!(state.all_sounds().len(), 1);
        assert_eq!(state.sound_volume("hover"), 0.5);
        assert_eq!(state.master_volume(), 0.8);
        assert!(!state.is_muted());
        assert_eq!(state.sound_volume("click"), 0.0);
    }

    #[test]
    fn subscribers_see_every_mutation() {
        let events: Rc<RefCell<Vec<AudioEvent>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);

        let mut state = AudioState::new();
        state.subscribe(move |event| sink.borrow_mut().push(event.clone()));

        state.register("click", sound("click", 0.25));
        state.set_master_volume(0.7);
        state.set_individual_volume("click", 0.4);
        state.toggle_mute();

        let events = events.borrow();
        assert_eq!(
            *events,
            vec![
                AudioEvent::SoundRegistered("click".to_string()),
                AudioEvent::MasterVolumeChanged(0.7),
                AudioEvent::SoundVolumeChanged {
                    id: "click".to_string(),
                    volume: 0.4,
                },
                AudioEvent::MuteChanged(true),
            ]
        );
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let events: Rc<RefCell<Vec<AudioEvent>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);

        let mut state = AudioState::new();
        let subscription = state.subscribe(move |event| sink.borrow_mut().push(event.clone()));

        state.set_master_volume(0.7);
        assert!(state.unsubscribe(subscription));
        state.set_master_volume(0.9);

        assert_eq!(events.borrow().len(), 1);
        assert!(!state.unsubscribe(subscription));
    }
}

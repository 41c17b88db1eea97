use std::path::PathBuf;

/// Errors that can occur in the audio system.
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("failed to initialize audio backend: {0}")]
    InitFailed(String),

    #[error("failed to load sound '{id}' from any of its sources: {reason}")]
    LoadFailed { id: String, reason: String },

    #[error("audio playback failed: {0}")]
    PlaybackFailed(String),

    #[error("invalid config for sound '{id}': {reason}")]
    InvalidConfig { id: String, reason: String },

    #[error("failed to write audio settings to {path:?}: {reason}")]
    SettingsIo { path: PathBuf, reason: String },
}

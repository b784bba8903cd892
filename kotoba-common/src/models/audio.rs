//! Audio playback types
//!
//! Shared by the playback component (which owns and publishes
//! [`AudioState`]) and by anything that observes it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Immutable description of something to play
///
/// Created by the caller when starting playback; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioTrack {
    pub id: String,
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub title_japanese: Option<String>,
    /// Declared duration in milliseconds (0 = unknown)
    #[serde(default)]
    pub duration: u64,
    #[serde(default)]
    pub lesson_id: Option<String>,
    #[serde(default)]
    pub activity_id: Option<String>,
}

impl AudioTrack {
    pub fn new(id: impl Into<String>, url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            title: title.into(),
            title_japanese: None,
            duration: 0,
            lesson_id: None,
            activity_id: None,
        }
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration = duration_ms;
        self
    }
}

/// Playback failure surfaced in [`AudioState::error`]
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioError {
    #[error("Network error")]
    NetworkError,

    #[error("File not found")]
    FileNotFound,

    #[error("Playback error")]
    PlaybackError,

    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Snapshot of the playback session
///
/// Replaced as a whole on every transition; observers never see a
/// half-applied update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioState {
    pub is_playing: bool,
    pub is_paused: bool,
    pub is_buffering: bool,
    /// Milliseconds
    pub current_position: u64,
    /// Milliseconds (0 until the media is ready)
    pub duration: u64,
    pub playback_speed: f32,
    /// 0.0-1.0
    pub volume: f32,
    pub current_track_id: Option<String>,
    pub error: Option<AudioError>,
}

impl Default for AudioState {
    fn default() -> Self {
        Self {
            is_playing: false,
            is_paused: false,
            is_buffering: false,
            current_position: 0,
            duration: 0,
            playback_speed: PlaybackSpeed::Normal.value(),
            volume: 1.0,
            current_track_id: None,
            error: None,
        }
    }
}

impl AudioState {
    /// True when no track is loaded
    pub fn is_idle(&self) -> bool {
        self.current_track_id.is_none()
    }

    /// A loaded track that has stopped on its own: not loading, playing,
    /// paused or failed
    pub fn is_finished(&self) -> bool {
        self.current_track_id.is_some()
            && !self.is_playing
            && !self.is_paused
            && !self.is_buffering
            && self.error.is_none()
    }

    /// Fraction of the track played (0.0-1.0)
    pub fn progress(&self) -> f32 {
        if self.duration == 0 {
            return 0.0;
        }
        (self.current_position as f32 / self.duration as f32).clamp(0.0, 1.0)
    }
}

/// Available playback speeds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaybackSpeed {
    Slow,
    #[default]
    Normal,
    Fast,
    Faster,
}

impl PlaybackSpeed {
    pub const ALL: [PlaybackSpeed; 4] = [
        PlaybackSpeed::Slow,
        PlaybackSpeed::Normal,
        PlaybackSpeed::Fast,
        PlaybackSpeed::Faster,
    ];

    /// Rate multiplier passed to the player
    pub fn value(&self) -> f32 {
        match self {
            PlaybackSpeed::Slow => 0.75,
            PlaybackSpeed::Normal => 1.0,
            PlaybackSpeed::Fast => 1.25,
            PlaybackSpeed::Faster => 1.5,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PlaybackSpeed::Slow => "0.75x",
            PlaybackSpeed::Normal => "1x",
            PlaybackSpeed::Fast => "1.25x",
            PlaybackSpeed::Faster => "1.5x",
        }
    }

    /// Look up the speed whose multiplier equals `value`
    pub fn from_value(value: f32) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|speed| (speed.value() - value).abs() < f32::EPSILON)
    }
}

impl std::fmt::Display for PlaybackSpeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_idle() {
        let state = AudioState::default();
        assert!(state.is_idle());
        assert_eq!(state.playback_speed, 1.0);
        assert_eq!(state.volume, 1.0);
        assert!(state.error.is_none());
    }

    #[test]
    fn test_finished_does_not_depend_on_duration() {
        let loaded = AudioState {
            current_track_id: Some("z".to_string()),
            ..AudioState::default()
        };
        assert!(loaded.is_finished());
        assert!(!AudioState::default().is_finished());
        assert!(!AudioState { is_buffering: true, ..loaded.clone() }.is_finished());
        assert!(!AudioState { is_playing: true, ..loaded.clone() }.is_finished());
        assert!(!AudioState { is_paused: true, ..loaded.clone() }.is_finished());
        assert!(!AudioState {
            error: Some(AudioError::NetworkError),
            ..loaded
        }
        .is_finished());
    }

    #[test]
    fn test_progress() {
        let state = AudioState {
            current_position: 15_000,
            duration: 60_000,
            ..AudioState::default()
        };
        assert_eq!(state.progress(), 0.25);
        assert_eq!(AudioState::default().progress(), 0.0);
    }

    #[test]
    fn test_speed_values_and_labels() {
        let values: Vec<f32> = PlaybackSpeed::ALL.iter().map(|s| s.value()).collect();
        assert_eq!(values, vec![0.75, 1.0, 1.25, 1.5]);
        assert_eq!(PlaybackSpeed::Normal.label(), "1x");
        assert_eq!(PlaybackSpeed::from_value(1.25), Some(PlaybackSpeed::Fast));
        assert_eq!(PlaybackSpeed::from_value(2.0), None);
    }

    #[test]
    fn test_audio_error_display() {
        assert_eq!(AudioError::NetworkError.to_string(), "Network error");
        assert_eq!(
            AudioError::Unknown("codec".to_string()).to_string(),
            "Unknown error: codec"
        );
    }
}

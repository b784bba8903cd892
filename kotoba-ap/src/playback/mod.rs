//! Audio playback
//!
//! A single-session controller over a pluggable [`MediaPlayer`]:
//! - `controller` - commands, event handling and the published state
//! - `player` - the media player trait and its events
//! - `poller` - position sampling while playing
//! - `simulated` - a clock-driven player for tests and the CLI

pub mod controller;
pub mod player;
pub mod poller;
pub mod simulated;

pub use controller::AudioController;
pub use player::{
    MediaItem, MediaPlayer, PlayerErrorCode, PlayerEvent, PlayerEventKind, PlayerEventSender,
    PlayerStatus,
};
pub use simulated::{AutoOptions, SimulatedPlayer};

use kotoba_common::config::PlaybackConfig;
use tokio::time::Duration;

/// Playback tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackOptions {
    /// Position sampling period while playing
    pub poll_interval: Duration,
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self {
            poll_interval: poller::DEFAULT_POLL_INTERVAL,
        }
    }
}

impl From<&PlaybackConfig> for PlaybackOptions {
    fn from(config: &PlaybackConfig) -> Self {
        Self {
            poll_interval: Duration::from_millis(config.poll_interval_ms()),
        }
    }
}

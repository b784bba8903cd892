//! Media player abstraction
//!
//! The controller drives a [`MediaPlayer`] with synchronous commands and
//! learns about asynchronous transitions through [`PlayerEvent`]s sent to
//! the listener channel handed to the player when it is constructed.

use kotoba_common::models::AudioError;
use tokio::sync::mpsc;

/// One load request; `media_id` tags every event the load produces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    pub media_id: u64,
    pub url: String,
}

/// Player lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerStatus {
    /// Nothing loaded, or stopped after an error
    Idle,
    Buffering,
    Ready,
    /// Reached the end of the media
    Ended,
}

/// Failure classes reported by a player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerErrorCode {
    NetworkConnectionFailed,
    NetworkConnectionTimeout,
    FileNotFound,
    DecodingFailed,
    FormatUnsupported,
    RendererFailed,
    Unspecified,
}

impl PlayerErrorCode {
    /// Map a player failure onto the error published in playback state
    pub fn to_audio_error(self, message: &str) -> AudioError {
        match self {
            PlayerErrorCode::NetworkConnectionFailed | PlayerErrorCode::NetworkConnectionTimeout => {
                AudioError::NetworkError
            }
            PlayerErrorCode::FileNotFound => AudioError::FileNotFound,
            PlayerErrorCode::DecodingFailed
            | PlayerErrorCode::FormatUnsupported
            | PlayerErrorCode::RendererFailed => AudioError::PlaybackError,
            PlayerErrorCode::Unspecified => AudioError::Unknown(message.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEventKind {
    StateChanged(PlayerStatus),
    IsPlayingChanged(bool),
    Error { code: PlayerErrorCode, message: String },
}

/// Event emitted by a player, tagged with the load it belongs to
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerEvent {
    pub media_id: u64,
    pub kind: PlayerEventKind,
}

impl PlayerEvent {
    pub fn new(media_id: u64, kind: PlayerEventKind) -> Self {
        Self { media_id, kind }
    }
}

pub type PlayerEventSender = mpsc::UnboundedSender<PlayerEvent>;
pub type PlayerEventReceiver = mpsc::UnboundedReceiver<PlayerEvent>;

/// A media player the controller can drive
///
/// Commands return immediately; their asynchronous effects (buffering
/// finished, playback started, failures) arrive as events.
pub trait MediaPlayer: Send + 'static {
    /// Replace the current media; the player starts buffering
    fn load(&mut self, item: MediaItem);

    /// Start playback as soon as the media is ready
    fn play(&mut self);

    fn pause(&mut self);

    /// Halt playback and unload the media
    fn stop(&mut self);

    fn seek_to(&mut self, position_ms: u64);

    fn set_speed(&mut self, speed: f32);

    /// 0.0-1.0
    fn set_volume(&mut self, volume: f32);

    fn position_ms(&self) -> u64;

    /// None until the media reports a duration
    fn duration_ms(&self) -> Option<u64>;

    fn is_playing(&self) -> bool;

    fn status(&self) -> PlayerStatus;

    /// Free the player; no command is valid afterwards
    fn release(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        assert_eq!(
            PlayerErrorCode::NetworkConnectionFailed.to_audio_error("refused"),
            AudioError::NetworkError
        );
        assert_eq!(
            PlayerErrorCode::NetworkConnectionTimeout.to_audio_error("timeout"),
            AudioError::NetworkError
        );
        assert_eq!(PlayerErrorCode::FileNotFound.to_audio_error(""), AudioError::FileNotFound);
        for code in [
            PlayerErrorCode::DecodingFailed,
            PlayerErrorCode::FormatUnsupported,
            PlayerErrorCode::RendererFailed,
        ] {
            assert_eq!(code.to_audio_error("bad"), AudioError::PlaybackError);
        }
        assert_eq!(
            PlayerErrorCode::Unspecified.to_audio_error("boom"),
            AudioError::Unknown("boom".to_string())
        );
    }
}

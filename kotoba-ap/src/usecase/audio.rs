//! Audio use cases

use crate::playback::AudioController;
use kotoba_common::models::{AudioState, AudioTrack, PlaybackSpeed};
use std::sync::Arc;
use tokio_stream::wrappers::WatchStream;

pub struct PlayAudio {
    controller: Arc<AudioController>,
}

impl PlayAudio {
    pub fn new(controller: Arc<AudioController>) -> Self {
        Self { controller }
    }

    pub fn execute(&self, track: AudioTrack) {
        self.controller.play(track);
    }
}

pub struct PauseAudio {
    controller: Arc<AudioController>,
}

impl PauseAudio {
    pub fn new(controller: Arc<AudioController>) -> Self {
        Self { controller }
    }

    pub fn execute(&self) {
        self.controller.pause();
    }
}

pub struct ResumeAudio {
    controller: Arc<AudioController>,
}

impl ResumeAudio {
    pub fn new(controller: Arc<AudioController>) -> Self {
        Self { controller }
    }

    pub fn execute(&self) {
        self.controller.resume();
    }
}

pub struct StopAudio {
    controller: Arc<AudioController>,
}

impl StopAudio {
    pub fn new(controller: Arc<AudioController>) -> Self {
        Self { controller }
    }

    pub fn execute(&self) {
        self.controller.stop();
    }
}

pub struct SeekAudio {
    controller: Arc<AudioController>,
}

impl SeekAudio {
    pub fn new(controller: Arc<AudioController>) -> Self {
        Self { controller }
    }

    /// Position in milliseconds
    pub fn execute(&self, position_ms: u64) {
        self.controller.seek_to(position_ms);
    }
}

pub struct SetPlaybackSpeed {
    controller: Arc<AudioController>,
}

impl SetPlaybackSpeed {
    pub fn new(controller: Arc<AudioController>) -> Self {
        Self { controller }
    }

    pub fn execute(&self, speed: PlaybackSpeed) {
        self.controller.set_playback_speed(speed);
    }
}

pub struct SetVolume {
    controller: Arc<AudioController>,
}

impl SetVolume {
    pub fn new(controller: Arc<AudioController>) -> Self {
        Self { controller }
    }

    pub fn execute(&self, volume: f32) {
        self.controller.set_volume(volume);
    }
}

pub struct ObserveAudioState {
    controller: Arc<AudioController>,
}

impl ObserveAudioState {
    pub fn new(controller: Arc<AudioController>) -> Self {
        Self { controller }
    }

    /// Current state first, then every change
    pub fn execute(&self) -> WatchStream<AudioState> {
        self.controller.watch_state()
    }
}

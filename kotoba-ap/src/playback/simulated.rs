//! Simulated media player
//!
//! A clock-driven player with no audio output. Position advances with the
//! tokio clock scaled by the playback speed, so paused-time tests see
//! deterministic positions.
//!
//! Two modes:
//! - [`SimulatedPlayer::manual`]: buffering completes, fails or finishes
//!   only when the owner says so. Clones share the same player, so a test
//!   keeps one clone to drive the player the controller owns.
//! - [`SimulatedPlayer::auto`]: buffering completes after a fixed latency,
//!   local files that do not exist fail with `FileNotFound`, and the media
//!   ends once the sampled position reaches its duration.

use super::player::{
    MediaItem, MediaPlayer, PlayerErrorCode, PlayerEvent, PlayerEventKind, PlayerEventSender,
    PlayerStatus,
};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tokio::time::{Duration, Instant};
use tracing::debug;

/// Behavior of an automatic simulated player
#[derive(Debug, Clone)]
pub struct AutoOptions {
    /// Time spent buffering before the media is ready
    pub buffering_latency: Duration,
    /// Duration reported once ready (None: the media reports no duration)
    pub media_duration_ms: Option<u64>,
}

impl Default for AutoOptions {
    fn default() -> Self {
        Self {
            buffering_latency: Duration::from_millis(250),
            media_duration_ms: None,
        }
    }
}

#[derive(Debug)]
struct SimState {
    media: Option<MediaItem>,
    status: PlayerStatus,
    play_when_ready: bool,
    playing: bool,
    /// Position when the clock last started or was rebased
    base_position_ms: u64,
    clock_started: Option<Instant>,
    duration_ms: Option<u64>,
    speed: f32,
    volume: f32,
    released: bool,
    position_queries: u64,
}

impl SimState {
    fn position(&self) -> u64 {
        let elapsed = match self.clock_started {
            Some(started) if self.playing => {
                (started.elapsed().as_millis() as f64 * f64::from(self.speed)) as u64
            }
            _ => 0,
        };
        let position = self.base_position_ms.saturating_add(elapsed);
        match self.duration_ms {
            Some(duration) => position.min(duration),
            None => position,
        }
    }

    /// Freeze the clock at the current position
    fn rebase(&mut self) {
        self.base_position_ms = self.position();
        self.clock_started = if self.playing { Some(Instant::now()) } else { None };
    }

    fn media_id(&self) -> Option<u64> {
        self.media.as_ref().map(|m| m.media_id)
    }
}

#[derive(Debug)]
struct Shared {
    state: Mutex<SimState>,
    events: PlayerEventSender,
    auto: Option<AutoOptions>,
    runtime: Option<Handle>,
}

/// In-process player used by tests and the command-line front end
#[derive(Debug, Clone)]
pub struct SimulatedPlayer {
    shared: Arc<Shared>,
}

impl SimulatedPlayer {
    /// Player whose transitions are driven by the owner
    pub fn manual(events: PlayerEventSender) -> Self {
        Self::build(events, None)
    }

    /// Player that buffers, plays and ends on its own
    pub fn auto(events: PlayerEventSender, options: AutoOptions) -> Self {
        Self::build(events, Some(options))
    }

    fn build(events: PlayerEventSender, auto: Option<AutoOptions>) -> Self {
        let state = SimState {
            media: None,
            status: PlayerStatus::Idle,
            play_when_ready: false,
            playing: false,
            base_position_ms: 0,
            clock_started: None,
            duration_ms: None,
            speed: 1.0,
            volume: 1.0,
            released: false,
            position_queries: 0,
        };

        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(state),
                events,
                auto,
                runtime: Handle::try_current().ok(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.shared.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, media_id: u64, kind: PlayerEventKind) {
        // Ignore send errors (listener gone is OK)
        let _ = self.shared.events.send(PlayerEvent::new(media_id, kind));
    }

    /// Finish buffering the current media
    ///
    /// Starts playing if `play` was requested while buffering.
    pub fn complete_buffering(&self, duration_ms: Option<u64>) {
        let mut state = self.lock();
        let Some(media_id) = state.media_id() else {
            return;
        };
        if state.status != PlayerStatus::Buffering {
            return;
        }

        state.status = PlayerStatus::Ready;
        state.duration_ms = duration_ms;
        self.emit(media_id, PlayerEventKind::StateChanged(PlayerStatus::Ready));

        if state.play_when_ready {
            self.start_clock(&mut state, media_id);
        }
    }

    /// Fail the current media with `code`
    pub fn fail(&self, code: PlayerErrorCode, message: &str) {
        let mut state = self.lock();
        let Some(media_id) = state.media_id() else {
            return;
        };

        let was_playing = state.playing;
        state.rebase();
        state.playing = false;
        state.clock_started = None;
        state.status = PlayerStatus::Idle;

        if was_playing {
            self.emit(media_id, PlayerEventKind::IsPlayingChanged(false));
        }
        self.emit(
            media_id,
            PlayerEventKind::Error {
                code,
                message: message.to_string(),
            },
        );
    }

    /// Jump to the end of the current media
    pub fn finish(&self) {
        let mut state = self.lock();
        if let Some(media_id) = state.media_id() {
            self.end(&mut state, media_id);
        }
    }

    /// How many times the position has been sampled
    pub fn position_queries(&self) -> u64 {
        self.lock().position_queries
    }

    pub fn speed(&self) -> f32 {
        self.lock().speed
    }

    pub fn volume(&self) -> f32 {
        self.lock().volume
    }

    pub fn is_released(&self) -> bool {
        self.lock().released
    }

    fn start_clock(&self, state: &mut SimState, media_id: u64) {
        if state.playing {
            return;
        }
        state.playing = true;
        state.clock_started = Some(Instant::now());
        self.emit(media_id, PlayerEventKind::IsPlayingChanged(true));
    }

    fn end(&self, state: &mut SimState, media_id: u64) {
        if state.status == PlayerStatus::Ended {
            return;
        }
        let was_playing = state.playing;
        state.playing = false;
        state.clock_started = None;
        state.base_position_ms = state.duration_ms.unwrap_or(state.base_position_ms);
        state.status = PlayerStatus::Ended;

        self.emit(media_id, PlayerEventKind::StateChanged(PlayerStatus::Ended));
        if was_playing {
            self.emit(media_id, PlayerEventKind::IsPlayingChanged(false));
        }
    }

    /// Automatic mode: validate the source and schedule the end of buffering
    fn begin_auto_load(&self, media_id: u64, url: &str, options: &AutoOptions) {
        if let Some(path) = local_path(url) {
            if !Path::new(path).exists() {
                debug!("Simulated player: {} does not exist", path);
                self.fail(PlayerErrorCode::FileNotFound, &format!("{} not found", path));
                return;
            }
        }

        let player = self.clone();
        let latency = options.buffering_latency;
        let duration = options.media_duration_ms;
        match &self.shared.runtime {
            Some(runtime) => {
                runtime.spawn(async move {
                    tokio::time::sleep(latency).await;
                    if player.lock().media_id() == Some(media_id) {
                        player.complete_buffering(duration);
                    }
                });
            }
            None => player.complete_buffering(duration),
        }
    }
}

/// Filesystem path for local URLs; None for remote ones
fn local_path(url: &str) -> Option<&str> {
    if let Some(path) = url.strip_prefix("file://") {
        return Some(path);
    }
    if url.contains("://") {
        return None;
    }
    Some(url)
}

impl MediaPlayer for SimulatedPlayer {
    fn load(&mut self, item: MediaItem) {
        let auto_options = {
            let mut state = self.lock();
            if state.released {
                return;
            }
            state.media = Some(item.clone());
            state.status = PlayerStatus::Buffering;
            state.playing = false;
            state.clock_started = None;
            state.base_position_ms = 0;
            state.duration_ms = None;
            self.emit(item.media_id, PlayerEventKind::StateChanged(PlayerStatus::Buffering));
            self.shared.auto.clone()
        };

        if let Some(options) = auto_options {
            self.begin_auto_load(item.media_id, &item.url, &options);
        }
    }

    fn play(&mut self) {
        let mut state = self.lock();
        state.play_when_ready = true;
        if let (PlayerStatus::Ready, Some(media_id)) = (state.status, state.media_id()) {
            self.start_clock(&mut state, media_id);
        }
    }

    fn pause(&mut self) {
        let mut state = self.lock();
        state.play_when_ready = false;
        if state.playing {
            state.rebase();
            state.playing = false;
            state.clock_started = None;
            if let Some(media_id) = state.media_id() {
                self.emit(media_id, PlayerEventKind::IsPlayingChanged(false));
            }
        }
    }

    fn stop(&mut self) {
        let mut state = self.lock();
        state.media = None;
        state.status = PlayerStatus::Idle;
        state.play_when_ready = false;
        state.playing = false;
        state.clock_started = None;
        state.base_position_ms = 0;
        state.duration_ms = None;
    }

    fn seek_to(&mut self, position_ms: u64) {
        let mut state = self.lock();
        state.base_position_ms = match state.duration_ms {
            Some(duration) => position_ms.min(duration),
            None => position_ms,
        };
        state.clock_started = if state.playing { Some(Instant::now()) } else { None };
    }

    fn set_speed(&mut self, speed: f32) {
        let mut state = self.lock();
        state.rebase();
        state.speed = speed;
    }

    fn set_volume(&mut self, volume: f32) {
        self.lock().volume = volume;
    }

    fn position_ms(&self) -> u64 {
        let mut state = self.lock();
        state.position_queries += 1;
        let position = state.position();

        if self.shared.auto.is_some() && state.playing {
            if let (Some(duration), Some(media_id)) = (state.duration_ms, state.media_id()) {
                if position >= duration {
                    self.end(&mut state, media_id);
                }
            }
        }
        position
    }

    fn duration_ms(&self) -> Option<u64> {
        self.lock().duration_ms
    }

    fn is_playing(&self) -> bool {
        self.lock().playing
    }

    fn status(&self) -> PlayerStatus {
        self.lock().status
    }

    fn release(&mut self) {
        self.stop();
        self.lock().released = true;
    }
}

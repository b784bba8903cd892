//! Audio controller
//!
//! Owns the single playback session: the media player, the track being
//! played, the position poller and the published [`AudioState`].
//!
//! Commands are synchronous and never fail; playback problems surface in
//! `AudioState::error`. Player events are handled on a background task and
//! applied under the same session lock as commands, so a command and an
//! event never interleave. Events tagged with a superseded media id are
//! dropped.

use super::player::{
    MediaItem, MediaPlayer, PlayerEvent, PlayerEventKind, PlayerEventReceiver, PlayerEventSender,
    PlayerStatus,
};
use super::poller::{PollGeneration, PositionPoller};
use super::PlaybackOptions;
use crate::{Error, Result};
use kotoba_common::models::{AudioState, AudioTrack, PlaybackSpeed};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info, warn};

struct Session {
    player: Box<dyn MediaPlayer>,
    track: Option<AudioTrack>,
    /// Id of the latest load; events carrying any other id are stale
    media_id: u64,
    poller: Option<PositionPoller>,
    released: bool,
}

struct Shared {
    session: Mutex<Session>,
    state_tx: watch::Sender<AudioState>,
    generations: PollGeneration,
    options: PlaybackOptions,
    runtime: Handle,
}

/// Single-session audio playback
///
/// Must be created inside a tokio runtime; the event loop and the position
/// poller run on it.
pub struct AudioController {
    shared: Arc<Shared>,
    event_task: JoinHandle<()>,
}

impl AudioController {
    /// Create a controller around the player built by `make_player`
    ///
    /// `make_player` receives the listener the player must send its events to.
    pub fn new<P, F>(options: PlaybackOptions, make_player: F) -> Result<Self>
    where
        P: MediaPlayer,
        F: FnOnce(PlayerEventSender) -> P,
    {
        let runtime = Handle::try_current()
            .map_err(|e| Error::Playback(format!("Audio controller needs a tokio runtime: {}", e)))?;

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let player = make_player(event_tx);
        let (state_tx, _) = watch::channel(AudioState::default());

        let shared = Arc::new(Shared {
            session: Mutex::new(Session {
                player: Box::new(player),
                track: None,
                media_id: 0,
                poller: None,
                released: false,
            }),
            state_tx,
            generations: PollGeneration::new(),
            options,
            runtime: runtime.clone(),
        });

        let event_task = runtime.spawn(event_loop(Arc::downgrade(&shared), event_rx));
        debug!("Audio controller started (poll interval {:?})", shared.options.poll_interval);

        Ok(Self { shared, event_task })
    }

    /// Play `track`, superseding whatever was playing
    pub fn play(&self, track: AudioTrack) {
        let mut session = self.shared.lock();
        if session.released {
            warn!("play({}) ignored: controller released", track.id);
            return;
        }

        self.shared.cancel_polling(&mut session);
        session.player.stop();
        session.media_id += 1;
        let media_id = session.media_id;

        let default_speed = PlaybackSpeed::default().value();
        session.player.set_speed(default_speed);
        session.player.set_volume(1.0);

        info!("Playing {} ({})", track.id, track.url);
        self.shared.replace(AudioState {
            current_track_id: Some(track.id.clone()),
            is_buffering: true,
            ..AudioState::default()
        });

        let url = track.url.clone();
        session.track = Some(track);
        session.player.load(MediaItem { media_id, url });
        session.player.play();
    }

    pub fn pause(&self) {
        let mut session = self.shared.lock();
        if !self.shared.accepts_transport(&session, "pause") {
            return;
        }

        session.player.pause();
        self.shared.cancel_polling(&mut session);
        let position = session.player.position_ms();
        self.shared.update(|state| {
            state.is_playing = false;
            state.is_paused = true;
            state.current_position = position;
        });
    }

    pub fn resume(&self) {
        let mut session = self.shared.lock();
        if !self.shared.accepts_transport(&session, "resume") {
            return;
        }

        session.player.play();
        let playing = session.player.is_playing();
        self.shared.update(|state| {
            state.is_paused = false;
            state.is_playing = playing;
        });
        if playing {
            self.shared.start_polling(&mut session);
        }
    }

    /// Halt playback and return to the idle state
    pub fn stop(&self) {
        let mut session = self.shared.lock();
        if session.released {
            warn!("stop() ignored: controller released");
            return;
        }

        self.shared.cancel_polling(&mut session);
        session.player.stop();
        // Anything still queued from the stopped load is stale
        session.media_id += 1;
        session.track = None;
        self.shared.replace(AudioState::default());
    }

    /// Seek to `position_ms`, clamped to the duration once it is known
    pub fn seek_to(&self, position_ms: u64) {
        let mut session = self.shared.lock();
        if !self.shared.accepts_transport(&session, "seek") {
            return;
        }

        let duration = self.shared.state_tx.borrow().duration;
        let position = if duration > 0 { position_ms.min(duration) } else { position_ms };

        session.player.seek_to(position);
        self.shared.update(|state| state.current_position = position);
    }

    pub fn set_playback_speed(&self, speed: PlaybackSpeed) {
        let mut session = self.shared.lock();
        if session.released {
            warn!("set_playback_speed({}) ignored: controller released", speed);
            return;
        }

        session.player.set_speed(speed.value());
        self.shared.update(|state| state.playback_speed = speed.value());
    }

    /// Set the volume, clamped to 0.0-1.0; NaN is ignored
    pub fn set_volume(&self, volume: f32) {
        if volume.is_nan() {
            warn!("set_volume(NaN) ignored");
            return;
        }

        let mut session = self.shared.lock();
        if session.released {
            warn!("set_volume({}) ignored: controller released", volume);
            return;
        }

        let volume = volume.clamp(0.0, 1.0);
        session.player.set_volume(volume);
        self.shared.update(|state| state.volume = volume);
    }

    /// Release the player; every later command is ignored
    pub fn release(&self) {
        let mut session = self.shared.lock();
        if session.released {
            return;
        }

        self.shared.cancel_polling(&mut session);
        session.player.release();
        session.released = true;
        session.track = None;
        session.media_id += 1;
        self.event_task.abort();
        self.shared.replace(AudioState::default());
        info!("Audio controller released");
    }

    /// Current state snapshot
    pub fn state(&self) -> AudioState {
        self.shared.state_tx.borrow().clone()
    }

    /// Receiver that sees every published state
    pub fn subscribe(&self) -> watch::Receiver<AudioState> {
        self.shared.state_tx.subscribe()
    }

    /// Stream yielding the current state, then each newly published one
    pub fn watch_state(&self) -> WatchStream<AudioState> {
        WatchStream::new(self.subscribe())
    }

    /// Track of the current session, if any
    pub fn current_track(&self) -> Option<AudioTrack> {
        self.shared.lock().track.clone()
    }

    pub fn is_polling(&self) -> bool {
        self.shared.lock().poller.is_some()
    }

    pub fn is_released(&self) -> bool {
        self.shared.lock().released
    }
}

impl Drop for AudioController {
    fn drop(&mut self) {
        self.event_task.abort();
        let mut session = self.shared.lock();
        self.shared.cancel_polling(&mut session);
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Publish a whole new state
    fn replace(&self, next: AudioState) {
        self.state_tx.send_if_modified(|state| {
            if *state == next {
                return false;
            }
            *state = next;
            true
        });
    }

    /// Publish a copy of the current state with `change` applied
    fn update(&self, change: impl FnOnce(&mut AudioState)) {
        let mut next = self.state_tx.borrow().clone();
        change(&mut next);
        self.replace(next);
    }

    /// Pause, resume and seek need a loaded, healthy track
    fn accepts_transport(&self, session: &Session, command: &str) -> bool {
        if session.released {
            warn!("{}() ignored: controller released", command);
            return false;
        }
        if session.track.is_none() {
            debug!("{}() ignored: nothing loaded", command);
            return false;
        }
        if self.state_tx.borrow().error.is_some() {
            debug!("{}() ignored: playback failed", command);
            return false;
        }
        true
    }

    fn cancel_polling(&self, session: &mut Session) {
        if let Some(poller) = session.poller.take() {
            poller.cancel(&self.generations);
        }
    }

    /// Replace any running poller with a fresh one
    fn start_polling(self: &Arc<Self>, session: &mut Session) {
        self.cancel_polling(session);

        let weak = Arc::downgrade(self);
        let poller = PositionPoller::start(
            &self.runtime,
            &self.generations,
            self.options.poll_interval,
            move |generation| match weak.upgrade() {
                Some(shared) => shared.poll_tick(generation),
                None => false,
            },
        );
        session.poller = Some(poller);
    }

    /// Sample the player position; false once this poller is stale
    fn poll_tick(&self, generation: u64) -> bool {
        if !self.generations.is_current(generation) {
            return false;
        }

        // Held through the publish so a concurrent seek cannot be overwritten
        // by a position sampled before it
        let session = self.lock();
        let position = session.player.position_ms();

        let mut stale = false;
        self.state_tx.send_if_modified(|state| {
            // Checked under the state lock so a cancelled tick never publishes
            if !self.generations.is_current(generation) {
                stale = true;
                return false;
            }
            if state.current_position == position {
                return false;
            }
            state.current_position = position;
            true
        });
        drop(session);
        !stale
    }

    fn handle_event(self: &Arc<Self>, event: PlayerEvent) {
        let mut session = self.lock();
        if session.released || event.media_id != session.media_id {
            debug!(
                "Dropping stale player event for media {} (current {})",
                event.media_id, session.media_id
            );
            return;
        }

        match event.kind {
            PlayerEventKind::StateChanged(status) => self.on_status(&mut session, status),
            PlayerEventKind::IsPlayingChanged(playing) => self.on_is_playing(&mut session, playing),
            PlayerEventKind::Error { code, message } => {
                let error = code.to_audio_error(&message);
                warn!("Playback error ({:?}): {} -> {}", code, message, error);
                self.cancel_polling(&mut session);
                self.update(|state| {
                    state.is_playing = false;
                    state.is_buffering = false;
                    state.error = Some(error);
                });
            }
        }
    }

    fn on_status(self: &Arc<Self>, session: &mut Session, status: PlayerStatus) {
        match status {
            PlayerStatus::Buffering => self.update(|state| state.is_buffering = true),
            PlayerStatus::Idle => self.update(|state| state.is_buffering = false),
            PlayerStatus::Ready => {
                let declared = session.track.as_ref().map(|t| t.duration).unwrap_or(0);
                let duration = session
                    .player
                    .duration_ms()
                    .filter(|d| *d > 0)
                    .unwrap_or(declared);
                let playing = session.player.is_playing();

                debug!("Media ready: duration {}ms, playing {}", duration, playing);
                self.update(|state| {
                    state.is_buffering = false;
                    state.duration = duration;
                    if playing {
                        state.is_playing = true;
                        state.is_paused = false;
                    }
                });
                if playing && session.poller.is_none() {
                    self.start_polling(session);
                }
            }
            PlayerStatus::Ended => {
                self.cancel_polling(session);
                let player_duration = session.player.duration_ms();
                self.update(|state| {
                    if let Some(duration) = player_duration.filter(|d| *d > 0) {
                        state.duration = duration;
                    }
                    state.is_playing = false;
                    state.is_paused = false;
                    state.is_buffering = false;
                    state.current_position = state.duration;
                });
                info!("Playback ended");
            }
        }
    }

    fn on_is_playing(self: &Arc<Self>, session: &mut Session, playing: bool) {
        // A later command may already have flipped the player back
        if playing != session.player.is_playing() {
            debug!("Ignoring outdated is-playing change ({})", playing);
            return;
        }

        if playing {
            self.update(|state| {
                state.is_playing = true;
                state.is_paused = false;
                state.is_buffering = false;
            });
            if session.poller.is_none() {
                self.start_polling(session);
            }
        } else {
            self.cancel_polling(session);
            let position = session.player.position_ms();
            self.update(|state| {
                state.is_playing = false;
                if state.duration == 0 || position <= state.duration {
                    state.current_position = position;
                }
            });
        }
    }
}

async fn event_loop(shared: Weak<Shared>, mut events: PlayerEventReceiver) {
    while let Some(event) = events.recv().await {
        let Some(shared) = shared.upgrade() else {
            break;
        };
        shared.handle_event(event);
    }
    debug!("Player event loop stopped");
}

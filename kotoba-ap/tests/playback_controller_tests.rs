//! Audio controller tests
//!
//! Drive the controller with a manual simulated player on a paused tokio
//! clock, so buffering, failures and the end of media happen exactly when
//! a test says and positions are deterministic.

use kotoba_ap::playback::{
    AudioController, AutoOptions, MediaPlayer, PlaybackOptions, PlayerErrorCode, PlayerEvent,
    PlayerEventKind, PlayerEventSender, PlayerStatus, SimulatedPlayer,
};
use kotoba_common::models::{AudioError, AudioState, AudioTrack, PlaybackSpeed};
use std::time::Duration;

fn controller() -> (AudioController, SimulatedPlayer) {
    let mut handle = None;
    let controller = AudioController::new(PlaybackOptions::default(), |events| {
        let player = SimulatedPlayer::manual(events);
        handle = Some(player.clone());
        player
    })
    .expect("Failed to create controller");
    (controller, handle.expect("Player factory not called"))
}

fn track(id: &str, duration_ms: u64) -> AudioTrack {
    AudioTrack::new(id, format!("audio/{}.mp3", id), id).with_duration(duration_ms)
}

async fn wait_until(controller: &AudioController, predicate: impl Fn(&AudioState) -> bool) -> AudioState {
    let mut rx = controller.subscribe();
    let state = tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|s| predicate(s)))
        .await
        .expect("Timed out waiting for state")
        .expect("State channel closed")
        .clone();
    state
}

/// Play `track` and let the player finish buffering with `duration_ms`
async fn play_ready(controller: &AudioController, player: &SimulatedPlayer, track: AudioTrack, duration_ms: u64) -> AudioState {
    controller.play(track);
    player.complete_buffering(Some(duration_ms));
    wait_until(controller, |s| !s.is_buffering && s.is_playing).await
}

/// **Given:** an idle controller
/// **When:** a track is played and the player becomes ready
/// **Then:** the track is current, buffering is over and the duration is published
#[tokio::test(start_paused = true)]
async fn test_play_then_ready() {
    let (controller, player) = controller();

    controller.play(track("greeting", 60_000));
    let buffering = controller.state();
    assert_eq!(buffering.current_track_id.as_deref(), Some("greeting"));
    assert!(buffering.is_buffering);
    assert!(!buffering.is_playing);

    player.complete_buffering(Some(60_000));
    let ready = wait_until(&controller, |s| !s.is_buffering).await;

    assert_eq!(ready.current_track_id.as_deref(), Some("greeting"));
    assert!(ready.is_playing);
    assert_eq!(ready.duration, 60_000);
    assert!(controller.is_polling());
}

#[tokio::test(start_paused = true)]
async fn test_declared_duration_used_when_player_reports_none() {
    let (controller, player) = controller();

    controller.play(track("greeting", 42_000));
    player.complete_buffering(None);
    let ready = wait_until(&controller, |s| !s.is_buffering).await;

    assert_eq!(ready.duration, 42_000);
}

#[tokio::test(start_paused = true)]
async fn test_position_polled_while_playing() {
    let (controller, player) = controller();
    play_ready(&controller, &player, track("greeting", 60_000), 60_000).await;

    tokio::time::sleep(Duration::from_millis(1000)).await;
    let position = controller.state().current_position;
    assert!((900..=1000).contains(&position), "position {} after 1s", position);
}

/// **Given:** a playing track
/// **When:** it is paused and resumed
/// **Then:** it plays again from the paused position
#[tokio::test(start_paused = true)]
async fn test_pause_then_resume_keeps_position() {
    let (controller, player) = controller();
    play_ready(&controller, &player, track("greeting", 60_000), 60_000).await;
    tokio::time::sleep(Duration::from_millis(1000)).await;

    controller.pause();
    let paused = controller.state();
    assert!(!paused.is_playing);
    assert!(paused.is_paused);
    assert!(!controller.is_polling());

    tokio::time::sleep(Duration::from_millis(500)).await;

    controller.resume();
    let resumed = controller.state();
    assert!(resumed.is_playing);
    assert!(!resumed.is_paused);
    assert_eq!(resumed.current_position, paused.current_position);
    assert!(controller.is_polling());
}

#[tokio::test(start_paused = true)]
async fn test_seek_within_duration() {
    let (controller, player) = controller();
    play_ready(&controller, &player, track("greeting", 60_000), 60_000).await;

    controller.seek_to(30_000);
    let state = controller.state();
    assert_eq!(state.current_position, 30_000);
    assert_eq!(state.duration, 60_000);
    assert_eq!(player.position_ms(), 30_000);
}

#[tokio::test(start_paused = true)]
async fn test_seek_clamped_to_duration() {
    let (controller, player) = controller();
    play_ready(&controller, &player, track("greeting", 60_000), 60_000).await;

    controller.seek_to(90_000);
    assert_eq!(controller.state().current_position, 60_000);
}

#[tokio::test(start_paused = true)]
async fn test_seek_passes_through_before_duration_known() {
    let (controller, _player) = controller();

    controller.play(track("greeting", 0));
    controller.seek_to(12_345);
    assert_eq!(controller.state().current_position, 12_345);
}

#[tokio::test(start_paused = true)]
async fn test_commands_ignored_when_idle() {
    let (controller, _player) = controller();

    controller.pause();
    controller.resume();
    controller.seek_to(5_000);

    assert_eq!(controller.state(), AudioState::default());
    assert!(!controller.is_polling());
}

/// **Given:** a controller in any state
/// **When:** stop is called
/// **Then:** polling is cancelled and the state returns to its default
#[tokio::test(start_paused = true)]
async fn test_stop_resets_from_any_state() {
    let (controller, player) = controller();

    // Buffering
    controller.play(track("a", 60_000));
    controller.stop();
    assert_eq!(controller.state(), AudioState::default());

    // Playing
    play_ready(&controller, &player, track("b", 60_000), 60_000).await;
    controller.stop();
    assert_eq!(controller.state(), AudioState::default());
    assert!(!controller.is_polling());

    // Paused
    play_ready(&controller, &player, track("c", 60_000), 60_000).await;
    controller.pause();
    controller.stop();
    assert_eq!(controller.state(), AudioState::default());

    // Errored
    controller.play(track("d", 60_000));
    player.fail(PlayerErrorCode::DecodingFailed, "corrupt");
    wait_until(&controller, |s| s.error.is_some()).await;
    controller.stop();
    assert_eq!(controller.state(), AudioState::default());

    // Nothing stale arrives afterwards
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(controller.state(), AudioState::default());
    assert!(controller.current_track().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_new_play_supersedes_current_track() {
    let (controller, player) = controller();

    controller.play(track("a", 60_000));
    controller.play(track("b", 30_000));
    player.complete_buffering(Some(30_000));

    let state = wait_until(&controller, |s| !s.is_buffering).await;
    assert_eq!(state.current_track_id.as_deref(), Some("b"));
    assert_eq!(state.duration, 30_000);
    assert_eq!(controller.current_track().map(|t| t.id), Some("b".to_string()));
}

/// **Given:** track a superseded by a playing track b
/// **When:** the player reports a failure and the end of media for a's load
/// **Then:** b keeps playing untouched
#[tokio::test(start_paused = true)]
async fn test_events_from_superseded_load_are_discarded() {
    let mut handle = None;
    let mut sender: Option<PlayerEventSender> = None;
    let controller = AudioController::new(PlaybackOptions::default(), |events| {
        sender = Some(events.clone());
        let player = SimulatedPlayer::manual(events);
        handle = Some(player.clone());
        player
    })
    .expect("Failed to create controller");
    let player = handle.expect("Player factory not called");
    let sender = sender.expect("Player factory not called");

    controller.play(track("a", 60_000));
    let ready = play_ready(&controller, &player, track("b", 30_000), 30_000).await;
    assert_eq!(ready.current_track_id.as_deref(), Some("b"));

    // a was the first load
    sender
        .send(PlayerEvent::new(
            1,
            PlayerEventKind::Error {
                code: PlayerErrorCode::NetworkConnectionFailed,
                message: "connection reset".to_string(),
            },
        ))
        .expect("Event loop gone");
    sender
        .send(PlayerEvent::new(1, PlayerEventKind::StateChanged(PlayerStatus::Ended)))
        .expect("Event loop gone");
    tokio::time::sleep(Duration::from_millis(250)).await;

    let state = controller.state();
    assert_eq!(state.current_track_id.as_deref(), Some("b"));
    assert!(state.error.is_none());
    assert!(state.is_playing);
    assert_eq!(state.duration, 30_000);
    assert!(state.current_position > 0);
    assert!(controller.is_polling());
}

/// **Given:** repeated play/pause/resume cycles
/// **When:** the clock then runs for one second
/// **Then:** the position is sampled at the rate of a single poller
#[tokio::test(start_paused = true)]
async fn test_only_one_poller_at_a_time() {
    let (controller, player) = controller();

    play_ready(&controller, &player, track("a", 600_000), 600_000).await;
    for _ in 0..5 {
        controller.pause();
        controller.resume();
    }
    play_ready(&controller, &player, track("b", 600_000), 600_000).await;
    for _ in 0..5 {
        controller.resume();
        controller.pause();
        controller.resume();
    }
    // Let queued player events settle
    tokio::task::yield_now().await;
    assert!(controller.is_polling());

    let before = player.position_queries();
    tokio::time::sleep(Duration::from_millis(1000)).await;
    let samples = player.position_queries() - before;

    assert!((9..=11).contains(&samples), "{} position samples in 1s", samples);
}

/// **Given:** a track that is buffering
/// **When:** the player reports a network failure
/// **Then:** the error is published and playback is not running
#[tokio::test(start_paused = true)]
async fn test_network_error_published() {
    let (controller, player) = controller();

    controller.play(track("remote", 60_000));
    player.fail(PlayerErrorCode::NetworkConnectionFailed, "connection refused");

    let state = wait_until(&controller, |s| s.error.is_some()).await;
    assert_eq!(state.error, Some(AudioError::NetworkError));
    assert!(!state.is_playing);
    assert!(!state.is_buffering);
    assert_eq!(state.current_track_id.as_deref(), Some("remote"));
}

#[tokio::test(start_paused = true)]
async fn test_error_while_playing_stops_polling() {
    let (controller, player) = controller();
    play_ready(&controller, &player, track("a", 60_000), 60_000).await;

    player.fail(PlayerErrorCode::Unspecified, "device lost");
    let state = wait_until(&controller, |s| s.error.is_some()).await;

    assert_eq!(state.error, Some(AudioError::Unknown("device lost".to_string())));
    assert!(!state.is_playing);
    assert!(!controller.is_polling());
}

#[tokio::test(start_paused = true)]
async fn test_only_play_or_stop_recover_from_error() {
    let (controller, player) = controller();

    controller.play(track("missing", 60_000));
    player.fail(PlayerErrorCode::FileNotFound, "no such file");
    let failed = wait_until(&controller, |s| s.error.is_some()).await;
    assert_eq!(failed.error, Some(AudioError::FileNotFound));

    controller.resume();
    controller.pause();
    controller.seek_to(1_000);
    assert_eq!(controller.state(), failed);

    let recovered = play_ready(&controller, &player, track("other", 60_000), 60_000).await;
    assert!(recovered.error.is_none());
    assert_eq!(recovered.current_track_id.as_deref(), Some("other"));
}

#[tokio::test(start_paused = true)]
async fn test_end_of_media() {
    let (controller, player) = controller();
    play_ready(&controller, &player, track("a", 5_000), 5_000).await;

    player.finish();
    let ended = wait_until(&controller, |s| !s.is_playing).await;

    assert_eq!(ended.current_position, 5_000);
    assert_eq!(ended.duration, 5_000);
    assert!(!ended.is_paused);
    assert!(!controller.is_polling());
}

#[tokio::test(start_paused = true)]
async fn test_speed_and_volume() {
    let (controller, player) = controller();
    play_ready(&controller, &player, track("a", 60_000), 60_000).await;

    controller.set_playback_speed(PlaybackSpeed::Slow);
    controller.set_volume(1.7);
    let state = controller.state();
    assert_eq!(state.playback_speed, 0.75);
    assert_eq!(state.volume, 1.0);
    assert_eq!(player.speed(), 0.75);

    controller.set_volume(-0.5);
    assert_eq!(controller.state().volume, 0.0);

    controller.set_volume(0.4);
    controller.set_volume(f32::NAN);
    assert_eq!(controller.state().volume, 0.4);
    assert_eq!(player.volume(), 0.4);

    // A new track starts from default speed and volume
    controller.play(track("b", 60_000));
    let state = controller.state();
    assert_eq!(state.playback_speed, 1.0);
    assert_eq!(state.volume, 1.0);
    assert_eq!(player.speed(), 1.0);
    assert_eq!(player.volume(), 1.0);
}

#[tokio::test(start_paused = true)]
async fn test_commands_ignored_after_release() {
    let (controller, player) = controller();
    play_ready(&controller, &player, track("a", 60_000), 60_000).await;

    controller.release();
    assert!(controller.is_released());
    assert!(player.is_released());
    assert!(!controller.is_polling());
    assert_eq!(controller.state(), AudioState::default());

    controller.play(track("b", 60_000));
    controller.set_volume(0.2);
    controller.set_playback_speed(PlaybackSpeed::Fast);
    assert_eq!(controller.state(), AudioState::default());
}

#[tokio::test(start_paused = true)]
async fn test_watch_state_yields_current_then_changes() {
    use futures::StreamExt;

    let (controller, player) = controller();
    let mut states = controller.watch_state();

    assert_eq!(states.next().await, Some(AudioState::default()));

    controller.play(track("a", 60_000));
    let buffering = states.next().await.expect("stream ended");
    assert!(buffering.is_buffering);

    player.complete_buffering(Some(60_000));
    let ready = states.next().await.expect("stream ended");
    assert!(!ready.is_buffering);
}

/// **Given:** an automatic player whose media is zero milliseconds long
/// **When:** the track is played
/// **Then:** the session finishes even though position never passes duration
#[tokio::test(start_paused = true)]
async fn test_zero_length_media_finishes() {
    let options = AutoOptions {
        media_duration_ms: Some(0),
        ..AutoOptions::default()
    };
    let controller = AudioController::new(PlaybackOptions::default(), |events| {
        SimulatedPlayer::auto(events, options)
    })
    .expect("Failed to create controller");

    controller.play(AudioTrack::new("z", "https://example.com/z.mp3", "z").with_duration(0));
    let state = wait_until(&controller, |s| s.is_finished()).await;

    assert_eq!(state.current_track_id.as_deref(), Some("z"));
    assert_eq!(state.duration, 0);
    assert!(state.error.is_none());
    assert!(!controller.is_polling());
}

/// **Given:** fast position polling on a multi-threaded runtime
/// **When:** the track is repeatedly sought forward
/// **Then:** no tick publishes a position from before the seek
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_poll_never_publishes_position_from_before_seek() {
    let options = PlaybackOptions {
        poll_interval: Duration::from_millis(20),
    };
    let mut handle = None;
    let controller = AudioController::new(options, |events| {
        let player = SimulatedPlayer::manual(events);
        handle = Some(player.clone());
        player
    })
    .expect("Failed to create controller");
    let player = handle.expect("Player factory not called");
    play_ready(&controller, &player, track("a", 3_600_000), 3_600_000).await;

    for step in 1..=50u64 {
        let target = step * 60_000;
        controller.seek_to(target);
        tokio::time::sleep(Duration::from_millis(7)).await;
        let position = controller.state().current_position;
        assert!(position >= target, "position {} behind seek to {}", position, target);
    }
}

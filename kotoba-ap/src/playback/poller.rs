//! Position poller
//!
//! While media plays, a recurring tick samples the player position and
//! publishes it. A session owns at most one [`PositionPoller`]; each poller
//! carries the generation it was started under, and a tick may publish only
//! while that generation is still current. Cancelling advances the
//! generation before aborting the task, so a tick already in flight when
//! the poller is cancelled cannot publish.

use std::sync::atomic::{AtomicU64, Ordering};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};
use tracing::trace;

/// Default sampling period while playing
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Generation counter shared between a session and its poll ticks
#[derive(Debug, Default)]
pub struct PollGeneration(AtomicU64);

impl PollGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invalidate every outstanding tick and return the new generation
    pub fn advance(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.0.load(Ordering::SeqCst) == generation
    }
}

/// Handle to a running poll task
#[derive(Debug)]
pub struct PositionPoller {
    task: JoinHandle<()>,
    generation: u64,
}

impl PositionPoller {
    /// Spawn a poll task ticking every `period`
    ///
    /// `tick` receives the poller's generation and returns false to end the
    /// task. The first tick fires one period after start.
    pub fn start<F>(runtime: &Handle, generations: &PollGeneration, period: Duration, mut tick: F) -> Self
    where
        F: FnMut(u64) -> bool + Send + 'static,
    {
        let generation = generations.advance();

        let task = runtime.spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                if !tick(generation) {
                    trace!("Position poller {} finished", generation);
                    break;
                }
            }
        });

        Self { task, generation }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Stop ticking; no tick of this poller publishes after this returns
    pub fn cancel(self, generations: &PollGeneration) {
        if generations.is_current(self.generation) {
            generations.advance();
        }
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_ticks_at_period() {
        let generations = PollGeneration::new();
        let count = Arc::new(AtomicU64::new(0));
        let ticks = count.clone();

        let poller = PositionPoller::start(
            &Handle::current(),
            &generations,
            Duration::from_millis(100),
            move |_| {
                ticks.fetch_add(1, Ordering::SeqCst);
                true
            },
        );

        tokio::time::sleep(Duration::from_millis(350)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);

        poller.cancel(&generations);
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_cancel_invalidates_generation() {
        let generations = PollGeneration::new();
        let poller = PositionPoller::start(
            &Handle::current(),
            &generations,
            DEFAULT_POLL_INTERVAL,
            |_| true,
        );
        let generation = poller.generation();
        assert!(generations.is_current(generation));

        poller.cancel(&generations);
        assert!(!generations.is_current(generation));
    }

    #[tokio::test]
    async fn test_newer_poller_supersedes_older() {
        let generations = PollGeneration::new();
        let first = PositionPoller::start(&Handle::current(), &generations, DEFAULT_POLL_INTERVAL, |_| true);
        let second = PositionPoller::start(&Handle::current(), &generations, DEFAULT_POLL_INTERVAL, |_| true);

        assert!(!generations.is_current(first.generation()));
        assert!(generations.is_current(second.generation()));

        // Cancelling a stale poller leaves the live generation alone
        first.cancel(&generations);
        assert!(generations.is_current(second.generation()));
        second.cancel(&generations);
    }
}

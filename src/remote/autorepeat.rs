//! Per-button autorepeat timers for held remote control buttons.

use std::collections::HashMap;
use std::task::{Context, Poll};
use std::time::Duration;

use tokio_util::time::delay_queue::{DelayQueue, Key};
use tracing::trace;

use super::RemoteButton;
use crate::config::AutorepeatConfig;

/// Timer state for held buttons, owned by the controller task.
///
/// A press arms a timer with the initial delay; each fired timer is re-armed
/// with the repeat interval until the release cancels it. A second press for
/// an already-armed button replaces its timer, so duplicate down edges reset
/// the delay instead of stacking timers.
pub struct Autorepeat {
    initial_delay: Duration,
    repeat_interval: Duration,
    timers: DelayQueue<RemoteButton>,
    armed: HashMap<RemoteButton, Key>,
}

impl Autorepeat {
    pub fn new(config: &AutorepeatConfig) -> Self {
        Self {
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            repeat_interval: Duration::from_millis(config.repeat_interval_ms),
            timers: DelayQueue::new(),
            armed: HashMap::new(),
        }
    }

    /// True when no timer is armed. The controller skips polling the queue
    /// while idle, since an empty queue reports completion instead of
    /// pending.
    pub fn is_idle(&self) -> bool {
        self.armed.is_empty()
    }

    /// Arm the timer for `button` with the initial delay, replacing any
    /// timer already running for it.
    pub fn press(&mut self, button: RemoteButton) {
        if self.cancel(button) {
            trace!("Autorepeat timer reset for {}", button);
        }
        let key = self.timers.insert(button, self.initial_delay);
        self.armed.insert(button, key);
    }

    /// Cancel the timer for `button`, if one is armed.
    pub fn release(&mut self, button: RemoteButton) {
        self.cancel(button);
    }

    /// Re-arm `button` with the repeat interval after its timer fired.
    pub fn rearm(&mut self, button: RemoteButton) {
        let key = self.timers.insert(button, self.repeat_interval);
        self.armed.insert(button, key);
    }

    /// Drop all timers. Used on shutdown and listener failure so no repeat
    /// fires after the last real edge.
    pub fn clear(&mut self) {
        self.timers.clear();
        self.armed.clear();
    }

    /// Poll for the next fired timer. Returns the button whose timer
    /// expired; the caller is expected to emit the repeat event and call
    /// [`rearm`](Self::rearm).
    pub fn poll_fired(&mut self, cx: &mut Context<'_>) -> Poll<Option<RemoteButton>> {
        match self.timers.poll_expired(cx) {
            Poll::Ready(Some(expired)) => {
                let button = expired.into_inner();
                self.armed.remove(&button);
                Poll::Ready(Some(button))
            }
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }

    fn cancel(&mut self, button: RemoteButton) -> bool {
        match self.armed.remove(&button) {
            Some(key) => {
                self.timers.try_remove(&key);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::poll_fn;
    use tokio::time::{advance, Instant};

    fn test_config() -> AutorepeatConfig {
        AutorepeatConfig {
            initial_delay_ms: 500,
            repeat_interval_ms: 100,
        }
    }

    async fn next_fired(autorepeat: &mut Autorepeat) -> Option<RemoteButton> {
        poll_fn(|cx| autorepeat.poll_fired(cx)).await
    }

    #[tokio::test(start_paused = true)]
    async fn fires_after_initial_delay_then_at_interval() {
        let mut autorepeat = Autorepeat::new(&test_config());
        let start = Instant::now();

        autorepeat.press(RemoteButton::PLAY);

        let fired = next_fired(&mut autorepeat).await;
        assert_eq!(fired, Some(RemoteButton::PLAY));
        let first = start.elapsed().as_millis();
        assert!((500..520).contains(&first), "first fire at {}ms", first);

        autorepeat.rearm(RemoteButton::PLAY);
        let fired = next_fired(&mut autorepeat).await;
        assert_eq!(fired, Some(RemoteButton::PLAY));
        let second = start.elapsed().as_millis();
        assert!((600..620).contains(&second), "second fire at {}ms", second);
    }

    #[tokio::test(start_paused = true)]
    async fn release_cancels_pending_timer() {
        let mut autorepeat = Autorepeat::new(&test_config());

        autorepeat.press(RemoteButton::MENU);
        advance(Duration::from_millis(300)).await;
        autorepeat.release(RemoteButton::MENU);

        assert!(autorepeat.is_idle());
        // An empty queue reports end-of-stream rather than a fired timer.
        assert_eq!(next_fired(&mut autorepeat).await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_press_resets_the_delay() {
        let mut autorepeat = Autorepeat::new(&test_config());
        let start = Instant::now();

        autorepeat.press(RemoteButton::RIGHT);
        advance(Duration::from_millis(400)).await;
        autorepeat.press(RemoteButton::RIGHT);

        let fired = next_fired(&mut autorepeat).await;
        assert_eq!(fired, Some(RemoteButton::RIGHT));
        let at = start.elapsed().as_millis();
        assert!((900..920).contains(&at), "fired at {}ms", at);
    }

    #[tokio::test(start_paused = true)]
    async fn buttons_repeat_independently() {
        let mut autorepeat = Autorepeat::new(&test_config());

        autorepeat.press(RemoteButton::PLUS);
        advance(Duration::from_millis(200)).await;
        autorepeat.press(RemoteButton::MINUS);
        autorepeat.release(RemoteButton::PLUS);

        let fired = next_fired(&mut autorepeat).await;
        assert_eq!(fired, Some(RemoteButton::MINUS));
        assert!(autorepeat.is_idle());
    }

    #[tokio::test(start_paused = true)]
    async fn clear_drops_all_timers() {
        let mut autorepeat = Autorepeat::new(&test_config());

        autorepeat.press(RemoteButton::PLUS);
        autorepeat.press(RemoteButton::MINUS);
        autorepeat.clear();

        assert!(autorepeat.is_idle());
        assert_eq!(next_fired(&mut autorepeat).await, None);
    }
}

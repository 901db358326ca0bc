use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration};

use crate::core::time::{Clock, SharedClock};

const TICK_PERIOD: Duration = Duration::from_millis(1_000);

/// Sink for the rendered `MM:SS` readout. The timer has no opinion on
/// presentation beyond that format.
pub(crate) trait TimerDisplay: Send + Sync {
    fn show(&self, remaining: &str);
}

pub(crate) type ExpiryCallback = Box<dyn FnOnce() + Send + 'static>;

/// Countdown against a fixed deadline. Remaining time is recomputed from the
/// deadline on every tick, never decremented, so a timer rebuilt after a
/// client restart lands on the same wall-clock end instant.
///
/// Termination is exactly-once: however many ticks race past zero, the expiry
/// callback runs a single time, and never after `stop()`.
pub(crate) struct CountdownTimer {
    deadline_ms: i64,
    clock: SharedClock,
    cancelled: Arc<AtomicBool>,
    expired: Arc<AtomicBool>,
    shutdown: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl CountdownTimer {
    pub(crate) fn new(deadline_ms: i64, clock: SharedClock) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            deadline_ms,
            clock,
            cancelled: Arc::new(AtomicBool::new(false)),
            expired: Arc::new(AtomicBool::new(false)),
            shutdown,
            task: None,
        }
    }

    pub(crate) fn remaining_ms(&self) -> i64 {
        self.deadline_ms - self.clock.now_ms()
    }

    pub(crate) fn has_expired(&self) -> bool {
        self.expired.load(Ordering::SeqCst)
    }

    pub(crate) fn start(&mut self, display: Arc<dyn TimerDisplay>, on_expire: ExpiryCallback) {
        if self.task.is_some() || self.expired.load(Ordering::SeqCst) {
            return;
        }

        // A deadline already in the past is terminal right away; no tick is
        // ever scheduled for it.
        if self.remaining_ms() <= 0 {
            if !self.cancelled.load(Ordering::SeqCst)
                && !self.expired.swap(true, Ordering::SeqCst)
            {
                on_expire();
            }
            return;
        }

        let deadline_ms = self.deadline_ms;
        let clock = self.clock.clone();
        let cancelled = self.cancelled.clone();
        let expired = self.expired.clone();
        let mut shutdown = self.shutdown.subscribe();
        let mut on_expire = Some(on_expire);

        self.task = Some(tokio::spawn(async move {
            let mut tick = interval(TICK_PERIOD);
            loop {
                tokio::select! {
                    _ = shutdown.changed() => break,
                    _ = tick.tick() => {
                        // stop() may land between a tick being scheduled and
                        // it firing; the flag wins over the schedule.
                        if cancelled.load(Ordering::SeqCst) {
                            break;
                        }

                        let remaining = deadline_ms - clock.now_ms();
                        if remaining <= 0 {
                            if !expired.swap(true, Ordering::SeqCst) {
                                if let Some(callback) = on_expire.take() {
                                    callback();
                                }
                            }
                            break;
                        }

                        display.show(&format_clock(remaining));
                    }
                }
            }
        }));
    }

    /// Idempotent; safe before `start`, after expiry, and from an unrelated
    /// event such as a successful submission.
    pub(crate) fn stop(&mut self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.shutdown.send(true).ok();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// `MM:SS` with total minutes (a two-hour exam renders as `120:00`, not a
/// clock time). Sub-second remainders round up, so `00:00` can never appear
/// while time is still left; negatives clamp to zero.
pub(crate) fn format_clock(remaining_ms: i64) -> String {
    let whole_seconds = (remaining_ms.max(0) + 999) / 1_000;
    let minutes = whole_seconds / 60;
    let seconds = whole_seconds % 60;
    format!("{minutes:02}:{seconds:02}")
}

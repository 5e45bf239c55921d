//! Deadline-based countdown timer
//!
//! Both the ad gate and the session expiry run on this timer. The
//! countdown fixes its deadline when started; per-second display ticks
//! are purely cosmetic and completion is judged against the deadline,
//! so a stalled or backgrounded UI cannot stretch the countdown.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// A one-shot countdown with latched completion
///
/// Completion and cancellation are mutually exclusive: whichever is
/// observed first sticks. A cancel that arrives after the deadline has
/// been observed is ignored, and a completed countdown never reverts.
#[derive(Debug)]
pub struct Countdown {
    deadline: Instant,
    duration: Duration,
    cancelled: CancellationToken,
    completed: AtomicBool,
}

impl Countdown {
    /// Start a countdown ending `duration` from now
    pub fn start(duration: Duration) -> Self {
        Self {
            deadline: Instant::now() + duration,
            duration,
            cancelled: CancellationToken::new(),
            completed: AtomicBool::new(false),
        }
    }

    /// The full length of this countdown
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Time left until the deadline
    pub fn remaining(&self) -> Duration {
        if self.is_complete() {
            return Duration::ZERO;
        }
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Whole seconds left, rounded up so a fresh timer shows its full length
    pub fn remaining_secs(&self) -> u64 {
        let remaining = self.remaining();
        remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0)
    }

    /// Whether the deadline has passed
    ///
    /// Once this returns true it keeps returning true. A cancelled
    /// countdown never completes, even after its deadline passes.
    pub fn is_complete(&self) -> bool {
        if self.completed.load(Ordering::SeqCst) {
            return true;
        }
        if self.cancelled.is_cancelled() {
            return false;
        }
        if Instant::now() >= self.deadline {
            self.completed.store(true, Ordering::SeqCst);
            return true;
        }
        false
    }

    /// Whether the countdown was cancelled before completing
    pub fn is_cancelled(&self) -> bool {
        !self.completed.load(Ordering::SeqCst) && self.cancelled.is_cancelled()
    }

    /// Stop the countdown
    ///
    /// Ignored if the countdown has already completed.
    pub fn cancel(&self) {
        if !self.is_complete() {
            self.cancelled.cancel();
        }
    }

    /// Wait for the countdown to finish
    ///
    /// Returns true when the deadline is reached and false when the
    /// countdown is cancelled first.
    pub async fn wait(&self) -> bool {
        if self.is_complete() {
            return true;
        }
        if self.cancelled.is_cancelled() {
            return false;
        }

        tokio::select! {
            _ = tokio::time::sleep_until(self.deadline) => {
                self.completed.store(true, Ordering::SeqCst);
                true
            }
            _ = self.cancelled.cancelled() => false,
        }
    }
}

//! Repetition countdown timer.
//!
//! A single-shot repeating countdown: `start()` arms it at the configured
//! duration, one tick per second counts it down with a spoken cue per value,
//! and at zero a release cue fires followed, after a short grace delay, by
//! the completion callback (the repetition increment).
//!
//! The timer is a pure state machine with no internal thread -- the session
//! driver schedules the one-second ticks and the grace delay and delivers
//! them back via [`tick`](CountdownTimer::tick) and
//! [`release`](CountdownTimer::release). Every scheduled callback captures
//! the `epoch` current at scheduling time; `stop()` bumps the epoch, so a
//! callback that raced past its cancellation self-discards on arrival.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> Expired -> Idle
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Interval between countdown ticks.
pub const TICK: Duration = Duration::from_secs(1);
/// Delay between the release cue and the completion callback.
pub const GRACE: Duration = Duration::from_millis(500);

pub const DEFAULT_DURATION_SECS: u32 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Expired,
}

/// Result of arming the timer: the value to announce and the epoch that
/// scheduled callbacks must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerStart {
    pub announce: u32,
    pub epoch: u64,
}

/// Result of delivering a one-second tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The tick belonged to a stopped run; nothing happened.
    Stale,
    /// Countdown continues; announce the new value and schedule the next tick.
    Cue(u32),
    /// Countdown reached zero; announce the release cue and schedule the
    /// grace delay before [`CountdownTimer::release`].
    Release,
}

/// Countdown timer state machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountdownTimer {
    enabled: bool,
    duration_secs: u32,
    remaining: u32,
    state: TimerState,
    /// Bumped on every stop; stale scheduled callbacks carry an older value.
    epoch: u64,
}

impl Default for CountdownTimer {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION_SECS)
    }
}

impl CountdownTimer {
    pub fn new(duration_secs: u32) -> Self {
        Self {
            enabled: true,
            duration_secs,
            remaining: duration_secs,
            state: TimerState::Idle,
            epoch: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Arm the countdown. Returns `None` when the feature is disabled or a
    /// countdown is already in flight (idempotent start).
    pub fn start(&mut self) -> Option<TimerStart> {
        if !self.enabled || self.state != TimerState::Idle {
            return None;
        }
        self.state = TimerState::Running;
        self.remaining = self.duration_secs;
        Some(TimerStart {
            announce: self.remaining,
            epoch: self.epoch,
        })
    }

    /// Deliver a one-second tick scheduled under `epoch`.
    pub fn tick(&mut self, epoch: u64) -> TickOutcome {
        if epoch != self.epoch || self.state != TimerState::Running {
            return TickOutcome::Stale;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining > 0 {
            TickOutcome::Cue(self.remaining)
        } else {
            self.state = TimerState::Expired;
            TickOutcome::Release
        }
    }

    /// Deliver the post-grace completion scheduled under `epoch`. Returns
    /// whether the completion callback (repetition increment) should run.
    pub fn release(&mut self, epoch: u64) -> bool {
        if epoch != self.epoch || self.state != TimerState::Expired {
            return false;
        }
        self.reset_run();
        true
    }

    /// Cancel the current countdown, if any. After this returns no tick or
    /// completion from the cancelled run is observable.
    pub fn stop(&mut self) {
        self.reset_run();
    }

    /// Disabling stops any running countdown synchronously.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.stop();
        }
    }

    /// Reconfigure the countdown length. Takes effect for the next run; an
    /// in-flight countdown keeps its remaining time.
    pub fn set_duration(&mut self, duration_secs: u32) {
        self.duration_secs = duration_secs;
        if self.state == TimerState::Idle {
            self.remaining = duration_secs;
        }
    }

    fn reset_run(&mut self) {
        self.epoch += 1;
        self.state = TimerState::Idle;
        self.remaining = self.duration_secs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Drive a full countdown, returning the cue values announced.
    fn run_to_release(timer: &mut CountdownTimer) -> Vec<u32> {
        let start = timer.start().expect("timer should arm");
        let mut cues = vec![start.announce];
        loop {
            match timer.tick(start.epoch) {
                TickOutcome::Cue(v) => cues.push(v),
                TickOutcome::Release => break,
                TickOutcome::Stale => panic!("unexpected stale tick"),
            }
        }
        cues
    }

    #[test]
    fn counts_down_and_releases() {
        let mut timer = CountdownTimer::new(5);
        let cues = run_to_release(&mut timer);
        assert_eq!(cues, vec![5, 4, 3, 2, 1]);
        assert_eq!(timer.state(), TimerState::Expired);

        assert!(timer.release(0));
        assert_eq!(timer.state(), TimerState::Idle);
        assert_eq!(timer.remaining(), 5);
    }

    #[test]
    fn start_is_idempotent_while_running() {
        let mut timer = CountdownTimer::new(5);
        assert!(timer.start().is_some());
        assert!(timer.start().is_none());
        // Also a no-op during the grace window.
        while timer.tick(0) != TickOutcome::Release {}
        assert!(timer.start().is_none());
    }

    #[test]
    fn disabled_timer_does_not_arm() {
        let mut timer = CountdownTimer::new(5);
        timer.set_enabled(false);
        assert!(timer.start().is_none());
    }

    #[test]
    fn stop_discards_in_flight_callbacks() {
        let mut timer = CountdownTimer::new(5);
        let start = timer.start().unwrap();
        assert_eq!(timer.tick(start.epoch), TickOutcome::Cue(4));

        timer.stop();
        assert_eq!(timer.state(), TimerState::Idle);
        // A tick scheduled before the stop arrives late: it must be inert.
        assert_eq!(timer.tick(start.epoch), TickOutcome::Stale);
        assert!(!timer.release(start.epoch));
        assert_eq!(timer.remaining(), 5);
    }

    #[test]
    fn stop_during_grace_discards_completion() {
        let mut timer = CountdownTimer::new(1);
        let start = timer.start().unwrap();
        assert_eq!(timer.tick(start.epoch), TickOutcome::Release);
        timer.stop();
        assert!(!timer.release(start.epoch));
    }

    #[test]
    fn release_fires_at_most_once() {
        let mut timer = CountdownTimer::new(1);
        let start = timer.start().unwrap();
        assert_eq!(timer.tick(start.epoch), TickOutcome::Release);
        assert!(timer.release(start.epoch));
        assert!(!timer.release(start.epoch));
    }

    #[test]
    fn disabling_mid_run_stops() {
        let mut timer = CountdownTimer::new(5);
        let start = timer.start().unwrap();
        timer.set_enabled(false);
        assert_eq!(timer.tick(start.epoch), TickOutcome::Stale);
        assert!(timer.start().is_none());
    }

    #[test]
    fn set_duration_applies_when_idle() {
        let mut timer = CountdownTimer::new(15);
        timer.set_duration(5);
        assert_eq!(timer.remaining(), 5);
        let cues = run_to_release(&mut timer);
        assert_eq!(cues.len(), 5);
    }
}

//! Timer primitives
//!
//! Every "timeout" in the controller is a deadline compared against the
//! caller-supplied clock - the core never sleeps. Two shapes cover all of
//! them: a one-shot [`Countdown`] (attack-start delay, no-target timeout,
//! stuck detection, unstuck completion) and a periodic [`IntervalTimer`]
//! with a randomized re-arm (targeting key, attack rotation, buff checks).
//!
//! A timer exists only while the state that owns it is active; the
//! [`TimerSet`] is cleared on every state exit so nothing fires stale.

use chrono::{Duration, NaiveDateTime};
use rand::Rng;

/// One-shot deadline armed at state entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    deadline: NaiveDateTime,
}

impl Countdown {
    pub fn arm(now: NaiveDateTime, timeout_ms: u64) -> Self {
        Self {
            deadline: now + Duration::milliseconds(timeout_ms as i64),
        }
    }

    pub fn elapsed(&self, now: NaiveDateTime) -> bool {
        now >= self.deadline
    }

    pub fn reset(&mut self, now: NaiveDateTime, timeout_ms: u64) {
        self.deadline = now + Duration::milliseconds(timeout_ms as i64);
    }
}

/// Periodic timer that re-arms itself a uniform-random interval into the
/// future each time it fires. Due immediately when armed, so the first
/// fire lands on the arming state's first tick - press first, wait after,
/// the way the firmware loop behaves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalTimer {
    next_due: NaiveDateTime,
    min_ms: u64,
    max_ms: u64,
}

impl IntervalTimer {
    pub fn arm(now: NaiveDateTime, min_ms: u64, max_ms: u64) -> Self {
        Self {
            next_due: now,
            min_ms,
            max_ms,
        }
    }

    /// Fixed-period variant (buff checks have no jitter).
    pub fn fixed(now: NaiveDateTime, period_ms: u64) -> Self {
        Self::arm(now, period_ms, period_ms)
    }

    /// Check the deadline and, if due, re-arm. Returns whether the timer
    /// fired this tick.
    pub fn fire(&mut self, now: NaiveDateTime, rng: &mut impl Rng) -> bool {
        if now < self.next_due {
            return false;
        }
        let period_ms = if self.min_ms == self.max_ms {
            self.min_ms
        } else {
            rng.random_range(self.min_ms..=self.max_ms)
        };
        self.next_due = now + Duration::milliseconds(period_ms as i64);
        true
    }
}

/// All timers the controller may hold, by owner.
///
/// `None` / empty means "not armed". State entry actions arm what they
/// own; [`TimerSet::clear`] runs on every exit.
#[derive(Debug, Clone, Default)]
pub struct TimerSet {
    /// NoTarget: give up after searching this long
    pub no_target: Option<Countdown>,
    /// NoTarget: targeting key cadence
    pub targeting: Option<IntervalTimer>,
    /// Approaching: delay before the rotation starts
    pub attack_start: Option<Countdown>,
    /// Attacking: flat-HP watchdog
    pub stuck: Option<Countdown>,
    /// Attacking: one interval per attack key, in rotation order
    pub attacks: Vec<IntervalTimer>,
    /// Attacking: one fixed-period check per buff binding
    pub buffs: Vec<IntervalTimer>,
    /// Stuck: when the unstuck hold sequence has played out
    pub unstuck_done: Option<Countdown>,
}

impl TimerSet {
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

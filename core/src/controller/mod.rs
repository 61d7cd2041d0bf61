//! The conditional clicker controller
//!
//! One coherent core driven by an external scheduler:
//!
//! ```text
//! SensorSnapshot ──▶ Debouncer ──▶ State Machine ──▶ Synthesizer ──▶ Vec<KeyAction>
//!                    (stable        (transitions,       (ordered
//!                     signal)        timer firings)      commands)
//! ```
//!
//! The controller performs no I/O and never sleeps: every deadline is
//! compared against the caller-supplied `now`, which makes the whole
//! engine deterministic under test. All mutation happens inside
//! [`Controller::tick`]; snapshot and profile are immutable for the call.

pub mod actions;
mod lifecycle;

#[cfg(test)]
mod controller_tests;

pub use actions::TickFirings;
pub use lifecycle::LifecycleState;

use chrono::NaiveDateTime;
use farmhand_types::{KeyAction, Profile};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::error::{ConfigError, TickError};
use crate::profile;
use crate::sensor::{SensorDebouncer, SensorSnapshot, StableSignal};
use crate::timer::TimerSet;

/// Mutable controller state: lifecycle + timers + stuck baseline.
/// Mutated only by the state machine during a tick.
#[derive(Debug, Clone)]
pub(crate) struct ControllerState {
    pub lifecycle: LifecycleState,
    pub timers: TimerSet,
    /// Last numeric HP the stuck watchdog is anchored to
    pub stuck_baseline: Option<f32>,
}

impl ControllerState {
    fn new() -> Self {
        Self {
            lifecycle: LifecycleState::NoTarget,
            timers: TimerSet::default(),
            stuck_baseline: None,
        }
    }
}

/// The decision engine. Created by [`start`](Self::start), advanced one
/// [`tick`](Self::tick) at a time, ended by [`stop`](Self::stop).
///
/// Exclusive ownership is the concurrency model: the caller drives ticks
/// from a single place and hands the returned actions to the actuator.
#[derive(Debug)]
pub struct Controller {
    profile: Profile,
    state: ControllerState,
    debouncer: SensorDebouncer,
    rng: StdRng,
    tick_count: u64,
    last_tick_at: Option<NaiveDateTime>,
}

impl Controller {
    /// Validate the profile and build a controller in `NoTarget`.
    ///
    /// The initial entry timers are armed on the first tick - the
    /// controller has no clock of its own.
    pub fn start(profile: Profile) -> Result<Self, ConfigError> {
        Self::build(profile, StdRng::from_os_rng())
    }

    /// Like [`start`](Self::start), with seeded interval randomness.
    /// Replays and tests use this for reproducible key cadence.
    pub fn start_seeded(profile: Profile, seed: u64) -> Result<Self, ConfigError> {
        Self::build(profile, StdRng::seed_from_u64(seed))
    }

    fn build(profile: Profile, rng: StdRng) -> Result<Self, ConfigError> {
        profile::validate(&profile)?;
        Ok(Self {
            debouncer: SensorDebouncer::new(profile.hp.clone()),
            profile,
            state: ControllerState::new(),
            rng,
            tick_count: 0,
            last_tick_at: None,
        })
    }

    /// Advance one tick: debounce the snapshot, run the state machine,
    /// and synthesize this tick's ordered action list.
    ///
    /// `now` must be strictly after the previous tick's `now`. A stopped
    /// controller accepts ticks and returns no actions.
    pub fn tick(
        &mut self,
        snapshot: &SensorSnapshot,
        now: NaiveDateTime,
    ) -> Result<Vec<KeyAction>, TickError> {
        if let Some(prev) = self.last_tick_at
            && now <= prev
        {
            return Err(TickError::TimeWentBackwards { prev, now });
        }
        let first_tick = self.last_tick_at.is_none();
        self.last_tick_at = Some(now);
        self.tick_count += 1;

        if self.state.lifecycle == LifecycleState::Stopped {
            return Ok(Vec::new());
        }

        // Initial NoTarget entry, deferred until a clock exists
        if first_tick {
            lifecycle::enter_no_target(&mut self.state, &self.profile, now);
        }

        let signal = self.debouncer.update(snapshot, now).clone();
        let firings = lifecycle::advance(
            &mut self.state,
            &signal,
            snapshot,
            &self.profile,
            now,
            &mut self.rng,
        );

        Ok(actions::synthesize(&firings, &self.profile))
    }

    /// Force `Stopped` and clear every timer. Instantaneous; actions
    /// already handed to the actuator are not retracted.
    pub fn stop(&mut self) {
        tracing::info!("[LIFECYCLE] stopped");
        lifecycle::enter_stopped(&mut self.state);
    }

    // ─── Accessors ──────────────────────────────────────────────────────────

    pub fn lifecycle(&self) -> LifecycleState {
        self.state.lifecycle
    }

    pub fn signal(&self) -> &StableSignal {
        self.debouncer.signal()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }
}

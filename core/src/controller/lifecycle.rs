//! Target lifecycle state machine
//!
//! Tracks the acquisition lifecycle and owns every timer transition:
//! - NoTarget: searching; targeting key on its interval, give-up timeout
//! - Approaching: target acquired, waiting out the attack-start delay
//! - Attacking: rotation + buff/status upkeep + stuck watchdog
//! - Stuck: unstuck hold sequence playing out
//! - OnDeath: pass-through; fires the on-death key and lands in NoTarget
//! - Stopped: terminal until externally restarted
//!
//! When several deadlines resolve in one tick they are processed in fixed
//! priority order: death > stuck > attack-start > buff/status checks >
//! rotation > targeting. Identical inputs always produce identical
//! transitions and firings.

use chrono::NaiveDateTime;
use farmhand_types::Profile;
use rand::rngs::StdRng;

use crate::sensor::{SensorSnapshot, StableSignal};
use crate::timer::{Countdown, IntervalTimer};

use super::ControllerState;
use super::actions::TickFirings;

/// Target-acquisition lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Searching for a target
    NoTarget,
    /// Target acquired; closing distance before the rotation starts
    Approaching,
    /// Rotation, buffs and status upkeep running
    Attacking,
    /// Unstuck sequence playing out
    Stuck,
    /// Target just died; never observed across ticks
    OnDeath,
    /// Terminal until externally restarted
    Stopped,
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::NoTarget => "no_target",
            Self::Approaching => "approaching",
            Self::Attacking => "attacking",
            Self::Stuck => "stuck",
            Self::OnDeath => "on_death",
            Self::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Advance the state machine one tick and record which timers and
/// transitions resolved, for the synthesizer to turn into key actions.
pub(super) fn advance(
    state: &mut ControllerState,
    signal: &StableSignal,
    snapshot: &SensorSnapshot,
    profile: &Profile,
    now: NaiveDateTime,
    rng: &mut StdRng,
) -> TickFirings {
    let mut firings = TickFirings::default();

    match state.lifecycle {
        LifecycleState::NoTarget => handle_no_target(state, signal, profile, now, rng, &mut firings),
        LifecycleState::Approaching => {
            handle_approaching(state, signal, snapshot, profile, now, rng, &mut firings)
        }
        LifecycleState::Attacking => {
            handle_attacking(state, signal, snapshot, profile, now, rng, &mut firings)
        }
        LifecycleState::Stuck => {
            handle_stuck(state, signal, snapshot, profile, now, rng, &mut firings)
        }
        // OnDeath resolves within the tick that produced it
        LifecycleState::OnDeath => enter_no_target(state, profile, now),
        LifecycleState::Stopped => {}
    }

    firings
}

// ═══════════════════════════════════════════════════════════════════════════
// Per-state handlers
// ═══════════════════════════════════════════════════════════════════════════

fn handle_no_target(
    state: &mut ControllerState,
    signal: &StableSignal,
    profile: &Profile,
    now: NaiveDateTime,
    rng: &mut StdRng,
    firings: &mut TickFirings,
) {
    // An Alive reading wins over the give-up deadline in the same tick
    if signal.hp_state.is_alive() {
        tracing::info!("[LIFECYCLE] target acquired, approaching");
        enter_approaching(state, profile, now);
        firings.instant = !profile.instant_keys.is_empty();
        return;
    }

    if let Some(timer) = &state.timers.no_target
        && timer.elapsed(now)
    {
        tracing::info!(
            "[LIFECYCLE] no target for {}ms, stopping",
            profile.no_target_timeout_ms
        );
        enter_stopped(state);
        return;
    }

    if let Some(timer) = &mut state.timers.targeting
        && timer.fire(now, rng)
    {
        firings.targeting = true;
    }
}

fn handle_approaching(
    state: &mut ControllerState,
    signal: &StableSignal,
    snapshot: &SensorSnapshot,
    profile: &Profile,
    now: NaiveDateTime,
    rng: &mut StdRng,
    firings: &mut TickFirings,
) {
    // Target lost before engagement (including a misread that has not yet
    // debounced to Dead) - resume searching
    if !signal.hp_state.is_alive() {
        tracing::info!("[LIFECYCLE] target lost before engagement");
        enter_no_target(state, profile, now);
        return;
    }

    if let Some(timer) = &state.timers.attack_start
        && timer.elapsed(now)
    {
        tracing::info!("[LIFECYCLE] engaging");
        enter_attacking(state, signal, profile, now);
        fire_attacking_timers(state, snapshot, profile, now, rng, firings);
    }
}

fn handle_attacking(
    state: &mut ControllerState,
    signal: &StableSignal,
    snapshot: &SensorSnapshot,
    profile: &Profile,
    now: NaiveDateTime,
    rng: &mut StdRng,
    firings: &mut TickFirings,
) {
    if signal.hp_state.is_dead() {
        pass_through_on_death(state, profile, now, firings);
        return;
    }

    // Any numeric movement (beyond the OCR epsilon) restarts the stuck
    // watchdog; the debounced classification is irrelevant here
    if let Some(hp) = signal.last_numeric_hp {
        let moved = match state.stuck_baseline {
            Some(base) => (hp - base).abs() > profile.hp.change_epsilon,
            None => true,
        };
        if moved {
            state.stuck_baseline = Some(hp);
            if let Some(stuck) = &mut state.timers.stuck {
                stuck.reset(now, profile.stuck.timeout_ms);
            }
        }
    }

    if let Some(stuck) = &state.timers.stuck
        && stuck.elapsed(now)
    {
        tracing::info!(
            "[LIFECYCLE] hp flat for {}ms, running unstuck sequence",
            profile.stuck.timeout_ms
        );
        enter_stuck(state, profile, now);
        firings.unstuck = !profile.stuck.unstuck_sequence.is_empty();
        return;
    }

    fire_attacking_timers(state, snapshot, profile, now, rng, firings);
}

fn handle_stuck(
    state: &mut ControllerState,
    signal: &StableSignal,
    snapshot: &SensorSnapshot,
    profile: &Profile,
    now: NaiveDateTime,
    rng: &mut StdRng,
    firings: &mut TickFirings,
) {
    // Death outranks recovery
    if signal.hp_state.is_dead() {
        pass_through_on_death(state, profile, now, firings);
        return;
    }

    if let Some(done) = &state.timers.unstuck_done
        && done.elapsed(now)
    {
        tracing::info!("[LIFECYCLE] unstuck sequence complete, re-engaging");
        enter_attacking(state, signal, profile, now);
        fire_attacking_timers(state, snapshot, profile, now, rng, firings);
    }
}

/// Buff/status checks and the attack rotation, in priority order.
/// Shared by the Attacking tick and by same-tick entry into Attacking.
fn fire_attacking_timers(
    state: &mut ControllerState,
    snapshot: &SensorSnapshot,
    profile: &Profile,
    now: NaiveDateTime,
    rng: &mut StdRng,
    firings: &mut TickFirings,
) {
    // Status effects: re-evaluated every tick; key emitted while the
    // template is absent, suppressed while present
    for (idx, binding) in profile.status_effects.iter().enumerate() {
        if !snapshot.effect_present(&binding.effect) {
            firings.status_keys.push(idx);
        }
    }

    // Buffs: at most one check-and-fire per period, firing only when the
    // template is absent at check time
    for (idx, timer) in state.timers.buffs.iter_mut().enumerate() {
        if timer.fire(now, rng) && !snapshot.effect_present(&profile.buffs[idx].effect) {
            firings.buff_keys.push(idx);
        }
    }

    // Rotation: each key on its own clock; several may fire in one tick
    for (idx, timer) in state.timers.attacks.iter_mut().enumerate() {
        if timer.fire(now, rng) {
            firings.attack_keys.push(idx);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Entry actions
// ═══════════════════════════════════════════════════════════════════════════

pub(super) fn enter_no_target(state: &mut ControllerState, profile: &Profile, now: NaiveDateTime) {
    state.lifecycle = LifecycleState::NoTarget;
    state.timers.clear();
    state.stuck_baseline = None;
    state.timers.no_target = Some(Countdown::arm(now, profile.no_target_timeout_ms));
    state.timers.targeting = Some(IntervalTimer::arm(
        now,
        profile.targeting.min_interval_ms,
        profile.targeting.max_interval_ms,
    ));
}

fn enter_approaching(state: &mut ControllerState, profile: &Profile, now: NaiveDateTime) {
    state.lifecycle = LifecycleState::Approaching;
    state.timers.clear();
    state.timers.attack_start = Some(Countdown::arm(now, profile.attack_start_delay_ms));
}

fn enter_attacking(
    state: &mut ControllerState,
    signal: &StableSignal,
    profile: &Profile,
    now: NaiveDateTime,
) {
    state.lifecycle = LifecycleState::Attacking;
    state.timers.clear();
    state.timers.attacks = profile
        .attack_keys
        .iter()
        .map(|k| IntervalTimer::arm(now, k.min_interval_ms, k.max_interval_ms))
        .collect();
    state.timers.buffs = profile
        .buffs
        .iter()
        .map(|b| IntervalTimer::fixed(now, b.check_interval_ms))
        .collect();
    state.timers.stuck = Some(Countdown::arm(now, profile.stuck.timeout_ms));
    state.stuck_baseline = signal.last_numeric_hp;
}

fn enter_stuck(state: &mut ControllerState, profile: &Profile, now: NaiveDateTime) {
    state.lifecycle = LifecycleState::Stuck;
    state.timers.clear();
    // The actuator plays holds back-to-back in real time; hold Stuck for
    // their summed duration, then re-engage
    let total_ms: u64 = profile
        .stuck
        .unstuck_sequence
        .iter()
        .map(|step| step.hold_ms)
        .sum();
    state.timers.unstuck_done = Some(Countdown::arm(now, total_ms));
}

/// OnDeath is transient: fire the on-death key (if configured) and land
/// in NoTarget within the same tick.
fn pass_through_on_death(
    state: &mut ControllerState,
    profile: &Profile,
    now: NaiveDateTime,
    firings: &mut TickFirings,
) {
    tracing::info!("[LIFECYCLE] target dead");
    state.lifecycle = LifecycleState::OnDeath;
    firings.on_death = profile.on_death_key.is_some();
    enter_no_target(state, profile, now);
}

pub(super) fn enter_stopped(state: &mut ControllerState) {
    state.lifecycle = LifecycleState::Stopped;
    state.timers.clear();
    state.stuck_baseline = None;
}

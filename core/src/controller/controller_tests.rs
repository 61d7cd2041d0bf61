//! Tests for the controller
//!
//! Drives `Controller` through recorded snapshot sequences with injected
//! time; covers the lifecycle transitions, debounce interplay, timer
//! priorities, and synthesizer purity.

use chrono::{Duration, NaiveDateTime};
use farmhand_types::{
    AttackKey, BuffBinding, EffectId, HoldStep, KeyAction, KeyName, Profile, StatusEffectBinding,
    StuckConfig, TargetingConfig,
};

use super::actions::{self, TickFirings};
use super::{Controller, LifecycleState};
use crate::error::TickError;
use crate::sensor::SensorSnapshot;

fn t(ms: i64) -> NaiveDateTime {
    NaiveDateTime::default() + Duration::milliseconds(ms)
}

fn alive(pct: f32) -> SensorSnapshot {
    SensorSnapshot {
        hp: Some(pct),
        confidence: 1.0,
        ..Default::default()
    }
}

fn gone() -> SensorSnapshot {
    SensorSnapshot::default()
}

fn with_effects(pct: f32, effects: &[(&str, bool)]) -> SensorSnapshot {
    let mut snapshot = alive(pct);
    for (slug, present) in effects {
        snapshot.effects.insert(EffectId::from(*slug), *present);
    }
    snapshot
}

/// Walkthrough profile: f1 targeting, two attack keys on their own
/// intervals, 300ms engage delay.
fn base_profile() -> Profile {
    Profile {
        targeting: TargetingConfig {
            key: KeyName::from("f1"),
            min_interval_ms: 500,
            max_interval_ms: 800,
        },
        attack_keys: vec![
            AttackKey {
                key: KeyName::from("1"),
                min_interval_ms: 200,
                max_interval_ms: 300,
            },
            AttackKey {
                key: KeyName::from("2"),
                min_interval_ms: 400,
                max_interval_ms: 500,
            },
        ],
        instant_keys: Vec::new(),
        on_death_key: None,
        status_effects: Vec::new(),
        buffs: Vec::new(),
        stuck: StuckConfig {
            timeout_ms: 5000,
            unstuck_sequence: vec![
                HoldStep {
                    key: KeyName::from("s"),
                    hold_ms: 1500,
                },
                HoldStep {
                    key: KeyName::from("space"),
                    hold_ms: 400,
                },
            ],
        },
        no_target_timeout_ms: 10_000,
        attack_start_delay_ms: 300,
        hp: Default::default(),
    }
}

/// base_profile with all randomness squeezed out (min == max) so exact
/// fire ticks can be asserted.
fn fixed_profile() -> Profile {
    let mut p = base_profile();
    p.targeting.min_interval_ms = 500;
    p.targeting.max_interval_ms = 500;
    p.attack_keys[0].min_interval_ms = 200;
    p.attack_keys[0].max_interval_ms = 200;
    p.attack_keys[1].min_interval_ms = 400;
    p.attack_keys[1].max_interval_ms = 400;
    p
}

fn start(profile: Profile) -> Controller {
    Controller::start_seeded(profile, 0xFA12).unwrap()
}

fn presses(actions: &[KeyAction], key: &str) -> usize {
    actions
        .iter()
        .filter(|a| matches!(a, KeyAction::Press { key: k } if k.as_str() == key))
        .count()
}

/// Drive the controller into Attacking with a full-HP target.
/// Entry happens at t(300) with base/fixed profiles.
fn engage(controller: &mut Controller, pct: f32) {
    controller.tick(&alive(pct), t(0)).unwrap();
    controller.tick(&alive(pct), t(100)).unwrap();
    controller.tick(&alive(pct), t(200)).unwrap();
    controller.tick(&alive(pct), t(300)).unwrap();
    assert_eq!(controller.lifecycle(), LifecycleState::Attacking);
}

// ─────────────────────────────────────────────────────────────────────────────
// Searching: targeting cadence, no-target timeout
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_searching_presses_only_the_targeting_key() {
    let mut controller = start(base_profile());
    let mut f1 = 0;
    for ms in (0..=1000).step_by(100) {
        let actions = controller.tick(&gone(), t(ms)).unwrap();
        for action in &actions {
            assert_eq!(
                action.key().as_str(),
                "f1",
                "only the targeting key may fire while searching"
            );
        }
        f1 += presses(&actions, "f1");
    }
    // Due on entry, then re-armed within 500-800ms: at least twice in 1s
    assert!(f1 >= 2, "expected repeated targeting presses, got {f1}");
    assert_eq!(controller.lifecycle(), LifecycleState::NoTarget);
}

#[test]
fn test_no_target_timeout_stops_the_controller() {
    let mut controller = start(base_profile());
    for ms in (0..10_000).step_by(500) {
        controller.tick(&gone(), t(ms)).unwrap();
    }
    controller.tick(&gone(), t(10_000)).unwrap();
    assert_eq!(controller.lifecycle(), LifecycleState::Stopped);

    // All subsequent ticks emit nothing, even with a live target
    for ms in [10_100, 10_600, 20_000] {
        let actions = controller.tick(&alive(100.0), t(ms)).unwrap();
        assert!(actions.is_empty());
    }
    assert_eq!(controller.lifecycle(), LifecycleState::Stopped);
}

#[test]
fn test_alive_reading_beats_the_give_up_deadline() {
    let mut controller = start(base_profile());
    controller.tick(&gone(), t(0)).unwrap();
    // Alive lands exactly on the no-target deadline: progress wins
    controller.tick(&alive(100.0), t(10_000)).unwrap();
    assert_eq!(controller.lifecycle(), LifecycleState::Approaching);
}

// ─────────────────────────────────────────────────────────────────────────────
// Engagement: attack-start delay, instant keys
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_acquisition_waits_out_the_attack_start_delay() {
    let mut controller = start(fixed_profile());
    controller.tick(&gone(), t(0)).unwrap();

    controller.tick(&alive(100.0), t(100)).unwrap();
    assert_eq!(controller.lifecycle(), LifecycleState::Approaching);
}

#[test]
fn test_rotation_starts_when_the_delay_elapses() {
    let mut controller = start(fixed_profile());
    controller.tick(&alive(100.0), t(0)).unwrap();
    assert_eq!(controller.lifecycle(), LifecycleState::Approaching);

    // Delay (300ms) still running: no attacks yet
    let actions = controller.tick(&alive(100.0), t(200)).unwrap();
    assert!(actions.is_empty());

    // Delay elapsed: both keys fire their first rotation pass
    let actions = controller.tick(&alive(100.0), t(300)).unwrap();
    assert_eq!(presses(&actions, "1"), 1);
    assert_eq!(presses(&actions, "2"), 1);
    assert_eq!(controller.lifecycle(), LifecycleState::Attacking);

    // Each key keeps its own clock: at +200 only key 1 is due
    let actions = controller.tick(&alive(100.0), t(500)).unwrap();
    assert_eq!(presses(&actions, "1"), 1);
    assert_eq!(presses(&actions, "2"), 0);

    // At +400 key 2 is due again (and key 1, due at 700, is not)
    let actions = controller.tick(&alive(100.0), t(700)).unwrap();
    assert_eq!(presses(&actions, "2"), 1);
    assert_eq!(presses(&actions, "1"), 1); // due at exactly 700 as well
}

#[test]
fn test_instant_keys_fire_once_on_acquisition() {
    let mut profile = fixed_profile();
    profile.instant_keys = vec![KeyName::from("4"), KeyName::from("7")];
    let mut controller = start(profile);

    controller.tick(&gone(), t(0)).unwrap();
    let actions = controller.tick(&alive(100.0), t(100)).unwrap();
    assert_eq!(presses(&actions, "4"), 1);
    assert_eq!(presses(&actions, "7"), 1);

    // Never again while the engagement lasts
    for ms in (200..2000).step_by(100) {
        let actions = controller.tick(&alive(100.0), t(ms)).unwrap();
        assert_eq!(presses(&actions, "4"), 0);
        assert_eq!(presses(&actions, "7"), 0);
    }
}

#[test]
fn test_target_lost_during_approach_resumes_search() {
    let mut controller = start(fixed_profile());
    controller.tick(&alive(100.0), t(0)).unwrap();
    assert_eq!(controller.lifecycle(), LifecycleState::Approaching);

    // One unreadable frame inside the delay window drops the engagement
    controller.tick(&gone(), t(100)).unwrap();
    assert_eq!(controller.lifecycle(), LifecycleState::NoTarget);

    // The rotation never started
    let actions = controller.tick(&gone(), t(200)).unwrap();
    assert_eq!(presses(&actions, "1"), 0);
    assert_eq!(presses(&actions, "2"), 0);
}

#[test]
fn test_no_targeting_key_while_attacking() {
    let mut controller = start(base_profile());
    engage(&mut controller, 100.0);
    for ms in (400..4000).step_by(100) {
        let actions = controller.tick(&alive(100.0 - ms as f32 * 0.01), t(ms)).unwrap();
        assert_eq!(
            presses(&actions, "f1"),
            0,
            "targeting key fired at {ms}ms while attacking"
        );
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Stuck detection and recovery
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_flat_hp_for_stuck_timeout_triggers_recovery_once() {
    let mut controller = start(fixed_profile());
    engage(&mut controller, 80.0);

    // HP flat at 80 for exactly stuck_timeout after engagement (t=300)
    let mut unstuck_emissions = 0;
    for ms in (1300..=5300).step_by(1000) {
        let actions = controller.tick(&alive(80.0), t(ms)).unwrap();
        let holds = actions
            .iter()
            .filter(|a| matches!(a, KeyAction::Hold { .. }))
            .count();
        if holds > 0 {
            unstuck_emissions += 1;
            assert_eq!(
                actions,
                vec![
                    KeyAction::hold("s", 1500),
                    KeyAction::hold("space", 400),
                ],
                "unstuck sequence emitted verbatim, nothing else that tick"
            );
            assert_eq!(controller.lifecycle(), LifecycleState::Stuck);
        }
    }
    assert_eq!(unstuck_emissions, 1, "unstuck sequence fired exactly once");
}

#[test]
fn test_hp_movement_one_tick_early_averts_stuck() {
    let mut controller = start(fixed_profile());
    engage(&mut controller, 80.0);

    // 80, 79, 80, 80, 80 - the dip resets the watchdog
    controller.tick(&alive(80.0), t(1300)).unwrap();
    controller.tick(&alive(79.0), t(2300)).unwrap();
    controller.tick(&alive(80.0), t(3300)).unwrap();
    controller.tick(&alive(80.0), t(4300)).unwrap();
    let actions = controller.tick(&alive(80.0), t(5300)).unwrap();
    assert_eq!(controller.lifecycle(), LifecycleState::Attacking);
    assert!(actions.iter().all(|a| matches!(a, KeyAction::Press { .. })));
}

#[test]
fn test_stuck_recovery_resumes_the_rotation() {
    let mut controller = start(fixed_profile());
    engage(&mut controller, 80.0);

    // Flat HP all the way to the watchdog
    for ms in (1300..=5300).step_by(1000) {
        controller.tick(&alive(80.0), t(ms)).unwrap();
    }
    assert_eq!(controller.lifecycle(), LifecycleState::Stuck);

    // Sequence lasts 1500 + 400 = 1900ms; still stuck halfway through
    let actions = controller.tick(&alive(80.0), t(6300)).unwrap();
    assert!(actions.is_empty());
    assert_eq!(controller.lifecycle(), LifecycleState::Stuck);

    // Past 7200ms the controller re-engages and the rotation restarts
    let actions = controller.tick(&alive(80.0), t(7300)).unwrap();
    assert_eq!(controller.lifecycle(), LifecycleState::Attacking);
    assert_eq!(presses(&actions, "1"), 1);
    assert_eq!(presses(&actions, "2"), 1);
}

#[test]
fn test_unknown_frames_do_not_feed_the_stuck_baseline() {
    let mut controller = start(fixed_profile());
    engage(&mut controller, 80.0);

    // Unreadable frames keep the last numeric value; the watchdog keeps
    // counting against the 80.0 baseline (streak < gone timeout, so the
    // target is never debounced to Dead: gone_timeout is 1500ms default
    // and we interleave alive frames)
    controller.tick(&alive(80.0), t(1300)).unwrap();
    controller.tick(&gone(), t(2300)).unwrap();
    controller.tick(&alive(80.0), t(3300)).unwrap();
    controller.tick(&gone(), t(4300)).unwrap();
    controller.tick(&alive(80.0), t(5300)).unwrap();
    assert_eq!(controller.lifecycle(), LifecycleState::Stuck);
}

// ─────────────────────────────────────────────────────────────────────────────
// Death handling
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_short_hp_dropouts_never_read_as_death() {
    let mut controller = start(fixed_profile());
    engage(&mut controller, 50.0);

    // Unreadable bursts shorter than gone_timeout (1500ms), each broken
    // by one good frame
    let mut ms = 400;
    for _ in 0..5 {
        for _ in 0..13 {
            controller.tick(&gone(), t(ms)).unwrap();
            ms += 100;
        }
        controller.tick(&alive(49.0 - ms as f32 * 0.001), t(ms)).unwrap();
        ms += 100;
    }
    assert_eq!(controller.lifecycle(), LifecycleState::Attacking);
}

#[test]
fn test_death_fires_on_death_key_exactly_once() {
    let mut profile = fixed_profile();
    profile.on_death_key = Some(KeyName::from("5"));
    let mut controller = start(profile);
    engage(&mut controller, 10.0);

    let mut death_presses = 0;
    for ms in (400..4000).step_by(100) {
        let actions = controller.tick(&gone(), t(ms)).unwrap();
        death_presses += presses(&actions, "5");
    }
    assert_eq!(death_presses, 1, "on-death key must fire exactly once");
    // Debounced death lands back in NoTarget and the search resumes
    assert_eq!(controller.lifecycle(), LifecycleState::NoTarget);
}

#[test]
fn test_death_without_on_death_key_still_resets() {
    let mut controller = start(fixed_profile());
    engage(&mut controller, 10.0);

    for ms in (400..2100).step_by(100) {
        controller.tick(&gone(), t(ms)).unwrap();
    }
    assert_eq!(controller.lifecycle(), LifecycleState::NoTarget);
}

#[test]
fn test_next_target_after_death_restarts_the_cycle() {
    let mut profile = fixed_profile();
    profile.on_death_key = Some(KeyName::from("5"));
    let mut controller = start(profile);
    engage(&mut controller, 10.0);

    for ms in (400..2100).step_by(100) {
        controller.tick(&gone(), t(ms)).unwrap();
    }
    assert_eq!(controller.lifecycle(), LifecycleState::NoTarget);

    controller.tick(&alive(100.0), t(2200)).unwrap();
    assert_eq!(controller.lifecycle(), LifecycleState::Approaching);
    let actions = controller.tick(&alive(100.0), t(2500)).unwrap();
    assert_eq!(controller.lifecycle(), LifecycleState::Attacking);
    assert_eq!(presses(&actions, "1"), 1);
}

// ─────────────────────────────────────────────────────────────────────────────
// Status effects and buffs
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_status_effect_key_tracks_template_absence() {
    let mut profile = fixed_profile();
    profile.status_effects = vec![StatusEffectBinding {
        effect: EffectId::from("battle_stance"),
        key: KeyName::from("9"),
    }];
    let mut controller = start(profile);
    engage(&mut controller, 90.0);

    // Template absent: key re-applied every tick
    let actions = controller
        .tick(&with_effects(90.0, &[("battle_stance", false)]), t(400))
        .unwrap();
    assert_eq!(presses(&actions, "9"), 1);
    let actions = controller.tick(&alive(90.0), t(500)).unwrap(); // missing = absent
    assert_eq!(presses(&actions, "9"), 1);

    // Template present: suppressed
    let actions = controller
        .tick(&with_effects(90.0, &[("battle_stance", true)]), t(600))
        .unwrap();
    assert_eq!(presses(&actions, "9"), 0);
}

#[test]
fn test_buff_checks_at_most_once_per_period() {
    let mut profile = fixed_profile();
    profile.buffs = vec![BuffBinding {
        effect: EffectId::from("war_cry"),
        key: KeyName::from("0"),
        check_interval_ms: 2000,
    }];
    let mut controller = start(profile);
    engage(&mut controller, 90.0);

    // First check fires on engagement (t=300); absent every tick after,
    // but the next press may only come at the next period boundary
    let mut zero_presses = 0;
    for ms in (400..2300).step_by(100) {
        let actions = controller.tick(&alive(90.0), t(ms)).unwrap();
        zero_presses += presses(&actions, "0");
    }
    assert_eq!(zero_presses, 0, "no buff press inside the period");

    let actions = controller.tick(&alive(90.0), t(2300)).unwrap();
    assert_eq!(presses(&actions, "0"), 1, "buff press at the period boundary");
}

#[test]
fn test_buff_present_at_check_time_is_not_recast() {
    let mut profile = fixed_profile();
    profile.buffs = vec![BuffBinding {
        effect: EffectId::from("war_cry"),
        key: KeyName::from("0"),
        check_interval_ms: 2000,
    }];
    let mut controller = start(profile);

    controller.tick(&with_effects(90.0, &[("war_cry", true)]), t(0)).unwrap();
    controller.tick(&with_effects(90.0, &[("war_cry", true)]), t(100)).unwrap();
    controller.tick(&with_effects(90.0, &[("war_cry", true)]), t(200)).unwrap();
    // Engagement tick: buff present at check time, so no press
    let actions = controller
        .tick(&with_effects(90.0, &[("war_cry", true)]), t(300))
        .unwrap();
    assert_eq!(presses(&actions, "0"), 0);

    // Present at the next boundary too; the check stays silent
    let actions = controller
        .tick(&with_effects(90.0, &[("war_cry", true)]), t(2300))
        .unwrap();
    assert_eq!(presses(&actions, "0"), 0);
}

// ─────────────────────────────────────────────────────────────────────────────
// Lifecycle surface
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_stop_is_instantaneous_and_sticky() {
    let mut controller = start(fixed_profile());
    engage(&mut controller, 90.0);

    controller.stop();
    assert_eq!(controller.lifecycle(), LifecycleState::Stopped);
    let actions = controller.tick(&alive(90.0), t(400)).unwrap();
    assert!(actions.is_empty());
}

#[test]
fn test_time_travel_is_rejected() {
    let mut controller = start(fixed_profile());
    controller.tick(&gone(), t(100)).unwrap();

    // Equal timestamps are caller misuse too
    let err = controller.tick(&gone(), t(100)).unwrap_err();
    assert!(matches!(err, TickError::TimeWentBackwards { .. }));

    let err = controller.tick(&gone(), t(50)).unwrap_err();
    assert!(matches!(err, TickError::TimeWentBackwards { .. }));

    // A later tick is accepted again; the failed calls did not advance state
    controller.tick(&gone(), t(200)).unwrap();
    assert_eq!(controller.lifecycle(), LifecycleState::NoTarget);
}

#[test]
fn test_rejected_profiles_never_build_a_controller() {
    let mut profile = base_profile();
    profile.attack_keys.clear();
    assert!(Controller::start(profile).is_err());
}

// ─────────────────────────────────────────────────────────────────────────────
// Synthesizer purity
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_synthesize_is_pure_and_idempotent() {
    let profile = base_profile();
    let firings = TickFirings {
        on_death: false,
        unstuck: true,
        instant: false,
        status_keys: vec![],
        buff_keys: vec![],
        attack_keys: vec![0, 1],
        targeting: false,
    };

    let first = actions::synthesize(&firings, &profile);
    let second = actions::synthesize(&firings, &profile);
    assert_eq!(first, second);
    assert_eq!(
        first,
        vec![
            KeyAction::hold("s", 1500),
            KeyAction::hold("space", 400),
            KeyAction::press("1"),
            KeyAction::press("2"),
        ]
    );
}

#[test]
fn test_synthesize_orders_by_priority() {
    let mut profile = base_profile();
    profile.on_death_key = Some(KeyName::from("5"));
    profile.status_effects = vec![StatusEffectBinding {
        effect: EffectId::from("battle_stance"),
        key: KeyName::from("9"),
    }];
    profile.buffs = vec![BuffBinding {
        effect: EffectId::from("war_cry"),
        key: KeyName::from("0"),
        check_interval_ms: 2000,
    }];

    let firings = TickFirings {
        on_death: true,
        unstuck: false,
        instant: false,
        status_keys: vec![0],
        buff_keys: vec![0],
        attack_keys: vec![0],
        targeting: true,
    };

    let actions = actions::synthesize(&firings, &profile);
    let keys: Vec<&str> = actions.iter().map(|a| a.key().as_str()).collect();
    assert_eq!(keys, vec!["5", "9", "0", "1", "f1"]);
}

//! Controller profile types
//!
//! A profile is the immutable per-session configuration handed to the
//! controller at start: which key acquires targets, the attack rotation,
//! status-effect and buff bindings, and the timing/debounce tunables.
//! Profiles are stored as TOML; loading and validation live in
//! `farmhand-core`.

use serde::{Deserialize, Serialize};

use crate::effects::EffectId;
use crate::keys::KeyName;

// ═══════════════════════════════════════════════════════════════════════════
// Key Timing
// ═══════════════════════════════════════════════════════════════════════════

/// The key that acquires a target, fired while searching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetingConfig {
    /// Key pressed to cycle/acquire targets (commonly tab or a function key)
    pub key: KeyName,

    /// Shortest wait between presses in milliseconds
    pub min_interval_ms: u64,

    /// Longest wait between presses in milliseconds
    pub max_interval_ms: u64,
}

/// One key in the attack rotation. Each key runs on its own independent
/// randomized interval; keys are not mutually exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackKey {
    pub key: KeyName,

    /// Shortest wait between presses in milliseconds
    pub min_interval_ms: u64,

    /// Longest wait between presses in milliseconds
    pub max_interval_ms: u64,
}

// ═══════════════════════════════════════════════════════════════════════════
// Effect Bindings
// ═══════════════════════════════════════════════════════════════════════════

/// Re-apply `key` whenever the bound template is absent from the screen.
/// Checked every tick while attacking (e.g. a stance that drops on death).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEffectBinding {
    /// Template slug reported by the vision subsystem
    pub effect: EffectId,

    /// Key that re-applies the effect
    pub key: KeyName,
}

/// Periodic buff upkeep: every `check_interval_ms`, press `key` if the
/// bound template is absent. At most one check-and-fire per period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuffBinding {
    /// Template slug reported by the vision subsystem
    pub effect: EffectId,

    /// Key that casts the buff
    pub key: KeyName,

    /// How often to check the buff, in milliseconds
    pub check_interval_ms: u64,
}

// ═══════════════════════════════════════════════════════════════════════════
// Stuck Recovery
// ═══════════════════════════════════════════════════════════════════════════

/// One step of the unstuck sequence: hold `key` for `hold_ms`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldStep {
    pub key: KeyName,
    pub hold_ms: u64,
}

/// Stuck detection and recovery.
///
/// The controller is "stuck" when the target's numeric HP has not moved
/// for `timeout_ms` while nominally attacking - blocked movement or
/// attacks landing on nothing. Recovery plays the hold sequence once
/// (typically movement keys), then resumes the rotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StuckConfig {
    /// How long HP may stay flat before recovery kicks in, in milliseconds
    #[serde(default = "default_stuck_timeout_ms")]
    pub timeout_ms: u64,

    /// Keys held in order to walk out (empty = detect but do nothing)
    #[serde(default)]
    pub unstuck_sequence: Vec<HoldStep>,
}

impl Default for StuckConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_stuck_timeout_ms(),
            unstuck_sequence: Vec::new(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// HP Verification
// ═══════════════════════════════════════════════════════════════════════════

/// Tunables for interpreting the OCR'd health reading. Consumed by the
/// controller's debouncer; the vision subsystem computes none of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HpConfig {
    /// Minimum OCR confidence for a reading to be trusted
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,

    /// Lower confidence floor accepted when the HP bar renders dimmed
    /// (unfocused game window); must not exceed `confidence_threshold`
    #[serde(default = "default_dimmer_fallback_threshold")]
    pub dimmer_fallback_threshold: f32,

    /// How long HP must read zero-or-unreadable before the target counts
    /// as gone, in milliseconds
    #[serde(default = "default_gone_timeout_ms")]
    pub gone_timeout_ms: u64,

    /// HP percentage-point delta below which a new reading is treated as
    /// unchanged (OCR jitter)
    #[serde(default = "default_change_epsilon")]
    pub change_epsilon: f32,
}

impl Default for HpConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
            dimmer_fallback_threshold: default_dimmer_fallback_threshold(),
            gone_timeout_ms: default_gone_timeout_ms(),
            change_epsilon: default_change_epsilon(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Profile
// ═══════════════════════════════════════════════════════════════════════════

/// Immutable per-session controller configuration.
///
/// Reconfiguration is `stop()` + `start(new_profile)` - the running
/// controller never sees a profile change mid-session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Target acquisition key and its press interval
    pub targeting: TargetingConfig,

    /// Attack rotation, in configured order
    #[serde(default, rename = "attack_key")]
    pub attack_keys: Vec<AttackKey>,

    /// Keys fired exactly once when a new target is acquired, before the
    /// rotation begins
    #[serde(default)]
    pub instant_keys: Vec<KeyName>,

    /// Key fired once when the target dies (loot, dot refresh, etc.)
    pub on_death_key: Option<KeyName>,

    /// Per-tick status effect upkeep
    #[serde(default, rename = "status_effect")]
    pub status_effects: Vec<StatusEffectBinding>,

    /// Periodic buff upkeep
    #[serde(default, rename = "buff")]
    pub buffs: Vec<BuffBinding>,

    /// Stuck detection + recovery
    #[serde(default)]
    pub stuck: StuckConfig,

    /// Give up and stop after searching this long without an Alive
    /// reading, in milliseconds
    #[serde(default = "default_no_target_timeout_ms")]
    pub no_target_timeout_ms: u64,

    /// Wait after acquiring a target before the rotation starts (running
    /// into range), in milliseconds
    #[serde(default = "default_attack_start_delay_ms")]
    pub attack_start_delay_ms: u64,

    /// HP reading interpretation
    #[serde(default)]
    pub hp: HpConfig,
}

// ═══════════════════════════════════════════════════════════════════════════
// Serde Helpers
// ═══════════════════════════════════════════════════════════════════════════

fn default_stuck_timeout_ms() -> u64 {
    5000
}

fn default_confidence_threshold() -> f32 {
    0.6
}

fn default_dimmer_fallback_threshold() -> f32 {
    0.35
}

fn default_gone_timeout_ms() -> u64 {
    1500
}

fn default_change_epsilon() -> f32 {
    0.5
}

fn default_no_target_timeout_ms() -> u64 {
    10_000
}

fn default_attack_start_delay_ms() -> u64 {
    300
}

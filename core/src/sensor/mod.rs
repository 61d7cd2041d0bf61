//! Sensor boundary types and debouncing
//!
//! The vision subsystem hands the controller one [`SensorSnapshot`] per
//! tick: a raw health reading with an OCR confidence, and a map of
//! template detections. The [`SensorDebouncer`] filters that into a
//! [`StableSignal`] the state machine can trust - single-frame misreads
//! must not end target tracking.

mod debounce;

pub use debounce::SensorDebouncer;

use std::collections::HashMap;

use chrono::NaiveDateTime;
use farmhand_types::EffectId;

/// Raw per-tick sensor reading. Ephemeral; produced fresh each tick by
/// the external vision subsystem.
#[derive(Debug, Clone, Default)]
pub struct SensorSnapshot {
    /// Health percentage (0.0–100.0), or `None` when the OCR could not
    /// produce a number at all
    pub hp: Option<f32>,

    /// OCR confidence for the `hp` reading, 0.0–1.0
    pub confidence: f32,

    /// Template detections. A missing key means the template was not
    /// detected - "not checked" and "checked, absent" are deliberately
    /// the same thing at this boundary.
    pub effects: HashMap<EffectId, bool>,
}

impl SensorSnapshot {
    /// Whether a template is currently present on screen.
    pub fn effect_present(&self, effect: &EffectId) -> bool {
        self.effects.get(effect).copied().unwrap_or(false)
    }
}

/// Debounced health classification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HpState {
    /// No trustworthy reading yet, or an unreadable streak shorter than
    /// the gone timeout
    Unknown,

    /// HP has read zero-or-unreadable continuously for at least the gone
    /// timeout
    Dead,

    /// Trusted positive reading (percentage)
    Alive(f32),
}

impl HpState {
    pub fn is_alive(&self) -> bool {
        matches!(self, Self::Alive(_))
    }

    pub fn is_dead(&self) -> bool {
        matches!(self, Self::Dead)
    }
}

/// Stable, confidence-qualified signal derived from raw snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct StableSignal {
    /// Debounced classification
    pub hp_state: HpState,

    /// When the numeric HP value last moved beyond the change epsilon
    pub last_hp_change_at: Option<NaiveDateTime>,

    /// When HP last read as Alive
    pub last_seen_alive_at: Option<NaiveDateTime>,

    /// Last trusted numeric value, retained through Unknown windows.
    /// Stuck detection compares against this, not the classification.
    pub last_numeric_hp: Option<f32>,
}

impl StableSignal {
    pub(crate) fn new() -> Self {
        Self {
            hp_state: HpState::Unknown,
            last_hp_change_at: None,
            last_seen_alive_at: None,
            last_numeric_hp: None,
        }
    }
}

//! HP debouncer
//!
//! OCR on a small HP readout misfires often enough that a single frame
//! can read 0 or nothing while the target is alive and well. The
//! debouncer only reports [`HpState::Dead`] once zero-or-unreadable has
//! held continuously for the configured gone timeout; any Alive reading
//! inside that window resets the countdown.

use chrono::{Duration, NaiveDateTime};
use farmhand_types::HpConfig;

use super::{HpState, SensorSnapshot, StableSignal};

/// Filters raw snapshots into a [`StableSignal`].
///
/// Pure bookkeeping over (previous state, new snapshot, now); no side
/// effects beyond its own fields.
#[derive(Debug, Clone)]
pub struct SensorDebouncer {
    hp_cfg: HpConfig,
    signal: StableSignal,
    /// Start of the current zero-or-unreadable streak
    gone_since: Option<NaiveDateTime>,
}

impl SensorDebouncer {
    pub fn new(hp_cfg: HpConfig) -> Self {
        Self {
            hp_cfg,
            signal: StableSignal::new(),
            gone_since: None,
        }
    }

    pub fn signal(&self) -> &StableSignal {
        &self.signal
    }

    /// Fold one raw snapshot into the stable signal.
    pub fn update(&mut self, raw: &SensorSnapshot, now: NaiveDateTime) -> &StableSignal {
        match self.classify(raw) {
            Reading::Trusted(pct) => {
                self.gone_since = None;
                self.signal.last_seen_alive_at = Some(now);

                let changed = match self.signal.last_numeric_hp {
                    Some(prev) => (pct - prev).abs() > self.hp_cfg.change_epsilon,
                    None => true,
                };
                if changed {
                    self.signal.last_hp_change_at = Some(now);
                    self.signal.last_numeric_hp = Some(pct);
                }

                self.signal.hp_state = HpState::Alive(pct);
            }
            Reading::Dim(pct) => {
                // Alive evidence, but the digits are not reliable enough
                // to move the numeric baseline used by stuck detection
                self.gone_since = None;
                self.signal.last_seen_alive_at = Some(now);
                self.signal.hp_state = HpState::Alive(pct);
            }
            Reading::Gone => {
                let since = *self.gone_since.get_or_insert(now);
                let gone_for = now.signed_duration_since(since);
                self.signal.hp_state =
                    if gone_for >= Duration::milliseconds(self.hp_cfg.gone_timeout_ms as i64) {
                        HpState::Dead
                    } else {
                        HpState::Unknown
                    };
            }
        }

        &self.signal
    }

    /// Classify one raw reading against the confidence thresholds.
    ///
    /// Readings below the main threshold but at or above the dimmer
    /// fallback still count as alive: the HP bar loses contrast when the
    /// game window is unfocused, dragging OCR confidence down across the
    /// board.
    fn classify(&self, raw: &SensorSnapshot) -> Reading {
        let Some(pct) = raw.hp else {
            return Reading::Gone;
        };
        if pct <= 0.0 {
            return Reading::Gone;
        }
        if raw.confidence >= self.hp_cfg.confidence_threshold {
            Reading::Trusted(pct)
        } else if raw.confidence >= self.hp_cfg.dimmer_fallback_threshold {
            Reading::Dim(pct)
        } else {
            Reading::Gone
        }
    }
}

/// One raw reading, classified.
enum Reading {
    /// Positive value at full confidence
    Trusted(f32),
    /// Positive value at dimmed-window confidence
    Dim(f32),
    /// Zero, unreadable, or below even the fallback threshold
    Gone,
}

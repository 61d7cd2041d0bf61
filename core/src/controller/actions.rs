//! Action synthesis
//!
//! The state machine records *what resolved* this tick in a
//! [`TickFirings`]; this module turns that into the ordered action list
//! the actuator receives. Synthesis is a pure function of (firings,
//! profile): no clock, no randomness, no state - calling it twice with
//! identical inputs yields identical lists.

use farmhand_types::{KeyAction, Profile};

/// Which timers and transitions resolved in one tick, in priority order.
///
/// Indices refer to positions in the profile's respective lists. An
/// entry appears here only when its prerequisite state/timer actually
/// resolved this tick - the synthesizer never fires speculatively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickFirings {
    /// Death transition: emit the on-death key
    pub on_death: bool,
    /// Entered Stuck: emit the unstuck hold sequence
    pub unstuck: bool,
    /// Entered Approaching: emit the instant keys once
    pub instant: bool,
    /// Status-effect bindings whose template is absent this tick
    pub status_keys: Vec<usize>,
    /// Buff bindings whose periodic check fired with the template absent
    pub buff_keys: Vec<usize>,
    /// Attack keys whose interval elapsed this tick
    pub attack_keys: Vec<usize>,
    /// Targeting key interval elapsed
    pub targeting: bool,
}

impl TickFirings {
    pub fn is_empty(&self) -> bool {
        !self.on_death
            && !self.unstuck
            && !self.instant
            && !self.targeting
            && self.status_keys.is_empty()
            && self.buff_keys.is_empty()
            && self.attack_keys.is_empty()
    }
}

/// Map resolved firings onto the ordered action list for this tick.
pub fn synthesize(firings: &TickFirings, profile: &Profile) -> Vec<KeyAction> {
    let mut actions = Vec::new();

    if firings.on_death
        && let Some(key) = &profile.on_death_key
    {
        actions.push(KeyAction::press(key.clone()));
    }

    if firings.unstuck {
        for step in &profile.stuck.unstuck_sequence {
            actions.push(KeyAction::hold(step.key.clone(), step.hold_ms));
        }
    }

    if firings.instant {
        for key in &profile.instant_keys {
            actions.push(KeyAction::press(key.clone()));
        }
    }

    for &idx in &firings.status_keys {
        actions.push(KeyAction::press(profile.status_effects[idx].key.clone()));
    }

    for &idx in &firings.buff_keys {
        actions.push(KeyAction::press(profile.buffs[idx].key.clone()));
    }

    for &idx in &firings.attack_keys {
        actions.push(KeyAction::press(profile.attack_keys[idx].key.clone()));
    }

    if firings.targeting {
        actions.push(KeyAction::press(profile.targeting.key.clone()));
    }

    actions
}

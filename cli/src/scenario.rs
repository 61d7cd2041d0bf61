//! Recorded sensor scenarios
//!
//! A scenario file is a TOML list of `[[tick]]` entries - one snapshot
//! per tick with its offset from the run start. Replaying one through
//! the controller exercises the full decision path without a screen or
//! a serial port attached.
//!
//! ```toml
//! [[tick]]
//! at_ms = 0
//!
//! [[tick]]
//! at_ms = 100
//! hp = 100.0
//! confidence = 0.95
//! effects = { battle_stance = true }
//! ```
//!
//! An omitted `hp` means the reading was unreadable that tick.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use farmhand_core::SensorSnapshot;
use farmhand_types::EffectId;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(rename = "tick")]
    pub ticks: Vec<TickRecord>,
}

/// One recorded snapshot.
#[derive(Debug, Clone, Deserialize)]
pub struct TickRecord {
    /// Offset from the start of the run, in milliseconds
    pub at_ms: u64,

    /// Health percentage; omitted = unreadable
    pub hp: Option<f32>,

    /// OCR confidence for the reading
    #[serde(default = "default_confidence")]
    pub confidence: f32,

    /// Template detections (missing slug = absent)
    #[serde(default)]
    pub effects: HashMap<String, bool>,
}

impl TickRecord {
    pub fn snapshot(&self) -> SensorSnapshot {
        SensorSnapshot {
            hp: self.hp,
            confidence: self.confidence,
            effects: self
                .effects
                .iter()
                .map(|(slug, present)| (EffectId::new(slug.clone()), *present))
                .collect(),
        }
    }
}

fn default_confidence() -> f32 {
    1.0
}

/// Load a scenario from a TOML file.
pub fn load_file(path: &Path) -> Result<Scenario, String> {
    let contents =
        fs::read_to_string(path).map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    toml::from_str(&contents).map_err(|e| format!("failed to parse {}: {e}", path.display()))
}

//! Effect identifiers
//!
//! An effect is a named visual pattern the vision subsystem looks for on
//! screen (a buff icon, a stance indicator). Identifiers are the slugs the
//! template library assigns when a template is captured.

use serde::{Deserialize, Serialize};

/// Slug identifying a template in the vision subsystem's library.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EffectId(String);

impl EffectId {
    pub fn new(slug: impl Into<String>) -> Self {
        Self(slug.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EffectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EffectId {
    fn from(slug: &str) -> Self {
        Self(slug.to_string())
    }
}

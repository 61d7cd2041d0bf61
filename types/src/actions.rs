//! Key actions
//!
//! The ordered output of one controller tick. The actuator serializes each
//! action to the keyboard-emulating device: a `Press` becomes one
//! key-down + key-up, a `Hold` keeps the key down for the given duration
//! (used by the unstuck sequence to walk out of geometry).

use serde::{Deserialize, Serialize};

use crate::keys::KeyName;

/// A single key action handed to the actuator sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum KeyAction {
    /// One key-down + key-up.
    Press { key: KeyName },

    /// Key held down for `duration_ms`, then released.
    Hold { key: KeyName, duration_ms: u64 },
}

impl KeyAction {
    pub fn press(key: impl Into<KeyName>) -> Self {
        Self::Press { key: key.into() }
    }

    pub fn hold(key: impl Into<KeyName>, duration_ms: u64) -> Self {
        Self::Hold {
            key: key.into(),
            duration_ms,
        }
    }

    /// The key this action touches.
    pub fn key(&self) -> &KeyName {
        match self {
            Self::Press { key } | Self::Hold { key, .. } => key,
        }
    }
}

impl std::fmt::Display for KeyAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Press { key } => write!(f, "press {key}"),
            Self::Hold { key, duration_ms } => write!(f, "hold {key} {duration_ms}ms"),
        }
    }
}

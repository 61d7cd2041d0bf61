//! Key name identifiers
//!
//! Key names travel from profile files through the controller to the
//! actuator, which maps them onto USB HID keycodes. The legal name set
//! mirrors the firmware's key map: letters, digits, function keys, and a
//! fixed list of named keys.

use serde::{Deserialize, Serialize};

/// Named keys accepted by the firmware in addition to `a`-`z`, `0`-`9`
/// and `f1`-`f12`.
pub const NAMED_KEYS: &[&str] = &[
    "space",
    "enter",
    "tab",
    "escape",
    "backspace",
    "minus",
    "equals",
    "left_bracket",
    "right_bracket",
    "backslash",
    "semicolon",
    "quote",
    "grave",
    "comma",
    "period",
    "slash",
    "insert",
    "delete",
    "home",
    "end",
    "page_up",
    "page_down",
    "up",
    "down",
    "left",
    "right",
];

/// A key identifier as understood by the keyboard-emulating device.
///
/// Stored as the lowercase name the actuator expects (e.g. `"f1"`, `"a"`,
/// `"page_up"`). Construction does not validate; profile validation
/// rejects unknown names so that a bad profile fails at `start`, not at
/// deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyName(String);

impl KeyName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this name is in the firmware's key map.
    pub fn is_known(&self) -> bool {
        let name = self.0.as_str();

        if name.len() == 1 {
            let c = name.as_bytes()[0];
            return c.is_ascii_lowercase() || c.is_ascii_digit();
        }

        if let Some(n) = name.strip_prefix('f')
            && let Ok(n) = n.parse::<u8>()
        {
            return (1..=12).contains(&n);
        }

        NAMED_KEYS.contains(&name)
    }
}

impl std::fmt::Display for KeyName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for KeyName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

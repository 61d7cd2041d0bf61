//! Controller error types
//!
//! Only caller misuse is an error: a malformed profile at `start`, or a
//! non-monotonic clock at `tick`. Sensor noise, lost targets and stuck
//! states are handled by the state machine, never surfaced here.

use std::path::PathBuf;

use chrono::NaiveDateTime;
use thiserror::Error;

/// Rejected profile, reported by [`Controller::start`](crate::Controller::start).
///
/// The controller never silently "fixes" a bad profile.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no attack keys configured")]
    NoAttackKeys,

    #[error("unknown key name `{0}`")]
    UnknownKey(String),

    #[error("interval for `{key}` has min {min_ms}ms > max {max_ms}ms")]
    InvalidInterval { key: String, min_ms: u64, max_ms: u64 },

    #[error("{field} must be greater than zero")]
    ZeroDuration { field: String },

    #[error("effect `{0}` is bound more than once")]
    DuplicateEffect(String),

    #[error("confidence threshold {0} outside 0.0..=1.0")]
    ConfidenceOutOfRange(f32),

    #[error("dimmer fallback {fallback} above confidence threshold {threshold}")]
    FallbackAboveThreshold { fallback: f32, threshold: f32 },

    #[error("failed to read profile {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse profile {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize profile {path:?}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: toml::ser::Error,
    },
}

/// Rejected tick. The controller never infers missed ticks retroactively,
/// so the caller-supplied clock must move strictly forward.
#[derive(Debug, Error)]
pub enum TickError {
    #[error("tick time went backwards: {now} is not after {prev}")]
    TimeWentBackwards {
        prev: NaiveDateTime,
        now: NaiveDateTime,
    },
}

//! Profile validation and TOML I/O
//!
//! Profiles are TOML files. Validation runs at `start` - a profile that
//! parses but makes no sense (empty rotation, min > max, unknown key
//! name) is rejected up front rather than mis-driven at runtime.

use std::fs;
use std::path::{Path, PathBuf};

use farmhand_types::{KeyName, Profile};

use crate::error::ConfigError;

/// Reject malformed or out-of-range profiles.
pub fn validate(profile: &Profile) -> Result<(), ConfigError> {
    if profile.attack_keys.is_empty() {
        return Err(ConfigError::NoAttackKeys);
    }

    check_key(&profile.targeting.key)?;
    check_interval(
        &profile.targeting.key,
        profile.targeting.min_interval_ms,
        profile.targeting.max_interval_ms,
    )?;

    for attack in &profile.attack_keys {
        check_key(&attack.key)?;
        check_interval(&attack.key, attack.min_interval_ms, attack.max_interval_ms)?;
    }

    for key in &profile.instant_keys {
        check_key(key)?;
    }

    if let Some(key) = &profile.on_death_key {
        check_key(key)?;
    }

    let mut seen_effects = std::collections::HashSet::new();
    for binding in &profile.status_effects {
        check_key(&binding.key)?;
        if !seen_effects.insert(binding.effect.as_str()) {
            return Err(ConfigError::DuplicateEffect(binding.effect.to_string()));
        }
    }
    for buff in &profile.buffs {
        check_key(&buff.key)?;
        if buff.check_interval_ms == 0 {
            return Err(ConfigError::ZeroDuration {
                field: format!("buff `{}` check interval", buff.effect),
            });
        }
        if !seen_effects.insert(buff.effect.as_str()) {
            return Err(ConfigError::DuplicateEffect(buff.effect.to_string()));
        }
    }

    for step in &profile.stuck.unstuck_sequence {
        check_key(&step.key)?;
        if step.hold_ms == 0 {
            return Err(ConfigError::ZeroDuration {
                field: format!("unstuck hold for `{}`", step.key),
            });
        }
    }
    if profile.stuck.timeout_ms == 0 {
        return Err(ConfigError::ZeroDuration {
            field: "stuck timeout".to_string(),
        });
    }

    if profile.no_target_timeout_ms == 0 {
        return Err(ConfigError::ZeroDuration {
            field: "no-target timeout".to_string(),
        });
    }
    if profile.hp.gone_timeout_ms == 0 {
        return Err(ConfigError::ZeroDuration {
            field: "hp gone timeout".to_string(),
        });
    }

    for threshold in [
        profile.hp.confidence_threshold,
        profile.hp.dimmer_fallback_threshold,
    ] {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::ConfidenceOutOfRange(threshold));
        }
    }
    if profile.hp.dimmer_fallback_threshold > profile.hp.confidence_threshold {
        return Err(ConfigError::FallbackAboveThreshold {
            fallback: profile.hp.dimmer_fallback_threshold,
            threshold: profile.hp.confidence_threshold,
        });
    }

    Ok(())
}

fn check_key(key: &KeyName) -> Result<(), ConfigError> {
    if key.is_known() {
        Ok(())
    } else {
        Err(ConfigError::UnknownKey(key.to_string()))
    }
}

fn check_interval(key: &KeyName, min_ms: u64, max_ms: u64) -> Result<(), ConfigError> {
    if min_ms == 0 {
        return Err(ConfigError::ZeroDuration {
            field: format!("interval for `{key}`"),
        });
    }
    if min_ms > max_ms {
        return Err(ConfigError::InvalidInterval {
            key: key.to_string(),
            min_ms,
            max_ms,
        });
    }
    Ok(())
}

/// Load a profile from a TOML file. Parsing only; call [`validate`] (or
/// let `Controller::start` do it) before driving anything with it.
pub fn load_file(path: &Path) -> Result<Profile, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    toml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Save a profile to a TOML file.
pub fn save_file(path: &Path, profile: &Profile) -> Result<(), ConfigError> {
    let contents = toml::to_string_pretty(profile).map_err(|e| ConfigError::Serialize {
        path: path.to_path_buf(),
        source: e,
    })?;

    fs::write(path, contents).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Default directory for user profiles.
pub fn default_profile_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("farmhand").join("profiles"))
}

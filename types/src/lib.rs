pub mod actions;
pub mod effects;
pub mod keys;
pub mod profile;

// Re-exports for convenience
pub use actions::KeyAction;
pub use effects::EffectId;
pub use keys::KeyName;
pub use profile::{
    AttackKey, BuffBinding, HoldStep, HpConfig, Profile, StatusEffectBinding, StuckConfig,
    TargetingConfig,
};

pub mod controller;
pub mod error;
pub mod profile;
pub mod sensor;
pub mod timer;

// Re-exports for convenience
pub use controller::{Controller, LifecycleState};
pub use error::{ConfigError, TickError};
pub use sensor::{HpState, SensorSnapshot, StableSignal};

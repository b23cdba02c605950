//! Core business logic - framework-agnostic settings and pricing operations.

/// Quote sizing and pricing
pub mod quote;
/// Typed reads and writes against the settings store
pub mod settings;
/// Validated operator edits from the admin console
pub mod settings_update;
/// Setting value encoding and decoding
pub mod value;

pub use quote::{PropertyType, QuoteCalculator, QuoteRequest, QuoteResult};
pub use settings::{Branding, Settings, seed_defaults};
pub use settings_update::SettingsUpdate;
pub use value::SettingValue;

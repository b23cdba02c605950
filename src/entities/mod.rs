//! Entity module - Contains the SeaORM entity definitions for the database.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod setting;

// Re-export specific types to avoid conflicts
pub use setting::{
    Column as SettingColumn, Entity as Setting, Model as SettingModel, SettingType,
};

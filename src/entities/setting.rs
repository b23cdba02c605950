//! Setting entity - Stores typed key-value pairs for operator configuration.
//!
//! Every tunable business parameter (pricing per watt, savings per kWh, branding,
//! session limits) is one row here. The value is kept as text and decoded according
//! to its [`SettingType`] tag.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// How the stored text of a setting is decoded.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum SettingType {
    /// Verbatim text
    #[sea_orm(string_value = "string")]
    #[serde(rename = "string")]
    Text,
    /// `"true"` / `"false"`, case-insensitive on read
    #[sea_orm(string_value = "boolean")]
    #[serde(rename = "boolean")]
    Boolean,
    /// Integer, or floating point when the text contains a decimal point
    #[sea_orm(string_value = "number")]
    #[serde(rename = "number")]
    Number,
}

/// Setting database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "settings")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Setting key (e.g., `"cost_per_watt_residential"`)
    #[sea_orm(unique)]
    pub key: String,
    /// Encoded value
    #[sea_orm(column_type = "Text")]
    pub value: String,
    /// Decoding tag for `value`
    pub value_type: SettingType,
    /// Optional text shown next to the setting in the admin console
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    /// When the key was first stored
    pub created_at: DateTime,
    /// When the setting was last written
    pub updated_at: DateTime,
}

/// `Setting` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

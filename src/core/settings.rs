//! Settings resolution - typed reads and writes against the `settings` table.
//!
//! Every tunable business parameter flows through [`Settings`] so operators can retune
//! pricing without a deployment. There is no cache: each call is exactly one round trip
//! to the store. Reads never fail. When the store is unreachable, or a stored number does
//! not parse, the caller's default is returned and the problem is logged.

use crate::{
    config::BrandingConfig,
    core::value::SettingValue,
    entities::{Setting, SettingType, setting},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{Set, prelude::*, sea_query::OnConflict};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, warn};

/// Dark mode toggle for the admin console
pub const DARK_MODE: &str = "dark_mode";
/// Email alerts for new quotes
pub const EMAIL_NOTIFICATIONS: &str = "email_notifications";
/// Company name shown on every page
pub const COMPANY_NAME: &str = "company_name";
/// Currency label shown next to prices
pub const DEFAULT_CURRENCY: &str = "default_currency";
/// Session timeout in minutes
pub const SESSION_TIMEOUT: &str = "session_timeout";
/// Failed logins allowed before lockout
pub const MAX_LOGIN_ATTEMPTS: &str = "max_login_attempts";
/// Price per watt for residential installations
pub const COST_PER_WATT_RESIDENTIAL: &str = "cost_per_watt_residential";
/// Price per watt for commercial installations
pub const COST_PER_WATT_COMMERCIAL: &str = "cost_per_watt_commercial";
/// Money saved per kWh generated
pub const SAVINGS_PER_KWH: &str = "savings_per_kwh";

/// A setting written at start-up when its key is absent.
#[derive(Debug, Clone, Copy)]
pub struct DefaultSetting {
    /// Setting key
    pub key: &'static str,
    /// Encoded value
    pub value: &'static str,
    /// Decoding tag
    pub setting_type: SettingType,
    /// Admin console description
    pub description: &'static str,
}

/// Settings present on a freshly initialized system.
pub const DEFAULT_SETTINGS: [DefaultSetting; 9] = [
    DefaultSetting {
        key: DARK_MODE,
        value: "false",
        setting_type: SettingType::Boolean,
        description: "Enable dark mode for the application",
    },
    DefaultSetting {
        key: EMAIL_NOTIFICATIONS,
        value: "true",
        setting_type: SettingType::Boolean,
        description: "Send email alerts for new quotes",
    },
    DefaultSetting {
        key: COMPANY_NAME,
        value: "Veeteq Solar",
        setting_type: SettingType::Text,
        description: "Company name displayed on the website",
    },
    DefaultSetting {
        key: DEFAULT_CURRENCY,
        value: "KSh",
        setting_type: SettingType::Text,
        description: "Default currency for pricing",
    },
    DefaultSetting {
        key: SESSION_TIMEOUT,
        value: "30",
        setting_type: SettingType::Number,
        description: "Session timeout in minutes",
    },
    DefaultSetting {
        key: MAX_LOGIN_ATTEMPTS,
        value: "5",
        setting_type: SettingType::Number,
        description: "Maximum login attempts before lockout",
    },
    DefaultSetting {
        key: COST_PER_WATT_RESIDENTIAL,
        value: "375",
        setting_type: SettingType::Number,
        description: "Cost per watt for residential installations (KSh)",
    },
    DefaultSetting {
        key: COST_PER_WATT_COMMERCIAL,
        value: "325",
        setting_type: SettingType::Number,
        description: "Cost per watt for commercial installations (KSh)",
    },
    DefaultSetting {
        key: SAVINGS_PER_KWH,
        value: "20",
        setting_type: SettingType::Number,
        description: "Savings per kWh generated (KSh)",
    },
];

/// Company name and currency resolved for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branding {
    /// Company name
    pub company_name: String,
    /// Currency label
    pub currency: String,
}

/// Inserts or updates one setting row on any connection, including a transaction.
///
/// The type tag is taken from the value.
pub async fn upsert_setting<C: ConnectionTrait>(
    db: &C,
    key: &str,
    value: &SettingValue,
    description: Option<&str>,
) -> std::result::Result<(), DbErr> {
    let now = Utc::now().naive_utc();

    let row = setting::ActiveModel {
        key: Set(key.to_string()),
        value: Set(value.encode()),
        value_type: Set(value.setting_type()),
        description: Set(description.map(str::to_string)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    Setting::insert(row)
        .on_conflict(
            OnConflict::column(setting::Column::Key)
                .update_columns([
                    setting::Column::Value,
                    setting::Column::ValueType,
                    setting::Column::Description,
                    setting::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    Ok(())
}

/// Typed access to the settings store.
#[derive(Debug, Clone, Copy)]
pub struct Settings<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> Settings<'a> {
    /// Creates a resolver over the given connection.
    #[must_use]
    pub const fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// The connection this resolver reads from and writes to.
    #[must_use]
    pub const fn connection(&self) -> &'a DatabaseConnection {
        self.db
    }

    /// Looks up `key` and decodes it, distinguishing every failure.
    ///
    /// # Returns
    /// * `Ok(Some(value))` - The key exists and decoded cleanly
    /// * `Ok(None)` - The key is not stored
    ///
    /// # Errors
    /// * [`Error::SettingsUnavailable`] if the store cannot be queried
    /// * [`Error::NumberDecode`] if a number setting does not parse
    pub async fn try_get(&self, key: &str) -> Result<Option<SettingValue>> {
        let row = Setting::find()
            .filter(setting::Column::Key.eq(key))
            .one(self.db)
            .await
            .map_err(|source| Error::SettingsUnavailable { source })?;

        row.map(|r| SettingValue::decode(&r.key, &r.value, r.value_type))
            .transpose()
    }

    /// Returns the stored value for `key`, or `default` unchanged if it is absent,
    /// undecodable, or the store is unreachable.
    #[instrument(skip(self))]
    pub async fn get(&self, key: &str, default: SettingValue) -> SettingValue {
        match self.try_get(key).await {
            Ok(Some(value)) => {
                debug!("Setting '{}' = {}", key, value);
                value
            }
            Ok(None) => {
                debug!("Setting '{}' not stored, using default {}", key, default);
                default
            }
            Err(e) => {
                warn!("Falling back to default for '{}': {}", key, e);
                default
            }
        }
    }

    /// Numeric read; a stored value that is not a number yields `default`.
    pub async fn get_f64(&self, key: &str, default: f64) -> f64 {
        let value = self.get(key, SettingValue::Float(default)).await;
        value.as_f64().unwrap_or_else(|| {
            warn!("Setting '{}' is not a number ({}), using {}", key, value, default);
            default
        })
    }

    /// Boolean read; a stored value that is not a boolean yields `default`.
    pub async fn get_bool(&self, key: &str, default: bool) -> bool {
        let value = self.get(key, SettingValue::Bool(default)).await;
        value.as_bool().unwrap_or_else(|| {
            warn!("Setting '{}' is not a boolean ({}), using {}", key, value, default);
            default
        })
    }

    /// Text read; a stored value that is not text yields `default`.
    pub async fn get_string(&self, key: &str, default: &str) -> String {
        match self.get(key, SettingValue::from(default)).await {
            SettingValue::Text(s) => s,
            other => {
                warn!("Setting '{}' is not text ({}), using {}", key, other, default);
                default.to_string()
            }
        }
    }

    /// Inserts or updates a setting in a single statement.
    ///
    /// The type tag is taken from the value. Value, type, description and
    /// `updated_at` are rewritten on every call, even when nothing changed.
    ///
    /// # Errors
    /// Returns [`Error::SettingsUnavailable`] if the write does not reach the store.
    #[instrument(skip(self, value))]
    pub async fn set(
        &self,
        key: &str,
        value: impl Into<SettingValue>,
        description: Option<&str>,
    ) -> Result<()> {
        let value = value.into();
        upsert_setting(self.db, key, &value, description)
            .await
            .map_err(|source| Error::SettingsUnavailable { source })?;

        info!("Set setting: {} = {}", key, value);
        Ok(())
    }

    /// Every stored setting, decoded per its own type.
    ///
    /// A number that fails to decode is returned as its raw text. An unreachable
    /// store yields an empty map.
    pub async fn get_all(&self) -> BTreeMap<String, SettingValue> {
        let rows = match Setting::find().all(self.db).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!("Settings store unavailable, returning no settings: {}", e);
                return BTreeMap::new();
            }
        };

        rows.into_iter()
            .map(|row| {
                let value = SettingValue::decode(&row.key, &row.value, row.value_type)
                    .unwrap_or_else(|e| {
                        warn!("{}", e);
                        SettingValue::Text(row.value.clone())
                    });
                (row.key, value)
            })
            .collect()
    }

    /// Company name and currency, with configured fallbacks.
    pub async fn branding(&self, fallback: &BrandingConfig) -> Branding {
        Branding {
            company_name: self.get_string(COMPANY_NAME, &fallback.company_name).await,
            currency: self
                .get_string(DEFAULT_CURRENCY, &fallback.default_currency)
                .await,
        }
    }
}

/// Writes [`DEFAULT_SETTINGS`] for every key not already stored.
///
/// Existing values are never overwritten.
pub async fn seed_defaults(db: &DatabaseConnection) -> Result<()> {
    let now = Utc::now().naive_utc();
    let rows = DEFAULT_SETTINGS.iter().map(|d| setting::ActiveModel {
        key: Set(d.key.to_string()),
        value: Set(d.value.to_string()),
        value_type: Set(d.setting_type),
        description: Set(Some(d.description.to_string())),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    });

    let inserted = Setting::insert_many(rows)
        .on_conflict(
            OnConflict::column(setting::Column::Key)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    info!("Seeded {} default settings", inserted);
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase};

    fn unreachable_db() -> DatabaseConnection {
        MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_errors([DbErr::Custom("connection refused".to_string())])
            .append_exec_errors([DbErr::Custom("connection refused".to_string())])
            .into_connection()
    }

    #[tokio::test]
    async fn test_set_and_get_integer_round_trip() -> Result<()> {
        init_test_tracing();
        let db = setup_test_db().await?;
        let settings = Settings::new(&db);

        settings
            .set(SAVINGS_PER_KWH, 25, Some("Savings per kWh generated (KSh)"))
            .await?;

        let value = settings.get(SAVINGS_PER_KWH, SettingValue::from(20)).await;
        assert_eq!(value, SettingValue::Integer(25));

        let row = Setting::find()
            .filter(setting::Column::Key.eq(SAVINGS_PER_KWH))
            .one(&db)
            .await?
            .unwrap();
        assert_eq!(row.value, "25");
        assert_eq!(row.value_type, SettingType::Number);

        Ok(())
    }

    #[tokio::test]
    async fn test_set_boolean_stores_literal() -> Result<()> {
        let db = setup_test_db().await?;
        let settings = Settings::new(&db);

        settings.set(DARK_MODE, true, None).await?;

        let row = Setting::find()
            .filter(setting::Column::Key.eq(DARK_MODE))
            .one(&db)
            .await?
            .unwrap();
        assert_eq!(row.value, "true");
        assert!(settings.get_bool(DARK_MODE, false).await);

        Ok(())
    }

    #[tokio::test]
    async fn test_get_unknown_key_returns_default_unchanged() -> Result<()> {
        let db = setup_test_db().await?;
        let settings = Settings::new(&db);

        let value = settings
            .get("no_such_key", SettingValue::from("fallback"))
            .await;
        assert_eq!(value, SettingValue::Text("fallback".to_string()));

        let value = settings.get("no_such_key", SettingValue::Float(1.5)).await;
        assert_eq!(value, SettingValue::Float(1.5));

        Ok(())
    }

    #[tokio::test]
    async fn test_set_updates_existing_key() -> Result<()> {
        let db = setup_test_db().await?;
        let settings = Settings::new(&db);

        settings.set(COMPANY_NAME, "Old Name", Some("first")).await?;
        let first = Setting::find()
            .filter(setting::Column::Key.eq(COMPANY_NAME))
            .one(&db)
            .await?
            .unwrap();

        settings.set(COMPANY_NAME, "New Name", Some("second")).await?;
        let second = Setting::find()
            .filter(setting::Column::Key.eq(COMPANY_NAME))
            .one(&db)
            .await?
            .unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.value, "New Name");
        assert_eq!(second.description.as_deref(), Some("second"));
        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at >= first.updated_at);

        let count = Setting::find()
            .filter(setting::Column::Key.eq(COMPANY_NAME))
            .count(&db)
            .await?;
        assert_eq!(count, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_set_can_change_type() -> Result<()> {
        let db = setup_test_db().await?;
        let settings = Settings::new(&db);

        settings.set("flexible", "hello", None).await?;
        settings.set("flexible", 12.5, None).await?;

        let value = settings.get("flexible", SettingValue::from(0)).await;
        assert_eq!(value, SettingValue::Float(12.5));

        Ok(())
    }

    #[tokio::test]
    async fn test_undecodable_number_falls_back_to_default() -> Result<()> {
        init_test_tracing();
        let db = setup_test_db().await?;
        let now = Utc::now().naive_utc();
        setting::ActiveModel {
            key: Set(SAVINGS_PER_KWH.to_string()),
            value: Set("lots".to_string()),
            value_type: Set(SettingType::Number),
            description: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let settings = Settings::new(&db);
        assert_eq!(settings.get_f64(SAVINGS_PER_KWH, 20.0).await, 20.0);
        assert!(matches!(
            settings.try_get(SAVINGS_PER_KWH).await,
            Err(Error::NumberDecode { .. })
        ));

        // Bulk read keeps the raw text
        let all = settings.get_all().await;
        assert_eq!(
            all.get(SAVINGS_PER_KWH),
            Some(&SettingValue::Text("lots".to_string()))
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_typed_reads_reject_wrong_variant() -> Result<()> {
        let db = setup_test_db().await?;
        let settings = Settings::new(&db);

        settings.set(SAVINGS_PER_KWH, "twenty", None).await?;
        assert_eq!(settings.get_f64(SAVINGS_PER_KWH, 20.0).await, 20.0);

        settings.set(COMPANY_NAME, 42, None).await?;
        assert_eq!(settings.get_string(COMPANY_NAME, "Acme").await, "Acme");

        Ok(())
    }

    #[tokio::test]
    async fn test_get_all_decodes_each_type() -> Result<()> {
        let db = setup_test_db().await?;
        seed_defaults(&db).await?;

        let all = Settings::new(&db).get_all().await;
        assert_eq!(all.len(), DEFAULT_SETTINGS.len());
        assert_eq!(all.get(DARK_MODE), Some(&SettingValue::Bool(false)));
        assert_eq!(all.get(EMAIL_NOTIFICATIONS), Some(&SettingValue::Bool(true)));
        assert_eq!(
            all.get(COMPANY_NAME),
            Some(&SettingValue::Text("Veeteq Solar".to_string()))
        );
        assert_eq!(all.get(SESSION_TIMEOUT), Some(&SettingValue::Integer(30)));
        assert_eq!(
            all.get(COST_PER_WATT_RESIDENTIAL),
            Some(&SettingValue::Integer(375))
        );
        assert_eq!(
            all.get(COST_PER_WATT_COMMERCIAL),
            Some(&SettingValue::Integer(325))
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_seed_defaults_does_not_overwrite() -> Result<()> {
        let db = setup_test_db().await?;
        let settings = Settings::new(&db);

        settings.set(COST_PER_WATT_RESIDENTIAL, 400, None).await?;
        seed_defaults(&db).await?;
        seed_defaults(&db).await?;

        assert_eq!(settings.get_f64(COST_PER_WATT_RESIDENTIAL, 0.0).await, 400.0);
        assert_eq!(Setting::find().count(&db).await?, 9);

        Ok(())
    }

    #[tokio::test]
    async fn test_branding_uses_fallback_then_store() -> Result<()> {
        let db = setup_test_db().await?;
        let settings = Settings::new(&db);
        let fallback = BrandingConfig::default();

        let branding = settings.branding(&fallback).await;
        assert_eq!(branding.company_name, "Veeteq Solar");
        assert_eq!(branding.currency, "KSh");

        settings.set(DEFAULT_CURRENCY, "USD", None).await?;
        let branding = settings.branding(&fallback).await;
        assert_eq!(branding.currency, "USD");

        Ok(())
    }

    #[tokio::test]
    async fn test_get_with_unreachable_store_returns_default() {
        init_test_tracing();
        let db = unreachable_db();
        let settings = Settings::new(&db);

        let value = settings.get("x", SettingValue::from(7)).await;
        assert_eq!(value, SettingValue::Integer(7));
    }

    #[tokio::test]
    async fn test_set_with_unreachable_store_reports_failure() {
        let db = unreachable_db();
        let settings = Settings::new(&db);

        let result = settings.set(SAVINGS_PER_KWH, 25, None).await;
        assert!(matches!(result, Err(Error::SettingsUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_get_all_with_unreachable_store_is_empty() {
        let db = unreachable_db();
        assert!(Settings::new(&db).get_all().await.is_empty());
    }

    #[tokio::test]
    async fn test_get_is_a_single_round_trip() {
        let now = Utc::now().naive_utc();
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_results([vec![setting::Model {
                id: 1,
                key: SAVINGS_PER_KWH.to_string(),
                value: "22.5".to_string(),
                value_type: SettingType::Number,
                description: None,
                created_at: now,
                updated_at: now,
            }]])
            .into_connection();

        let value = Settings::new(&db)
            .get(SAVINGS_PER_KWH, SettingValue::from(20))
            .await;
        assert_eq!(value, SettingValue::Float(22.5));
        assert_eq!(db.into_transaction_log().len(), 1);
    }
}

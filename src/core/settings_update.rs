//! Operator edits to the settings shown in the admin console.
//!
//! All fields are validated before anything is written, so a rejected edit leaves the
//! store untouched.

use crate::{
    core::settings::{
        COMPANY_NAME, COST_PER_WATT_COMMERCIAL, COST_PER_WATT_RESIDENTIAL, DEFAULT_CURRENCY,
        EMAIL_NOTIFICATIONS, MAX_LOGIN_ATTEMPTS, SAVINGS_PER_KWH, SESSION_TIMEOUT, Settings,
        upsert_setting,
    },
    core::value::SettingValue,
    errors::{Error, Result},
};
use sea_orm::{DbErr, TransactionTrait};
use serde::Deserialize;
use std::ops::RangeInclusive;
use tracing::{info, warn};

const SESSION_TIMEOUT_RANGE: RangeInclusive<u32> = 5..=480;
const LOGIN_ATTEMPTS_RANGE: RangeInclusive<u32> = 3..=10;
const COST_PER_WATT_RANGE: RangeInclusive<f64> = 100.0..=1000.0;
const SAVINGS_PER_KWH_RANGE: RangeInclusive<f64> = 5.0..=100.0;

/// The full set of values an operator submits from the settings page.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SettingsUpdate {
    /// Send email alerts for new quotes
    pub email_notifications: bool,
    /// Company name displayed on the website
    pub company_name: String,
    /// Currency label for pricing
    pub default_currency: String,
    /// Session timeout in minutes
    pub session_timeout: u32,
    /// Login attempts before lockout
    pub max_login_attempts: u32,
    /// Residential price per watt
    pub cost_per_watt_residential: f64,
    /// Commercial price per watt
    pub cost_per_watt_commercial: f64,
    /// Savings per kWh generated
    pub savings_per_kwh: f64,
}

impl SettingsUpdate {
    /// Checks every field against its allowed range.
    ///
    /// # Errors
    /// Returns [`Error::InvalidSetting`] naming the first field out of range.
    pub fn validate(&self) -> Result<()> {
        check_range(
            SESSION_TIMEOUT,
            self.session_timeout,
            &SESSION_TIMEOUT_RANGE,
            "Session timeout must be between 5 and 480 minutes",
        )?;
        check_range(
            MAX_LOGIN_ATTEMPTS,
            self.max_login_attempts,
            &LOGIN_ATTEMPTS_RANGE,
            "Max login attempts must be between 3 and 10",
        )?;
        check_range(
            COST_PER_WATT_RESIDENTIAL,
            self.cost_per_watt_residential,
            &COST_PER_WATT_RANGE,
            "Residential cost per watt must be between 100 and 1000",
        )?;
        check_range(
            COST_PER_WATT_COMMERCIAL,
            self.cost_per_watt_commercial,
            &COST_PER_WATT_RANGE,
            "Commercial cost per watt must be between 100 and 1000",
        )?;
        check_range(
            SAVINGS_PER_KWH,
            self.savings_per_kwh,
            &SAVINGS_PER_KWH_RANGE,
            "Savings per kWh must be between 5 and 100",
        )?;
        Ok(())
    }

    /// Validates, then writes every field with its admin console description.
    ///
    /// The writes share one transaction, so the store sees all of them or none.
    ///
    /// # Errors
    /// * [`Error::InvalidSetting`] if validation fails (nothing is written)
    /// * [`Error::SettingsUnavailable`] if a write fails (nothing is kept)
    pub async fn apply(&self, settings: &Settings<'_>) -> Result<()> {
        self.validate()?;

        let unavailable = |source: DbErr| Error::SettingsUnavailable { source };
        let txn = settings.connection().begin().await.map_err(unavailable)?;

        for (key, value, description) in self.entries() {
            if let Err(source) = upsert_setting(&txn, key, &value, Some(description)).await {
                warn!("Rolling back settings update, '{}' failed: {}", key, source);
                txn.rollback().await.map_err(unavailable)?;
                return Err(unavailable(source));
            }
        }

        txn.commit().await.map_err(unavailable)?;
        info!("Settings saved");
        Ok(())
    }

    fn entries(&self) -> [(&'static str, SettingValue, &'static str); 8] {
        [
            (
                EMAIL_NOTIFICATIONS,
                self.email_notifications.into(),
                "Send email alerts for new quotes",
            ),
            (
                COMPANY_NAME,
                self.company_name.trim().into(),
                "Company name displayed on the website",
            ),
            (
                DEFAULT_CURRENCY,
                self.default_currency.as_str().into(),
                "Default currency for pricing",
            ),
            (
                SESSION_TIMEOUT,
                self.session_timeout.into(),
                "Session timeout in minutes",
            ),
            (
                MAX_LOGIN_ATTEMPTS,
                self.max_login_attempts.into(),
                "Maximum login attempts before lockout",
            ),
            (
                COST_PER_WATT_RESIDENTIAL,
                self.cost_per_watt_residential.into(),
                "Cost per watt for residential installations (KSh)",
            ),
            (
                COST_PER_WATT_COMMERCIAL,
                self.cost_per_watt_commercial.into(),
                "Cost per watt for commercial installations (KSh)",
            ),
            (
                SAVINGS_PER_KWH,
                self.savings_per_kwh.into(),
                "Savings per kWh generated (KSh)",
            ),
        ]
    }
}

// NaN fails `contains`, so non-finite prices are rejected here too
fn check_range<T: PartialOrd>(
    key: &str,
    value: T,
    range: &RangeInclusive<T>,
    message: &str,
) -> Result<()> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(Error::InvalidSetting {
            key: key.to_string(),
            message: message.to_string(),
        })
    }
}

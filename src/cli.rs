//! Command-line surface: quotes and settings administration, printed as JSON.
//!
//! Each command is a function returning the JSON document it prints, so the binary
//! only parses arguments and writes to stdout.

use crate::{
    config::AppConfig,
    core::{QuoteCalculator, QuoteRequest, SettingValue, Settings},
    entities::SettingType,
    errors::{Error, Result},
};
use clap::{Args, Parser, Subcommand};
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};
use tracing::{error, warn};

/// Top-level arguments.
#[derive(Parser, Debug)]
#[command(
    name = "solar-portal",
    about = "Price solar installations and manage the settings that drive pricing",
    version
)]
pub struct Cli {
    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Size and price a system, printing the quote as JSON
    Quote(QuoteArgs),
    /// Inspect or change operator settings
    Settings {
        /// Settings action
        #[command(subcommand)]
        command: SettingsCommand,
    },
}

/// Raw quote form fields.
#[derive(Args, Debug, Clone)]
pub struct QuoteArgs {
    /// Monthly electricity usage
    #[arg(long)]
    pub monthly_usage: Option<String>,
    /// Available roof area; 2000 means "not specified"
    #[arg(long, default_value = "2000")]
    pub roof_size: String,
    /// `residential`, or anything else for commercial pricing
    #[arg(long, default_value = "residential")]
    pub property_type: String,
}

/// Settings actions.
#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    /// Print every setting as JSON
    List,
    /// Print one setting, or null when it is not stored
    Get {
        /// Setting key
        key: String,
    },
    /// Insert or update a setting
    Set {
        /// Setting key
        key: String,
        /// Value as typed by the operator
        value: String,
        /// string, boolean or number
        #[arg(long = "type", default_value = "string")]
        setting_type: String,
        /// Admin console description
        #[arg(long)]
        description: Option<String>,
    },
}

/// Runs `command` and prints its JSON output.
///
/// A rejected quote still prints `{"error": ...}` before the error is returned, so
/// the process exits non-zero with a readable body on stdout.
///
/// # Errors
/// Whatever the command itself returns.
pub async fn run(command: Command, db: &DatabaseConnection, config: &AppConfig) -> Result<()> {
    let settings = Settings::new(db);

    let output = match command {
        Command::Quote(args) => match quote(&args, settings, config).await {
            Ok(body) => body,
            Err(e) => {
                println!("{}", error_body(&e));
                return Err(e);
            }
        },
        Command::Settings { command } => match command {
            SettingsCommand::List => settings_list(settings).await?,
            SettingsCommand::Get { key } => settings_get(settings, &key).await?,
            SettingsCommand::Set {
                key,
                value,
                setting_type,
                description,
            } => {
                settings_set(settings, &key, &value, &setting_type, description.as_deref())
                    .await?
            }
        },
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// The body printed for a failed command.
#[must_use]
pub fn error_body(error: &Error) -> Value {
    json!({ "error": error.to_string() })
}

/// Prices the submitted form fields.
///
/// # Errors
/// Returns [`Error::InvalidInput`] when the fields do not form a valid request.
pub async fn quote(args: &QuoteArgs, settings: Settings<'_>, config: &AppConfig) -> Result<Value> {
    let request = QuoteRequest::parse(
        args.monthly_usage.as_deref(),
        Some(args.roof_size.as_str()),
        Some(args.property_type.as_str()),
    )
    .inspect_err(|e| error!("Rejected quote request: {}", e))?;

    let result = QuoteCalculator::new(settings, &config.pricing)
        .calculate(&request)
        .await;
    Ok(serde_json::to_value(result)?)
}

/// Every stored setting as one JSON object.
///
/// # Errors
/// Returns [`Error::Serialization`] if the map cannot be encoded.
pub async fn settings_list(settings: Settings<'_>) -> Result<Value> {
    Ok(serde_json::to_value(settings.get_all().await)?)
}

/// One setting, `null` when absent.
///
/// A number that no longer parses is shown as its stored text, the way `list` shows it.
///
/// # Errors
/// Returns [`Error::SettingsUnavailable`] if the store cannot be queried.
pub async fn settings_get(settings: Settings<'_>, key: &str) -> Result<Value> {
    let value = match settings.try_get(key).await {
        Ok(value) => value,
        Err(Error::NumberDecode { value, .. }) => {
            warn!("Setting '{}' is not a valid number, showing raw text", key);
            Some(SettingValue::Text(value))
        }
        Err(e) => return Err(e),
    };
    Ok(serde_json::to_value(value)?)
}

/// Parses operator input for `setting_type` and stores it, echoing what was written.
///
/// # Errors
/// * [`Error::Config`] for an unknown type, [`Error::InvalidSetting`] for a malformed
///   value (nothing is written in either case)
/// * [`Error::SettingsUnavailable`] if the write fails
pub async fn settings_set(
    settings: Settings<'_>,
    key: &str,
    value: &str,
    setting_type: &str,
    description: Option<&str>,
) -> Result<Value> {
    let setting_type: SettingType = setting_type.parse()?;
    let value = SettingValue::from_input(key, value, setting_type)?;
    settings.set(key, value.clone(), description).await?;
    Ok(json!({ key: value }))
}

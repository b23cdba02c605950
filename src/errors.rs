//! Unified error types for the portal core.
//!
//! Every fallible operation returns [`Result`]. Store failures inside the settings
//! resolver are absorbed into defaults; the variants here are what still reaches callers.

use thiserror::Error;

/// Errors produced by configuration loading, the settings store and the quote calculator.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration file could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of the problem
        message: String,
    },

    /// Any database error raised outside the degrade-to-default paths
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O error while reading configuration or preparing the data directory
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Output could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Calculator input was missing, non-numeric or out of range
    #[error("{message}")]
    InvalidInput {
        /// Message suitable for showing to the person who filled in the form
        message: String,
    },

    /// The settings store could not be reached
    #[error("Settings store unavailable: {source}")]
    SettingsUnavailable {
        /// Underlying database error
        source: sea_orm::DbErr,
    },

    /// A stored number setting is not parseable
    #[error("Setting '{key}' holds '{value}', which is not a number")]
    NumberDecode {
        /// Setting key
        key: String,
        /// Raw stored text
        value: String,
    },

    /// An operator edit failed validation
    #[error("Invalid value for '{key}': {message}")]
    InvalidSetting {
        /// Setting key that was rejected
        key: String,
        /// Why it was rejected
        message: String,
    },
}

impl Error {
    /// Builds an [`Error::InvalidInput`] from any message.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

//! Database configuration module.
//!
//! This module handles the database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs without hand-written SQL.

use crate::config::app::AppConfig;
use crate::entities::Setting;
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use std::path::Path;
use tracing::info;

/// Creates the directory holding a file-backed `SQLite` database, if needed.
///
/// Other backends and in-memory databases are left alone.
pub fn ensure_sqlite_dir(url: &str) -> Result<()> {
    let Some(rest) = url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let path = rest.split('?').next().unwrap_or_default();
    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Establishes a connection to the database named in the configuration.
pub async fn create_connection(config: &AppConfig) -> Result<DatabaseConnection> {
    info!("Connecting to database at {}", config.database.url);
    ensure_sqlite_dir(&config.database.url)?;
    Database::connect(&config.database.url)
        .await
        .map_err(Into::into)
}

/// Creates all necessary database tables if they do not exist yet.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut setting_table = schema.create_table_from_entity(Setting);
    setting_table.if_not_exists();

    db.execute(builder.build(&setting_table)).await?;

    Ok(())
}

use log::info;
use self::migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::path::Path;
use std::time::Duration;
use tokio::fs::{create_dir_all, File};

pub use sea_orm::DbErr;

pub mod entities;
pub mod migration;

pub type DbResult<T> = Result<T, DbErr>;

/// Connects to the database file, creating it if missing, and brings
/// the schema up to date
pub async fn connect(db_file: &str) -> DbResult<DatabaseConnection> {
    info!("Connecting to database..");

    let file_path = Path::new(db_file);
    if let Some(parent) = file_path.parent() {
        if !parent.exists() {
            create_dir_all(parent)
                .await
                .map_err(|err| DbErr::Custom(format!("Unable to create data directory: {err}")))?;
        }
    }

    if !file_path.exists() {
        File::create(file_path)
            .await
            .map_err(|err| DbErr::Custom(format!("Unable to create database file: {err}")))?;
    }

    let mut options = ConnectOptions::new(format!("sqlite:{db_file}"));
    options
        .connect_timeout(Duration::from_secs(3))
        .acquire_timeout(Duration::from_secs(3));

    let connection = Database::connect(options).await?;

    info!("Running migrations...");
    Migrator::up(&connection, None).await?;

    prepare(&connection).await?;

    info!("Connected to database: sqlite:{db_file}");

    Ok(connection)
}

/// Boot-time preparation: seed the id counters when absent and clear
/// out session rows left behind by a previous run
async fn prepare(db: &DatabaseConnection) -> DbResult<()> {
    entities::Counter::seed_defaults(db).await?;
    let stale = entities::SessionRecord::clear_all(db).await?;
    if stale > 0 {
        info!("Cleared {stale} stale session records");
    }
    Ok(())
}

#[cfg(test)]
pub async fn connect_memory() -> DatabaseConnection {
    // A single pooled connection so every caller shares one in-memory
    // database
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1);
    let connection = Database::connect(options)
        .await
        .expect("Failed to open in-memory database");
    Migrator::up(&connection, None)
        .await
        .expect("Failed to run migrations");
    prepare(&connection)
        .await
        .expect("Failed to prepare database");
    connection
}

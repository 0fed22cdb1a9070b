//! Database migration command.
//!
//! ```bash
//! resman migrate
//! ```
//!
//! Applies the migrations embedded in `resman-server`
//! (`crates/server/migrations/`) to `RESMAN_DATABASE_URL`.

use thiserror::Error;

use resman_server::db::{create_pool, postgres::MIGRATOR};

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Missing environment variable: RESMAN_DATABASE_URL")]
    MissingDatabaseUrl,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run all pending migrations.
///
/// # Errors
///
/// Returns `MigrationError` if the database is unreachable or a migration
/// fails.
pub async fn run() -> Result<(), MigrationError> {
    let database_url = super::database_url().ok_or(MigrationError::MissingDatabaseUrl)?;

    tracing::info!("Connecting to database...");
    let pool = create_pool(&database_url).await?;

    tracing::info!("Running migrations...");
    MIGRATOR.run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}

//! Embedded Diesel migrations for the hangout schema.

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

use crate::domain::ports::RepositoryError;

/// Migrations from the `backend/migrations` directory, compiled in.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Apply every pending migration and return the versions that ran.
///
/// The migration harness is synchronous, so the work runs on a blocking
/// thread with its own `PgConnection`.
///
/// # Errors
///
/// Returns [`RepositoryError::Connection`] when the database is unreachable and
/// [`RepositoryError::Query`] when a migration fails.
pub async fn run_pending_migrations(database_url: &str) -> Result<Vec<String>, RepositoryError> {
    let url = database_url.to_owned();
    tokio::task::spawn_blocking(move || migrate_blocking(&url))
        .await
        .map_err(|err| RepositoryError::query(format!("migration task: {err}")))?
}

fn migrate_blocking(url: &str) -> Result<Vec<String>, RepositoryError> {
    let mut conn = PgConnection::establish(url)
        .map_err(|err| RepositoryError::connection(err.to_string()))?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| RepositoryError::query(format!("migration: {err}")))?
        .into_iter()
        .map(|version| version.to_string())
        .collect::<Vec<_>>();
    info!(count = applied.len(), "migrations applied");
    Ok(applied)
}

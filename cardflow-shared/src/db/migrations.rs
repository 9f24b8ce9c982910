/// Database migration runner
///
/// Applies the SQL migrations embedded from this crate's `migrations/`
/// directory using sqlx's migration system. The schema carries the
/// deferred unique constraints that back the dense-ordering invariant,
/// so running migrations is required before any store operation.

use sqlx::postgres::PgPool;
use tracing::{info, warn};

/// Runs all pending migrations from `migrations/`.
///
/// # Errors
///
/// Returns an error if a migration file is malformed or fails to
/// execute; a failed migration is rolled back.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("running database migrations");

    match sqlx::migrate!("./migrations").run(pool).await {
        Ok(()) => {
            info!("database migrations complete");
            Ok(())
        }
        Err(e) => {
            warn!("migration failed: {}", e);
            Err(e)
        }
    }
}

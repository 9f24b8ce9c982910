/// Database layer
///
/// Connection pooling and schema migrations for the Postgres store.
///
/// # Modules
///
/// - `pool`: connection pool creation and health checks
/// - `migrations`: sqlx migration runner for `migrations/`

pub mod migrations;
pub mod pool;

pub use migrations::run_migrations;
pub use pool::{create_pool, health_check, DatabaseConfig};

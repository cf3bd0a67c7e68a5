//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! relikt-cli migrate
//! ```
//!
//! Migrations are embedded from `crates/catalog/migrations/`:
//! ```text
//! migrations/
//! └── 20260301000001_create_catalog.sql
//! ```

use relikt_catalog::store::{create_pool, run_migrations};

use super::CommandError;
use crate::config::CliConfig;

/// Run catalog database migrations.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the connection fails or a
/// migration cannot be applied.
pub async fn run(config: &CliConfig) -> Result<(), CommandError> {
    let database_url = config.require_database_url()?;

    tracing::info!("Connecting to catalog database...");
    let pool = create_pool(database_url).await?;

    tracing::info!("Running catalog migrations...");
    run_migrations(&pool).await?;
    pool.close().await;

    tracing::info!("Catalog migrations complete");
    Ok(())
}

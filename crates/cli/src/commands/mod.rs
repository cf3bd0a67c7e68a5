//! Subcommand implementations.

pub mod import;
pub mod inspect;
pub mod migrate;

use thiserror::Error;

use relikt_catalog::import::ImportError;
use relikt_catalog::inference::MappingError;
use relikt_catalog::store::RepositoryError;

use crate::config::ConfigError;

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("Invalid field mapping: {0}")]
    Mapping(#[from] MappingError),

    #[error("Import failed: {0}")]
    Import(#[from] ImportError),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

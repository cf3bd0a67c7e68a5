//! Catalog persistence.
//!
//! # Tables
//!
//! - `categories` - Product categories and their capability flags
//! - `products` - Catalog products, unique by `sku`
//! - `product_photos` - Photo web paths, unique per product
//!
//! # Migrations
//!
//! Migrations are stored in `crates/catalog/migrations/` and run via:
//! ```bash
//! cargo run -p relikt-cli -- migrate
//! ```
//!
//! The importer talks to the database only through [`CatalogStore`]. A store
//! is one unit of work: everything written through it becomes visible on
//! [`CatalogStore::commit`] and is discarded on [`CatalogStore::rollback`] or
//! when the store is dropped.

mod postgres;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use relikt_core::{ProductId, Sku};

use crate::models::{
    Category, NewCategory, NewProduct, NewProductPhoto, Product, ProductPhoto, ProductUpdate,
};

pub use postgres::PgCatalogStore;

/// Embedded catalog migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration error from sqlx.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate sku from a concurrent run).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Unit of work over the catalog tables.
///
/// Implementations must make every write visible to subsequent reads through
/// the same store, even before commit.
#[allow(async_fn_in_trait)]
pub trait CatalogStore {
    /// Find a category by its unique name.
    async fn find_category_by_name(
        &mut self,
        name: &str,
    ) -> Result<Option<Category>, RepositoryError>;

    /// Create a category.
    async fn insert_category(&mut self, input: &NewCategory) -> Result<Category, RepositoryError>;

    /// Find a product by SKU.
    async fn find_product_by_sku(&mut self, sku: &Sku) -> Result<Option<Product>, RepositoryError>;

    /// Create a product and return it with its assigned ID.
    async fn insert_product(&mut self, input: &NewProduct) -> Result<Product, RepositoryError>;

    /// Overwrite the importer-owned fields of a product.
    async fn update_product(
        &mut self,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<Product, RepositoryError>;

    /// List a product's photos in insertion order.
    async fn list_photos(&mut self, product_id: ProductId)
    -> Result<Vec<ProductPhoto>, RepositoryError>;

    /// Append a photo to a product.
    async fn insert_photo(&mut self, input: &NewProductPhoto)
    -> Result<ProductPhoto, RepositoryError>;

    /// Make all writes durable.
    async fn commit(self) -> Result<(), RepositoryError>
    where
        Self: Sized;

    /// Discard all writes.
    async fn rollback(self) -> Result<(), RepositoryError>
    where
        Self: Sized;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// The importer is sequential, so the pool stays small.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(2)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Run pending catalog migrations.
///
/// # Errors
///
/// Returns `RepositoryError::Migration` if a migration fails to apply.
pub async fn run_migrations(pool: &PgPool) -> Result<(), RepositoryError> {
    MIGRATOR.run(pool).await?;
    Ok(())
}

//! `PostgreSQL` catalog store backed by a single transaction.
//!
//! Queries are checked at runtime (`query_as` + `bind`) so the workspace
//! builds without a live database.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};

use relikt_core::{CategoryId, Price, ProductDescription, ProductId, ProductPhotoId, Sku};

use super::{CatalogStore, RepositoryError};
use crate::models::{
    Category, NewCategory, NewProduct, NewProductPhoto, Product, ProductPhoto, ProductUpdate,
};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: i32,
    name: String,
    is_glass_available: bool,
    is_orientation_choice: bool,
    is_material_choice: bool,
    is_platband_choice: bool,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: CategoryId::new(row.id),
            name: row.name,
            is_glass_available: row.is_glass_available,
            is_orientation_choice: row.is_orientation_choice,
            is_material_choice: row.is_material_choice,
            is_platband_choice: row.is_platband_choice,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    sku: String,
    name: String,
    price: i32,
    category_id: i32,
    description: Json<ProductDescription>,
    have_glass: bool,
    orientation_choice: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let sku = Sku::parse(&row.sku).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid sku in database: {e}"))
        })?;

        Ok(Self {
            id: ProductId::new(row.id),
            sku,
            name: row.name,
            price: Price::from_minor(row.price),
            category_id: CategoryId::new(row.category_id),
            description: row.description.0,
            have_glass: row.have_glass,
            orientation_choice: row.orientation_choice,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProductPhotoRow {
    id: i32,
    product_id: i32,
    photo: String,
    is_main: bool,
    orientation: Option<String>,
    color_id: Option<i32>,
    size_id: Option<i32>,
}

impl From<ProductPhotoRow> for ProductPhoto {
    fn from(row: ProductPhotoRow) -> Self {
        Self {
            id: ProductPhotoId::new(row.id),
            product_id: ProductId::new(row.product_id),
            photo: row.photo,
            is_main: row.is_main,
            orientation: row.orientation,
            color_id: row.color_id,
            size_id: row.size_id,
        }
    }
}

const PRODUCT_COLUMNS: &str = "id, sku, name, price, category_id, description, \
     have_glass, orientation_choice, created_at, updated_at";

const CATEGORY_COLUMNS: &str = "id, name, is_glass_available, is_orientation_choice, \
     is_material_choice, is_platband_choice";

const PHOTO_COLUMNS: &str = "id, product_id, photo, is_main, orientation, color_id, size_id";

/// Map a unique violation to `RepositoryError::Conflict`.
fn conflict_or_database(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(e)
}

// =============================================================================
// Store
// =============================================================================

/// Catalog store holding one open transaction for the whole import run.
///
/// Dropping the store without calling [`CatalogStore::commit`] rolls the
/// transaction back.
pub struct PgCatalogStore {
    tx: Transaction<'static, Postgres>,
}

impl PgCatalogStore {
    /// Begin a transaction on the pool.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if no connection can be acquired.
    pub async fn begin(pool: &PgPool) -> Result<Self, RepositoryError> {
        let tx = pool.begin().await?;
        Ok(Self { tx })
    }
}

impl CatalogStore for PgCatalogStore {
    async fn find_category_by_name(
        &mut self,
        name: &str,
    ) -> Result<Option<Category>, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE name = $1"
        ))
        .bind(name)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn insert_category(&mut self, input: &NewCategory) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            r"
            INSERT INTO categories (
                name, is_glass_available, is_orientation_choice,
                is_material_choice, is_platband_choice
            )
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {CATEGORY_COLUMNS}
            "
        ))
        .bind(&input.name)
        .bind(input.is_glass_available)
        .bind(input.is_orientation_choice)
        .bind(input.is_material_choice)
        .bind(input.is_platband_choice)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| conflict_or_database(e, "category"))?;

        Ok(row.into())
    }

    async fn find_product_by_sku(&mut self, sku: &Sku) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE sku = $1"
        ))
        .bind(sku.as_str())
        .fetch_optional(&mut *self.tx)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn insert_product(&mut self, input: &NewProduct) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            INSERT INTO products (
                sku, name, price, category_id, description,
                have_glass, orientation_choice
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(input.sku.as_str())
        .bind(&input.name)
        .bind(input.price.minor_units())
        .bind(input.category_id)
        .bind(Json(&input.description))
        .bind(input.have_glass)
        .bind(input.orientation_choice)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| conflict_or_database(e, "product sku"))?;

        row.try_into()
    }

    async fn update_product(
        &mut self,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            UPDATE products
            SET
                name = $2,
                description = $3,
                have_glass = $4,
                orientation_choice = $5,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(id)
        .bind(&update.name)
        .bind(Json(&update.description))
        .bind(update.have_glass)
        .bind(update.orientation_choice)
        .fetch_optional(&mut *self.tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    async fn list_photos(
        &mut self,
        product_id: ProductId,
    ) -> Result<Vec<ProductPhoto>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductPhotoRow>(&format!(
            "SELECT {PHOTO_COLUMNS} FROM product_photos WHERE product_id = $1 ORDER BY id ASC"
        ))
        .bind(product_id)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert_photo(
        &mut self,
        input: &NewProductPhoto,
    ) -> Result<ProductPhoto, RepositoryError> {
        let row = sqlx::query_as::<_, ProductPhotoRow>(&format!(
            r"
            INSERT INTO product_photos (product_id, photo, is_main)
            VALUES ($1, $2, $3)
            RETURNING {PHOTO_COLUMNS}
            "
        ))
        .bind(input.product_id)
        .bind(&input.photo)
        .bind(input.is_main)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| conflict_or_database(e, "product photo"))?;

        Ok(row.into())
    }

    async fn commit(self) -> Result<(), RepositoryError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<(), RepositoryError> {
        self.tx.rollback().await?;
        Ok(())
    }
}

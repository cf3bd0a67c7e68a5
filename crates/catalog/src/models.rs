//! Catalog domain models.
//!
//! These mirror the rows the storefront reads. The importer only ever
//! creates categories, creates or overwrites products, and appends photos.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use relikt_core::{CategoryId, Price, ProductDescription, ProductId, ProductPhotoId, Sku};

/// A product category with its storefront capability flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    /// Unique display name (lookup key).
    pub name: String,
    /// Products may be ordered with glass.
    pub is_glass_available: bool,
    /// Products may be ordered left- or right-handed.
    pub is_orientation_choice: bool,
    /// Products offer a material choice.
    pub is_material_choice: bool,
    /// Products offer a platband choice.
    pub is_platband_choice: bool,
}

/// Input for creating a category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    pub name: String,
    pub is_glass_available: bool,
    pub is_orientation_choice: bool,
    pub is_material_choice: bool,
    pub is_platband_choice: bool,
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    /// Idempotency key across import runs.
    pub sku: Sku,
    pub name: String,
    pub price: Price,
    pub category_id: CategoryId,
    pub description: ProductDescription,
    pub have_glass: bool,
    pub orientation_choice: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub sku: Sku,
    pub name: String,
    pub price: Price,
    pub category_id: CategoryId,
    pub description: ProductDescription,
    pub have_glass: bool,
    pub orientation_choice: bool,
}

/// Fields the importer overwrites on every run.
///
/// Price and category are deliberately absent: they are set once at
/// creation and may be edited by hand afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductUpdate {
    pub name: String,
    pub description: ProductDescription,
    pub have_glass: bool,
    pub orientation_choice: bool,
}

/// A product photo row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPhoto {
    pub id: ProductPhotoId,
    pub product_id: ProductId,
    /// Web path, e.g. `/static/catalog/door/Classic/Alpha/1.webp`.
    pub photo: String,
    pub is_main: bool,
    pub orientation: Option<String>,
    pub color_id: Option<i32>,
    pub size_id: Option<i32>,
}

/// Input for appending a photo. Attribute placeholders are always NULL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProductPhoto {
    pub product_id: ProductId,
    pub photo: String,
    pub is_main: bool,
}

//! Relikt Catalog - directory-tree catalog importer.
//!
//! Walks `catalog_root/<category>/[<class>/]<product>/`, reads each product's
//! photos and `description.docx`, and upserts `categories`, `products` and
//! `product_photos` rows in `PostgreSQL`.
//!
//! # Pipeline
//!
//! 1. [`photos`] - find the images of a product folder
//! 2. [`document`] - read the description document into lines
//! 3. [`inference`] - map lines to labeled fields and flags
//! 4. [`sync`] - upsert the product and append new photos
//! 5. [`import`] - walk the tree and drive the steps above in one transaction
//!
//! Persistence goes through the [`store::CatalogStore`] trait;
//! [`store::PgCatalogStore`] is the `PostgreSQL` implementation.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod document;
pub mod import;
pub mod inference;
pub mod models;
pub mod photos;
pub mod store;
pub mod sync;

pub use document::{DocumentReader, DocumentReaderKind, extract_lines};
pub use import::{
    CatalogLayout, CategoryReport, CategorySpec, ImportError, ImportOptions, ImportReport,
    Importer, ProductPreview, preview_product,
};
pub use inference::{FieldMapping, InferredFields, infer};
pub use store::{CatalogStore, PgCatalogStore, RepositoryError};

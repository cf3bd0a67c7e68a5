//! Product and photo synchronization.
//!
//! Products are upserted by SKU and the importer-owned fields are overwritten
//! on every run (last import wins, no merge). Photos are append-only: rows
//! for files that disappeared from disk are kept, and existing rows are never
//! reordered or re-flagged.

use std::collections::HashSet;

use tracing::{debug, info, instrument};

use relikt_core::{Price, ProductId, Sku};

use crate::inference::InferredFields;
use crate::models::{Category, NewProduct, NewProductPhoto, ProductUpdate};
use crate::photos::DiscoveredPhoto;
use crate::store::{CatalogStore, RepositoryError};

/// Everything the synchronizer needs to know about one product folder.
#[derive(Debug, Clone, Copy)]
pub struct ProductSource<'a> {
    pub sku: &'a Sku,
    pub name: &'a str,
    /// Price used only when the product is created.
    pub price: Price,
    pub fields: &'a InferredFields,
    /// Sorted, deduplicated photos.
    pub photos: &'a [DiscoveredPhoto],
    /// Web path of the product folder, without a trailing slash.
    pub web_dir: &'a str,
}

impl ProductSource<'_> {
    /// Web path of a photo in this folder.
    #[must_use]
    pub fn web_path(&self, photo: &DiscoveredPhoto) -> String {
        format!("{}/{}", self.web_dir, photo.file_name)
    }
}

/// Result of synchronizing one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOutcome {
    pub product_id: ProductId,
    /// The product row was inserted by this run.
    pub created: bool,
    pub photos_added: usize,
    pub photos_total: usize,
}

/// Upsert a product and append its new photos.
///
/// Glass and orientation flags are only stored when the category supports
/// them.
///
/// # Errors
///
/// Returns any `RepositoryError` from the store; the caller's transaction is
/// then expected to be abandoned.
#[instrument(skip_all, fields(sku = %source.sku))]
pub async fn sync_product<S: CatalogStore>(
    store: &mut S,
    category: &Category,
    source: ProductSource<'_>,
) -> Result<SyncOutcome, RepositoryError> {
    let description = source.fields.to_description();
    let have_glass = source.fields.has_glass && category.is_glass_available;
    let orientation_choice = source.fields.has_orientation && category.is_orientation_choice;

    let (product, created) = match store.find_product_by_sku(source.sku).await? {
        None => {
            let product = store
                .insert_product(&NewProduct {
                    sku: source.sku.clone(),
                    name: source.name.to_owned(),
                    price: source.price,
                    category_id: category.id,
                    description,
                    have_glass,
                    orientation_choice,
                })
                .await?;
            info!(product_id = %product.id, price = %product.price, "Created product");
            (product, true)
        }
        Some(existing) => {
            let product = store
                .update_product(
                    existing.id,
                    &ProductUpdate {
                        name: source.name.to_owned(),
                        description,
                        have_glass,
                        orientation_choice,
                    },
                )
                .await?;
            info!(product_id = %product.id, "Updated product");
            (product, false)
        }
    };

    let existing = store.list_photos(product.id).await?;
    let existing_paths: HashSet<&str> = existing.iter().map(|p| p.photo.as_str()).collect();
    let had_photos = !existing.is_empty();

    let mut photos_added = 0;
    for photo in source.photos {
        let web_path = source.web_path(photo);
        if existing_paths.contains(web_path.as_str()) {
            continue;
        }

        let is_main = !had_photos && photos_added == 0;
        store
            .insert_photo(&NewProductPhoto {
                product_id: product.id,
                photo: web_path,
                is_main,
            })
            .await?;
        photos_added += 1;
        debug!(file = %photo.file_name, is_main, "Added photo");
    }

    Ok(SyncOutcome {
        product_id: product.id,
        created,
        photos_added,
        photos_total: existing.len() + photos_added,
    })
}

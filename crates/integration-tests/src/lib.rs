//! Integration tests for Relikt.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p relikt-integration-tests
//! ```
//!
//! The tests drive the real importer against two fixtures:
//!
//! - [`MemoryCatalog`] - an in-memory [`CatalogStore`] with the same unit of
//!   work semantics as the `PostgreSQL` store (writes visible inside the
//!   store, published on commit, dropped on rollback)
//! - [`CatalogFixture`] - a temporary catalog folder with photos and
//!   generated `description.docx` files

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use tempfile::TempDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use relikt_catalog::document::DESCRIPTION_FILE;
use relikt_catalog::models::{
    Category, NewCategory, NewProduct, NewProductPhoto, Product, ProductPhoto, ProductUpdate,
};
use relikt_catalog::{CatalogStore, RepositoryError};
use relikt_core::{CategoryId, ProductId, ProductPhotoId, Sku};

// =============================================================================
// In-memory store
// =============================================================================

/// Contents of the in-memory catalog tables.
#[derive(Debug, Clone, Default)]
pub struct CatalogState {
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
    pub photos: Vec<ProductPhoto>,
    /// Number of insert/update statements committed so far.
    pub writes: usize,
    next_id: i32,
}

impl CatalogState {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    #[must_use]
    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    #[must_use]
    pub fn product(&self, sku: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.sku.as_str() == sku)
    }

    /// Photos of a product in insertion order.
    #[must_use]
    pub fn photos_of(&self, product_id: ProductId) -> Vec<&ProductPhoto> {
        self.photos
            .iter()
            .filter(|p| p.product_id == product_id)
            .collect()
    }

    /// Photo paths of the product with `sku`, in insertion order.
    #[must_use]
    pub fn photo_paths(&self, sku: &str) -> Vec<&str> {
        self.product(sku)
            .map(|product| {
                self.photos_of(product.id)
                    .into_iter()
                    .map(|p| p.photo.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Shared committed state; hands out one store per unit of work.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    committed: Arc<Mutex<CatalogState>>,
}

impl MemoryCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a unit of work over a copy of the committed state.
    #[must_use]
    pub fn begin(&self) -> MemoryCatalogStore {
        MemoryCatalogStore {
            committed: Arc::clone(&self.committed),
            working: self.snapshot(),
            fail_on_photo: None,
        }
    }

    /// Like [`Self::begin`], but inserting a photo whose path ends with
    /// `suffix` fails with a database error.
    #[must_use]
    pub fn begin_failing_on_photo(&self, suffix: &str) -> MemoryCatalogStore {
        MemoryCatalogStore {
            fail_on_photo: Some(suffix.to_owned()),
            ..self.begin()
        }
    }

    /// Copy of the committed state.
    #[must_use]
    pub fn snapshot(&self) -> CatalogState {
        self.committed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// One unit of work over a [`MemoryCatalog`].
#[derive(Debug)]
pub struct MemoryCatalogStore {
    committed: Arc<Mutex<CatalogState>>,
    working: CatalogState,
    fail_on_photo: Option<String>,
}

impl CatalogStore for MemoryCatalogStore {
    async fn find_category_by_name(
        &mut self,
        name: &str,
    ) -> Result<Option<Category>, RepositoryError> {
        Ok(self.working.category(name).cloned())
    }

    async fn insert_category(&mut self, input: &NewCategory) -> Result<Category, RepositoryError> {
        if self.working.category(&input.name).is_some() {
            return Err(RepositoryError::Conflict(format!(
                "category {} already exists",
                input.name
            )));
        }

        let category = Category {
            id: CategoryId::new(self.working.next_id()),
            name: input.name.clone(),
            is_glass_available: input.is_glass_available,
            is_orientation_choice: input.is_orientation_choice,
            is_material_choice: input.is_material_choice,
            is_platband_choice: input.is_platband_choice,
        };
        self.working.categories.push(category.clone());
        self.working.writes += 1;
        Ok(category)
    }

    async fn find_product_by_sku(&mut self, sku: &Sku) -> Result<Option<Product>, RepositoryError> {
        Ok(self.working.product(sku.as_str()).cloned())
    }

    async fn insert_product(&mut self, input: &NewProduct) -> Result<Product, RepositoryError> {
        if self.working.product(input.sku.as_str()).is_some() {
            return Err(RepositoryError::Conflict(format!(
                "product {} already exists",
                input.sku
            )));
        }

        let now = Utc::now();
        let product = Product {
            id: ProductId::new(self.working.next_id()),
            sku: input.sku.clone(),
            name: input.name.clone(),
            price: input.price,
            category_id: input.category_id,
            description: input.description.clone(),
            have_glass: input.have_glass,
            orientation_choice: input.orientation_choice,
            created_at: now,
            updated_at: now,
        };
        self.working.products.push(product.clone());
        self.working.writes += 1;
        Ok(product)
    }

    async fn update_product(
        &mut self,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<Product, RepositoryError> {
        let product = self
            .working
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(RepositoryError::NotFound)?;

        product.name.clone_from(&update.name);
        product.description = update.description.clone();
        product.have_glass = update.have_glass;
        product.orientation_choice = update.orientation_choice;
        product.updated_at = Utc::now();
        let product = product.clone();

        self.working.writes += 1;
        Ok(product)
    }

    async fn list_photos(
        &mut self,
        product_id: ProductId,
    ) -> Result<Vec<ProductPhoto>, RepositoryError> {
        Ok(self
            .working
            .photos_of(product_id)
            .into_iter()
            .cloned()
            .collect())
    }

    async fn insert_photo(
        &mut self,
        input: &NewProductPhoto,
    ) -> Result<ProductPhoto, RepositoryError> {
        if self
            .fail_on_photo
            .as_deref()
            .is_some_and(|suffix| input.photo.ends_with(suffix))
        {
            return Err(RepositoryError::Database(sqlx::Error::Protocol(format!(
                "simulated failure inserting {}",
                input.photo
            ))));
        }

        let duplicate = self
            .working
            .photos
            .iter()
            .any(|p| p.product_id == input.product_id && p.photo == input.photo);
        if duplicate {
            return Err(RepositoryError::Conflict(format!(
                "photo {} already exists",
                input.photo
            )));
        }

        let photo = ProductPhoto {
            id: ProductPhotoId::new(self.working.next_id()),
            product_id: input.product_id,
            photo: input.photo.clone(),
            is_main: input.is_main,
            orientation: None,
            color_id: None,
            size_id: None,
        };
        self.working.photos.push(photo.clone());
        self.working.writes += 1;
        Ok(photo)
    }

    async fn commit(self) -> Result<(), RepositoryError> {
        *self
            .committed
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = self.working;
        Ok(())
    }

    async fn rollback(self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

// =============================================================================
// Catalog folder fixture
// =============================================================================

const WORDML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Write a minimal `.docx` with one body paragraph per line.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be written.
pub fn write_docx(path: &Path, lines: &[&str]) -> std::io::Result<()> {
    let body: String = lines
        .iter()
        .map(|line| {
            format!(
                "<w:p><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>",
                escape_xml(line)
            )
        })
        .collect();
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{WORDML_NS}"><w:body>{body}</w:body></w:document>"#
    );

    let mut zip = ZipWriter::new(File::create(path)?);
    zip.start_file("word/document.xml", SimpleFileOptions::default())?;
    zip.write_all(xml.as_bytes())?;
    zip.finish()?;
    Ok(())
}

/// A temporary catalog root.
#[derive(Debug)]
pub struct CatalogFixture {
    dir: TempDir,
}

impl CatalogFixture {
    /// Create an empty catalog root.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the temporary directory cannot be created.
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Create a product folder at `relative` (e.g. `door/Classic/A1`) with
    /// the given photos and, when `lines` is set, a description document.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if a file cannot be written.
    pub fn product(
        &self,
        relative: &str,
        photos: &[&str],
        lines: Option<&[&str]>,
    ) -> std::io::Result<PathBuf> {
        let dir = self.root().join(relative);
        fs::create_dir_all(&dir)?;
        for photo in photos {
            fs::write(dir.join(photo), b"image")?;
        }
        if let Some(lines) = lines {
            write_docx(&dir.join(DESCRIPTION_FILE), lines)?;
        }
        Ok(dir)
    }

    /// Drop another photo into an existing product folder.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be written.
    pub fn add_photo(&self, relative: &str, photo: &str) -> std::io::Result<()> {
        fs::write(self.root().join(relative).join(photo), b"image")
    }

    /// Remove a photo from a product folder.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be removed.
    pub fn remove_photo(&self, relative: &str, photo: &str) -> std::io::Result<()> {
        fs::remove_file(self.root().join(relative).join(photo))
    }
}

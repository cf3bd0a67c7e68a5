//! Catalog import orchestration.
//!
//! ## Directory layout
//!
//! ```text
//! catalog_root/
//! ├── door/                    classed layout
//! │   └── <class>/<product>/   *.webp|*.png|*.jpg|*.jpeg, description.docx
//! └── mouldings/               flat layout (or classed)
//!     └── <product>/
//! ```
//!
//! A run ensures every configured category exists, walks its folders in
//! sorted order and synchronizes each product folder that holds at least one
//! photo. The whole run shares one store; it is committed once at the end
//! (or rolled back for a dry run). Any error aborts the run before commit.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument, warn};
use walkdir::WalkDir;

use relikt_core::{Price, ProductDescription, Sku, SkuError};

use crate::document::{DESCRIPTION_FILE, DocumentReader, extract_lines};
use crate::inference::{FieldMapping, InferenceMode, infer};
use crate::models::{Category, NewCategory};
use crate::photos::discover_photos;
use crate::store::{CatalogStore, RepositoryError};
use crate::sync::{ProductSource, SyncOutcome, sync_product};

/// Default web prefix mirroring the on-disk catalog root.
pub const DEFAULT_WEB_PREFIX: &str = "/static/catalog";

/// Errors that abort an import run.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("failed to walk catalog: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("cannot derive sku for {}: {source}", path.display())]
    Sku { path: PathBuf, source: SkuError },
}

/// How product folders are nested below a category folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogLayout {
    /// `<category>/<class>/<product>/`
    Classed,
    /// `<category>/<product>/`
    Flat,
}

impl FromStr for CatalogLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "classed" => Ok(Self::Classed),
            "flat" => Ok(Self::Flat),
            other => Err(format!("unknown catalog layout: {other}")),
        }
    }
}

impl fmt::Display for CatalogLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Classed => "classed",
            Self::Flat => "flat",
        })
    }
}

/// Static description of one importable category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySpec {
    /// Folder name below the catalog root (also the web path segment).
    pub dir_name: String,
    /// Category row name.
    pub name: String,
    pub sku_prefix: String,
    /// Price for newly created products.
    pub default_price: Price,
    pub layout: CatalogLayout,
    pub is_glass_available: bool,
    pub is_orientation_choice: bool,
    pub is_material_choice: bool,
    pub is_platband_choice: bool,
}

impl CategorySpec {
    /// Doors: classed layout, glass and side choice.
    #[must_use]
    pub fn doors() -> Self {
        Self {
            dir_name: "door".to_owned(),
            name: "Двері".to_owned(),
            sku_prefix: "DOOR".to_owned(),
            default_price: Price::from_minor(50_000),
            layout: CatalogLayout::Classed,
            is_glass_available: true,
            is_orientation_choice: true,
            is_material_choice: false,
            is_platband_choice: false,
        }
    }

    /// Mouldings: no glass, no side choice.
    #[must_use]
    pub fn mouldings(layout: CatalogLayout) -> Self {
        Self {
            dir_name: "mouldings".to_owned(),
            name: "Лиштви".to_owned(),
            sku_prefix: "MOULDING".to_owned(),
            default_price: Price::from_minor(5_000),
            layout,
            is_glass_available: false,
            is_orientation_choice: false,
            is_material_choice: false,
            is_platband_choice: false,
        }
    }

    fn new_category(&self) -> NewCategory {
        NewCategory {
            name: self.name.clone(),
            is_glass_available: self.is_glass_available,
            is_orientation_choice: self.is_orientation_choice,
            is_material_choice: self.is_material_choice,
            is_platband_choice: self.is_platband_choice,
        }
    }
}

/// Import run settings.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub catalog_root: PathBuf,
    pub web_prefix: String,
    pub categories: Vec<CategorySpec>,
    pub mapping: FieldMapping,
    /// Roll back instead of committing.
    pub dry_run: bool,
}

impl ImportOptions {
    /// Doors and mouldings under `catalog_root` with the default mapping.
    #[must_use]
    pub fn new(catalog_root: impl Into<PathBuf>) -> Self {
        Self {
            catalog_root: catalog_root.into(),
            web_prefix: DEFAULT_WEB_PREFIX.to_owned(),
            categories: vec![
                CategorySpec::doors(),
                CategorySpec::mouldings(CatalogLayout::Flat),
            ],
            mapping: FieldMapping::default(),
            dry_run: false,
        }
    }
}

/// Counts for one category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryReport {
    pub category: String,
    /// Product folders synchronized.
    pub processed: usize,
    pub created: usize,
    pub updated: usize,
    /// Product folders without photos.
    pub skipped: usize,
    pub photos_added: usize,
}

impl CategoryReport {
    fn record(&mut self, outcome: &SyncOutcome) {
        self.processed += 1;
        if outcome.created {
            self.created += 1;
        } else {
            self.updated += 1;
        }
        self.photos_added += outcome.photos_added;
    }
}

/// Counts for a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub categories: Vec<CategoryReport>,
    /// False for dry runs.
    pub committed: bool,
}

impl ImportReport {
    #[must_use]
    pub fn processed(&self) -> usize {
        self.categories.iter().map(|c| c.processed).sum()
    }

    #[must_use]
    pub fn created(&self) -> usize {
        self.categories.iter().map(|c| c.created).sum()
    }

    #[must_use]
    pub fn skipped(&self) -> usize {
        self.categories.iter().map(|c| c.skipped).sum()
    }

    #[must_use]
    pub fn photos_added(&self) -> usize {
        self.categories.iter().map(|c| c.photos_added).sum()
    }
}

/// What the importer would write for one product folder.
#[derive(Debug, Clone, Serialize)]
pub struct ProductPreview {
    pub photos: Vec<String>,
    pub lines_read: usize,
    pub mode: InferenceMode,
    pub description: ProductDescription,
    pub has_glass: bool,
    pub has_orientation: bool,
}

/// Inspect one product folder without touching the database.
///
/// # Errors
///
/// Returns `ImportError::Walk` if the folder cannot be read.
pub fn preview_product(
    dir: &Path,
    reader: &dyn DocumentReader,
    mapping: &FieldMapping,
) -> Result<ProductPreview, ImportError> {
    let photos = discover_photos(dir)?;
    let lines = extract_lines(reader, &dir.join(DESCRIPTION_FILE));
    let fields = infer(&lines, mapping);

    Ok(ProductPreview {
        photos: photos.into_iter().map(|p| p.file_name).collect(),
        lines_read: lines.len(),
        mode: fields.mode,
        description: fields.to_description(),
        has_glass: fields.has_glass,
        has_orientation: fields.has_orientation,
    })
}

/// Subdirectories of `dir`, sorted by name.
fn sorted_subdirs(dir: &Path) -> Result<Vec<(String, PathBuf)>, walkdir::Error> {
    let mut dirs = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            // Dangling symlinks and the like; only the folder itself is fatal.
            Err(e) if e.depth() > 0 => {
                warn!(path = ?e.path(), error = %e, "Skipping unreadable folder entry");
                continue;
            }
            Err(e) => return Err(e),
        };
        if !entry.file_type().is_dir() {
            continue;
        }
        match entry.file_name().to_str() {
            Some(name) => dirs.push((name.to_owned(), entry.path().to_path_buf())),
            None => warn!(path = %entry.path().display(), "Skipping folder with non UTF-8 name"),
        }
    }
    Ok(dirs)
}

/// One product folder located by the walk.
struct ProductFolder<'a> {
    class: Option<&'a str>,
    name: &'a str,
    path: &'a Path,
}

/// Runs imports with a fixed reader and options.
pub struct Importer {
    options: ImportOptions,
    reader: Box<dyn DocumentReader>,
}

impl Importer {
    #[must_use]
    pub fn new(options: ImportOptions, reader: Box<dyn DocumentReader>) -> Self {
        Self { options, reader }
    }

    /// Run a full import through `store`, then commit (or roll back for a
    /// dry run).
    ///
    /// # Errors
    ///
    /// Returns an `ImportError` on the first database or traversal failure.
    /// Nothing is committed in that case.
    #[instrument(
        skip_all,
        fields(
            root = %self.options.catalog_root.display(),
            mapping = %self.options.mapping.name,
            reader = self.reader.name(),
            dry_run = self.options.dry_run,
        )
    )]
    pub async fn run<S: CatalogStore>(&self, mut store: S) -> Result<ImportReport, ImportError> {
        info!("Starting catalog import");

        let mut categories = Vec::with_capacity(self.options.categories.len());
        for spec in &self.options.categories {
            categories.push(ensure_category(&mut store, spec).await?);
        }

        let mut report = ImportReport::default();
        for (spec, category) in self.options.categories.iter().zip(&categories) {
            report
                .categories
                .push(self.import_category(&mut store, spec, category).await?);
        }

        if self.options.dry_run {
            store.rollback().await?;
            info!("Dry run complete, changes rolled back");
        } else {
            store.commit().await?;
            report.committed = true;
        }

        info!(
            processed = report.processed(),
            created = report.created(),
            skipped = report.skipped(),
            photos_added = report.photos_added(),
            committed = report.committed,
            "Catalog import finished"
        );

        Ok(report)
    }

    async fn import_category<S: CatalogStore>(
        &self,
        store: &mut S,
        spec: &CategorySpec,
        category: &Category,
    ) -> Result<CategoryReport, ImportError> {
        let mut report = CategoryReport {
            category: spec.name.clone(),
            ..CategoryReport::default()
        };

        let root = self.options.catalog_root.join(&spec.dir_name);
        if !root.is_dir() {
            warn!(path = %root.display(), category = %spec.name, "Category folder not found");
            return Ok(report);
        }

        info!(
            category = %spec.name,
            layout = %spec.layout,
            default_price = %spec.default_price,
            "Importing category"
        );

        match spec.layout {
            CatalogLayout::Classed => {
                for (class, class_path) in sorted_subdirs(&root)? {
                    info!(class = %class, "Processing class");
                    for (name, path) in sorted_subdirs(&class_path)? {
                        let folder = ProductFolder {
                            class: Some(class.as_str()),
                            name: &name,
                            path: &path,
                        };
                        self.import_product(store, spec, category, &folder, &mut report)
                            .await?;
                    }
                }
            }
            CatalogLayout::Flat => {
                for (name, path) in sorted_subdirs(&root)? {
                    let folder = ProductFolder {
                        class: None,
                        name: &name,
                        path: &path,
                    };
                    self.import_product(store, spec, category, &folder, &mut report)
                        .await?;
                }
            }
        }

        Ok(report)
    }

    async fn import_product<S: CatalogStore>(
        &self,
        store: &mut S,
        spec: &CategorySpec,
        category: &Category,
        folder: &ProductFolder<'_>,
        report: &mut CategoryReport,
    ) -> Result<(), ImportError> {
        let photos = discover_photos(folder.path)?;
        if photos.is_empty() {
            info!(path = %folder.path.display(), "No photos found, skipping");
            report.skipped += 1;
            return Ok(());
        }

        let lines = extract_lines(self.reader.as_ref(), &folder.path.join(DESCRIPTION_FILE));
        let fields = infer(&lines, &self.options.mapping);

        let mut segments = vec![spec.sku_prefix.as_str()];
        segments.extend(folder.class);
        segments.push(folder.name);
        let sku = Sku::derive(&segments).map_err(|source| ImportError::Sku {
            path: folder.path.to_path_buf(),
            source,
        })?;

        let name = folder
            .class
            .map_or_else(|| folder.name.to_owned(), |class| format!("{class} {}", folder.name));

        let mut web_segments = vec![spec.dir_name.as_str()];
        web_segments.extend(folder.class);
        web_segments.push(folder.name);
        let web_dir = format!(
            "{}/{}",
            self.options.web_prefix.trim_end_matches('/'),
            web_segments.join("/")
        );

        let outcome = sync_product(
            store,
            category,
            ProductSource {
                sku: &sku,
                name: &name,
                price: spec.default_price,
                fields: &fields,
                photos: &photos,
                web_dir: &web_dir,
            },
        )
        .await?;

        info!(
            sku = %sku,
            created = outcome.created,
            photos_added = outcome.photos_added,
            photos_total = outcome.photos_total,
            details = fields.details.len(),
            "Product synchronized"
        );

        report.record(&outcome);
        Ok(())
    }
}

/// Find a category by name or create it from the spec.
///
/// Existing categories are returned untouched.
async fn ensure_category<S: CatalogStore>(
    store: &mut S,
    spec: &CategorySpec,
) -> Result<Category, RepositoryError> {
    if let Some(category) = store.find_category_by_name(&spec.name).await? {
        info!(category = %category.name, id = %category.id, "Found category");
        return Ok(category);
    }

    let category = store.insert_category(&spec.new_category()).await?;
    info!(category = %category.name, id = %category.id, "Created category");
    Ok(category)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_from_str() {
        assert_eq!("flat".parse(), Ok(CatalogLayout::Flat));
        assert_eq!("Classed".parse(), Ok(CatalogLayout::Classed));
        assert!("nested".parse::<CatalogLayout>().is_err());
    }

    #[test]
    fn test_default_options() {
        let options = ImportOptions::new("static/catalog");
        let dirs: Vec<&str> = options
            .categories
            .iter()
            .map(|c| c.dir_name.as_str())
            .collect();

        assert_eq!(dirs, vec!["door", "mouldings"]);
        assert_eq!(options.web_prefix, DEFAULT_WEB_PREFIX);
        assert!(!options.dry_run);
    }

    #[test]
    fn test_mouldings_have_no_capabilities() {
        let spec = CategorySpec::mouldings(CatalogLayout::Flat);
        assert!(!spec.is_glass_available);
        assert!(!spec.is_orientation_choice);
        assert_eq!(spec.default_price, Price::from_minor(5_000));
    }

    #[test]
    fn test_report_totals() {
        let report = ImportReport {
            categories: vec![
                CategoryReport {
                    processed: 2,
                    created: 1,
                    photos_added: 3,
                    ..CategoryReport::default()
                },
                CategoryReport {
                    processed: 1,
                    skipped: 4,
                    ..CategoryReport::default()
                },
            ],
            committed: true,
        };

        assert_eq!(report.processed(), 3);
        assert_eq!(report.created(), 1);
        assert_eq!(report.skipped(), 4);
        assert_eq!(report.photos_added(), 3);
    }
}

//! Catalog import command.
//!
//! # Usage
//!
//! ```bash
//! # Import doors and mouldings from static/catalog
//! relikt-cli import
//!
//! # Preview an import without committing
//! relikt-cli import --dry-run
//!
//! # Nested mouldings and a custom mapping profile
//! relikt-cli import --mouldings-layout classed --mapping config/doors-2025.yaml
//! ```

use relikt_catalog::store::create_pool;
use relikt_catalog::{
    CategorySpec, FieldMapping, ImportOptions, ImportReport, Importer, PgCatalogStore,
};

use super::CommandError;
use crate::config::CliConfig;

/// Run a full catalog import in one transaction.
///
/// # Errors
///
/// Returns an error if configuration is incomplete, the mapping profile cannot
/// be loaded or the import fails. A failed import commits nothing.
pub async fn run(config: &CliConfig, dry_run: bool) -> Result<ImportReport, CommandError> {
    let database_url = config.require_database_url()?;
    let mapping = FieldMapping::resolve(&config.mapping)?;
    tracing::info!(profile = %mapping.name, version = mapping.version, "Loaded field mapping");

    let options = ImportOptions {
        catalog_root: config.catalog_root.clone(),
        web_prefix: config.web_prefix.clone(),
        categories: vec![
            CategorySpec::doors(),
            CategorySpec::mouldings(config.mouldings_layout),
        ],
        mapping,
        dry_run,
    };
    let importer = Importer::new(options, config.document_reader.into_reader());

    let pool = create_pool(database_url).await?;
    tracing::info!("Database pool created");

    let store = PgCatalogStore::begin(&pool).await?;
    let result = importer.run(store).await;
    pool.close().await;
    let report = result?;

    for category in &report.categories {
        tracing::info!(
            category = %category.category,
            processed = category.processed,
            created = category.created,
            updated = category.updated,
            skipped = category.skipped,
            photos_added = category.photos_added,
            "Category summary"
        );
    }

    Ok(report)
}

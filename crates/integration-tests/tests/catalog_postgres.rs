//! Catalog import against a real `PostgreSQL` database.
//!
//! These tests are ignored by default. Run them with:
//!
//! ```bash
//! CATALOG_DATABASE_URL=postgres://localhost/relikt_test \
//!     cargo test -p relikt-integration-tests --test catalog_postgres -- --ignored
//! ```
//!
//! Every test uses its own class folder or category name, so runs do not
//! interfere with each other or with earlier runs.

#![allow(clippy::unwrap_used)]

use chrono::Utc;
use secrecy::SecretString;
use sqlx::PgPool;

use relikt_catalog::models::{NewCategory, NewProduct, ProductUpdate};
use relikt_catalog::store::{create_pool, run_migrations};
use relikt_catalog::{
    CatalogStore, DocumentReaderKind, ImportOptions, Importer, PgCatalogStore, RepositoryError,
};
use relikt_core::{DetailEntry, Price, ProductDescription, ProductId, Sku};
use relikt_integration_tests::CatalogFixture;

/// Connect and migrate, or `None` when no database is configured.
async fn test_pool() -> Option<PgPool> {
    let url = std::env::var("CATALOG_DATABASE_URL").ok()?;
    let pool = create_pool(&SecretString::from(url)).await.unwrap();
    run_migrations(&pool).await.unwrap();
    Some(pool)
}

fn unique(prefix: &str) -> String {
    format!("{prefix}{}", Utc::now().timestamp_micros())
}

// =============================================================================
// Import
// =============================================================================

#[tokio::test]
#[ignore = "Requires running PostgreSQL database"]
async fn test_postgres_import_is_idempotent() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let class = unique("Pg");
    let fixture = CatalogFixture::new().unwrap();
    fixture
        .product(
            &format!("door/{class}/A1"),
            &["2.webp", "1.webp"],
            Some(&["ART-1", "Model-X", "Дуб", "Двері", "800x2000", "праве"]),
        )
        .unwrap();
    let importer = Importer::new(
        ImportOptions::new(fixture.root()),
        DocumentReaderKind::Docx.into_reader(),
    );
    let sku = Sku::derive(&["DOOR", &class, "A1"]).unwrap();

    let first = importer
        .run(PgCatalogStore::begin(&pool).await.unwrap())
        .await
        .unwrap();
    assert_eq!(first.created(), 1);
    assert_eq!(first.photos_added(), 2);

    let mut store = PgCatalogStore::begin(&pool).await.unwrap();
    let before = store.find_product_by_sku(&sku).await.unwrap().unwrap();
    let photos_before = store.list_photos(before.id).await.unwrap();
    drop(store);

    let second = importer
        .run(PgCatalogStore::begin(&pool).await.unwrap())
        .await
        .unwrap();
    assert_eq!(second.created(), 0);
    assert_eq!(second.photos_added(), 0);

    let mut store = PgCatalogStore::begin(&pool).await.unwrap();
    let after = store.find_product_by_sku(&sku).await.unwrap().unwrap();
    let photos_after = store.list_photos(after.id).await.unwrap();

    assert_eq!(after.id, before.id);
    assert_eq!(after.description, before.description);
    assert_eq!(after.price, Price::from_minor(50_000));
    assert!(after.orientation_choice);
    assert_eq!(photos_after, photos_before);
    assert_eq!(
        photos_after.iter().map(|p| p.is_main).collect::<Vec<_>>(),
        vec![true, false]
    );
    assert!(photos_after[0].photo.ends_with("/A1/1.webp"));
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL database"]
async fn test_postgres_dry_run_commits_nothing() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let class = unique("Dry");
    let fixture = CatalogFixture::new().unwrap();
    fixture
        .product(&format!("door/{class}/A1"), &["1.webp"], None)
        .unwrap();
    let importer = Importer::new(
        ImportOptions {
            dry_run: true,
            ..ImportOptions::new(fixture.root())
        },
        DocumentReaderKind::Docx.into_reader(),
    );

    let report = importer
        .run(PgCatalogStore::begin(&pool).await.unwrap())
        .await
        .unwrap();
    assert!(!report.committed);

    let sku = Sku::derive(&["DOOR", &class, "A1"]).unwrap();
    let mut store = PgCatalogStore::begin(&pool).await.unwrap();
    assert!(store.find_product_by_sku(&sku).await.unwrap().is_none());
}

// =============================================================================
// Store
// =============================================================================

#[tokio::test]
#[ignore = "Requires running PostgreSQL database"]
async fn test_postgres_store_rows_and_errors() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let mut store = PgCatalogStore::begin(&pool).await.unwrap();
    let category = store
        .insert_category(&NewCategory {
            name: unique("Category "),
            is_glass_available: true,
            is_orientation_choice: false,
            is_material_choice: false,
            is_platband_choice: false,
        })
        .await
        .unwrap();

    let description = ProductDescription::new(
        "A • B".to_owned(),
        vec![
            DetailEntry::labeled("Article", "A"),
            DetailEntry::unlabeled("free text"),
        ],
        Some("Дуб".to_owned()),
    );
    let input = NewProduct {
        sku: Sku::derive(&["TEST", &unique("S")]).unwrap(),
        name: "Store test".to_owned(),
        price: Price::from_minor(12_345),
        category_id: category.id,
        description: description.clone(),
        have_glass: true,
        orientation_choice: false,
    };
    let product = store.insert_product(&input).await.unwrap();

    let found = store.find_product_by_sku(&input.sku).await.unwrap().unwrap();
    assert_eq!(found, product);
    assert_eq!(found.description, description);
    assert_eq!(found.price, Price::from_minor(12_345));

    let updated = store
        .update_product(
            product.id,
            &ProductUpdate {
                name: "Renamed".to_owned(),
                description: ProductDescription::new("x".to_owned(), Vec::new(), None),
                have_glass: false,
                orientation_choice: false,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Renamed");
    assert_eq!(updated.description.covering(), None);
    assert_eq!(updated.price, product.price);

    let missing = store
        .update_product(
            ProductId::new(i32::MAX),
            &ProductUpdate {
                name: "nobody".to_owned(),
                description: description.clone(),
                have_glass: false,
                orientation_choice: false,
            },
        )
        .await;
    assert!(matches!(missing, Err(RepositoryError::NotFound)));

    // A unique violation aborts the transaction, so it is checked last.
    let duplicate = store.insert_product(&input).await;
    assert!(matches!(duplicate, Err(RepositoryError::Conflict(_))));

    // Dropping the store rolls everything back.
    drop(store);
    let mut store = PgCatalogStore::begin(&pool).await.unwrap();
    assert!(store.find_product_by_sku(&input.sku).await.unwrap().is_none());
    assert!(
        store
            .find_category_by_name(&category.name)
            .await
            .unwrap()
            .is_none()
    );
}

//! Relikt CLI - Catalog migrations and import.
//!
//! # Usage
//!
//! ```bash
//! # Create or upgrade the catalog tables
//! relikt-cli migrate
//!
//! # Import doors and mouldings from the catalog folder
//! relikt-cli import --catalog-root static/catalog
//!
//! # Show what would be stored for one product folder
//! relikt-cli inspect static/catalog/door/Classic/A1
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run catalog database migrations
//! - `import` - Synchronize the catalog folder into the database
//! - `inspect` - Preview one product folder (no database)
//!
//! Settings come from the environment (see [`config`]); flags override them.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use relikt_catalog::{CatalogLayout, DocumentReaderKind};

mod commands;
mod config;

use config::{CliConfig, LogFormat};

#[derive(Parser)]
#[command(name = "relikt-cli")]
#[command(author, version, about = "Relikt catalog tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run catalog database migrations
    Migrate,
    /// Import the catalog folder into the database
    Import {
        /// Catalog folder containing `door/` and `mouldings/`
        #[arg(long)]
        catalog_root: Option<PathBuf>,

        /// Web path prefix stored for photos
        #[arg(long)]
        web_prefix: Option<String>,

        /// Field mapping profile (`positional-v2`, `coarse-v3`) or YAML path
        #[arg(long)]
        mapping: Option<String>,

        /// Mouldings folder layout (`flat`, `classed`)
        #[arg(long)]
        mouldings_layout: Option<CatalogLayout>,

        /// Skip description documents; every product gets the placeholder
        #[arg(long)]
        no_documents: bool,

        /// Run the import and roll it back
        #[arg(long)]
        dry_run: bool,
    },
    /// Preview what the importer would store for one product folder
    Inspect {
        /// Product folder
        dir: PathBuf,

        /// Field mapping profile (`positional-v2`, `coarse-v3`) or YAML path
        #[arg(long)]
        mapping: Option<String>,

        /// Skip the description document
        #[arg(long)]
        no_documents: bool,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &CliConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Errors become Sentry events; progress logs ride along as breadcrumbs.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing(format: LogFormat) {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "relikt_cli=info,relikt_catalog=info".into());

    let is_json = format == LogFormat::Json;
    let json_layer = is_json.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!is_json).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match CliConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt::init();
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);
    init_tracing(config.log_format);

    let result = tokio::select! {
        result = run(cli, config) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted, nothing was committed");
            Err("interrupted".into())
        }
    };

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, mut config: CliConfig) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run(&config).await?,
        Commands::Import {
            catalog_root,
            web_prefix,
            mapping,
            mouldings_layout,
            no_documents,
            dry_run,
        } => {
            if let Some(root) = catalog_root {
                config.catalog_root = root;
            }
            if let Some(prefix) = web_prefix {
                config.web_prefix = prefix;
            }
            if let Some(mapping) = mapping {
                config.mapping = mapping;
            }
            if let Some(layout) = mouldings_layout {
                config.mouldings_layout = layout;
            }
            if no_documents {
                config.document_reader = DocumentReaderKind::Disabled;
            }

            let report = commands::import::run(&config, dry_run).await?;
            tracing::info!(
                processed = report.processed(),
                created = report.created(),
                skipped = report.skipped(),
                photos_added = report.photos_added(),
                committed = report.committed,
                "Import complete"
            );
        }
        Commands::Inspect {
            dir,
            mapping,
            no_documents,
        } => {
            let mapping = mapping.unwrap_or_else(|| config.mapping.clone());
            let reader = if no_documents {
                DocumentReaderKind::Disabled
            } else {
                config.document_reader
            };
            commands::inspect::run(&dir, &mapping, reader)?;
        }
    }
    Ok(())
}

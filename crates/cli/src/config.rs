//! CLI configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required (for `migrate` and `import`)
//! - `CATALOG_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `CATALOG_ROOT` - Catalog folder (default: `static/catalog`)
//! - `CATALOG_WEB_PREFIX` - Web path prefix for photos (default: `/static/catalog`)
//! - `CATALOG_MAPPING` - Field mapping profile name or YAML path (default: `positional-v2`)
//! - `CATALOG_MOULDINGS_LAYOUT` - `flat` or `classed` (default: `flat`)
//! - `CATALOG_DOCUMENT_READER` - `docx` or `disabled` (default: `docx`)
//! - `LOG_FORMAT` - `text` or `json` (default: `text`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//!
//! Command-line flags override these values.

use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;

use relikt_catalog::import::DEFAULT_WEB_PREFIX;
use relikt_catalog::{CatalogLayout, DocumentReaderKind, FieldMapping};

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// CLI configuration.
#[derive(Clone)]
pub struct CliConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: Option<SecretString>,
    pub catalog_root: PathBuf,
    pub web_prefix: String,
    /// Mapping profile name or path, resolved when an import starts
    pub mapping: String,
    pub mouldings_layout: CatalogLayout,
    pub document_reader: DocumentReaderKind,
    pub log_format: LogFormat,
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
}

impl std::fmt::Debug for CliConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CliConfig")
            .field("database_url", &self.database_url.as_ref().map(|_| "[REDACTED]"))
            .field("catalog_root", &self.catalog_root)
            .field("web_prefix", &self.web_prefix)
            .field("mapping", &self.mapping)
            .field("mouldings_layout", &self.mouldings_layout)
            .field("document_reader", &self.document_reader)
            .field("log_format", &self.log_format)
            .field("sentry_dsn", &self.sentry_dsn)
            .field("sentry_environment", &self.sentry_environment)
            .finish()
    }
}

impl CliConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("CATALOG_DATABASE_URL")
            .or_else(|| lookup("DATABASE_URL"))
            .map(SecretString::from);

        let mouldings_layout = lookup("CATALOG_MOULDINGS_LAYOUT")
            .map(|v| {
                v.parse::<CatalogLayout>().map_err(|e| {
                    ConfigError::InvalidEnvVar("CATALOG_MOULDINGS_LAYOUT".to_owned(), e)
                })
            })
            .transpose()?
            .unwrap_or(CatalogLayout::Flat);

        let document_reader = lookup("CATALOG_DOCUMENT_READER")
            .map(|v| {
                v.parse::<DocumentReaderKind>().map_err(|e| {
                    ConfigError::InvalidEnvVar("CATALOG_DOCUMENT_READER".to_owned(), e)
                })
            })
            .transpose()?
            .unwrap_or_default();

        let log_format = match lookup("LOG_FORMAT").as_deref() {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::InvalidEnvVar(
                    "LOG_FORMAT".to_owned(),
                    format!("expected text or json, got {other}"),
                ));
            }
        };

        Ok(Self {
            database_url,
            catalog_root: lookup("CATALOG_ROOT")
                .map_or_else(|| PathBuf::from("static/catalog"), PathBuf::from),
            web_prefix: lookup("CATALOG_WEB_PREFIX")
                .unwrap_or_else(|| DEFAULT_WEB_PREFIX.to_owned()),
            mapping: lookup("CATALOG_MAPPING")
                .unwrap_or_else(|| FieldMapping::POSITIONAL_V2.to_owned()),
            mouldings_layout,
            document_reader,
            log_format,
            sentry_dsn: lookup("SENTRY_DSN").filter(|v| !v.is_empty()),
            sentry_environment: lookup("SENTRY_ENVIRONMENT"),
        })
    }

    /// The database URL, or an error naming the missing variable.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if no database URL is configured.
    pub fn require_database_url(&self) -> Result<&SecretString, ConfigError> {
        self.database_url
            .as_ref()
            .ok_or_else(|| ConfigError::MissingEnvVar("CATALOG_DATABASE_URL".to_owned()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<CliConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        CliConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();

        assert!(config.database_url.is_none());
        assert_eq!(config.catalog_root, PathBuf::from("static/catalog"));
        assert_eq!(config.web_prefix, "/static/catalog");
        assert_eq!(config.mapping, "positional-v2");
        assert_eq!(config.mouldings_layout, CatalogLayout::Flat);
        assert_eq!(config.document_reader, DocumentReaderKind::Docx);
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn test_database_url_fallback() {
        let config = config(&[("DATABASE_URL", "postgres://fallback")]).unwrap();
        assert_eq!(
            config.require_database_url().unwrap().expose_secret(),
            "postgres://fallback"
        );

        let config = config_with_both();
        assert_eq!(
            config.require_database_url().unwrap().expose_secret(),
            "postgres://primary"
        );
    }

    fn config_with_both() -> CliConfig {
        config(&[
            ("CATALOG_DATABASE_URL", "postgres://primary"),
            ("DATABASE_URL", "postgres://fallback"),
        ])
        .unwrap()
    }

    #[test]
    fn test_missing_database_url() {
        let config = config(&[]).unwrap();
        assert!(matches!(
            config.require_database_url(),
            Err(ConfigError::MissingEnvVar(_))
        ));
    }

    #[test]
    fn test_invalid_layout() {
        let err = config(&[("CATALOG_MOULDINGS_LAYOUT", "nested")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "CATALOG_MOULDINGS_LAYOUT"));
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("CATALOG_ROOT", "/srv/catalog"),
            ("CATALOG_MOULDINGS_LAYOUT", "classed"),
            ("CATALOG_DOCUMENT_READER", "disabled"),
            ("LOG_FORMAT", "json"),
        ])
        .unwrap();

        assert_eq!(config.catalog_root, PathBuf::from("/srv/catalog"));
        assert_eq!(config.mouldings_layout, CatalogLayout::Classed);
        assert_eq!(config.document_reader, DocumentReaderKind::Disabled);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_debug_redacts_database_url() {
        let debug = format!("{:?}", config_with_both());
        assert!(!debug.contains("primary"));
        assert!(debug.contains("[REDACTED]"));
    }
}

//! Relikt Core - Shared catalog types.
//!
//! This crate provides the types shared by the catalog importer and the CLI:
//! - `catalog` - Directory-tree importer (documents, photos, database sync)
//! - `cli` - Command-line tools for migrations and imports
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access. The
//! optional `postgres` feature adds `sqlx` encode/decode support for IDs.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, prices, SKUs and the product description document

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;

//! Core types for Relikt.
//!
//! This module provides type-safe wrappers for catalog domain concepts.

pub mod description;
pub mod id;
pub mod price;
pub mod sku;

pub use description::{DetailEntry, Finishing, FinishingText, ProductDescription};
pub use id::*;
pub use price::Price;
pub use sku::{Sku, SkuError};

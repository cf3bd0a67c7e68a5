//! Catalog price stored as an integer amount of minor currency units.
//!
//! Prices are persisted as `INTEGER` kopiykas so the database never sees
//! floating point. The catalog is priced in hryvnia only.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price in kopiykas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(i32);

impl Price {
    /// ISO 4217 code of the catalog currency.
    pub const CURRENCY: &'static str = "UAH";

    /// Create a price from minor units.
    #[must_use]
    pub const fn from_minor(minor_units: i32) -> Self {
        Self(minor_units)
    }

    /// Amount in minor units, as stored in the database.
    #[must_use]
    pub const fn minor_units(&self) -> i32 {
        self.0
    }

    /// Amount in hryvnia (two decimal places).
    #[must_use]
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(i64::from(self.0), 2)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {}", self.to_decimal(), Self::CURRENCY)
    }
}

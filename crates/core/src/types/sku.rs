//! Stock-keeping unit identifier.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when building a [`Sku`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SkuError {
    /// The input string is empty.
    #[error("sku cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("sku must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains whitespace.
    #[error("sku cannot contain whitespace")]
    Whitespace,
    /// One of the segments used to derive the SKU is blank.
    #[error("sku segment {index} is blank")]
    BlankSegment {
        /// Zero-based position of the blank segment.
        index: usize,
    },
}

/// A product SKU.
///
/// The SKU is the importer's idempotency key: the same directory always
/// derives the same SKU, so re-running an import updates rows in place
/// instead of inserting duplicates.
///
/// ## Examples
///
/// ```
/// use relikt_core::Sku;
///
/// let sku = Sku::derive(&["door", "Class A", "Modern 01"]).unwrap();
/// assert_eq!(sku.as_str(), "DOOR-CLASS-A-MODERN-01");
///
/// assert!(Sku::parse("").is_err());
/// assert!(Sku::parse("HAS SPACE").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Sku(String);

impl Sku {
    /// Maximum length of a SKU.
    pub const MAX_LENGTH: usize = 255;

    /// Parse an existing SKU string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, longer than 255 characters,
    /// or contains whitespace.
    pub fn parse(s: &str) -> Result<Self, SkuError> {
        if s.is_empty() {
            return Err(SkuError::Empty);
        }

        if s.chars().count() > Self::MAX_LENGTH {
            return Err(SkuError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if s.chars().any(char::is_whitespace) {
            return Err(SkuError::Whitespace);
        }

        Ok(Self(s.to_owned()))
    }

    /// Derive a SKU from path segments.
    ///
    /// Each segment is trimmed, runs of whitespace become a single `-`, and
    /// the segments are joined with `-` and upper-cased.
    ///
    /// # Errors
    ///
    /// Returns [`SkuError::BlankSegment`] if any segment is blank, or any
    /// error from [`Sku::parse`] for the joined result.
    pub fn derive(segments: &[&str]) -> Result<Self, SkuError> {
        let mut parts = Vec::with_capacity(segments.len());
        for (index, segment) in segments.iter().enumerate() {
            let sanitized = segment.split_whitespace().collect::<Vec<_>>().join("-");
            if sanitized.is_empty() {
                return Err(SkuError::BlankSegment { index });
            }
            parts.push(sanitized);
        }

        Self::parse(&parts.join("-").to_uppercase())
    }

    /// Returns the SKU as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Sku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Sku {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_upper_cases_and_joins() {
        let sku = Sku::derive(&["DOOR", "Class A", "Modern 01"]).unwrap();
        assert_eq!(sku.as_str(), "DOOR-CLASS-A-MODERN-01");
    }

    #[test]
    fn test_derive_collapses_whitespace_runs() {
        let sku = Sku::derive(&["MOULDING", "  wide   plank  "]).unwrap();
        assert_eq!(sku.as_str(), "MOULDING-WIDE-PLANK");
    }

    #[test]
    fn test_derive_cyrillic() {
        let sku = Sku::derive(&["DOOR", "Економ", "модель 5"]).unwrap();
        assert_eq!(sku.as_str(), "DOOR-ЕКОНОМ-МОДЕЛЬ-5");
    }

    #[test]
    fn test_derive_is_deterministic() {
        let a = Sku::derive(&["DOOR", "Premium", "Alpha"]).unwrap();
        let b = Sku::derive(&["DOOR", "Premium", "Alpha"]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_derive_blank_segment() {
        assert_eq!(
            Sku::derive(&["DOOR", "   ", "x"]),
            Err(SkuError::BlankSegment { index: 1 })
        );
    }

    #[test]
    fn test_parse_rejects_whitespace() {
        assert_eq!(Sku::parse("A B"), Err(SkuError::Whitespace));
    }

    #[test]
    fn test_parse_too_long() {
        let long = "A".repeat(256);
        assert!(matches!(Sku::parse(&long), Err(SkuError::TooLong { .. })));
    }
}

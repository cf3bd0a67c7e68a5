//! Versioned field-mapping profiles.
//!
//! A profile says which line index carries which label, which line doubles as
//! the covering text, and which keyword tables classify the remaining lines.
//! Catalog generations that wrote their documents differently get different
//! profiles instead of ad hoc parsing code.
//!
//! ## YAML Format
//!
//! Any field may be omitted; omitted fields take the `positional-v2` value.
//! A profile with `positional_labels: []` has no covering index.
//!
//! ```yaml
//! name: doors-2025
//! version: 4
//! positional_labels: [Article, Model, Color, ProductType, Size]
//! covering_index: 2
//! orientation_keywords: [праве, ліве]
//! glass_keywords: [скло, glass]
//! unmatched: generic
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Placeholder used when a product has no readable description.
pub const DESCRIPTION_PLACEHOLDER: &str = "Опис відсутній";

/// Errors loading or validating a [`FieldMapping`].
#[derive(Debug, Error)]
pub enum MappingError {
    #[error("failed to read mapping file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse mapping: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid mapping: {0}")]
    Invalid(String),
}

/// What to do with a trailing line that matches no keyword table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedLine {
    /// Record as `Characteristic N`.
    #[default]
    Generic,
    /// Record as glass and set the glass flag.
    Glass,
}

/// Line-index labels plus keyword classifier tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMapping {
    /// Profile name, e.g. `positional-v2`.
    pub name: String,
    pub version: u32,
    /// Labels for the leading lines, in order. Empty disables positional mode.
    pub positional_labels: Vec<String>,
    /// Index into `positional_labels` whose line is also the covering text.
    pub covering_index: Option<usize>,
    pub orientation_keywords: Vec<String>,
    pub glass_keywords: Vec<String>,
    /// Used to guess the covering line when positional mode does not apply.
    pub covering_keywords: Vec<String>,
    pub orientation_label: String,
    pub glass_label: String,
    /// Prefix for generic entries; the 1-based position is appended.
    pub generic_label: String,
    pub unmatched: UnmatchedLine,
    /// Number of leading lines joined into the summary.
    pub summary_lines: usize,
    pub summary_separator: String,
    /// Summary and single detail value for documents with no lines.
    pub placeholder: String,
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self::positional_v2()
    }
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| (*w).to_owned()).collect()
}

impl FieldMapping {
    /// Name of the built-in positional profile.
    pub const POSITIONAL_V2: &'static str = "positional-v2";
    /// Name of the built-in keyword-only profile.
    pub const COARSE_V3: &'static str = "coarse-v3";

    /// Five fixed leading fields, then keyword-classified extras.
    #[must_use]
    pub fn positional_v2() -> Self {
        Self {
            name: Self::POSITIONAL_V2.to_owned(),
            version: 2,
            positional_labels: words(&["Article", "Model", "Color", "ProductType", "Size"]),
            covering_index: Some(2),
            orientation_keywords: words(&["праве", "ліве", "правий", "лівий", "сторона"]),
            glass_keywords: words(&["скло", "скла", "glass", "скління"]),
            covering_keywords: words(&[
                "пвх",
                "шпон",
                "ламінат",
                "горіх",
                "дуб",
                "ясен",
                "вільха",
                "сосна",
                "бук",
                "покриття",
                "білоцерків",
            ]),
            orientation_label: "Side".to_owned(),
            glass_label: "Glass".to_owned(),
            generic_label: "Characteristic".to_owned(),
            unmatched: UnmatchedLine::Generic,
            summary_lines: 3,
            summary_separator: " • ".to_owned(),
            placeholder: DESCRIPTION_PLACEHOLDER.to_owned(),
        }
    }

    /// No positional labels: every line is generic, flags and covering come
    /// from keyword scans.
    #[must_use]
    pub fn coarse_v3() -> Self {
        Self {
            name: Self::COARSE_V3.to_owned(),
            version: 3,
            positional_labels: Vec::new(),
            covering_index: None,
            ..Self::positional_v2()
        }
    }

    /// Resolve a built-in profile name or a path to a YAML profile.
    ///
    /// # Errors
    ///
    /// Returns a [`MappingError`] if the file cannot be read, parsed or
    /// validated.
    pub fn resolve(profile: &str) -> Result<Self, MappingError> {
        match profile {
            Self::POSITIONAL_V2 => Ok(Self::positional_v2()),
            Self::COARSE_V3 => Ok(Self::coarse_v3()),
            path => Self::from_file(Path::new(path)),
        }
    }

    /// Load a profile from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns a [`MappingError`] if the file cannot be read, parsed or
    /// validated.
    pub fn from_file(path: &Path) -> Result<Self, MappingError> {
        let content = std::fs::read_to_string(path).map_err(|source| MappingError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Parse and validate a YAML profile.
    ///
    /// # Errors
    ///
    /// Returns a [`MappingError`] if parsing or validation fails.
    pub fn from_yaml_str(content: &str) -> Result<Self, MappingError> {
        let mut mapping: Self = serde_yaml::from_str(content)?;
        mapping.normalize();
        mapping.validate()?;
        Ok(mapping)
    }

    /// Lower-case keyword tables so matching is case-insensitive, and drop
    /// the covering index of a profile without positional labels.
    fn normalize(&mut self) {
        if self.positional_labels.is_empty() {
            self.covering_index = None;
        }

        for list in [
            &mut self.orientation_keywords,
            &mut self.glass_keywords,
            &mut self.covering_keywords,
        ] {
            for word in list.iter_mut() {
                *word = word.trim().to_lowercase();
            }
            list.retain(|w| !w.is_empty());
        }
    }

    /// Check internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), MappingError> {
        if let Some(index) = self.covering_index
            && index >= self.positional_labels.len()
        {
            return Err(MappingError::Invalid(format!(
                "covering_index {index} is outside the {} positional labels",
                self.positional_labels.len()
            )));
        }
        if self.summary_lines == 0 {
            return Err(MappingError::Invalid(
                "summary_lines must be at least 1".to_owned(),
            ));
        }
        if self.placeholder.trim().is_empty() {
            return Err(MappingError::Invalid("placeholder cannot be blank".to_owned()));
        }
        if self.positional_labels.iter().any(|l| l.trim().is_empty()) {
            return Err(MappingError::Invalid(
                "positional labels cannot be blank".to_owned(),
            ));
        }
        Ok(())
    }
}

//! Structured product description stored as JSON.
//!
//! The storefront renders this document directly, so the serialized shape is
//! part of the web contract:
//!
//! ```json
//! {
//!   "text": "ART-1 • Model-X • Дуб",
//!   "details": [{ "label": "Article", "value": "ART-1" }, { "value": "..." }],
//!   "finishing": { "covering": { "text": "Дуб" } }
//! }
//! ```
//!
//! `label` is omitted for unlabeled entries and `finishing` is omitted when
//! there is no covering text.

use serde::{Deserialize, Serialize};

/// Product description document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDescription {
    /// Short summary shown above the details list.
    pub text: String,
    /// Ordered detail lines.
    pub details: Vec<DetailEntry>,
    /// Finishing information, if the document named a covering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finishing: Option<Finishing>,
}

impl ProductDescription {
    /// Build a description, wrapping `covering` in the finishing block.
    #[must_use]
    pub fn new(text: String, details: Vec<DetailEntry>, covering: Option<String>) -> Self {
        Self {
            text,
            details,
            finishing: covering.map(|text| Finishing {
                covering: FinishingText { text },
            }),
        }
    }

    /// Covering text, if any.
    #[must_use]
    pub fn covering(&self) -> Option<&str> {
        self.finishing.as_ref().map(|f| f.covering.text.as_str())
    }
}

/// A single detail line, optionally labeled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub value: String,
}

impl DetailEntry {
    /// Labeled entry.
    #[must_use]
    pub fn labeled(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            value: value.into(),
        }
    }

    /// Entry without a label.
    #[must_use]
    pub fn unlabeled(value: impl Into<String>) -> Self {
        Self {
            label: None,
            value: value.into(),
        }
    }
}

/// Finishing block of the description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finishing {
    pub covering: FinishingText,
}

/// Free-form finishing text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinishingText {
    pub text: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_serializes_with_finishing() {
        let description = ProductDescription::new(
            "A • B".to_owned(),
            vec![DetailEntry::labeled("Article", "A"), DetailEntry::unlabeled("B")],
            Some("Дуб".to_owned()),
        );

        let value = serde_json::to_value(&description).unwrap();
        assert_eq!(
            value,
            json!({
                "text": "A • B",
                "details": [{"label": "Article", "value": "A"}, {"value": "B"}],
                "finishing": {"covering": {"text": "Дуб"}}
            })
        );
    }

    #[test]
    fn test_omits_finishing_without_covering() {
        let description = ProductDescription::new("x".to_owned(), Vec::new(), None);
        let value = serde_json::to_value(&description).unwrap();
        assert!(value.get("finishing").is_none());
        assert_eq!(description.covering(), None);
    }

    #[test]
    fn test_deserializes_legacy_document() {
        let value = json!({"text": "t", "details": [{"value": "only"}]});
        let description: ProductDescription = serde_json::from_value(value).unwrap();
        assert_eq!(description.details, vec![DetailEntry::unlabeled("only")]);
        assert!(description.finishing.is_none());
    }
}

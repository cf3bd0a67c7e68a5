//! Field inference from description lines.
//!
//! Three modes, picked from the line count and the [`FieldMapping`]:
//!
//! - **Positional**: enough lines for every positional label. Leading lines
//!   get fixed labels, trailing lines are classified by keyword.
//! - **Coarse**: too few lines, or a profile without positional labels. Every
//!   line is generic; flags and covering come from keyword scans.
//! - **Placeholder**: no lines at all.
//!
//! Every input line ends up in `details`, typed or generic.

mod mapping;

use serde::Serialize;

use relikt_core::{DetailEntry, ProductDescription};

pub use mapping::{DESCRIPTION_PLACEHOLDER, FieldMapping, MappingError, UnmatchedLine};

/// How the fields were inferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InferenceMode {
    Positional,
    Coarse,
    Placeholder,
}

/// Fields inferred from one description document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InferredFields {
    pub mode: InferenceMode,
    pub summary: String,
    pub details: Vec<DetailEntry>,
    pub covering: Option<String>,
    pub has_glass: bool,
    pub has_orientation: bool,
}

impl InferredFields {
    fn placeholder(text: &str) -> Self {
        Self {
            mode: InferenceMode::Placeholder,
            summary: text.to_owned(),
            details: vec![DetailEntry::unlabeled(text)],
            covering: None,
            has_glass: false,
            has_orientation: false,
        }
    }

    /// Build the stored description document.
    #[must_use]
    pub fn to_description(&self) -> ProductDescription {
        ProductDescription::new(
            self.summary.clone(),
            self.details.clone(),
            self.covering.clone(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineClass {
    Orientation,
    Glass,
    Unmatched,
}

fn contains_any(haystack: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|kw| haystack.contains(kw.as_str()))
}

fn classify(line: &str, mapping: &FieldMapping) -> LineClass {
    let lower = line.to_lowercase();
    if contains_any(&lower, &mapping.orientation_keywords) {
        LineClass::Orientation
    } else if contains_any(&lower, &mapping.glass_keywords) {
        LineClass::Glass
    } else {
        LineClass::Unmatched
    }
}

fn generic(mapping: &FieldMapping, position: usize, value: &str) -> DetailEntry {
    DetailEntry::labeled(format!("{} {position}", mapping.generic_label), value)
}

/// Infer description fields from document lines.
#[must_use]
pub fn infer(lines: &[String], mapping: &FieldMapping) -> InferredFields {
    if lines.is_empty() {
        return InferredFields::placeholder(&mapping.placeholder);
    }

    let summary = lines
        .iter()
        .take(mapping.summary_lines)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(&mapping.summary_separator);

    let positional =
        !mapping.positional_labels.is_empty() && lines.len() >= mapping.positional_labels.len();

    if positional {
        infer_positional(lines, mapping, summary)
    } else {
        infer_coarse(lines, mapping, summary)
    }
}

fn infer_positional(lines: &[String], mapping: &FieldMapping, summary: String) -> InferredFields {
    let (head, tail) = lines.split_at(mapping.positional_labels.len());

    let mut details: Vec<DetailEntry> = head
        .iter()
        .zip(&mapping.positional_labels)
        .map(|(value, label)| DetailEntry::labeled(label.as_str(), value.as_str()))
        .collect();

    let covering = mapping
        .covering_index
        .and_then(|i| head.get(i))
        .cloned();

    let mut has_glass = false;
    let mut has_orientation = false;

    for line in tail {
        match (classify(line, mapping), mapping.unmatched) {
            (LineClass::Orientation, _) => {
                has_orientation = true;
                details.push(DetailEntry::labeled(
                    mapping.orientation_label.as_str(),
                    line.as_str(),
                ));
            }
            (LineClass::Glass, _) | (LineClass::Unmatched, UnmatchedLine::Glass) => {
                has_glass = true;
                details.push(DetailEntry::labeled(mapping.glass_label.as_str(), line.as_str()));
            }
            (LineClass::Unmatched, UnmatchedLine::Generic) => {
                let position = details.len() + 1;
                details.push(generic(mapping, position, line));
            }
        }
    }

    InferredFields {
        mode: InferenceMode::Positional,
        summary,
        details,
        covering,
        has_glass,
        has_orientation,
    }
}

fn infer_coarse(lines: &[String], mapping: &FieldMapping, summary: String) -> InferredFields {
    let full_text = lines.join(" ").to_lowercase();

    let covering = lines
        .iter()
        .find(|line| contains_any(&line.to_lowercase(), &mapping.covering_keywords))
        .or_else(|| lines.get(1))
        .cloned();

    let details = lines
        .iter()
        .enumerate()
        .map(|(i, line)| generic(mapping, i + 1, line))
        .collect();

    InferredFields {
        mode: InferenceMode::Coarse,
        summary,
        details,
        covering,
        has_glass: contains_any(&full_text, &mapping.glass_keywords),
        has_orientation: contains_any(&full_text, &mapping.orientation_keywords),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn test_positional_with_side() {
        let input = lines(&["ART-1", "Model-X", "Дуб", "Двері", "800x2000", "праве"]);
        let fields = infer(&input, &FieldMapping::positional_v2());

        assert_eq!(fields.mode, InferenceMode::Positional);
        assert_eq!(
            fields.details,
            vec![
                DetailEntry::labeled("Article", "ART-1"),
                DetailEntry::labeled("Model", "Model-X"),
                DetailEntry::labeled("Color", "Дуб"),
                DetailEntry::labeled("ProductType", "Двері"),
                DetailEntry::labeled("Size", "800x2000"),
                DetailEntry::labeled("Side", "праве"),
            ]
        );
        assert!(fields.has_orientation);
        assert!(!fields.has_glass);
        assert_eq!(fields.covering.as_deref(), Some("Дуб"));
        assert_eq!(fields.summary, "ART-1 • Model-X • Дуб");
    }

    #[test]
    fn test_positional_glass_line() {
        let input = lines(&["A", "M", "Горіх", "Двері", "700x2000", "Скло сатин"]);
        let fields = infer(&input, &FieldMapping::positional_v2());

        assert!(fields.has_glass);
        assert!(!fields.has_orientation);
        assert_eq!(
            fields.details.last(),
            Some(&DetailEntry::labeled("Glass", "Скло сатин"))
        );
    }

    #[test]
    fn test_positional_unmatched_is_generic_by_default() {
        let input = lines(&["A", "M", "C", "T", "S", "Фурнітура в комплекті"]);
        let fields = infer(&input, &FieldMapping::positional_v2());

        assert!(!fields.has_glass);
        assert_eq!(
            fields.details.last(),
            Some(&DetailEntry::labeled("Characteristic 6", "Фурнітура в комплекті"))
        );
    }

    #[test]
    fn test_positional_unmatched_as_glass_policy() {
        let mapping = FieldMapping {
            unmatched: UnmatchedLine::Glass,
            ..FieldMapping::positional_v2()
        };
        let input = lines(&["A", "M", "C", "T", "S", "Сатин"]);
        let fields = infer(&input, &mapping);

        assert!(fields.has_glass);
        assert_eq!(
            fields.details.last(),
            Some(&DetailEntry::labeled("Glass", "Сатин"))
        );
    }

    #[test]
    fn test_orientation_wins_over_glass() {
        let input = lines(&["A", "M", "C", "T", "S", "Праве зі склом"]);
        let fields = infer(&input, &FieldMapping::positional_v2());

        assert!(fields.has_orientation);
        assert!(!fields.has_glass);
    }

    #[test]
    fn test_coarse_when_too_few_lines() {
        let input = lines(&["Модель Верона", "Покриття ПВХ білий", "Скло матове"]);
        let fields = infer(&input, &FieldMapping::positional_v2());

        assert_eq!(fields.mode, InferenceMode::Coarse);
        assert!(fields.has_glass);
        assert!(!fields.has_orientation);
        assert_eq!(fields.covering.as_deref(), Some("Покриття ПВХ білий"));
        assert_eq!(
            fields.details,
            vec![
                DetailEntry::labeled("Characteristic 1", "Модель Верона"),
                DetailEntry::labeled("Characteristic 2", "Покриття ПВХ білий"),
                DetailEntry::labeled("Characteristic 3", "Скло матове"),
            ]
        );
    }

    #[test]
    fn test_coarse_covering_falls_back_to_second_line() {
        let input = lines(&["Лиштва пряма", "Білий", "70 мм"]);
        let fields = infer(&input, &FieldMapping::positional_v2());

        assert_eq!(fields.covering.as_deref(), Some("Білий"));
    }

    #[test]
    fn test_coarse_single_line_has_no_covering() {
        let fields = infer(&lines(&["Лиштва"]), &FieldMapping::positional_v2());

        assert_eq!(fields.covering, None);
        assert_eq!(fields.summary, "Лиштва");
        assert_eq!(fields.details.len(), 1);
    }

    #[test]
    fn test_coarse_profile_ignores_positions() {
        let input = lines(&["ART-1", "Model-X", "Дуб", "Двері", "800x2000", "ліве"]);
        let fields = infer(&input, &FieldMapping::coarse_v3());

        assert_eq!(fields.mode, InferenceMode::Coarse);
        assert!(fields.has_orientation);
        assert_eq!(fields.details.len(), 6);
        assert_eq!(fields.covering.as_deref(), Some("Дуб"));
    }

    #[test]
    fn test_placeholder_when_empty() {
        let fields = infer(&[], &FieldMapping::positional_v2());

        assert_eq!(fields.mode, InferenceMode::Placeholder);
        assert_eq!(fields.summary, DESCRIPTION_PLACEHOLDER);
        assert_eq!(
            fields.details,
            vec![DetailEntry::unlabeled(DESCRIPTION_PLACEHOLDER)]
        );
        assert!(!fields.has_glass);
        assert!(!fields.has_orientation);
        assert_eq!(fields.covering, None);
    }

    #[test]
    fn test_every_line_surfaces() {
        let input = lines(&["a", "b", "c", "d", "e", "f", "скло", "праве", "g"]);
        let fields = infer(&input, &FieldMapping::positional_v2());

        let values: Vec<&str> = fields.details.iter().map(|d| d.value.as_str()).collect();
        assert_eq!(values, input.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[test]
    fn test_to_description() {
        let input = lines(&["ART-1", "Model-X", "Дуб", "Двері", "800x2000"]);
        let description = infer(&input, &FieldMapping::positional_v2()).to_description();

        assert_eq!(description.covering(), Some("Дуб"));
        assert_eq!(description.details.len(), 5);
    }
}

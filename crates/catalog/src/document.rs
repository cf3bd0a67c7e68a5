//! Description document text extraction.
//!
//! Each product folder may carry a `description.docx` whose paragraphs are
//! positional text (article, model, color, ...). Extraction is best-effort:
//! a missing, unreadable or empty document yields no lines and the importer
//! falls back to a placeholder description.
//!
//! The parsing capability is a [`DocumentReader`] chosen once at startup via
//! [`DocumentReaderKind`] and handed to the importer.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::str::FromStr;

use roxmltree::{Document, Node};
use thiserror::Error;
use tracing::{debug, warn};
use zip::ZipArchive;

/// File name of the description document inside a product folder.
pub const DESCRIPTION_FILE: &str = "description.docx";

/// `WordprocessingML` main namespace.
const WORDML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Archive entry holding the document body.
const DOCUMENT_PART: &str = "word/document.xml";

/// Errors raised by a [`DocumentReader`].
///
/// These never leave [`extract_lines`]; they are logged and turned into an
/// empty result.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Document parsing is disabled for this run.
    #[error("document parsing is unavailable")]
    Unavailable,

    #[error("failed to read document: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid docx archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("invalid document xml: {0}")]
    Xml(#[from] roxmltree::Error),

    /// The XML parsed but has no `w:body`.
    #[error("document has no body")]
    MissingBody,
}

/// Reads raw paragraph text from a document file.
pub trait DocumentReader: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Return the text of every body paragraph, in order, untrimmed.
    ///
    /// # Errors
    ///
    /// Returns a [`DocumentError`] if the document cannot be parsed.
    fn read_paragraphs(&self, path: &Path) -> Result<Vec<String>, DocumentError>;
}

/// Which reader to use for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentReaderKind {
    /// Parse `.docx` files.
    #[default]
    Docx,
    /// Skip documents entirely; every product gets the placeholder description.
    Disabled,
}

impl DocumentReaderKind {
    /// Build the reader.
    #[must_use]
    pub fn into_reader(self) -> Box<dyn DocumentReader> {
        match self {
            Self::Docx => Box::new(DocxReader),
            Self::Disabled => Box::new(DisabledReader),
        }
    }
}

impl FromStr for DocumentReaderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "docx" => Ok(Self::Docx),
            "disabled" | "none" | "off" => Ok(Self::Disabled),
            other => Err(format!("unknown document reader: {other}")),
        }
    }
}

/// Office Open XML (`.docx`) reader.
///
/// Only top-level body paragraphs are returned; tables and text boxes are
/// ignored. Within a paragraph, `w:tab` becomes a tab and `w:br`/`w:cr` a
/// newline.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxReader;

impl DocumentReader for DocxReader {
    fn name(&self) -> &'static str {
        "docx"
    }

    fn read_paragraphs(&self, path: &Path) -> Result<Vec<String>, DocumentError> {
        let file = BufReader::new(File::open(path)?);
        let mut archive = ZipArchive::new(file)?;

        let mut xml = String::new();
        archive.by_name(DOCUMENT_PART)?.read_to_string(&mut xml)?;

        let doc = Document::parse(&xml)?;
        let body = doc
            .descendants()
            .find(|n| is_wordml(n, "body"))
            .ok_or(DocumentError::MissingBody)?;

        Ok(body
            .children()
            .filter(|n| is_wordml(n, "p"))
            .map(paragraph_text)
            .collect())
    }
}

/// Reader used when document parsing is turned off.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledReader;

impl DocumentReader for DisabledReader {
    fn name(&self) -> &'static str {
        "disabled"
    }

    fn read_paragraphs(&self, _path: &Path) -> Result<Vec<String>, DocumentError> {
        Err(DocumentError::Unavailable)
    }
}

fn is_wordml(node: &Node<'_, '_>, local: &str) -> bool {
    node.is_element()
        && node.tag_name().name() == local
        && node.tag_name().namespace() == Some(WORDML_NS)
}

/// Nearest `w:p` strictly above `node`.
fn owning_paragraph<'a, 'input>(node: Node<'a, 'input>) -> Option<Node<'a, 'input>> {
    node.ancestors().skip(1).find(|n| is_wordml(n, "p"))
}

fn paragraph_text(paragraph: Node<'_, '_>) -> String {
    let mut text = String::new();
    for node in paragraph.descendants().filter(Node::is_element) {
        // Paragraphs nested in text boxes belong to their own paragraph.
        if owning_paragraph(node) != Some(paragraph) {
            continue;
        }
        if is_wordml(&node, "t") {
            text.push_str(node.text().unwrap_or_default());
        } else if is_wordml(&node, "tab") {
            text.push('\t');
        } else if is_wordml(&node, "br") || is_wordml(&node, "cr") {
            text.push('\n');
        }
    }
    text
}

/// Extract trimmed, non-empty lines from a description document.
///
/// Never fails: a missing file, a disabled reader, a parse error or an
/// empty document all yield an empty vector, with a warning logged.
pub fn extract_lines(reader: &dyn DocumentReader, path: &Path) -> Vec<String> {
    if !path.is_file() {
        warn!(path = %path.display(), "Description document not found");
        return Vec::new();
    }

    let paragraphs = match reader.read_paragraphs(path) {
        Ok(paragraphs) => paragraphs,
        Err(DocumentError::Unavailable) => {
            warn!(
                path = %path.display(),
                reader = reader.name(),
                "Document parsing unavailable, using placeholder description"
            );
            return Vec::new();
        }
        Err(e) => {
            warn!(
                path = %path.display(),
                reader = reader.name(),
                error = %e,
                error_debug = ?e,
                "Failed to parse description document"
            );
            return Vec::new();
        }
    };

    let lines: Vec<String> = paragraphs
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(str::to_owned)
        .collect();

    if lines.is_empty() {
        warn!(path = %path.display(), "Description document is empty");
    } else {
        debug!(path = %path.display(), lines = lines.len(), "Read description document");
    }

    lines
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    use super::*;

    fn write_docx(path: &Path, body: &str) {
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{WORDML_NS}"><w:body>{body}</w:body></w:document>"#
        );
        let mut zip = ZipWriter::new(File::create(path).unwrap());
        zip.start_file(DOCUMENT_PART, SimpleFileOptions::default())
            .unwrap();
        zip.write_all(xml.as_bytes()).unwrap();
        zip.finish().unwrap();
    }

    fn para(text: &str) -> String {
        format!("<w:p><w:r><w:t xml:space=\"preserve\">{text}</w:t></w:r></w:p>")
    }

    #[test]
    fn test_missing_file_returns_empty() {
        let dir = tempfile::tempdir().unwrap();
        let lines = extract_lines(&DocxReader, &dir.path().join("nope.docx"));
        assert!(lines.is_empty());
    }

    #[test]
    fn test_reads_trimmed_non_empty_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DESCRIPTION_FILE);
        let body = [para("  ART-1 "), para("   "), para("Model-X"), para("Дуб")].concat();
        write_docx(&path, &body);

        let lines = extract_lines(&DocxReader, &path);
        assert_eq!(lines, vec!["ART-1", "Model-X", "Дуб"]);
    }

    #[test]
    fn test_concatenates_runs_and_maps_tabs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DESCRIPTION_FILE);
        let body = "<w:p><w:r><w:t>800</w:t></w:r><w:r><w:tab/><w:t>x2000</w:t></w:r></w:p>";
        write_docx(&path, body);

        assert_eq!(extract_lines(&DocxReader, &path), vec!["800\tx2000"]);
    }

    #[test]
    fn test_maps_line_breaks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DESCRIPTION_FILE);
        let body = format!(
            "<w:p><w:r><w:t>800</w:t><w:br/><w:t>2000</w:t><w:cr/><w:t>мм</w:t></w:r></w:p>{}",
            para("next")
        );
        write_docx(&path, &body);

        assert_eq!(
            extract_lines(&DocxReader, &path),
            vec!["800\n2000\nмм", "next"]
        );
    }

    #[test]
    fn test_ignores_table_paragraphs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DESCRIPTION_FILE);
        let body = format!(
            "{}<w:tbl><w:tr><w:tc>{}</w:tc></w:tr></w:tbl>",
            para("body"),
            para("cell")
        );
        write_docx(&path, &body);

        assert_eq!(extract_lines(&DocxReader, &path), vec!["body"]);
    }

    #[test]
    fn test_corrupt_file_returns_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DESCRIPTION_FILE);
        std::fs::write(&path, b"not a zip archive").unwrap();

        assert!(extract_lines(&DocxReader, &path).is_empty());
    }

    #[test]
    fn test_disabled_reader_returns_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DESCRIPTION_FILE);
        write_docx(&path, &para("ignored"));

        assert!(extract_lines(&DisabledReader, &path).is_empty());
    }

    #[test]
    fn test_reader_kind_from_str() {
        assert_eq!("docx".parse(), Ok(DocumentReaderKind::Docx));
        assert_eq!("none".parse(), Ok(DocumentReaderKind::Disabled));
        assert!("pdf".parse::<DocumentReaderKind>().is_err());
    }
}

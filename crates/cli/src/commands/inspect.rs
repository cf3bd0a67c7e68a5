//! Product folder inspection.
//!
//! Prints what the importer would store for a single folder, without a
//! database connection. Useful when tuning a mapping profile.
//!
//! ```bash
//! relikt-cli inspect static/catalog/door/Classic/A1 --mapping coarse-v3
//! ```

use std::path::Path;

use relikt_catalog::{DocumentReaderKind, FieldMapping, preview_product};

use super::CommandError;

/// Print the preview of one product folder as JSON.
///
/// # Errors
///
/// Returns an error if the mapping cannot be loaded or the folder cannot be
/// read.
pub fn run(dir: &Path, mapping: &str, reader: DocumentReaderKind) -> Result<(), CommandError> {
    let mapping = FieldMapping::resolve(mapping)?;
    let reader = reader.into_reader();
    let preview = preview_product(dir, reader.as_ref(), &mapping)?;

    #[allow(clippy::print_stdout)]
    {
        println!("{}", serde_json::to_string_pretty(&preview)?);
    }
    Ok(())
}

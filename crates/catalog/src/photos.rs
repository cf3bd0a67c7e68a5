//! Product photo discovery.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

/// Recognized image extensions (matched case-insensitively).
pub const PHOTO_EXTENSIONS: &[&str] = &["webp", "png", "jpg", "jpeg"];

/// An image file found in a product folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredPhoto {
    pub path: PathBuf,
    pub file_name: String,
}

fn is_photo(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            PHOTO_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// List the photos directly inside `dir`, sorted by file name.
///
/// Names that differ only by case are treated as one photo. Files are
/// visited in byte order of their names and the first one wins, so `1.JPG`
/// is kept over `1.jpg`; the dropped file is logged.
///
/// An empty result means the folder should be skipped. Entries that cannot
/// be read, such as dangling symlinks, are logged and skipped.
///
/// # Errors
///
/// Returns a `walkdir::Error` if `dir` itself cannot be read.
pub fn discover_photos(dir: &Path) -> Result<Vec<DiscoveredPhoto>, walkdir::Error> {
    let mut seen = HashSet::new();
    let mut photos = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            // Dangling symlinks and the like; only the folder itself is fatal.
            Err(e) if e.depth() > 0 => {
                warn!(path = ?e.path(), error = %e, "Skipping unreadable photo entry");
                continue;
            }
            Err(e) => return Err(e),
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let Some(file_name) = entry.file_name().to_str() else {
            warn!(path = %entry.path().display(), "Skipping photo with non UTF-8 name");
            continue;
        };

        if !is_photo(file_name) {
            continue;
        }

        if !seen.insert(file_name.to_lowercase()) {
            warn!(
                path = %entry.path().display(),
                "Skipping photo whose name differs from another only by case"
            );
            continue;
        }

        photos.push(DiscoveredPhoto {
            path: entry.path().to_path_buf(),
            file_name: file_name.to_owned(),
        });
    }

    Ok(photos)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fs;

    use super::*;

    fn names(photos: &[DiscoveredPhoto]) -> Vec<&str> {
        photos.iter().map(|p| p.file_name.as_str()).collect()
    }

    #[test]
    fn test_filters_extensions_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["2.webp", "1.PNG", "description.docx", "notes.txt", "3.jpeg", "0.Jpg"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }

        let photos = discover_photos(dir.path()).unwrap();
        assert_eq!(names(&photos), vec!["0.Jpg", "1.PNG", "2.webp", "3.jpeg"]);
    }

    #[test]
    fn test_ignores_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("nested.webp")).unwrap();
        fs::write(dir.path().join("nested.webp").join("inner.webp"), b"x").unwrap();

        assert!(discover_photos(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_case_duplicates_keep_first_in_byte_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("1.jpg"), b"x").unwrap();
        fs::write(dir.path().join("1.JPG"), b"x").unwrap();

        let photos = discover_photos(dir.path()).unwrap();
        // On case-insensitive filesystems only one file exists to begin with.
        assert_eq!(photos.len(), 1);
        if cfg!(target_os = "linux") {
            assert_eq!(names(&photos), vec!["1.JPG"]);
        }
    }

    #[test]
    fn test_empty_folder() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("description.docx"), b"x").unwrap();

        assert!(discover_photos(dir.path()).unwrap().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_skips_dangling_symlink() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("1.webp"), b"x").unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone.webp"), dir.path().join("2.webp"))
            .unwrap();

        let photos = discover_photos(dir.path()).unwrap();
        assert_eq!(names(&photos), vec!["1.webp"]);
    }

    #[test]
    fn test_missing_folder_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_photos(&dir.path().join("missing")).is_err());
    }
}

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::catalog::domain::ad_record::AdRecord;
use crate::catalog::domain::catalog::{Catalog, CatalogError};

#[derive(Error, Debug)]
pub enum CatalogLoadError {
    #[error("failed to read catalog {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse catalog {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid catalog {path}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: CatalogError,
    },
}

/// Loads a catalog from a JSON array of ad records.
///
/// The file is read once at startup; the resulting catalog is validated
/// and never touched again.
pub fn read_catalog(path: &Path) -> Result<Catalog, CatalogLoadError> {
    let json = fs::read_to_string(path).map_err(|e| CatalogLoadError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    let ads: Vec<AdRecord> = serde_json::from_str(&json).map_err(|e| CatalogLoadError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    let catalog = Catalog::new(ads).map_err(|e| CatalogLoadError::Invalid {
        path: path.to_path_buf(),
        source: e,
    })?;
    log::info!("Loaded {} ads from {}", catalog.len(), path.display());
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_json(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_reads_valid_catalog() {
        let file = write_json(
            r#"[
                {"id": "a", "title": "A", "description": "", "ageRange": {"min": 18, "max": 30},
                 "targetGender": "male", "category": "Tech", "mediaRef": "a.png", "durationSeconds": 10},
                {"id": "b", "title": "B", "description": "", "ageRange": {"min": 0, "max": 99},
                 "targetGender": "both", "category": "Food", "mediaRef": "b.png", "durationSeconds": 5}
            ]"#,
        );
        let catalog = read_catalog(file.path()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.ads()[1].id, "b");
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_catalog(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, CatalogLoadError::Read { .. }));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let file = write_json("[{\"id\": ");
        let err = read_catalog(file.path()).unwrap_err();
        assert!(matches!(err, CatalogLoadError::Parse { .. }));
    }

    #[test]
    fn test_empty_array_is_invalid() {
        let file = write_json("[]");
        let err = read_catalog(file.path()).unwrap_err();
        assert!(matches!(
            err,
            CatalogLoadError::Invalid {
                source: CatalogError::Empty,
                ..
            }
        ));
    }

    #[test]
    fn test_error_message_names_path() {
        let file = write_json("[]");
        let err = read_catalog(file.path()).unwrap_err();
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }
}

/// Origin tracking for unified output folders
///
/// In the unified layout every folder's keeps land in the same directory,
/// so a JSON file in the project root remembers which source folder each
/// output file came from.
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use super::StoreError;

pub const OUTPUT_METADATA_FILE: &str = "toss-metadata.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputMetadata {
    /// Output file name -> source folder id
    #[serde(default)]
    pub file_origins: HashMap<String, String>,
}

pub fn read_output_metadata(project_dir: &Path) -> Result<OutputMetadata, StoreError> {
    let path = project_dir.join(OUTPUT_METADATA_FILE);
    if !path.exists() {
        return Ok(OutputMetadata::default());
    }
    let content = fs::read_to_string(&path)?;
    Ok(serde_json::from_str(&content)?)
}

pub fn write_output_metadata(
    project_dir: &Path,
    metadata: &OutputMetadata,
) -> Result<(), StoreError> {
    let path = project_dir.join(OUTPUT_METADATA_FILE);
    let content = serde_json::to_string_pretty(metadata)?;
    fs::write(&path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(read_output_metadata(dir.path()).unwrap(), OutputMetadata::default());
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let mut metadata = OutputMetadata::default();
        metadata.file_origins.insert("a_1.png".to_string(), "folder-9".to_string());

        write_output_metadata(dir.path(), &metadata).unwrap();
        let restored = read_output_metadata(dir.path()).unwrap();
        assert_eq!(restored.file_origins.get("a_1.png").map(String::as_str), Some("folder-9"));
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(OUTPUT_METADATA_FILE), "{ nope").unwrap();
        assert!(matches!(read_output_metadata(dir.path()), Err(StoreError::Metadata(_))));
    }
}

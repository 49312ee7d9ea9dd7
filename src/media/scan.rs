/// Folder scanning
///
/// Lists the supported images in a folder (non-recursive), sorted by name,
/// and counts outputs for project statistics.
use std::path::Path;
use walkdir::WalkDir;

use super::metadata::read_output_metadata;
use super::StoreError;
use crate::state::data::{
    Classification, Dimensions, Image, OutputLayout, Project, ProjectStats, FolderStats,
};

/// Supported image extensions (lower-case)
pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif", "bmp"];

/// Check if a path is a supported image by extension
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// List all images directly inside `dir`, sorted case-insensitively by name
pub fn scan_folder(dir: &Path) -> Result<Vec<Image>, StoreError> {
    if !dir.is_dir() {
        return Err(StoreError::FolderNotFound(dir.to_path_buf()));
    }

    let mut images = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        // Only process files (not directories)
        if !path.is_file() || !is_image_file(path) {
            continue;
        }

        let size = entry.metadata().map(|m| m.len()).unwrap_or(0);

        // Header-only read; unreadable images simply have no dimensions
        let dimensions = image::image_dimensions(path)
            .ok()
            .map(|(width, height)| Dimensions { width, height });

        images.push(Image::new(path.to_path_buf(), size, dimensions));
    }

    images.sort_by_key(|image| image.name.to_lowercase());

    Ok(images)
}

/// Number of supported images directly inside `dir` (0 if it doesn't exist)
pub fn count_images(dir: &Path) -> u32 {
    if !dir.is_dir() {
        return 0;
    }

    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file() && is_image_file(e.path()))
        .count() as u32
}

/// An image in a project output folder, with the source folder it came from
#[derive(Debug, Clone, PartialEq)]
pub struct OutputImage {
    pub image: Image,
    /// Empty when the origin is unknown
    pub source_folder_id: String,
}

/// List a project's output images for one bucket across all its folders
pub fn list_output_images(
    project: &Project,
    bucket: Classification,
) -> Result<Vec<OutputImage>, StoreError> {
    let mut outputs = Vec::new();

    match project.output_layout {
        OutputLayout::Unified => {
            let dir = project.path.join(bucket.dir_name());
            if dir.is_dir() {
                let metadata = read_output_metadata(&project.path)?;
                for image in scan_folder(&dir)? {
                    let source_folder_id = metadata
                        .file_origins
                        .get(&image.name)
                        .cloned()
                        .unwrap_or_default();
                    outputs.push(OutputImage {
                        image,
                        source_folder_id,
                    });
                }
            }
        }
        OutputLayout::PerFolder => {
            for folder in &project.folders {
                let dir = project.path.join(folder.name()).join(bucket.dir_name());
                // Folders that were never triaged have no output yet
                let Ok(images) = scan_folder(&dir) else {
                    continue;
                };
                outputs.extend(images.into_iter().map(|image| OutputImage {
                    image,
                    source_folder_id: folder.id.clone(),
                }));
            }
        }
    }

    outputs.sort_by_key(|output| output.image.name.to_lowercase());
    Ok(outputs)
}

/// Source and output counts for every folder of a project
pub fn project_stats(project: &Project) -> Result<ProjectStats, StoreError> {
    let mut stats = ProjectStats::default();

    // Unified outputs are attributed to folders through the origin metadata
    let unified = match project.output_layout {
        OutputLayout::Unified => Some(read_output_metadata(&project.path)?),
        OutputLayout::PerFolder => None,
    };

    for folder in &project.folders {
        let folder_name = folder.name();
        let source_count = count_images(&folder.source_path);

        let (keep_count, maybe_count) = match &unified {
            Some(metadata) => {
                let count_in = |bucket: Classification| {
                    let dir = project.path.join(bucket.dir_name());
                    metadata
                        .file_origins
                        .iter()
                        .filter(|(name, origin)| {
                            **origin == folder.id && dir.join(name.as_str()).is_file()
                        })
                        .count() as u32
                };
                (count_in(Classification::Keep), count_in(Classification::Maybe))
            }
            None => {
                let output = project.path.join(&folder_name);
                (
                    count_images(&output.join(Classification::Keep.dir_name())),
                    count_images(&output.join(Classification::Maybe.dir_name())),
                )
            }
        };

        stats.total_keep += keep_count;
        stats.total_maybe += maybe_count;
        stats.folders.push(FolderStats {
            folder_id: folder.id.clone(),
            folder_name,
            source_count,
            keep_count,
            maybe_count,
        });
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::metadata::{write_output_metadata, OutputMetadata};
    use crate::state::data::{Folder, OutputMode};
    use std::fs;
    use std::path::PathBuf;

    fn write_png(path: &Path, width: u32, height: u32) {
        image::RgbImage::new(width, height).save(path).unwrap();
    }

    fn project(root: &Path, layout: OutputLayout, folders: Vec<Folder>) -> Project {
        Project {
            id: "p1".to_string(),
            name: "Test".to_string(),
            path: root.to_path_buf(),
            created_at: "2026-01-01T00:00:00Z".to_string(),
            output_layout: layout,
            folders,
        }
    }

    fn folder(id: &str, source: PathBuf) -> Folder {
        Folder {
            id: id.to_string(),
            source_path: source,
            output_mode: OutputMode::Copy,
            added_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_is_image_file() {
        assert!(is_image_file(Path::new("a.PNG")));
        assert!(is_image_file(Path::new("/x/y.jpeg")));
        assert!(!is_image_file(Path::new("notes.txt")));
        assert!(!is_image_file(Path::new("no_extension")));
    }

    #[test]
    fn test_scan_folder_sorts_and_filters() {
        let dir = tempfile::tempdir().unwrap();
        write_png(&dir.path().join("b.png"), 3, 2);
        write_png(&dir.path().join("A.png"), 1, 1);
        fs::write(dir.path().join("c.png"), b"not really a png").unwrap();
        fs::write(dir.path().join("readme.txt"), b"hi").unwrap();
        fs::create_dir(dir.path().join("nested.png")).unwrap();
        write_png(&dir.path().join("nested.png").join("deep.png"), 1, 1);

        let images = scan_folder(dir.path()).unwrap();
        let names: Vec<&str> = images.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["A.png", "b.png", "c.png"]);
        assert_eq!(
            images[1].dimensions,
            Some(Dimensions {
                width: 3,
                height: 2
            })
        );
        assert_eq!(images[2].dimensions, None);
        assert_eq!(images[2].size, 16);
    }

    #[test]
    fn test_scan_missing_folder() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone");
        assert!(matches!(
            scan_folder(&missing),
            Err(StoreError::FolderNotFound(_))
        ));
        assert_eq!(count_images(&missing), 0);
    }

    #[test]
    fn test_per_folder_outputs_and_stats() {
        let root = tempfile::tempdir().unwrap();
        let source = root.path().join("batch");
        fs::create_dir(&source).unwrap();
        write_png(&source.join("left.png"), 1, 1);

        let keep = root.path().join("batch").join("keep");
        fs::create_dir_all(&keep).unwrap();
        write_png(&keep.join("z.png"), 1, 1);
        write_png(&keep.join("y.png"), 1, 1);

        let project = project(
            root.path(),
            OutputLayout::PerFolder,
            vec![folder("f1", source), folder("f2", root.path().join("absent"))],
        );

        let outputs = list_output_images(&project, Classification::Keep).unwrap();
        let names: Vec<&str> = outputs.iter().map(|o| o.image.name.as_str()).collect();
        assert_eq!(names, vec!["y.png", "z.png"]);
        assert!(outputs.iter().all(|o| o.source_folder_id == "f1"));

        let stats = project_stats(&project).unwrap();
        assert_eq!(stats.total_keep, 2);
        assert_eq!(stats.total_maybe, 0);
        assert_eq!(stats.folders[0].source_count, 1);
        assert_eq!(stats.folders[1].source_count, 0);
    }

    #[test]
    fn test_unified_outputs_use_origin_metadata() {
        let root = tempfile::tempdir().unwrap();
        let maybe = root.path().join("maybe");
        fs::create_dir_all(&maybe).unwrap();
        write_png(&maybe.join("one.png"), 1, 1);
        write_png(&maybe.join("two.png"), 1, 1);

        let mut metadata = OutputMetadata::default();
        metadata.file_origins.insert("one.png".to_string(), "f1".to_string());
        write_output_metadata(root.path(), &metadata).unwrap();

        let project = project(
            root.path(),
            OutputLayout::Unified,
            vec![folder("f1", root.path().join("src"))],
        );

        let outputs = list_output_images(&project, Classification::Maybe).unwrap();
        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs[0].source_folder_id, "f1");
        assert_eq!(outputs[1].source_folder_id, "");

        let stats = project_stats(&project).unwrap();
        assert_eq!(stats.folders[0].maybe_count, 1);
        assert_eq!(stats.total_keep, 0);
    }
}

/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the file system layer, the triage core and the UI layer.
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::{Path, PathBuf};

/// Stable image identifier, derived from the image path (not its content)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ImageId(String);

impl ImageId {
    /// Derive the id for a path: first 16 hex chars of SHA-256 over the path string
    pub fn from_path(path: &Path) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(path.to_string_lossy().as_bytes());
        let digest = hex::encode(hasher.finalize());
        ImageId(digest[..16].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ImageId {
    fn from(value: &str) -> Self {
        ImageId(value.to_string())
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Pixel dimensions of an image, when the header could be read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Represents a single image in a source or output folder
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    /// Stable id (hash of the path)
    pub id: ImageId,
    /// Full path to the image file
    pub path: PathBuf,
    /// Filename only (e.g., "gen_0001.png")
    pub name: String,
    /// File size in bytes
    pub size: u64,
    pub dimensions: Option<Dimensions>,
    /// Path to the cached JPEG thumbnail (None until loaded)
    pub thumbnail: Option<PathBuf>,
}

impl Image {
    pub fn new(path: PathBuf, size: u64, dimensions: Option<Dimensions>) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        Image {
            id: ImageId::from_path(&path),
            path,
            name,
            size,
            dimensions,
            thumbnail: None,
        }
    }
}

/// The three triage buckets, in their fixed left-to-right column order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Keep,
    Maybe,
    Yeet,
}

impl Classification {
    /// Column order used by the review grid
    pub const ALL: [Classification; 3] = [
        Classification::Keep,
        Classification::Maybe,
        Classification::Yeet,
    ];

    pub fn column(self) -> usize {
        match self {
            Classification::Keep => 0,
            Classification::Maybe => 1,
            Classification::Yeet => 2,
        }
    }

    pub fn from_column(column: usize) -> Option<Self> {
        Self::ALL.get(column).copied()
    }

    /// Directory name used for the output folders
    pub fn dir_name(self) -> &'static str {
        match self {
            Classification::Keep => "keep",
            Classification::Maybe => "maybe",
            Classification::Yeet => "yeet",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Classification::Keep => "Keep",
            Classification::Maybe => "Maybe",
            Classification::Yeet => "Yeet",
        }
    }
}

/// How a folder's files reach the output directories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    #[default]
    Move,
    Copy,
}

impl OutputMode {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputMode::Move => "move",
            OutputMode::Copy => "copy",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "move" => Some(OutputMode::Move),
            "copy" => Some(OutputMode::Copy),
            _ => None,
        }
    }
}

/// Output directory structure of a project
///
/// - `PerFolder`: `<project>/<folder name>/keep|maybe`
/// - `Unified`: `<project>/keep|maybe`, origins tracked in a metadata file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputLayout {
    #[default]
    PerFolder,
    Unified,
}

impl OutputLayout {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputLayout::PerFolder => "per-folder",
            OutputLayout::Unified => "unified",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "per-folder" => Some(OutputLayout::PerFolder),
            "unified" => Some(OutputLayout::Unified),
            _ => None,
        }
    }
}

/// A source folder registered in a project
#[derive(Debug, Clone, PartialEq)]
pub struct Folder {
    pub id: String,
    pub source_path: PathBuf,
    pub output_mode: OutputMode,
    /// RFC 3339 timestamp
    pub added_at: String,
}

impl Folder {
    /// Last path component, used for tab labels and per-folder output dirs
    pub fn name(&self) -> String {
        folder_name(&self.source_path)
    }
}

/// A triage project: an output directory plus its source folders
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub path: PathBuf,
    pub created_at: String,
    pub output_layout: OutputLayout,
    pub folders: Vec<Folder>,
}

impl Project {
    pub fn folder(&self, folder_id: &str) -> Option<&Folder> {
        self.folders.iter().find(|f| f.id == folder_id)
    }
}

/// Output counts for one source folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderStats {
    pub folder_id: String,
    pub folder_name: String,
    pub source_count: u32,
    pub keep_count: u32,
    pub maybe_count: u32,
}

/// Output counts for a whole project
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProjectStats {
    pub total_keep: u32,
    pub total_maybe: u32,
    pub folders: Vec<FolderStats>,
}

pub fn folder_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unnamed")
        .to_string()
}

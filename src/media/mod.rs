/// Media module
///
/// Everything that touches image files on disk:
/// - Folder scanning and output statistics (scan.rs)
/// - Thumbnail generation and caching (thumbnail.rs)
/// - Unified-layout origin tracking (metadata.rs)
/// - The image store used by the UI (store.rs)
/// - Executing a committed triage plan (executor.rs)
use std::path::PathBuf;
use thiserror::Error;

pub mod executor;
pub mod metadata;
pub mod scan;
pub mod store;
pub mod thumbnail;

pub use executor::{Conflict, ExecuteError, FsExecutor, TriageExecutor};
pub use store::{FsImageStore, ImageStore};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("folder not found: {}", .0.display())]
    FolderNotFound(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("could not determine a cache directory")]
    NoCacheDir,

    #[error("invalid output metadata: {0}")]
    Metadata(#[from] serde_json::Error),

    #[error("background task failed: {0}")]
    Join(String),
}

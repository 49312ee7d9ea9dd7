/// Image store: listing folders and producing thumbnails / full images.
///
/// The trait is synchronous; the async helpers below run it on tokio's
/// blocking pool so file I/O and decoding never stall the UI.
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::scan::{list_output_images, project_stats, scan_folder, OutputImage};
use super::thumbnail::generate_thumbnail;
use super::StoreError;
use crate::state::data::{Classification, Image, ImageId, Project, ProjectStats};

pub trait ImageStore: Send + Sync {
    /// Ordered list of the images in a folder
    fn list_images(&self, folder: &Path) -> Result<Vec<Image>, StoreError>;

    /// Path to a cached thumbnail fitting `size`x`size`
    fn thumbnail(&self, path: &Path, size: u32) -> Result<PathBuf, StoreError>;

    /// Encoded bytes of the full-resolution image
    fn full_image(&self, path: &Path) -> Result<Vec<u8>, StoreError>;

    /// A project's output images for one bucket
    fn list_outputs(
        &self,
        project: &Project,
        bucket: Classification,
    ) -> Result<Vec<OutputImage>, StoreError>;
}

/// The real thing: reads from disk, caches thumbnails under `cache_dir`
#[derive(Debug, Clone)]
pub struct FsImageStore {
    cache_dir: PathBuf,
}

impl FsImageStore {
    pub fn new(cache_dir: PathBuf) -> Self {
        FsImageStore { cache_dir }
    }
}

impl ImageStore for FsImageStore {
    fn list_images(&self, folder: &Path) -> Result<Vec<Image>, StoreError> {
        scan_folder(folder)
    }

    fn thumbnail(&self, path: &Path, size: u32) -> Result<PathBuf, StoreError> {
        generate_thumbnail(path, &ImageId::from_path(path), size, &self.cache_dir)
    }

    fn full_image(&self, path: &Path) -> Result<Vec<u8>, StoreError> {
        Ok(fs::read(path)?)
    }

    fn list_outputs(
        &self,
        project: &Project,
        bucket: Classification,
    ) -> Result<Vec<OutputImage>, StoreError> {
        list_output_images(project, bucket)
    }
}

async fn blocking<T, F>(work: F) -> Result<T, StoreError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, StoreError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| StoreError::Join(e.to_string()))?
}

pub async fn list_images(
    store: Arc<dyn ImageStore>,
    folder: PathBuf,
) -> Result<Vec<Image>, StoreError> {
    blocking(move || store.list_images(&folder)).await
}

pub async fn load_thumbnail(
    store: Arc<dyn ImageStore>,
    path: PathBuf,
    size: u32,
) -> Result<PathBuf, StoreError> {
    blocking(move || store.thumbnail(&path, size)).await
}

pub async fn load_full_image(
    store: Arc<dyn ImageStore>,
    path: PathBuf,
) -> Result<Vec<u8>, StoreError> {
    blocking(move || store.full_image(&path)).await
}

pub async fn list_outputs(
    store: Arc<dyn ImageStore>,
    project: Project,
    bucket: Classification,
) -> Result<Vec<OutputImage>, StoreError> {
    blocking(move || store.list_outputs(&project, bucket)).await
}

/// Source and output counts for every folder of a project
pub async fn load_project_stats(project: Project) -> Result<ProjectStats, StoreError> {
    blocking(move || project_stats(&project)).await
}

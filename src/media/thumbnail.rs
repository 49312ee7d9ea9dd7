use image::{imageops::FilterType, ImageFormat};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use super::StoreError;
use crate::state::data::ImageId;

/// Default size of generated thumbnails (longest edge)
pub const THUMBNAIL_SIZE: u32 = 150;

/// Get the thumbnail cache directory
/// Returns ~/.cache/toss/thumbnails on Linux
pub fn get_thumbnail_cache_dir() -> Result<PathBuf, StoreError> {
    let mut path = dirs_next::cache_dir()
        .or_else(dirs_next::home_dir)
        .ok_or(StoreError::NoCacheDir)?;

    path.push("toss");
    path.push("thumbnails");

    Ok(path)
}

/// Length and modification time of a source file, in hex
///
/// Part of the cache key, so an image rewritten under the same name gets
/// a new thumbnail.
pub fn source_stamp(image_path: &Path) -> Result<String, StoreError> {
    let metadata = fs::metadata(image_path)?;
    let modified = metadata
        .modified()
        .ok()
        .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
        .map_or(0, |elapsed| elapsed.as_nanos());
    Ok(format!("{:x}{:x}", metadata.len(), modified))
}

/// Get the thumbnail path for an image at a given size (doesn't generate)
pub fn thumbnail_path(cache_dir: &Path, image_id: &ImageId, size: u32, stamp: &str) -> PathBuf {
    cache_dir.join(format!("{}_{}_{}.jpg", image_id, size, stamp))
}

/// Generate (or reuse) a thumbnail for an image file.
///
/// The image is scaled to fit in `size`x`size`, keeping its aspect ratio,
/// and cached as JPEG. Returns the path to the cached file.
pub fn generate_thumbnail(
    image_path: &Path,
    image_id: &ImageId,
    size: u32,
    cache_dir: &Path,
) -> Result<PathBuf, StoreError> {
    let cached = thumbnail_path(cache_dir, image_id, size, &source_stamp(image_path)?);

    // Check cache first
    if cached.exists() {
        return Ok(cached);
    }

    let img = image::open(image_path).map_err(|source| StoreError::Decode {
        path: image_path.to_path_buf(),
        source,
    })?;

    let thumbnail = img.resize(size, size, FilterType::Triangle);

    // Ensure cache directory exists
    fs::create_dir_all(cache_dir)?;

    // JPEG has no alpha channel
    thumbnail
        .to_rgb8()
        .save_with_format(&cached, ImageFormat::Jpeg)
        .map_err(|source| StoreError::Decode {
            path: cached.clone(),
            source,
        })?;

    tracing::debug!("Generated thumbnail: {}", cached.display());
    Ok(cached)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_and_reuse() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("wide.png");
        image::RgbaImage::new(400, 200).save(&source).unwrap();
        let cache = dir.path().join("cache");
        let id = ImageId::from_path(&source);
        let stamp = source_stamp(&source).unwrap();

        assert!(!thumbnail_path(&cache, &id, 100, &stamp).exists());
        let path = generate_thumbnail(&source, &id, 100, &cache).unwrap();
        assert_eq!(path, thumbnail_path(&cache, &id, 100, &stamp));

        let (width, height) = image::image_dimensions(&path).unwrap();
        assert_eq!((width, height), (100, 50));

        // An untouched source reuses the cached file
        let written = fs::metadata(&path).unwrap().modified().unwrap();
        assert_eq!(generate_thumbnail(&source, &id, 100, &cache).unwrap(), path);
        assert_eq!(fs::metadata(&path).unwrap().modified().unwrap(), written);
    }

    #[test]
    fn test_rewritten_source_gets_new_thumbnail() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("render.png");
        let cache = dir.path().join("cache");
        let id = ImageId::from_path(&source);

        image::RgbaImage::new(400, 200).save(&source).unwrap();
        let first = generate_thumbnail(&source, &id, 100, &cache).unwrap();

        image::RgbaImage::new(100, 300).save(&source).unwrap();
        let second = generate_thumbnail(&source, &id, 100, &cache).unwrap();

        assert_ne!(first, second);
        let (width, height) = image::image_dimensions(&second).unwrap();
        assert_eq!(height, 100);
        assert!(width < height);
    }

    #[test]
    fn test_undecodable_source() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("broken.png");
        fs::write(&source, b"garbage").unwrap();

        let result = generate_thumbnail(&source, &ImageId::from_path(&source), 64, dir.path());
        assert!(matches!(result, Err(StoreError::Decode { .. })));
    }
}

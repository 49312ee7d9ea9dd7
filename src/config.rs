/// User settings
///
/// Stored as JSON in the user's config directory:
/// - Linux: ~/.config/toss/settings.json
/// - macOS: ~/Library/Application Support/toss/settings.json
/// - Windows: %APPDATA%\toss\settings.json
///
/// Every field is optional in the file; missing ones take their defaults.
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::logging::DEFAULT_LOG_FILTER;
use crate::media::thumbnail::THUMBNAIL_SIZE;
use crate::state::data::{OutputLayout, OutputMode};

/// Thumbnails in the Keep/Maybe gallery
pub const GALLERY_THUMBNAIL_SIZE: u32 = 100;

const MIN_THUMBNAIL_SIZE: u32 = 16;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine user config directory")]
    NoConfigDir,

    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid settings file: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub thumbnail_size: u32,
    pub gallery_thumbnail_size: u32,
    /// Output mode given to newly added folders
    pub default_output_mode: OutputMode,
    /// Layout given to newly created projects
    pub default_output_layout: OutputLayout,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            thumbnail_size: THUMBNAIL_SIZE,
            gallery_thumbnail_size: GALLERY_THUMBNAIL_SIZE,
            default_output_mode: OutputMode::Move,
            default_output_layout: OutputLayout::PerFolder,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Settings {
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let mut path = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        path.push("toss");
        path.push("settings.json");
        Ok(path)
    }

    /// Load from the default location
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_path()?)
    }

    /// Load from `path`; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Settings::default());
        }

        let content = fs::read_to_string(path)?;
        let mut settings: Settings = serde_json::from_str(&content)?;
        settings.thumbnail_size = settings.thumbnail_size.max(MIN_THUMBNAIL_SIZE);
        settings.gallery_thumbnail_size = settings.gallery_thumbnail_size.max(MIN_THUMBNAIL_SIZE);
        Ok(settings)
    }

    #[cfg(test)]
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

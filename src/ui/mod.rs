/// User interface module
///
/// One file per screen, plus keyboard translation and shared widgets.
/// Views only read state; every change goes through `Message`.
use iced::widget::image::Handle;
use std::path::{Path, PathBuf};

pub mod gallery;
pub mod keys;
pub mod project;
pub mod projects;
pub mod review;
pub mod summary;
pub mod triage;
pub mod widgets;

/// The full-size image currently shown (or being loaded)
#[derive(Debug, Clone)]
pub struct Preview {
    pub path: PathBuf,
    /// None while loading
    pub handle: Option<Handle>,
}

impl Preview {
    pub fn handle_for(&self, path: &Path) -> Option<&Handle> {
        if self.path == path {
            self.handle.as_ref()
        } else {
            None
        }
    }
}

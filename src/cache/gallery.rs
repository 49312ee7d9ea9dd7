use std::collections::HashMap;
use std::path::PathBuf;

use tracing::warn;

use super::{LoadStatus, LoadTicket};
use crate::media::scan::OutputImage;
use crate::state::data::{Classification, ImageId};
use crate::triage::navigator::Direction;

/// (project id, bucket)
pub type GalleryKey = (String, Classification);

#[derive(Debug, Clone)]
pub struct GalleryEntry {
    pub status: LoadStatus,
    pub images: Vec<OutputImage>,
    pub selected: usize,
    token: u64,
}

impl GalleryEntry {
    pub fn selected_image(&self) -> Option<&OutputImage> {
        self.images.get(self.selected)
    }

    /// Combined byte size of every image in this tab
    pub fn total_size(&self) -> u64 {
        self.images.iter().map(|output| output.image.size).sum()
    }
}

/// Keep / Maybe gallery tabs of every visited project
#[derive(Debug, Default)]
pub struct GallerySessions {
    entries: HashMap<GalleryKey, GalleryEntry>,
    next_token: u64,
}

impl GallerySessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, project_id: &str, bucket: Classification) -> Option<&GalleryEntry> {
        self.entries.get(&(project_id.to_string(), bucket))
    }

    pub fn needs_load(&self, project_id: &str, bucket: Classification) -> bool {
        self.get(project_id, bucket).is_none()
    }

    /// Start a (re)load of one tab. The selected index survives the
    /// reload and is clamped once the new listing arrives.
    pub fn begin_load(
        &mut self,
        project_id: &str,
        bucket: Classification,
    ) -> LoadTicket<GalleryKey> {
        self.next_token += 1;
        let token = self.next_token;
        let key = (project_id.to_string(), bucket);

        let selected = self.entries.get(&key).map_or(0, |entry| entry.selected);
        self.entries.insert(
            key.clone(),
            GalleryEntry {
                status: LoadStatus::Loading,
                images: Vec::new(),
                selected,
                token,
            },
        );

        LoadTicket { key, token }
    }

    pub fn finish_load(
        &mut self,
        ticket: &LoadTicket<GalleryKey>,
        result: Result<Vec<OutputImage>, String>,
    ) -> bool {
        let Some(entry) = self.current_mut(ticket) else {
            warn!(
                "Dropping stale {} gallery for project {}",
                ticket.key.1.label(),
                ticket.key.0
            );
            return false;
        };

        match result {
            Ok(images) => {
                entry.selected = entry.selected.min(images.len().saturating_sub(1));
                entry.images = images;
                entry.status = LoadStatus::Ready;
            }
            Err(message) => {
                entry.status = LoadStatus::Error(message);
            }
        }
        true
    }

    pub fn apply_thumbnail(
        &mut self,
        ticket: &LoadTicket<GalleryKey>,
        image_id: &ImageId,
        thumbnail: PathBuf,
    ) -> bool {
        let Some(entry) = self.current_mut(ticket) else {
            return false;
        };

        match entry
            .images
            .iter_mut()
            .find(|output| &output.image.id == image_id)
        {
            Some(output) => {
                output.image.thumbnail = Some(thumbnail);
                true
            }
            None => false,
        }
    }

    pub fn select(&mut self, project_id: &str, bucket: Classification, index: usize) {
        if let Some(entry) = self.entries.get_mut(&(project_id.to_string(), bucket)) {
            if !entry.images.is_empty() {
                entry.selected = index.min(entry.images.len() - 1);
            }
        }
    }

    pub fn step(&mut self, project_id: &str, bucket: Classification, direction: Direction) {
        let Some(entry) = self.entries.get_mut(&(project_id.to_string(), bucket)) else {
            return;
        };
        if entry.images.is_empty() {
            return;
        }
        entry.selected = match direction {
            Direction::Back => entry.selected.saturating_sub(1),
            Direction::Forward => (entry.selected + 1).min(entry.images.len() - 1),
        };
    }

    /// Drop both tabs of a project (after a commit changed its outputs)
    pub fn invalidate_project(&mut self, project_id: &str) {
        self.entries.retain(|(project, _), _| project != project_id);
    }

    fn current_mut(&mut self, ticket: &LoadTicket<GalleryKey>) -> Option<&mut GalleryEntry> {
        self.entries
            .get_mut(&ticket.key)
            .filter(|entry| entry.token == ticket.token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::Image;

    fn output(name: &str, size: u64) -> OutputImage {
        OutputImage {
            image: Image::new(PathBuf::from(format!("/out/keep/{}", name)), size, None),
            source_folder_id: "f1".to_string(),
        }
    }

    #[test]
    fn test_tabs_keep_their_own_index() {
        let mut galleries = GallerySessions::new();
        let keep = galleries.begin_load("p1", Classification::Keep);
        let maybe = galleries.begin_load("p1", Classification::Maybe);
        let outputs = vec![output("a.png", 1), output("b.png", 1), output("c.png", 1)];
        galleries.finish_load(&keep, Ok(outputs));
        galleries.finish_load(&maybe, Ok(vec![output("d.png", 1), output("e.png", 1)]));

        galleries.step("p1", Classification::Keep, Direction::Forward);
        galleries.step("p1", Classification::Keep, Direction::Forward);
        galleries.step("p1", Classification::Maybe, Direction::Forward);
        galleries.step("p1", Classification::Maybe, Direction::Forward);

        assert_eq!(galleries.get("p1", Classification::Keep).unwrap().selected, 2);
        assert_eq!(galleries.get("p1", Classification::Maybe).unwrap().selected, 1);
    }

    #[test]
    fn test_reload_clamps_selection() {
        let mut galleries = GallerySessions::new();
        let ticket = galleries.begin_load("p1", Classification::Keep);
        let outputs = vec![output("a.png", 1), output("b.png", 1), output("c.png", 1)];
        galleries.finish_load(&ticket, Ok(outputs));
        galleries.step("p1", Classification::Keep, Direction::Forward);
        galleries.step("p1", Classification::Keep, Direction::Forward);

        let reload = galleries.begin_load("p1", Classification::Keep);
        assert_eq!(galleries.get("p1", Classification::Keep).unwrap().selected, 2);
        galleries.finish_load(&reload, Ok(vec![output("a.png", 1)]));
        assert_eq!(galleries.get("p1", Classification::Keep).unwrap().selected, 0);
    }

    #[test]
    fn test_stale_gallery_result() {
        let mut galleries = GallerySessions::new();
        let old = galleries.begin_load("p1", Classification::Keep);
        let new = galleries.begin_load("p1", Classification::Keep);

        assert!(!galleries.finish_load(&old, Ok(vec![output("old.png", 1)])));
        assert!(galleries.finish_load(&new, Ok(vec![output("new.png", 1)])));

        let id = output("new.png", 1).image.id;
        assert!(!galleries.apply_thumbnail(&old, &id, PathBuf::from("/t.jpg")));
        assert!(galleries.apply_thumbnail(&new, &id, PathBuf::from("/t.jpg")));
    }

    #[test]
    fn test_total_size_and_invalidate() {
        let mut galleries = GallerySessions::new();
        let keep = galleries.begin_load("p1", Classification::Keep);
        galleries.begin_load("p2", Classification::Keep);
        galleries.finish_load(&keep, Ok(vec![output("a.png", 100), output("b.png", 23)]));

        assert_eq!(galleries.get("p1", Classification::Keep).unwrap().total_size(), 123);

        galleries.invalidate_project("p1");
        assert!(galleries.needs_load("p1", Classification::Keep));
        assert!(!galleries.needs_load("p2", Classification::Keep));
    }
}

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::{debug, warn};

use super::{LoadStatus, LoadTicket};
use crate::state::data::{Image, ImageId};
use crate::triage::navigator::Direction;

/// Cached listing of one source folder
#[derive(Debug, Clone)]
pub struct FolderEntry {
    pub status: LoadStatus,
    pub images: Vec<Image>,
    /// Browse filmstrip position
    pub selected: usize,
    token: u64,
}

impl FolderEntry {
    pub fn selected_image(&self) -> Option<&Image> {
        self.images.get(self.selected)
    }
}

/// Folder id -> listing, guarded by load tokens
#[derive(Debug, Default)]
pub struct FolderCache {
    entries: HashMap<String, FolderEntry>,
    next_token: u64,
}

impl FolderCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, folder_id: &str) -> Option<&FolderEntry> {
        self.entries.get(folder_id)
    }

    #[cfg(test)]
    pub fn status(&self, folder_id: &str) -> Option<&LoadStatus> {
        self.entries.get(folder_id).map(|entry| &entry.status)
    }

    /// True if a folder has no entry yet (or was invalidated)
    pub fn needs_load(&self, folder_id: &str) -> bool {
        !self.entries.contains_key(folder_id)
    }

    /// Start a (re)load. Any result still in flight for this folder
    /// becomes stale.
    pub fn begin_load(&mut self, folder_id: &str) -> LoadTicket<String> {
        self.next_token += 1;
        let token = self.next_token;

        self.entries.insert(
            folder_id.to_string(),
            FolderEntry {
                status: LoadStatus::Loading,
                images: Vec::new(),
                selected: 0,
                token,
            },
        );

        LoadTicket {
            key: folder_id.to_string(),
            token,
        }
    }

    #[cfg(test)]
    pub fn is_current(&self, ticket: &LoadTicket<String>) -> bool {
        self.entries
            .get(&ticket.key)
            .is_some_and(|entry| entry.token == ticket.token)
    }

    /// Store a listing result. Returns false if the ticket is stale.
    pub fn finish_load(
        &mut self,
        ticket: &LoadTicket<String>,
        result: Result<Vec<Image>, String>,
    ) -> bool {
        let Some(entry) = self.current_mut(ticket) else {
            warn!("Dropping stale listing for folder {}", ticket.key);
            return false;
        };

        match result {
            Ok(images) => {
                debug!("Folder {} listed: {} images", ticket.key, images.len());
                entry.images = images;
                entry.status = LoadStatus::Ready;
            }
            Err(message) => {
                entry.images.clear();
                entry.status = LoadStatus::Error(message);
            }
        }
        true
    }

    /// Patch one image's thumbnail. Returns false if stale or unknown.
    pub fn apply_thumbnail(
        &mut self,
        ticket: &LoadTicket<String>,
        image_id: &ImageId,
        thumbnail: PathBuf,
    ) -> bool {
        let Some(entry) = self.current_mut(ticket) else {
            debug!("Dropping stale thumbnail for folder {}", ticket.key);
            return false;
        };

        match entry.images.iter_mut().find(|image| &image.id == image_id) {
            Some(image) => {
                image.thumbnail = Some(thumbnail);
                true
            }
            None => false,
        }
    }

    /// Forget a folder so the next visit reloads it
    pub fn invalidate(&mut self, folder_id: &str) {
        self.entries.remove(folder_id);
    }

    pub fn select(&mut self, folder_id: &str, index: usize) {
        if let Some(entry) = self.entries.get_mut(folder_id) {
            if !entry.images.is_empty() {
                entry.selected = index.min(entry.images.len() - 1);
            }
        }
    }

    pub fn step(&mut self, folder_id: &str, direction: Direction) {
        let Some(entry) = self.entries.get(folder_id) else {
            return;
        };
        let index = match direction {
            Direction::Back => entry.selected.saturating_sub(1),
            Direction::Forward => entry.selected + 1,
        };
        self.select(folder_id, index);
    }

    fn current_mut(&mut self, ticket: &LoadTicket<String>) -> Option<&mut FolderEntry> {
        self.entries
            .get_mut(&ticket.key)
            .filter(|entry| entry.token == ticket.token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(name: &str) -> Image {
        Image::new(PathBuf::from(format!("/src/{}", name)), 10, None)
    }

    #[test]
    fn test_load_lifecycle() {
        let mut cache = FolderCache::new();
        assert!(cache.needs_load("f1"));

        let ticket = cache.begin_load("f1");
        assert_eq!(cache.status("f1"), Some(&LoadStatus::Loading));

        assert!(cache.finish_load(&ticket, Ok(vec![image("a.png"), image("b.png")])));
        assert_eq!(cache.status("f1"), Some(&LoadStatus::Ready));
        assert_eq!(cache.get("f1").unwrap().images.len(), 2);
        assert!(!cache.needs_load("f1"));
    }

    #[test]
    fn test_error_only_affects_its_entry() {
        let mut cache = FolderCache::new();
        let good = cache.begin_load("good");
        let bad = cache.begin_load("bad");

        cache.finish_load(&good, Ok(vec![image("a.png")]));
        cache.finish_load(&bad, Err("folder not found".to_string()));

        assert_eq!(cache.status("good"), Some(&LoadStatus::Ready));
        assert_eq!(
            cache.status("bad"),
            Some(&LoadStatus::Error("folder not found".to_string()))
        );
    }

    #[test]
    fn test_stale_results_are_dropped() {
        let mut cache = FolderCache::new();
        let first = cache.begin_load("f1");
        let second = cache.begin_load("f1");
        assert!(!cache.is_current(&first));

        assert!(!cache.finish_load(&first, Ok(vec![image("old.png")])));
        assert_eq!(cache.status("f1"), Some(&LoadStatus::Loading));

        assert!(cache.finish_load(&second, Ok(vec![image("new.png")])));
        let a = cache.get("f1").unwrap().images[0].id.clone();
        assert!(!cache.apply_thumbnail(&first, &a, PathBuf::from("/thumb.jpg")));
        assert_eq!(cache.get("f1").unwrap().images[0].thumbnail, None);
    }

    #[test]
    fn test_thumbnail_patches_only_its_image() {
        let mut cache = FolderCache::new();
        let ticket = cache.begin_load("f1");
        cache.finish_load(&ticket, Ok(vec![image("a.png"), image("b.png")]));

        let b = image("b.png").id;
        assert!(cache.apply_thumbnail(&ticket, &b, PathBuf::from("/cache/b.jpg")));

        let entry = cache.get("f1").unwrap();
        assert_eq!(entry.images[0].thumbnail, None);
        assert_eq!(entry.images[1].thumbnail, Some(PathBuf::from("/cache/b.jpg")));

        let unknown = ImageId::from("ffff");
        assert!(!cache.apply_thumbnail(&ticket, &unknown, PathBuf::from("/x.jpg")));
    }

    #[test]
    fn test_invalidate_makes_results_stale() {
        let mut cache = FolderCache::new();
        let ticket = cache.begin_load("f1");
        cache.invalidate("f1");

        assert!(cache.needs_load("f1"));
        assert!(!cache.finish_load(&ticket, Ok(vec![image("a.png")])));
        assert!(cache.get("f1").is_none());
    }

    #[test]
    fn test_selection_is_clamped_and_reset_on_reload() {
        let mut cache = FolderCache::new();
        let ticket = cache.begin_load("f1");
        cache.finish_load(&ticket, Ok(vec![image("a.png"), image("b.png")]));

        cache.step("f1", Direction::Forward);
        cache.step("f1", Direction::Forward);
        assert_eq!(cache.get("f1").unwrap().selected, 1);
        cache.step("f1", Direction::Back);
        cache.step("f1", Direction::Back);
        assert_eq!(cache.get("f1").unwrap().selected, 0);

        cache.select("f1", 9);
        assert_eq!(cache.get("f1").unwrap().selected_image().unwrap().name, "b.png");

        cache.begin_load("f1");
        assert_eq!(cache.get("f1").unwrap().selected, 0);
    }

    #[tokio::test]
    async fn test_out_of_order_completion() {
        let mut cache = FolderCache::new();
        let slow = cache.begin_load("f1");
        let fast = cache.begin_load("f1");

        let slow_task = tokio::spawn(async move {
            tokio::task::yield_now().await;
            (slow, vec![image("slow.png")])
        });
        let fast_task = tokio::spawn(async move { (fast, vec![image("fast.png")]) });

        let (fast, fast_images) = fast_task.await.unwrap();
        assert!(cache.finish_load(&fast, Ok(fast_images)));

        let (slow, slow_images) = slow_task.await.unwrap();
        assert!(!cache.finish_load(&slow, Ok(slow_images)));

        assert_eq!(cache.get("f1").unwrap().images[0].name, "fast.png");
    }
}

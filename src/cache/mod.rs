pub mod folder;
pub mod gallery;

pub use folder::FolderCache;
pub use gallery::GallerySessions;

/// Identifies one load of one cache key.
///
/// Each load gets a fresh token. Results come back tagged with the
/// ticket that requested them and are dropped if a newer load for the
/// same key has started since.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket<K> {
    pub key: K,
    pub token: u64,
}

/// Load state of a cache entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Loading,
    Ready,
    Error(String),
}

impl LoadStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, LoadStatus::Ready)
    }
}

/// State management module
///
/// This module handles the persistent application state:
/// - The SQLite project catalog (catalog.rs)
/// - Shared data structures (data.rs)
///
/// Triage decisions are not persisted; they live in `triage::TriageSession`.

pub mod catalog;
pub mod data;

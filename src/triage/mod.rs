/// Triage core
///
/// This module holds the state machine for sorting a folder:
/// - The classification ledger and its ordered buckets (ledger.rs)
/// - The one-at-a-time cursor (cursor.rs)
/// - Press/release key gestures (gesture.rs)
/// - Review grid navigation and batch moves (navigator.rs)
/// - The per-folder session tying them together (session.rs)
/// - Committing a session through the executor (commit.rs)

pub mod commit;
pub mod cursor;
pub mod gesture;
pub mod input;
pub mod ledger;
pub mod navigator;
pub mod session;

pub use session::{Phase, TriageSession};

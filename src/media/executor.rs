/// Triage executor: carries out a committed plan on disk.
///
/// Keeps and maybes are moved or copied into the project's output folders,
/// yeets go to the OS trash. Name collisions are resolved by renaming
/// (`name_1.png`, `name_2.png`, ...) and reported back as conflicts.
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, error, warn};

use super::metadata::{read_output_metadata, write_output_metadata, OutputMetadata};
use crate::state::data::{Classification, OutputLayout, OutputMode};
use crate::triage::commit::TriagePlan;

/// Give up renaming after this many attempts
const MAX_RENAME_ATTEMPTS: u32 = 1000;

/// A file that could not keep its name in the destination folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub source: PathBuf,
    pub destination: PathBuf,
}

#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error("source folder not found: {}", .0.display())]
    SourceMissing(PathBuf),

    #[error("failed to create {}: {source}", path.display())]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("failed to {verb} {}: {source}", path.display())]
    Transfer {
        verb: &'static str,
        path: PathBuf,
        source: io::Error,
    },

    #[error("no free name for {} after {} attempts", path.display(), MAX_RENAME_ATTEMPTS)]
    NoFreeName { path: PathBuf },

    #[error("failed to trash {}: {message}", path.display())]
    Trash { path: PathBuf, message: String },

    #[error("failed to update output metadata: {0}")]
    Metadata(String),

    #[error("background task failed: {0}")]
    Join(String),
}

pub trait TriageExecutor: Send + Sync {
    fn execute(&self, plan: &TriagePlan) -> Result<Vec<Conflict>, ExecuteError>;
}

/// Where yeeted files go
pub trait Trash: Send + Sync {
    fn delete(&self, path: &Path) -> Result<(), String>;
}

/// The operating system's trash / recycle bin
#[derive(Debug, Clone, Copy, Default)]
pub struct OsTrash;

impl Trash for OsTrash {
    fn delete(&self, path: &Path) -> Result<(), String> {
        trash::delete(path).map_err(|e| e.to_string())
    }
}

#[derive(Debug, Clone, Default)]
pub struct FsExecutor<T = OsTrash> {
    trash: T,
}

impl FsExecutor<OsTrash> {
    pub fn new() -> Self {
        FsExecutor { trash: OsTrash }
    }
}

#[cfg(test)]
impl<T: Trash> FsExecutor<T> {
    pub fn with_trash(trash: T) -> Self {
        FsExecutor { trash }
    }
}

/// Output folder for a bucket under the plan's layout
pub fn output_dir(plan: &TriagePlan, bucket: Classification) -> PathBuf {
    match plan.output_layout {
        OutputLayout::Unified => plan.project_path.join(bucket.dir_name()),
        OutputLayout::PerFolder => plan
            .project_path
            .join(&plan.folder_name)
            .join(bucket.dir_name()),
    }
}

/// First free name in `dest_dir`: `name`, then `stem_1.ext`, `stem_2.ext`, ...
///
/// Returns None once `MAX_RENAME_ATTEMPTS` candidates are all taken.
pub fn resolve_filename_conflict(dest_dir: &Path, original_name: &str) -> Option<String> {
    if !dest_dir.join(original_name).exists() {
        return Some(original_name.to_string());
    }

    let path = Path::new(original_name);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(original_name);
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    (1..=MAX_RENAME_ATTEMPTS)
        .map(|counter| {
            if ext.is_empty() {
                format!("{}_{}", stem, counter)
            } else {
                format!("{}_{}.{}", stem, counter, ext)
            }
        })
        .find(|name| !dest_dir.join(name).exists())
}

/// True if `existing` already holds the same bytes as `src`
fn same_contents(src: &Path, existing: &Path) -> bool {
    let (Ok(a), Ok(b)) = (fs::metadata(src), fs::metadata(existing)) else {
        return false;
    };
    if a.len() != b.len() {
        return false;
    }
    matches!((fs::read(src), fs::read(existing)), (Ok(a), Ok(b)) if a == b)
}

fn transfer(src: &Path, dest: &Path, mode: OutputMode) -> Result<(), ExecuteError> {
    let result = match mode {
        OutputMode::Copy => fs::copy(src, dest).map(|_| ()),
        // rename fails across file systems; fall back to copy + remove
        OutputMode::Move => fs::rename(src, dest).or_else(|_| {
            fs::copy(src, dest)?;
            fs::remove_file(src)
        }),
    };

    result.map_err(|source| ExecuteError::Transfer {
        verb: mode.as_str(),
        path: src.to_path_buf(),
        source,
    })
}

/// Move or copy keeps and maybes into their output folders.
///
/// Files that already left the source folder (a Move retried after a
/// partial failure) are skipped, as are Copy sources whose identical
/// copy is already in place.
fn transfer_outputs(
    plan: &TriagePlan,
    mut metadata: Option<&mut OutputMetadata>,
    conflicts: &mut Vec<Conflict>,
) -> Result<(), ExecuteError> {
    for (bucket, files) in [
        (Classification::Keep, &plan.keep),
        (Classification::Maybe, &plan.maybe),
    ] {
        let dir = output_dir(plan, bucket);
        fs::create_dir_all(&dir).map_err(|source| ExecuteError::CreateDir {
            path: dir.clone(),
            source,
        })?;

        for src in files {
            let Some(file_name) = src.file_name() else {
                warn!("Skipping path without a file name: {}", src.display());
                continue;
            };
            let file_name = file_name.to_string_lossy().to_string();

            if !src.exists() {
                warn!("{} is no longer in the source folder, skipping", src.display());
                continue;
            }
            let copied = plan.output_mode == OutputMode::Copy
                && same_contents(src, &dir.join(&file_name));
            if copied {
                debug!("{} already copied, skipping", src.display());
                continue;
            }

            let final_name = resolve_filename_conflict(&dir, &file_name)
                .ok_or_else(|| ExecuteError::NoFreeName { path: src.clone() })?;
            let dest = dir.join(&final_name);

            if final_name != file_name {
                debug!("{} renamed to {}", src.display(), dest.display());
                conflicts.push(Conflict {
                    source: src.clone(),
                    destination: dest.clone(),
                });
            }

            transfer(src, &dest, plan.output_mode)?;

            if let Some(metadata) = metadata.as_deref_mut() {
                metadata
                    .file_origins
                    .insert(final_name, plan.folder_id.clone());
            }
        }
    }
    Ok(())
}

impl<T: Trash> TriageExecutor for FsExecutor<T> {
    fn execute(&self, plan: &TriagePlan) -> Result<Vec<Conflict>, ExecuteError> {
        if !plan.source_path.is_dir() {
            return Err(ExecuteError::SourceMissing(plan.source_path.clone()));
        }

        let mut metadata = if plan.output_layout == OutputLayout::Unified {
            Some(
                read_output_metadata(&plan.project_path)
                    .map_err(|e| ExecuteError::Metadata(e.to_string()))?,
            )
        } else {
            None
        };

        let mut conflicts = Vec::new();
        let transferred = transfer_outputs(plan, metadata.as_mut(), &mut conflicts);

        // Origins of files moved before a failure are recorded too
        let written = metadata
            .as_ref()
            .map(|metadata| write_output_metadata(&plan.project_path, metadata))
            .transpose()
            .map_err(|e| ExecuteError::Metadata(e.to_string()));
        if let (Err(e), Err(_)) = (&written, &transferred) {
            error!("{}", e);
        }
        transferred?;
        written?;

        // Yeets go to the trash regardless of move/copy mode
        for path in &plan.yeet {
            if !path.exists() {
                warn!("{} is already gone, not trashing", path.display());
                continue;
            }
            self.trash
                .delete(path)
                .map_err(|message| ExecuteError::Trash {
                    path: path.clone(),
                    message,
                })?;
        }

        Ok(conflicts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingTrash {
        deleted: Mutex<Vec<PathBuf>>,
    }

    impl Trash for &RecordingTrash {
        fn delete(&self, path: &Path) -> Result<(), String> {
            self.deleted.lock().unwrap().push(path.to_path_buf());
            Ok(())
        }
    }

    struct Fixture {
        _dir: tempfile::TempDir,
        source: PathBuf,
        project: PathBuf,
    }

    fn fixture(names: &[&str]) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("batch");
        let project = dir.path().join("project");
        fs::create_dir_all(&source).unwrap();
        fs::create_dir_all(&project).unwrap();
        for name in names {
            fs::write(source.join(name), name.as_bytes()).unwrap();
        }
        Fixture {
            _dir: dir,
            source,
            project,
        }
    }

    fn plan(fx: &Fixture, layout: OutputLayout, mode: OutputMode) -> TriagePlan {
        TriagePlan {
            project_path: fx.project.clone(),
            output_layout: layout,
            folder_id: "f1".to_string(),
            folder_name: "batch".to_string(),
            source_path: fx.source.clone(),
            output_mode: mode,
            keep: vec![fx.source.join("a.png"), fx.source.join("b.png")],
            maybe: vec![fx.source.join("c.png")],
            yeet: vec![fx.source.join("d.png")],
        }
    }

    #[test]
    fn test_resolve_filename_conflict() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(resolve_filename_conflict(dir.path(), "a.png").as_deref(), Some("a.png"));

        fs::write(dir.path().join("a.png"), b"").unwrap();
        fs::write(dir.path().join("a_1.png"), b"").unwrap();
        assert_eq!(resolve_filename_conflict(dir.path(), "a.png").as_deref(), Some("a_2.png"));

        fs::write(dir.path().join("README"), b"").unwrap();
        assert_eq!(resolve_filename_conflict(dir.path(), "README").as_deref(), Some("README_1"));
    }

    #[test]
    fn test_exhausted_names_never_overwrite() {
        let fx = fixture(&["a.png"]);
        let keep = fx.project.join("batch").join("keep");
        fs::create_dir_all(&keep).unwrap();
        fs::write(keep.join("a.png"), b"taken").unwrap();
        for n in 1..=MAX_RENAME_ATTEMPTS {
            fs::write(keep.join(format!("a_{}.png", n)), b"taken").unwrap();
        }
        assert_eq!(resolve_filename_conflict(&keep, "a.png"), None);

        let mut plan = plan(&fx, OutputLayout::PerFolder, OutputMode::Copy);
        plan.keep = vec![fx.source.join("a.png")];
        plan.maybe.clear();
        plan.yeet.clear();

        let trash = RecordingTrash::default();
        let result = FsExecutor::with_trash(&trash).execute(&plan);
        assert!(matches!(result, Err(ExecuteError::NoFreeName { .. })));
        assert_eq!(fs::read(keep.join("a_1000.png")).unwrap(), b"taken");
        assert_eq!(fs::read(keep.join("a.png")).unwrap(), b"taken");
    }

    #[test]
    fn test_per_folder_copy() {
        let fx = fixture(&["a.png", "b.png", "c.png", "d.png"]);
        let trash = RecordingTrash::default();
        let executor = FsExecutor::with_trash(&trash);

        let conflicts = executor
            .execute(&plan(&fx, OutputLayout::PerFolder, OutputMode::Copy))
            .unwrap();

        assert!(conflicts.is_empty());
        let out = fx.project.join("batch");
        assert!(out.join("keep").join("a.png").is_file());
        assert!(out.join("keep").join("b.png").is_file());
        assert!(out.join("maybe").join("c.png").is_file());
        // Copy leaves the sources in place
        assert!(fx.source.join("a.png").is_file());
        assert_eq!(*trash.deleted.lock().unwrap(), vec![fx.source.join("d.png")]);
    }

    #[test]
    fn test_unified_move_renames_and_records_origins() {
        let fx = fixture(&["a.png", "b.png", "c.png", "d.png"]);
        let keep = fx.project.join("keep");
        fs::create_dir_all(&keep).unwrap();
        fs::write(keep.join("a.png"), b"older").unwrap();

        let trash = RecordingTrash::default();
        let executor = FsExecutor::with_trash(&trash);
        let conflicts = executor
            .execute(&plan(&fx, OutputLayout::Unified, OutputMode::Move))
            .unwrap();

        assert_eq!(
            conflicts,
            vec![Conflict {
                source: fx.source.join("a.png"),
                destination: keep.join("a_1.png"),
            }]
        );
        assert_eq!(fs::read(keep.join("a.png")).unwrap(), b"older");
        assert_eq!(fs::read(keep.join("a_1.png")).unwrap(), b"a.png");
        assert!(!fx.source.join("a.png").exists());
        assert!(fx.project.join("maybe").join("c.png").is_file());

        let metadata = read_output_metadata(&fx.project).unwrap();
        assert_eq!(metadata.file_origins.get("a_1.png").map(String::as_str), Some("f1"));
        assert_eq!(metadata.file_origins.get("c.png").map(String::as_str), Some("f1"));
        assert!(!metadata.file_origins.contains_key("a.png"));
    }

    #[test]
    fn test_missing_source_folder() {
        let fx = fixture(&[]);
        let mut plan = plan(&fx, OutputLayout::PerFolder, OutputMode::Copy);
        plan.source_path = fx.project.join("gone");

        let trash = RecordingTrash::default();
        let result = FsExecutor::with_trash(&trash).execute(&plan);
        assert!(matches!(result, Err(ExecuteError::SourceMissing(_))));
        assert!(trash.deleted.lock().unwrap().is_empty());
    }

    struct FailingTrash;

    impl Trash for FailingTrash {
        fn delete(&self, _path: &Path) -> Result<(), String> {
            Err("trash unavailable".to_string())
        }
    }

    #[test]
    fn test_move_can_be_retried_after_failure() {
        let fx = fixture(&["a.png", "b.png", "c.png", "d.png"]);
        let plan = plan(&fx, OutputLayout::Unified, OutputMode::Move);

        let first = FsExecutor::with_trash(FailingTrash).execute(&plan);
        assert!(matches!(first, Err(ExecuteError::Trash { .. })));
        assert!(!fx.source.join("a.png").exists());
        assert!(fx.source.join("d.png").exists());

        let trash = RecordingTrash::default();
        let conflicts = FsExecutor::with_trash(&trash).execute(&plan).unwrap();

        assert!(conflicts.is_empty());
        let keep = fx.project.join("keep");
        assert!(keep.join("a.png").is_file());
        assert!(!keep.join("a_1.png").exists());
        assert_eq!(*trash.deleted.lock().unwrap(), vec![fx.source.join("d.png")]);

        let metadata = read_output_metadata(&fx.project).unwrap();
        assert_eq!(metadata.file_origins.get("b.png").map(String::as_str), Some("f1"));
    }

    #[test]
    fn test_partial_copy_records_origins_and_retries_cleanly() {
        let fx = fixture(&["a.png", "b.png"]);
        // A directory where a file is expected makes the copy fail midway
        fs::create_dir_all(fx.source.join("broken.png")).unwrap();

        let mut plan = plan(&fx, OutputLayout::Unified, OutputMode::Copy);
        plan.keep = vec![
            fx.source.join("a.png"),
            fx.source.join("broken.png"),
            fx.source.join("b.png"),
        ];
        plan.maybe.clear();
        plan.yeet.clear();

        let trash = RecordingTrash::default();
        let executor = FsExecutor::with_trash(&trash);
        let first = executor.execute(&plan);
        assert!(matches!(first, Err(ExecuteError::Transfer { .. })));

        let metadata = read_output_metadata(&fx.project).unwrap();
        assert_eq!(metadata.file_origins.get("a.png").map(String::as_str), Some("f1"));
        assert!(!metadata.file_origins.contains_key("b.png"));

        fs::remove_dir(fx.source.join("broken.png")).unwrap();
        fs::write(fx.source.join("broken.png"), b"fixed").unwrap();

        let conflicts = executor.execute(&plan).unwrap();
        assert!(conflicts.is_empty());
        let keep = fx.project.join("keep");
        assert!(keep.join("broken.png").is_file());
        assert!(keep.join("b.png").is_file());
        assert!(!keep.join("a_1.png").exists());
    }
}

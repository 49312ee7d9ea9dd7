/// Final step of a session: hand the three ordered path lists to the executor.
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::media::executor::{Conflict, ExecuteError, TriageExecutor};
use crate::state::data::{OutputLayout, OutputMode};

/// Everything the executor needs to carry out a session's decisions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriagePlan {
    pub project_path: PathBuf,
    pub output_layout: OutputLayout,
    pub folder_id: String,
    pub folder_name: String,
    pub source_path: PathBuf,
    pub output_mode: OutputMode,
    pub keep: Vec<PathBuf>,
    pub maybe: Vec<PathBuf>,
    pub yeet: Vec<PathBuf>,
}

impl TriagePlan {
    pub fn total(&self) -> usize {
        self.keep.len() + self.maybe.len() + self.yeet.len()
    }
}

/// What the user sees after a successful commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSummary {
    pub keep: usize,
    pub maybe: usize,
    pub yeet: usize,
    pub conflicts: Vec<Conflict>,
}

impl CommitSummary {
    pub fn total(&self) -> usize {
        self.keep + self.maybe + self.yeet
    }
}

/// Run the executor off the UI thread.
///
/// On error the caller keeps its session untouched so the user can retry.
pub async fn commit(
    executor: Arc<dyn TriageExecutor>,
    plan: TriagePlan,
) -> Result<CommitSummary, ExecuteError> {
    let (keep, maybe, yeet) = (plan.keep.len(), plan.maybe.len(), plan.yeet.len());
    let folder = plan.source_path.clone();
    debug!("Committing {} images from {}", plan.total(), folder.display());

    let conflicts = tokio::task::spawn_blocking(move || executor.execute(&plan))
        .await
        .map_err(|e| ExecuteError::Join(e.to_string()))?;

    match conflicts {
        Ok(conflicts) => {
            info!(
                "Triage committed for {}: {} keep, {} maybe, {} yeet, {} renamed",
                folder.display(),
                keep,
                maybe,
                yeet,
                conflicts.len()
            );
            Ok(CommitSummary {
                keep,
                maybe,
                yeet,
                conflicts,
            })
        }
        Err(err) => {
            error!("Triage commit failed for {}: {}", folder.display(), err);
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingExecutor {
        seen: Mutex<Vec<TriagePlan>>,
        fail: bool,
    }

    impl TriageExecutor for RecordingExecutor {
        fn execute(&self, plan: &TriagePlan) -> Result<Vec<Conflict>, ExecuteError> {
            self.seen.lock().unwrap().push(plan.clone());
            if self.fail {
                return Err(ExecuteError::SourceMissing(plan.source_path.clone()));
            }
            Ok(vec![Conflict {
                source: plan.keep[0].clone(),
                destination: PathBuf::from("/out/keep/a_1.png"),
            }])
        }
    }

    fn plan() -> TriagePlan {
        TriagePlan {
            project_path: PathBuf::from("/out"),
            output_layout: OutputLayout::Unified,
            folder_id: "f1".to_string(),
            folder_name: "batch".to_string(),
            source_path: PathBuf::from("/renders/batch"),
            output_mode: OutputMode::Move,
            keep: vec![PathBuf::from("/renders/batch/a.png")],
            maybe: vec![],
            yeet: vec![PathBuf::from("/renders/batch/b.png")],
        }
    }

    #[tokio::test]
    async fn test_commit_reports_counts_and_conflicts() {
        let executor = Arc::new(RecordingExecutor {
            seen: Mutex::new(Vec::new()),
            fail: false,
        });

        let summary = commit(executor.clone(), plan()).await.unwrap();
        assert_eq!((summary.keep, summary.maybe, summary.yeet), (1, 0, 1));
        assert_eq!(summary.total(), 2);
        assert_eq!(summary.conflicts.len(), 1);
        assert_eq!(executor.seen.lock().unwrap()[0], plan());
    }

    #[tokio::test]
    async fn test_commit_failure_is_returned() {
        let executor = Arc::new(RecordingExecutor {
            seen: Mutex::new(Vec::new()),
            fail: true,
        });

        let result = commit(executor, plan()).await;
        assert!(matches!(result, Err(ExecuteError::SourceMissing(_))));
    }
}

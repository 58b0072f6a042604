//! Task Tracking
//!
//! Bookkeeping for the capability calls a run has in flight. Every spawned
//! call is tracked under the run that issued it, so the conductor can tell
//! which calls are still outstanding and which belong to a superseded run.
//!
//! # Cancellation
//!
//! Superseding a run never aborts its tasks. Their handles are kept until the
//! run falls out of the history window; the tasks finish on their own and
//! their completions are dropped by the conductor's run-id check. Dropping a
//! `JoinHandle` detaches the task rather than cancelling it.

use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use crate::concept::EnrichmentKind;
use crate::messages::RunId;

/// Default number of runs kept in the history window
pub const DEFAULT_RUN_HISTORY: usize = 8;

/// Which capability call a task performs
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskKind {
    /// Primary concept generation
    Primary,
    /// One of the enrichments
    Enrichment(EnrichmentKind),
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => f.write_str("primary"),
            Self::Enrichment(kind) => kind.fmt(f),
        }
    }
}

/// Status of a tracked task
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    /// In flight
    Pending,
    /// Completion applied by the conductor
    Done,
    /// Belongs to a superseded run; left to finish, result discarded
    Superseded,
}

impl TaskStatus {
    /// Get a status icon (for UI display)
    #[must_use]
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Pending => "...",
            Self::Done => "[+]",
            Self::Superseded => "[x]",
        }
    }

    /// Human-readable label
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Done => "Done",
            Self::Superseded => "Superseded",
        }
    }

    /// Whether the conductor is done with this task
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Superseded)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One spawned capability call
#[derive(Debug)]
pub struct TrackedTask {
    /// What the task does
    pub kind: TaskKind,
    /// Current status
    pub status: TaskStatus,
    /// When the task was spawned
    pub dispatched_at: Instant,
    /// Time from dispatch to completion, once applied
    pub elapsed: Option<Duration>,
    handle: JoinHandle<()>,
}

impl TrackedTask {
    fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

#[derive(Debug)]
struct RunTasks {
    run_id: RunId,
    tasks: Vec<TrackedTask>,
}

/// Task handles keyed by run
#[derive(Debug)]
pub struct EnrichmentTasks {
    runs: VecDeque<RunTasks>,
    history: usize,
}

impl Default for EnrichmentTasks {
    fn default() -> Self {
        Self::new(DEFAULT_RUN_HISTORY)
    }
}

impl EnrichmentTasks {
    /// Create a tracker remembering up to `history` runs
    #[must_use]
    pub fn new(history: usize) -> Self {
        Self {
            runs: VecDeque::new(),
            history: history.max(1),
        }
    }

    fn run_mut(&mut self, run_id: RunId) -> Option<&mut RunTasks> {
        self.runs.iter_mut().find(|r| r.run_id == run_id)
    }

    fn run(&self, run_id: RunId) -> Option<&RunTasks> {
        self.runs.iter().find(|r| r.run_id == run_id)
    }

    fn task_mut(&mut self, run_id: RunId, kind: TaskKind) -> Option<&mut TrackedTask> {
        self.run_mut(run_id)?
            .tasks
            .iter_mut()
            .find(|t| t.kind == kind)
    }

    /// Record a freshly spawned task
    pub fn track(&mut self, run_id: RunId, kind: TaskKind, handle: JoinHandle<()>) {
        let task = TrackedTask {
            kind,
            status: TaskStatus::Pending,
            dispatched_at: Instant::now(),
            elapsed: None,
            handle,
        };

        if let Some(run) = self.run_mut(run_id) {
            run.tasks.push(task);
            return;
        }

        self.runs.push_back(RunTasks {
            run_id,
            tasks: vec![task],
        });
        while self.runs.len() > self.history {
            if let Some(old) = self.runs.pop_front() {
                let detached = old.tasks.iter().filter(|t| !t.is_finished()).count();
                tracing::trace!(run_id = %old.run_id, detached, "Forgetting run tasks");
            }
        }
    }

    /// Mark a task's completion as applied, returning its run time
    ///
    /// Returns `None` if the task is unknown or was already terminal.
    pub fn complete(&mut self, run_id: RunId, kind: TaskKind) -> Option<Duration> {
        let task = self.task_mut(run_id, kind)?;
        if task.status != TaskStatus::Pending {
            return None;
        }
        let elapsed = task.dispatched_at.elapsed();
        task.status = TaskStatus::Done;
        task.elapsed = Some(elapsed);
        Some(elapsed)
    }

    /// Mark every pending task of a run as superseded
    ///
    /// Returns how many tasks were still in flight.
    pub fn supersede(&mut self, run_id: RunId) -> usize {
        let Some(run) = self.run_mut(run_id) else {
            return 0;
        };
        let mut count = 0;
        for task in run.tasks.iter_mut().filter(|t| t.status == TaskStatus::Pending) {
            task.status = TaskStatus::Superseded;
            count += 1;
        }
        count
    }

    /// Status of a run's task
    #[must_use]
    pub fn status(&self, run_id: RunId, kind: TaskKind) -> Option<TaskStatus> {
        self.run(run_id)?
            .tasks
            .iter()
            .find(|t| t.kind == kind)
            .map(|t| t.status)
    }

    /// Tasks of a run that are still pending
    #[must_use]
    pub fn pending(&self, run_id: RunId) -> Vec<TaskKind> {
        self.run(run_id)
            .map(|r| {
                r.tasks
                    .iter()
                    .filter(|t| t.status == TaskStatus::Pending)
                    .map(|t| t.kind)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// All tracked tasks of a run
    pub fn tasks(&self, run_id: RunId) -> impl Iterator<Item = &TrackedTask> {
        self.run(run_id).into_iter().flat_map(|r| r.tasks.iter())
    }

    /// Number of runs in the history window
    #[must_use]
    pub fn run_count(&self) -> usize {
        self.runs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idle_handle() -> JoinHandle<()> {
        tokio::spawn(async {})
    }

    #[test]
    fn test_task_status_labels() {
        assert_eq!(TaskStatus::Pending.icon(), "...");
        assert_eq!(TaskStatus::Superseded.to_string(), "Superseded");
        assert!(TaskStatus::Done.is_terminal());
        assert!(!TaskStatus::Pending.is_terminal());
    }

    #[test]
    fn test_task_kind_display() {
        assert_eq!(TaskKind::Primary.to_string(), "primary");
        assert_eq!(
            TaskKind::Enrichment(EnrichmentKind::MoodBoard).to_string(),
            "mood board"
        );
    }

    #[tokio::test]
    async fn test_complete_once() {
        let mut tasks = EnrichmentTasks::default();
        let run = RunId(1);
        tasks.track(run, TaskKind::Primary, idle_handle());

        assert!(tasks.complete(run, TaskKind::Primary).is_some());
        assert!(tasks.complete(run, TaskKind::Primary).is_none());
        assert_eq!(tasks.status(run, TaskKind::Primary), Some(TaskStatus::Done));
    }

    #[tokio::test]
    async fn test_supersede_marks_only_pending() {
        let mut tasks = EnrichmentTasks::default();
        let run = RunId(1);
        let leads = TaskKind::Enrichment(EnrichmentKind::Leads);
        let board = TaskKind::Enrichment(EnrichmentKind::MoodBoard);
        tasks.track(run, leads, idle_handle());
        tasks.track(run, board, idle_handle());
        tasks.complete(run, leads);

        assert_eq!(tasks.supersede(run), 1);
        assert_eq!(tasks.status(run, leads), Some(TaskStatus::Done));
        assert_eq!(tasks.status(run, board), Some(TaskStatus::Superseded));
        assert!(tasks.pending(run).is_empty());
        assert!(tasks.complete(run, board).is_none());
    }

    #[tokio::test]
    async fn test_history_window() {
        let mut tasks = EnrichmentTasks::new(2);
        for n in 1..=3 {
            tasks.track(RunId(n), TaskKind::Primary, idle_handle());
        }
        assert_eq!(tasks.run_count(), 2);
        assert!(tasks.status(RunId(1), TaskKind::Primary).is_none());
        assert_eq!(tasks.pending(RunId(3)), vec![TaskKind::Primary]);
    }
}

use std::sync::Arc;

use taskus_core::{
    collection::{Outcome, Rejection, Summary, TaskCollection},
    filter::Selector,
    ids::IdSupplier,
    persistence::TaskPersistence,
    tasks::{Priority, Task, TaskId},
};
use thiserror::Error;
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};
use tracing::{debug, warn};

/// How many fresh ids `add` asks for before giving up on a collision.
const MAX_ID_ATTEMPTS: usize = 8;

/// Non-fatal persistence problem the presentation layer may show.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PersistenceWarning {
    #[error("could not load saved tasks, started empty: {reason}")]
    LoadFailed { reason: String },
    #[error("could not save tasks: {reason}")]
    SaveFailed { reason: String },
}

/// Progress of the background save worker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveState {
    /// Snapshots written successfully.
    pub saved: u64,
    /// Save attempts that failed.
    pub failed: u64,
    /// Failure of the most recent save attempt, cleared by the next success.
    pub last_error: Option<PersistenceWarning>,
}

struct Saver {
    queue: mpsc::UnboundedSender<TaskCollection>,
    state: watch::Receiver<SaveState>,
    worker: JoinHandle<()>,
}

impl Saver {
    fn spawn<P: TaskPersistence + 'static>(persistence: Arc<P>) -> Self {
        let (queue, rx) = mpsc::unbounded_channel();
        let (state_tx, state) = watch::channel(SaveState::default());
        let worker = tokio::spawn(run_saver(persistence, rx, state_tx));
        Self {
            queue,
            state,
            worker,
        }
    }
}

/// Writes queued snapshots in order. When several are waiting only the newest
/// one is written.
async fn run_saver<P: TaskPersistence>(
    persistence: Arc<P>,
    mut queue: mpsc::UnboundedReceiver<TaskCollection>,
    state: watch::Sender<SaveState>,
) {
    while let Some(mut snapshot) = queue.recv().await {
        let mut superseded = 0usize;
        while let Ok(newer) = queue.try_recv() {
            snapshot = newer;
            superseded += 1;
        }
        if superseded > 0 {
            debug!(superseded, "skipping superseded snapshots");
        }

        match persistence.save(&snapshot).await {
            Ok(()) => state.send_modify(|s| {
                s.saved += 1;
                s.last_error = None;
            }),
            Err(err) => {
                warn!("failed to save tasks: {err}");
                state.send_modify(|s| {
                    s.failed += 1;
                    s.last_error = Some(PersistenceWarning::SaveFailed {
                        reason: err.to_string(),
                    });
                });
            }
        }
    }
}

/// Sole owner of the task collection.
///
/// Lifecycle is `open` (load once) → mutations → `close` (flush pending
/// saves). Mutations are synchronous and never wait on storage; each applied
/// mutation queues its snapshot for the save worker.
pub struct TaskStore<I: IdSupplier> {
    tasks: TaskCollection,
    ids: I,
    default_priority: Priority,
    saver: Option<Saver>,
    load_warning: Option<PersistenceWarning>,
}

impl<I: IdSupplier> TaskStore<I> {
    /// Loads the saved collection and starts the save worker. Load failures
    /// leave the store empty and are reported through [`TaskStore::warnings`].
    ///
    /// Must be called from within a tokio runtime.
    pub async fn open<P: TaskPersistence + 'static>(persistence: P, ids: I) -> Self {
        let persistence = Arc::new(persistence);
        let (tasks, load_warning) = match persistence.load().await {
            Ok(tasks) => {
                debug!(len = tasks.len(), "loaded tasks");
                (tasks, None)
            }
            Err(err) => {
                warn!("failed to load tasks, starting empty: {err}");
                let warning = PersistenceWarning::LoadFailed {
                    reason: err.to_string(),
                };
                (TaskCollection::new(), Some(warning))
            }
        };

        Self {
            tasks,
            ids,
            default_priority: Priority::default(),
            saver: Some(Saver::spawn(persistence)),
            load_warning,
        }
    }

    /// Store without persistence; nothing outlives the value.
    pub fn in_memory(ids: I) -> Self {
        Self {
            tasks: TaskCollection::new(),
            ids,
            default_priority: Priority::default(),
            saver: None,
            load_warning: None,
        }
    }

    /// Priority used by `add` when the caller passes none.
    pub fn with_default_priority(mut self, priority: Priority) -> Self {
        self.default_priority = priority;
        self
    }

    pub fn snapshot(&self) -> TaskCollection {
        self.tasks.clone()
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn visible(&self, selector: Selector) -> Vec<&Task> {
        self.tasks.visible(selector)
    }

    pub fn summary(&self) -> Summary {
        self.tasks.summary()
    }

    pub fn add(&mut self, description: &str, priority: Option<Priority>) -> Outcome {
        if description.trim().is_empty() {
            return self.apply(Outcome::Rejected(Rejection::EmptyDescription));
        }
        let priority = priority.unwrap_or(self.default_priority);

        let mut outcome = Outcome::Rejected(Rejection::EmptyDescription);
        for _ in 0..MAX_ID_ATTEMPTS {
            outcome = self.tasks.add(self.ids.next_id(), description, priority);
            if !matches!(outcome, Outcome::Rejected(Rejection::DuplicateId { .. })) {
                break;
            }
        }
        self.apply(outcome)
    }

    pub fn toggle(&mut self, id: &TaskId) -> Outcome {
        let outcome = self.tasks.toggle(id);
        self.apply(outcome)
    }

    pub fn delete(&mut self, id: &TaskId) -> Outcome {
        let outcome = self.tasks.delete(id);
        self.apply(outcome)
    }

    pub fn save_state(&self) -> SaveState {
        self.saver
            .as_ref()
            .map(|saver| saver.state.borrow().clone())
            .unwrap_or_default()
    }

    /// Load failure (if any) followed by the latest save failure (if any).
    pub fn warnings(&self) -> Vec<PersistenceWarning> {
        self.load_warning
            .iter()
            .cloned()
            .chain(self.save_state().last_error)
            .collect()
    }

    /// Waits for queued saves to finish and returns the final save state.
    pub async fn close(self) -> SaveState {
        let Some(Saver {
            queue,
            state,
            worker,
        }) = self.saver
        else {
            return SaveState::default();
        };

        drop(queue);
        if let Err(err) = worker.await {
            warn!("save worker ended abnormally: {err}");
        }
        let final_state = state.borrow().clone();
        final_state
    }

    fn apply(&mut self, outcome: Outcome) -> Outcome {
        match &outcome {
            Outcome::Applied(next) => {
                self.tasks = next.clone();
                debug!(len = next.len(), "mutation applied");
                if let Some(saver) = &self.saver {
                    if saver.queue.send(next.clone()).is_err() {
                        warn!("save worker is gone; snapshot not persisted");
                    }
                }
            }
            Outcome::Rejected(reason) => debug!(%reason, "mutation rejected"),
        }
        outcome
    }
}

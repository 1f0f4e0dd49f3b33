use std::{collections::HashSet, sync::Arc};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::{
    filter::{self, Selector},
    tasks::{Priority, Task, TaskId},
};

/// Immutable, ordered, id-unique snapshot of all known tasks.
///
/// Mutations never touch `self`; they return an [`Outcome`] carrying the next
/// snapshot. Clones share the backing storage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskCollection {
    tasks: Arc<Vec<Task>>,
}

/// Why a mutation left the collection unchanged.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Rejection {
    #[error("description is empty")]
    EmptyDescription,
    #[error("no task with id {id}")]
    NotFound { id: TaskId },
    #[error("id {id} is already in use")]
    DuplicateId { id: TaskId },
}

/// Result of a mutation: either the next snapshot, or the reason nothing changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Applied(TaskCollection),
    Rejected(Rejection),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied(_))
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Outcome::Applied(_) => None,
            Outcome::Rejected(reason) => Some(reason),
        }
    }

    /// Collapses the outcome into a snapshot, falling back to `current` on rejection.
    pub fn resolve(self, current: &TaskCollection) -> TaskCollection {
        match self {
            Outcome::Applied(next) => next,
            Outcome::Rejected(_) => current.clone(),
        }
    }
}

/// Errors produced when building a collection from untrusted records.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CollectionError {
    #[error("duplicate task id: {id}")]
    DuplicateId { id: TaskId },
    #[error("task {id} has a blank description")]
    BlankDescription { id: TaskId },
}

/// Counts shown in list footers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub pending: usize,
    pub completed: usize,
}

impl TaskCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates records loaded from storage: ids must be unique and
    /// descriptions non-blank.
    pub fn from_tasks(tasks: Vec<Task>) -> Result<Self, CollectionError> {
        let mut seen = HashSet::with_capacity(tasks.len());
        for task in &tasks {
            if task.description.trim().is_empty() {
                return Err(CollectionError::BlankDescription {
                    id: task.id.clone(),
                });
            }
            if !seen.insert(&task.id) {
                return Err(CollectionError::DuplicateId {
                    id: task.id.clone(),
                });
            }
        }
        Ok(Self {
            tasks: Arc::new(tasks),
        })
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.tasks.iter()
    }

    pub fn as_slice(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| &task.id == id)
    }

    pub fn contains(&self, id: &TaskId) -> bool {
        self.get(id).is_some()
    }

    /// Appends a new `Todo` task with a trimmed description.
    pub fn add(&self, id: TaskId, description: &str, priority: Priority) -> Outcome {
        let description = description.trim();
        if description.is_empty() {
            return Outcome::Rejected(Rejection::EmptyDescription);
        }
        if self.contains(&id) {
            return Outcome::Rejected(Rejection::DuplicateId { id });
        }

        let mut next = Vec::with_capacity(self.tasks.len() + 1);
        next.extend(self.tasks.iter().cloned());
        next.push(Task::new(id, description, priority));
        Outcome::Applied(Self::from_vec(next))
    }

    /// Flips the status of the matching task; every other task is left as is.
    pub fn toggle(&self, id: &TaskId) -> Outcome {
        if !self.contains(id) {
            return Outcome::Rejected(Rejection::NotFound { id: id.clone() });
        }
        let next = self
            .tasks
            .iter()
            .map(|task| {
                if &task.id == id {
                    task.toggled()
                } else {
                    task.clone()
                }
            })
            .collect();
        Outcome::Applied(Self::from_vec(next))
    }

    pub fn delete(&self, id: &TaskId) -> Outcome {
        if !self.contains(id) {
            return Outcome::Rejected(Rejection::NotFound { id: id.clone() });
        }
        let next = self
            .tasks
            .iter()
            .filter(|task| &task.id != id)
            .cloned()
            .collect();
        Outcome::Applied(Self::from_vec(next))
    }

    pub fn visible(&self, selector: Selector) -> Vec<&Task> {
        filter::visible(self, selector)
    }

    pub fn summary(&self) -> Summary {
        let completed = self.tasks.iter().filter(|task| task.is_done()).count();
        Summary {
            total: self.tasks.len(),
            pending: self.tasks.len() - completed,
            completed,
        }
    }

    fn from_vec(tasks: Vec<Task>) -> Self {
        Self {
            tasks: Arc::new(tasks),
        }
    }
}

impl<'a> IntoIterator for &'a TaskCollection {
    type Item = &'a Task;
    type IntoIter = std::slice::Iter<'a, Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Serialize for TaskCollection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.tasks.as_slice().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TaskCollection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tasks = Vec::<Task>::deserialize(deserializer)?;
        Self::from_tasks(tasks).map_err(de::Error::custom)
    }
}

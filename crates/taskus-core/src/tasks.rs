use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque task identifier. Assigned once at creation and never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl From<String> for TaskId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

/// Task status lifecycle. Only two states; toggling flips between them.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Todo,
    Done,
}

impl TaskStatus {
    pub fn toggled(self) -> Self {
        match self {
            TaskStatus::Todo => TaskStatus::Done,
            TaskStatus::Done => TaskStatus::Todo,
        }
    }

    pub fn is_done(self) -> bool {
        matches!(self, TaskStatus::Done)
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown priority `{0}` (expected high, medium or low)")]
pub struct ParsePriorityError(String);

impl FromStr for Priority {
    type Err = ParsePriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            _ => Err(ParsePriorityError(s.to_string())),
        }
    }
}

/// Task entity.
///
/// Serializes in the canonical record shape
/// `{"id", "description", "priority", "status": "todo"|"done"}`. Deserialization
/// also accepts the older record shape (numeric `id`, no `priority`,
/// `completed: bool`) so existing slots keep loading.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "TaskRecord")]
pub struct Task {
    pub id: TaskId,
    pub description: String,
    pub priority: Priority,
    pub status: TaskStatus,
}

impl Task {
    /// Builds a fresh `Todo` task. The caller is responsible for trimming and
    /// rejecting blank descriptions; see `TaskCollection::add`.
    pub fn new(id: TaskId, description: impl Into<String>, priority: Priority) -> Self {
        Self {
            id,
            description: description.into(),
            priority,
            status: TaskStatus::Todo,
        }
    }

    pub fn is_done(&self) -> bool {
        self.status.is_done()
    }

    pub fn toggled(&self) -> Self {
        Self {
            status: self.status.toggled(),
            ..self.clone()
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RecordId {
    Text(String),
    Number(u64),
}

#[derive(Deserialize)]
struct TaskRecord {
    id: RecordId,
    description: String,
    #[serde(default)]
    priority: Option<Priority>,
    #[serde(default)]
    status: Option<TaskStatus>,
    #[serde(default)]
    completed: Option<bool>,
}

impl From<TaskRecord> for Task {
    fn from(record: TaskRecord) -> Self {
        let id = match record.id {
            RecordId::Text(raw) => TaskId(raw),
            RecordId::Number(n) => TaskId(n.to_string()),
        };
        let status = record
            .status
            .or_else(|| {
                record.completed.map(|done| {
                    if done {
                        TaskStatus::Done
                    } else {
                        TaskStatus::Todo
                    }
                })
            })
            .unwrap_or_default();
        Self {
            id,
            description: record.description,
            priority: record.priority.unwrap_or_default(),
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_task_starts_todo() {
        let task = Task::new("1".into(), "Buy milk", Priority::default());
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.priority, Priority::Medium);
    }

    #[test]
    fn toggled_flips_only_status() {
        let task = Task::new("1".into(), "Buy milk", Priority::High);
        let done = task.toggled();
        assert_eq!(done.status, TaskStatus::Done);
        assert_eq!(done.description, task.description);
        assert_eq!(done.priority, Priority::High);
        assert_eq!(done.toggled(), task);
    }

    #[test]
    fn serializes_canonical_shape() {
        let task = Task::new("a1".into(), "Do dishes", Priority::Low);
        let json = serde_json::to_value(&task).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "id": "a1",
                "description": "Do dishes",
                "priority": "Low",
                "status": "todo",
            })
        );
    }

    #[test]
    fn decodes_legacy_completed_records() {
        let raw = r#"[
            {"id": 1700000000000, "description": "Go for a run", "priority": "High", "completed": true},
            {"id": "2", "description": "Buy Grocery", "status": "todo"},
            {"id": "3", "description": "Call mom"}
        ]"#;
        let tasks: Vec<Task> = serde_json::from_str(raw).expect("decode");
        assert_eq!(tasks[0].id.as_str(), "1700000000000");
        assert_eq!(tasks[0].status, TaskStatus::Done);
        assert_eq!(tasks[0].priority, Priority::High);
        assert_eq!(tasks[1].priority, Priority::Medium);
        assert_eq!(tasks[1].status, TaskStatus::Todo);
        assert_eq!(tasks[2].status, TaskStatus::Todo);
    }

    #[test]
    fn status_wins_over_completed_flag() {
        let raw = r#"{"id": "x", "description": "d", "status": "done", "completed": false}"#;
        let task: Task = serde_json::from_str(raw).expect("decode");
        assert!(task.is_done());
    }

    #[test]
    fn parses_priority_case_insensitively() {
        assert_eq!("HIGH".parse::<Priority>(), Ok(Priority::High));
        assert_eq!(" low ".parse::<Priority>(), Ok(Priority::Low));
        assert!("urgent".parse::<Priority>().is_err());
    }
}

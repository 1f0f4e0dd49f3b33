use chrono::Utc;
use uuid::Uuid;

use crate::tasks::TaskId;

/// Hands out identifiers for newly created tasks.
pub trait IdSupplier: Send {
    fn next_id(&mut self) -> TaskId;
}

impl<T: IdSupplier + ?Sized> IdSupplier for Box<T> {
    fn next_id(&mut self) -> TaskId {
        (**self).next_id()
    }
}

/// Random v4 UUIDs.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIds;

impl IdSupplier for UuidIds {
    fn next_id(&mut self) -> TaskId {
        TaskId::new(Uuid::new_v4().to_string())
    }
}

/// Millisecond wall-clock ids. Strictly increasing within one supplier even
/// when asked twice in the same millisecond or when the clock steps back.
#[derive(Debug, Default, Clone)]
pub struct ClockIds {
    last: i64,
}

impl ClockIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdSupplier for ClockIds {
    fn next_id(&mut self) -> TaskId {
        let now = Utc::now().timestamp_millis();
        self.last = now.max(self.last + 1);
        TaskId::new(self.last.to_string())
    }
}

/// Deterministic `1, 2, 3, ...` ids for tests and demos.
#[derive(Debug, Clone)]
pub struct SequenceIds {
    next: u64,
}

impl SequenceIds {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(first: u64) -> Self {
        Self { next: first }
    }
}

impl Default for SequenceIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdSupplier for SequenceIds {
    fn next_id(&mut self) -> TaskId {
        let id = self.next;
        self.next += 1;
        TaskId::new(id.to_string())
    }
}

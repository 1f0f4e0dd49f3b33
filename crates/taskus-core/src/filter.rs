use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{collection::TaskCollection, tasks::Task};

/// Which subset of the collection to show.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Selector {
    #[default]
    All,
    Pending,
    Completed,
}

impl Selector {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            Selector::All => true,
            Selector::Pending => !task.is_done(),
            Selector::Completed => task.is_done(),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Selector::All => "All",
            Selector::Pending => "Pending",
            Selector::Completed => "Completed",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown filter `{0}` (expected all, pending or completed)")]
pub struct ParseSelectorError(String);

impl FromStr for Selector {
    type Err = ParseSelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Selector::All),
            "pending" => Ok(Selector::Pending),
            "completed" => Ok(Selector::Completed),
            _ => Err(ParseSelectorError(s.to_string())),
        }
    }
}

/// Tasks matching `selector`, in collection order. Never mutates its input.
pub fn visible(collection: &TaskCollection, selector: Selector) -> Vec<&Task> {
    collection
        .iter()
        .filter(|task| selector.matches(task))
        .collect()
}

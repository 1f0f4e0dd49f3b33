use clap::{Parser, Subcommand};
use taskus_core::{filter::Selector, tasks::Priority};

/// CLI surface definition.
#[derive(Parser, Debug)]
#[command(
    name = "taskus",
    about = "Small local-first task manager",
    version,
    propagate_version = true
)]
pub struct Cli {
    /// Optional subcommand; defaults to listing all tasks when absent.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    #[command(flatten)]
    Task(TaskCommand),
    /// Print version and exit.
    Version,
    /// Check that the configured storage can be written and read back.
    Health,
    /// Manage CLI configuration.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum TaskCommand {
    /// Show tasks, optionally filtered by status.
    #[command(visible_alias = "ls")]
    List {
        /// all, pending or completed.
        #[arg(long, short, default_value_t = Selector::All)]
        filter: Selector,
    },
    /// Add a task. Blank descriptions are ignored.
    Add {
        #[arg(required = true, num_args = 1..)]
        description: Vec<String>,
        /// high, medium or low (defaults to the configured priority).
        #[arg(long, short)]
        priority: Option<Priority>,
    },
    /// Flip a task between todo and done.
    Toggle { id: String },
    /// Remove a task.
    #[command(visible_alias = "rm")]
    Delete { id: String },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommand {
    /// Create a default config file if one does not exist.
    Init,
}

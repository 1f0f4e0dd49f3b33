use std::io::Write;

use color_eyre::Result;
use taskus_core::{
    collection::{Outcome, Summary},
    filter::Selector,
    ids::IdSupplier,
    tasks::{Task, TaskId},
};
use taskus_task::{SlotPersistence, TaskStore};
use tracing::warn;

use crate::{cli::TaskCommand, config::Config, storage};

pub type CliStore = TaskStore<Box<dyn IdSupplier>>;

/// Execute a task subcommand against the configured store, then flush saves.
pub async fn handle(cmd: TaskCommand, config: &Config) -> Result<()> {
    let mut store = open_store(config).await?;
    {
        let mut out = std::io::stdout().lock();
        run(cmd, &mut store, &mut out)?;
    }

    let state = store.close().await;
    if let Some(warning) = state.last_error {
        warn!("{warning}");
        eprintln!("warning: {warning}");
    }
    Ok(())
}

/// Open the store described by `config`: file-backed unless `persist = false`.
pub async fn open_store(config: &Config) -> Result<CliStore> {
    let ids = config.id_scheme().supplier();
    let store = if config.persist() {
        let files = storage::store_from_config(config)?;
        let persistence = SlotPersistence::with_slot(files, config.slot());
        TaskStore::open(persistence, ids).await
    } else {
        TaskStore::in_memory(ids)
    };
    Ok(store.with_default_priority(config.default_priority()))
}

/// Apply one command and render its result. Load warnings are shown before
/// anything else so a silently emptied list is never mistaken for real state.
pub fn run<I: IdSupplier>(
    cmd: TaskCommand,
    store: &mut TaskStore<I>,
    out: &mut impl Write,
) -> Result<()> {
    for warning in store.warnings() {
        writeln!(out, "warning: {warning}")?;
    }

    match cmd {
        TaskCommand::List { filter } => render_list(store, filter, out)?,
        TaskCommand::Add {
            description,
            priority,
        } => {
            let outcome = store.add(&description.join(" "), priority);
            if let Outcome::Applied(tasks) = &outcome {
                if let Some(task) = tasks.as_slice().last() {
                    writeln!(out, "Added task {}: {}", task.id, task.description)?;
                }
            }
            report_rejection(&outcome, out)?;
        }
        TaskCommand::Toggle { id } => {
            let id = TaskId::from(id);
            let outcome = store.toggle(&id);
            if let Some(task) = store.get(&id).filter(|_| outcome.is_applied()) {
                let label = if task.is_done() { "done" } else { "todo" };
                writeln!(out, "Marked {label}: {}", task.description)?;
            }
            report_rejection(&outcome, out)?;
        }
        TaskCommand::Delete { id } => {
            let id = TaskId::from(id);
            let outcome = store.delete(&id);
            if outcome.is_applied() {
                writeln!(out, "Deleted task {id}")?;
            }
            report_rejection(&outcome, out)?;
        }
    }
    Ok(())
}

fn report_rejection(outcome: &Outcome, out: &mut impl Write) -> Result<()> {
    if let Some(reason) = outcome.rejection() {
        writeln!(out, "Nothing changed: {reason}")?;
    }
    Ok(())
}

fn render_list<I: IdSupplier>(
    store: &TaskStore<I>,
    filter: Selector,
    out: &mut impl Write,
) -> Result<()> {
    let summary = store.summary();
    if summary.total == 0 {
        writeln!(out, "No tasks yet. Add one with `taskus add <description>`.")?;
        return Ok(());
    }

    let visible = store.visible(filter);
    if filter != Selector::All {
        writeln!(out, "{filter} tasks:")?;
    }
    if visible.is_empty() {
        writeln!(out, "  (none)")?;
    }
    for task in visible {
        writeln!(out, "{}", task_line(task))?;
    }
    writeln!(out, "{}", footer(&summary))?;
    Ok(())
}

fn task_line(task: &Task) -> String {
    let mark = if task.is_done() { "x" } else { " " };
    format!(
        "[{mark}] {} ({}) {}",
        task.id, task.priority, task.description
    )
}

fn footer(summary: &Summary) -> String {
    format!(
        "Total tasks: {} ({} pending, {} completed)",
        summary.total, summary.pending, summary.completed
    )
}

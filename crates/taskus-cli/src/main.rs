mod cli;
mod config;
mod storage;
mod tasks;

use crate::cli::{Command, ConfigCommand, TaskCommand};
use clap::Parser;
use color_eyre::Result;
use taskus_core::{filter::Selector, storage::KeyValueStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Entry point wiring the CLI to the task store.
#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let cli = cli::Cli::parse();
    let config = config::load()?;
    let command = cli.command.unwrap_or(Command::Task(TaskCommand::List {
        filter: Selector::All,
    }));
    match command {
        Command::Task(cmd) => tasks::handle(cmd, &config).await?,
        Command::Version => print_version(),
        Command::Health => run_health_check(&config).await?,
        Command::Config(ConfigCommand::Init) => init_config(&config)?,
    }

    Ok(())
}

fn init_tracing() {
    // Respect user-provided filters; logs go to stderr so task output stays clean.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn print_version() {
    println!("taskus {}", env!("CARGO_PKG_VERSION"));
}

/// Runs a quick write/read/delete probe against the configured storage.
async fn run_health_check(config: &config::Config) -> Result<()> {
    if !config.persist() {
        println!("Storage: disabled (persist = false)");
        return Ok(());
    }
    let store = storage::store_from_config(config)?;
    run_store_health(&store).await?;
    println!("Storage: ok ({})", store.root().display());
    Ok(())
}

async fn run_store_health<S: KeyValueStore>(store: &S) -> Result<()> {
    let probe_key = "health/probe";
    let payload = b"ok";
    store
        .put(probe_key, payload)
        .await
        .map_err(|e| color_eyre::eyre::eyre!(e.to_string()))?;
    let round_trip = store
        .get(probe_key)
        .await
        .map_err(|e| color_eyre::eyre::eyre!(e.to_string()))?;
    store
        .delete(probe_key)
        .await
        .map_err(|e| color_eyre::eyre::eyre!(e.to_string()))?;

    if round_trip != payload {
        color_eyre::eyre::bail!("storage round-trip failed");
    }
    Ok(())
}

fn init_config(config: &config::Config) -> Result<()> {
    let path = config::write_default_if_missing(config)?;
    println!("Config initialized at {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use taskus_core::storage::InMemoryStore;
    use taskus_storage::file_store::FileStore;

    use super::*;

    #[tokio::test]
    async fn health_check_with_file_store_succeeds() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path());
        run_store_health(&store)
            .await
            .expect("health check should succeed");
        assert_eq!(std::fs::read_dir(dir.path()).expect("read dir").count(), 0);
    }

    #[tokio::test]
    async fn health_check_with_memory_store_succeeds() {
        run_store_health(&InMemoryStore::new())
            .await
            .expect("health check should succeed");
    }

    #[tokio::test]
    async fn health_check_skips_disabled_persistence() {
        let cfg = config::Config {
            persist: Some(false),
            ..config::Config::default()
        };
        run_health_check(&cfg).await.expect("health check");
    }
}

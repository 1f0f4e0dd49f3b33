use std::{
    fs,
    path::{Path, PathBuf},
};

use color_eyre::Result;
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use taskus_core::{
    ids::{ClockIds, IdSupplier, UuidIds},
    tasks::Priority,
};
use taskus_task::DEFAULT_SLOT;

/// User-level configuration loaded from `~/.config/taskus/config.toml` (platform-specific).
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Override for the directory holding the task slot.
    pub data_dir: Option<PathBuf>,
    /// Name of the slot the task list is stored under.
    pub slot: Option<String>,
    /// Priority for tasks added without `--priority`.
    pub default_priority: Option<Priority>,
    /// Identifier scheme for new tasks.
    pub ids: Option<IdScheme>,
    /// Set to `false` to keep tasks in memory only.
    pub persist: Option<bool>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IdScheme {
    #[default]
    Uuid,
    Clock,
}

impl IdScheme {
    pub fn supplier(self) -> Box<dyn IdSupplier> {
        match self {
            IdScheme::Uuid => Box::new(UuidIds),
            IdScheme::Clock => Box::new(ClockIds::new()),
        }
    }
}

impl Config {
    pub fn slot(&self) -> &str {
        self.slot.as_deref().unwrap_or(DEFAULT_SLOT)
    }

    pub fn default_priority(&self) -> Priority {
        self.default_priority.unwrap_or_default()
    }

    pub fn id_scheme(&self) -> IdScheme {
        self.ids.unwrap_or_default()
    }

    pub fn persist(&self) -> bool {
        self.persist.unwrap_or(true)
    }
}

/// Load config from the default path; if missing, return defaults.
pub fn load() -> Result<Config> {
    let path = default_path()?;
    load_from_path(path)
}

/// Load config from a given path; if missing or empty, return defaults.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Config::default());
    }
    let contents = fs::read_to_string(path)?;
    if contents.trim().is_empty() {
        return Ok(Config::default());
    }
    let cfg: Config = toml::from_str(&contents)?;
    Ok(cfg)
}

/// Resolve the default config path (platform aware).
pub fn default_path() -> Result<PathBuf> {
    let base = config_dir().ok_or_else(|| color_eyre::eyre::eyre!("no config dir available"))?;
    Ok(base.join("taskus").join("config.toml"))
}

/// Write `config` to the default path unless a file is already there.
pub fn write_default_if_missing(config: &Config) -> Result<PathBuf> {
    write_to_path_if_missing(config, &default_path()?)
}

/// Leaves an existing file untouched so user edits are never clobbered.
pub fn write_to_path_if_missing(config: &Config, path: &Path) -> Result<PathBuf> {
    if path.exists() {
        return Ok(path.to_path_buf());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let body = toml::to_string_pretty(config)?;
    fs::write(path, body)?;
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_default_when_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = load_from_path(dir.path().join("config.toml")).expect("load");
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.slot(), "tasks");
        assert_eq!(cfg.default_priority(), Priority::Medium);
        assert_eq!(cfg.id_scheme(), IdScheme::Uuid);
        assert!(cfg.persist());
    }

    #[test]
    fn empty_file_is_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "  \n").expect("write");
        assert_eq!(load_from_path(&path).expect("load"), Config::default());
    }

    #[test]
    fn parses_custom_config() {
        let contents = r#"
            data_dir = "/tmp/taskus-data"
            slot = "todos"
            default_priority = "High"
            ids = "clock"
            persist = false
        "#;
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, contents).expect("write temp config");

        let cfg = load_from_path(&path).expect("load");
        assert_eq!(
            cfg,
            Config {
                data_dir: Some(PathBuf::from("/tmp/taskus-data")),
                slot: Some("todos".into()),
                default_priority: Some(Priority::High),
                ids: Some(IdScheme::Clock),
                persist: Some(false),
            }
        );
        assert_eq!(cfg.slot(), "todos");
        assert!(!cfg.persist());
    }

    #[test]
    fn rejects_unknown_priority() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "default_priority = \"Urgent\"").expect("write");
        assert!(load_from_path(&path).is_err());
    }

    #[test]
    fn write_creates_file_once() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");
        let cfg = Config {
            data_dir: Some(PathBuf::from("/tmp/taskus-data")),
            ids: Some(IdScheme::Clock),
            ..Config::default()
        };

        write_to_path_if_missing(&cfg, &path).expect("write should succeed");
        let other = Config::default();
        let second = write_to_path_if_missing(&other, &path).expect("second write ok");
        assert_eq!(second, path);
        assert_eq!(load_from_path(&path).expect("load"), cfg);
    }
}

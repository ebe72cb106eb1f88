//! Configuration file management for the planner CLI.
//!
//! Provides a TOML config file at `~/.config/event-planner/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Env var overriding the data file location.
pub const DATA_FILE_ENV: &str = "PLANNER_DATA_FILE";

/// Data file used when nothing else is configured, relative to the current
/// working directory.
pub const DEFAULT_DATA_FILE: &str = "data/event-plans.json";

pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub storage: StorageSection,
    #[serde(default)]
    pub server: ServerSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StorageSection {
    /// Path of the JSON data file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the planner config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/event-planner` or
/// `~/.config/event-planner`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("event-planner");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("event-planner")
}

/// Return the path to the planner config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file at {}", path.display()))?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct PlannerConfig {
    pub data_file: PathBuf,
    pub bind: String,
    pub port: u16,
}

impl PlannerConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - Data file: `cli_data_file` > `PLANNER_DATA_FILE` env > `storage.data_file` > `./data/event-plans.json`
    /// - Bind/port: `server` section of the config file > defaults (serve flags override later)
    ///
    /// A config file that exists but fails to parse is an error; a missing
    /// one is not.
    pub fn resolve(cli_data_file: Option<PathBuf>) -> Result<Self> {
        let file_config = if config_path().exists() {
            load_config()?
        } else {
            ConfigFile::default()
        };

        let data_file = if let Some(path) = cli_data_file {
            path
        } else if let Some(path) = std::env::var_os(DATA_FILE_ENV).filter(|v| !v.is_empty()) {
            PathBuf::from(path)
        } else if let Some(path) = file_config.storage.data_file {
            path
        } else {
            PathBuf::from(DEFAULT_DATA_FILE)
        };

        Ok(Self {
            data_file,
            bind: file_config.server.bind,
            port: file_config.server.port,
        })
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn lock_env() -> std::sync::MutexGuard<'static, ()> {
        crate::test_util::lock_env()
    }

    /// Point XDG_CONFIG_HOME at `dir` for the duration of `f`.
    fn with_config_home<T>(dir: &std::path::Path, f: impl FnOnce() -> T) -> T {
        let orig_xdg = std::env::var("XDG_CONFIG_HOME").ok();
        unsafe { std::env::set_var("XDG_CONFIG_HOME", dir) };
        let out = f();
        match orig_xdg {
            Some(x) => unsafe { std::env::set_var("XDG_CONFIG_HOME", x) },
            None => unsafe { std::env::remove_var("XDG_CONFIG_HOME") },
        }
        out
    }

    #[test]
    fn config_path_ends_with_expected_filename() {
        let path = config_path();
        assert!(
            path.ends_with("event-planner/config.toml"),
            "unexpected config path: {}",
            path.display()
        );
    }

    #[test]
    fn config_file_defaults_missing_sections() {
        let cfg: ConfigFile = toml::from_str("").unwrap();
        assert!(cfg.storage.data_file.is_none());
        assert_eq!(cfg.server.bind, DEFAULT_BIND);
        assert_eq!(cfg.server.port, DEFAULT_PORT);
    }

    #[test]
    fn save_and_load_config_roundtrip() {
        let _lock = lock_env();
        let tmp = tempfile::TempDir::new().unwrap();

        let loaded = with_config_home(tmp.path(), || {
            let cfg = ConfigFile {
                storage: StorageSection {
                    data_file: Some(PathBuf::from("/srv/planner/events.json")),
                },
                server: ServerSection {
                    bind: "0.0.0.0".to_string(),
                    port: 9000,
                },
            };
            save_config(&cfg).unwrap();
            load_config().unwrap()
        });

        assert_eq!(
            loaded.storage.data_file,
            Some(PathBuf::from("/srv/planner/events.json"))
        );
        assert_eq!(loaded.server.bind, "0.0.0.0");
        assert_eq!(loaded.server.port, 9000);
        assert!(tmp.path().join("event-planner/config.toml").is_file());
    }

    #[test]
    fn resolve_with_cli_flag_overrides_all() {
        let _lock = lock_env();
        let tmp = tempfile::TempDir::new().unwrap();

        unsafe { std::env::set_var(DATA_FILE_ENV, "/env/events.json") };
        let config = with_config_home(tmp.path(), || {
            PlannerConfig::resolve(Some(PathBuf::from("/cli/events.json"))).unwrap()
        });
        unsafe { std::env::remove_var(DATA_FILE_ENV) };

        assert_eq!(config.data_file, PathBuf::from("/cli/events.json"));
    }

    #[test]
    fn resolve_with_env_var_overrides_config_file() {
        let _lock = lock_env();
        let tmp = tempfile::TempDir::new().unwrap();

        unsafe { std::env::set_var(DATA_FILE_ENV, "/env/events.json") };
        let config = with_config_home(tmp.path(), || {
            save_config(&ConfigFile {
                storage: StorageSection {
                    data_file: Some(PathBuf::from("/file/events.json")),
                },
                server: ServerSection::default(),
            })
            .unwrap();
            PlannerConfig::resolve(None).unwrap()
        });
        unsafe { std::env::remove_var(DATA_FILE_ENV) };

        assert_eq!(config.data_file, PathBuf::from("/env/events.json"));
    }

    #[test]
    fn resolve_reads_config_file_when_no_override() {
        let _lock = lock_env();
        let tmp = tempfile::TempDir::new().unwrap();

        unsafe { std::env::remove_var(DATA_FILE_ENV) };
        let config = with_config_home(tmp.path(), || {
            save_config(&ConfigFile {
                storage: StorageSection {
                    data_file: Some(PathBuf::from("/file/events.json")),
                },
                server: ServerSection {
                    bind: "0.0.0.0".to_string(),
                    port: 7070,
                },
            })
            .unwrap();
            PlannerConfig::resolve(None).unwrap()
        });

        assert_eq!(config.data_file, PathBuf::from("/file/events.json"));
        assert_eq!(config.bind, "0.0.0.0");
        assert_eq!(config.port, 7070);
    }

    #[test]
    fn resolve_defaults_when_nothing_set() {
        let _lock = lock_env();
        let tmp = tempfile::TempDir::new().unwrap();

        unsafe { std::env::remove_var(DATA_FILE_ENV) };
        let config = with_config_home(tmp.path(), || PlannerConfig::resolve(None).unwrap());

        assert_eq!(config.data_file, PathBuf::from(DEFAULT_DATA_FILE));
        assert_eq!(config.bind, DEFAULT_BIND);
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn resolve_errors_on_malformed_config_file() {
        let _lock = lock_env();
        let tmp = tempfile::TempDir::new().unwrap();

        let result = with_config_home(tmp.path(), || {
            let dir = config_dir();
            std::fs::create_dir_all(&dir).unwrap();
            std::fs::write(dir.join("config.toml"), "[storage\ndata_file = 3").unwrap();
            PlannerConfig::resolve(None)
        });

        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("failed to parse config file"), "unexpected error: {msg}");
    }
}

//! Provisioner configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::executor::ActionFlags;
use crate::subscriber::{DEFAULT_KEY_NAME, actions};

/// Main provisioner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// Skip confirmation for destructive actions
    pub force: bool,

    /// Directory actions run in
    pub workdir: PathBuf,

    /// Dotenv-style settings file, relative to `workdir` unless absolute
    #[serde(rename = "env-file")]
    pub env_file: PathBuf,

    /// Settings key holding the application secret
    #[serde(rename = "key-name")]
    pub key_name: String,

    /// Action name to shell command line
    pub actions: BTreeMap<String, String>,

    /// Optional integrations available beyond the configured actions
    pub capabilities: Vec<String>,

    /// Extra handlers bound to lifecycle steps
    pub hooks: Vec<HookConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: None,
            force: false,
            workdir: PathBuf::from("."),
            env_file: PathBuf::from(".env"),
            key_name: DEFAULT_KEY_NAME.to_string(),
            actions: default_actions(),
            capabilities: Vec::new(),
            hooks: Vec::new(),
        }
    }
}

fn default_actions() -> BTreeMap<String, String> {
    [
        actions::GENERATE_KEY,
        actions::CACHE_CONFIG,
        actions::CACHE_ROUTES,
        actions::PUBLISH_VENDORS,
        actions::RESET_MIGRATIONS,
        actions::RUN_MIGRATIONS,
        actions::RUN_SEEDING,
        actions::CLEAR_CACHE,
        actions::LINK_STORAGE,
    ]
    .into_iter()
    .map(|action| (action.to_string(), format!("php artisan {}", action)))
    .collect()
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        for candidate in Self::fallback_paths() {
            if candidate.exists() {
                match Self::load_from_file(&candidate) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", candidate.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only the log level, following the same chain as `load`
    ///
    /// Used before logging is set up, so failures stay silent.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let candidates = match config_path {
            Some(path) => vec![path.clone()],
            None => Self::fallback_paths(),
        };

        candidates
            .into_iter()
            .filter(|path| path.exists())
            .find_map(|path| Self::load_from_file(path).ok())
            .and_then(|c| c.log_level)
    }

    /// Project-local `.provisioner.yml`, then `~/.config/provisioner/provisioner.yml`
    fn fallback_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(".provisioner.yml")];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("provisioner").join("provisioner.yml"));
        }
        paths
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Settings file path resolved against `workdir`
    pub fn env_file_path(&self) -> PathBuf {
        if self.env_file.is_absolute() {
            self.env_file.clone()
        } else {
            self.workdir.join(&self.env_file)
        }
    }

    /// Every capability name: configured actions plus explicit extras
    pub fn capability_names(&self) -> impl Iterator<Item = &str> {
        self.actions
            .keys()
            .map(String::as_str)
            .chain(self.capabilities.iter().map(String::as_str))
    }
}

/// An extra action bound to a lifecycle step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookConfig {
    /// Step name, with or without the `command.` prefix
    pub step: String,

    /// Action to run; must appear under `actions`
    pub action: String,

    /// Flags passed to the action
    #[serde(default)]
    pub flags: ActionFlags,

    /// Dispatch priority (default 10, above the built-in handlers)
    #[serde(default)]
    pub priority: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(!config.force);
        assert_eq!(config.key_name, "APP_KEY");
        assert_eq!(config.env_file_path(), PathBuf::from("./.env"));
        assert_eq!(config.actions.get("migrate").map(String::as_str), Some("php artisan migrate"));
        assert_eq!(config.actions.len(), 9);
        assert!(config.hooks.is_empty());
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
log-level: debug
force: true
workdir: /srv/app
env-file: config/.env
key-name: SECRET_KEY

actions:
  key:generate: "./bin/console secrets:generate"
  migrate: "./bin/console doctrine:migrations:migrate"
  assets:build: "npm run build"

capabilities:
  - assets:generate

hooks:
  - step: command.extrastuff
    action: assets:build
    priority: 20
  - step: installed
    action: notify
    flags:
      quiet: true
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert!(config.force);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.key_name, "SECRET_KEY");
        assert_eq!(config.env_file_path(), PathBuf::from("/srv/app/config/.env"));
        assert_eq!(config.actions.len(), 3);
        assert_eq!(config.hooks.len(), 2);
        assert_eq!(config.hooks[0].priority, Some(20));
        assert_eq!(config.hooks[1].priority, None);
        assert_eq!(config.hooks[1].flags.get("quiet"), Some(&true));

        let caps: Vec<&str> = config.capability_names().collect();
        assert!(caps.contains(&"assets:build"));
        assert!(caps.contains(&"assets:generate"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
force: true
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert!(config.force);
        assert_eq!(config.key_name, "APP_KEY");
        assert!(config.actions.contains_key("storage:link"));
    }

    #[test]
    fn test_absolute_env_file() {
        let config = Config {
            env_file: PathBuf::from("/etc/app/.env"),
            ..Default::default()
        };
        assert_eq!(config.env_file_path(), PathBuf::from("/etc/app/.env"));
    }

    #[test]
    fn test_load_explicit_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("pv.yml");
        fs::write(&path, "key-name: TOKEN\nlog-level: WARN\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.key_name, "TOKEN");
        assert_eq!(Config::load_log_level(Some(&path)).as_deref(), Some("WARN"));
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing.yml");

        assert!(Config::load(Some(&path)).is_err());
        assert_eq!(Config::load_log_level(Some(&path)), None);
    }
}

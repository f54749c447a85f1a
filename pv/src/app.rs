//! Wiring of configuration, collaborators and handlers into a ready bus

use std::sync::Arc;

use tracing::debug;

use crate::collab::{CapabilitySet, ConfigStore, EnvFileStore, SecretKeeper};
use crate::config::Config;
use crate::events::EventBus;
use crate::executor::ShellExecutor;
use crate::subscriber::{ConfigurationError, LifecycleSubscriber, register_hooks};

/// A configured bus plus the collaborators its handlers share
pub struct App {
    pub config: Config,
    pub bus: EventBus,
    pub secrets: Arc<SecretKeeper>,
    pub force: bool,
}

impl App {
    /// Build the bus from config; `force` is OR-ed with the config's own setting
    pub fn new(config: Config, force: bool) -> Result<Self, ConfigurationError> {
        let force = force || config.force;
        debug!(force, "App::new: called");

        let store = Arc::new(EnvFileStore::new(config.env_file_path()));
        let secrets = Arc::new(match store.get(&config.key_name) {
            Some(key) => SecretKeeper::with_key(key),
            None => SecretKeeper::new(),
        });
        let capabilities: CapabilitySet = config.capability_names().collect();
        debug!(capabilities = capabilities.len(), "App::new: capabilities resolved");

        let subscriber = LifecycleSubscriber::builder()
            .config(store)
            .secrets(secrets.clone())
            .capabilities(Arc::new(capabilities))
            .key_name(config.key_name.clone())
            .force(force)
            .build()?;

        let mut bus = EventBus::new();
        // Hooks first: a bad step or unconfigured action fails startup before the built-ins are wired
        register_hooks(&mut bus, &config.hooks, &config.actions)?;
        subscriber.register(&mut bus);

        Ok(Self {
            config,
            bus,
            secrets,
            force,
        })
    }

    /// Shell executor for the configured actions
    pub fn executor(&self, dry_run: bool) -> ShellExecutor {
        ShellExecutor::new(self.config.actions.clone(), self.config.workdir.clone()).dry_run(dry_run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HookConfig;
    use crate::events::Step;
    use crate::executor::ActionFlags;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_app_wires_builtins_and_hooks() {
        let mut config = Config {
            hooks: vec![HookConfig {
                step: "extrastuff".to_string(),
                action: "assets:build".to_string(),
                flags: ActionFlags::new(),
                priority: None,
            }],
            ..Default::default()
        };
        config.actions.insert("assets:build".to_string(), "npm run build".to_string());

        let app = App::new(config, false).unwrap();

        assert_eq!(app.bus.handler_count(Step::ExtraStuff), 1);
        assert_eq!(app.bus.handler_count(Step::RunMigrations), 1);
        assert!(!app.force);
    }

    #[test]
    fn test_force_from_config_or_cli() {
        let config = Config {
            force: true,
            ..Default::default()
        };
        assert!(App::new(config, false).unwrap().force);
        assert!(App::new(Config::default(), true).unwrap().force);
    }

    #[test]
    fn test_bad_hook_fails_startup() {
        let config = Config {
            hooks: vec![HookConfig {
                step: "deploy".to_string(),
                action: "x".to_string(),
                flags: ActionFlags::new(),
                priority: None,
            }],
            ..Default::default()
        };

        assert!(matches!(
            App::new(config, false),
            Err(ConfigurationError::UnknownStep { index: 0, .. })
        ));
    }

    #[test]
    fn test_unconfigured_hook_action_fails_startup() {
        let config = Config {
            hooks: vec![HookConfig {
                step: "extrastuff".to_string(),
                action: "typo:action".to_string(),
                flags: ActionFlags::new(),
                priority: None,
            }],
            ..Default::default()
        };

        assert!(matches!(
            App::new(config, false),
            Err(ConfigurationError::UnknownAction { index: 0, ref action }) if action == "typo:action"
        ));
    }

    #[test]
    fn test_secret_seeded_from_env_file() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".env"), "APP_KEY=base64:existing\n").unwrap();
        let config = Config {
            workdir: temp.path().to_path_buf(),
            ..Default::default()
        };

        let app = App::new(config, false).unwrap();

        assert_eq!(app.secrets.current().as_deref(), Some("base64:existing"));
        assert_eq!(app.secrets.update_count(), 0);
    }
}

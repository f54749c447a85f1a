//! Lifecycle subscriber - binds the built-in provisioning vocabulary to the bus
//!
//! | step                    | action(s)                                  |
//! |-------------------------|--------------------------------------------|
//! | `command.generatekey`   | `key:generate`, then refresh the secret    |
//! | `command.cacheconfig`   | `config:cache`                             |
//! | `command.cacheroutes`   | `route:cache`                              |
//! | `command.publishvendors`| `vendor:publish`                           |
//! | `command.resetmigrations` | `migrate:reset` (force-sensitive)        |
//! | `command.runmigrations` | `migrate` (force-sensitive)                |
//! | `command.runseeding`    | `db:seed` (force-sensitive)                |
//! | `command.updatecache`   | `cache:clear`, with status lines           |
//! | `command.linkstorage`   | `storage:link` when available              |
//! | `command.genassets`     | `debugbar:publish`, `assets:generate` when available |
//!
//! All built-in handlers sit at [`BUILTIN_PRIORITY`], below the bus default,
//! so handlers registered without an explicit priority run before them.

mod error;
mod hooks;

use std::sync::Arc;

use tracing::{debug, info};

use crate::collab::{CapabilityRegistry, CapabilitySet, ConfigStore, SecretManager};
use crate::events::{DispatchError, EventBus, HandlerError, Step};
use crate::executor::{ActionFlags, StepContext, force_flags};

pub use error::ConfigurationError;
pub use hooks::register_hooks;

/// Priority of every built-in lifecycle handler
pub const BUILTIN_PRIORITY: i32 = 5;

/// Settings key holding the application secret
pub const DEFAULT_KEY_NAME: &str = "APP_KEY";

/// Names of the actions the built-in handlers invoke
pub mod actions {
    pub const GENERATE_KEY: &str = "key:generate";
    pub const CACHE_CONFIG: &str = "config:cache";
    pub const CACHE_ROUTES: &str = "route:cache";
    pub const PUBLISH_VENDORS: &str = "vendor:publish";
    pub const RESET_MIGRATIONS: &str = "migrate:reset";
    pub const RUN_MIGRATIONS: &str = "migrate";
    pub const RUN_SEEDING: &str = "db:seed";
    pub const CLEAR_CACHE: &str = "cache:clear";
    pub const LINK_STORAGE: &str = "storage:link";
    pub const PUBLISH_DEBUGBAR: &str = "debugbar:publish";
    pub const GENERATE_ASSETS: &str = "assets:generate";
}

type Method = fn(&LifecycleSubscriber, &mut dyn StepContext) -> Result<(), HandlerError>;

/// Registers the built-in provisioning handlers
#[derive(Clone)]
pub struct LifecycleSubscriber {
    config: Arc<dyn ConfigStore>,
    secrets: Arc<dyn SecretManager>,
    capabilities: Arc<dyn CapabilityRegistry>,
    key_name: String,
    force: bool,
}

impl LifecycleSubscriber {
    pub fn builder() -> LifecycleSubscriberBuilder {
        LifecycleSubscriberBuilder::default()
    }

    /// Whether destructive actions skip confirmation
    pub fn force(&self) -> bool {
        self.force
    }

    /// Subscribe every built-in handler to the bus
    pub fn register(&self, bus: &mut EventBus) {
        debug!(force = self.force, "LifecycleSubscriber::register: called");
        self.listen(bus, Step::GenerateKey, "lifecycle.generate_key", Self::on_generate_key);
        self.listen(bus, Step::CacheConfig, "lifecycle.cache_config", Self::on_cache_config);
        self.listen(bus, Step::CacheRoutes, "lifecycle.cache_routes", Self::on_cache_routes);
        self.listen(bus, Step::PublishVendors, "lifecycle.publish_vendors", Self::on_publish_vendors);
        self.listen(bus, Step::ResetMigrations, "lifecycle.reset_migrations", Self::on_reset_migrations);
        self.listen(bus, Step::RunMigrations, "lifecycle.run_migrations", Self::on_run_migrations);
        self.listen(bus, Step::RunSeeding, "lifecycle.run_seeding", Self::on_run_seeding);
        self.listen(bus, Step::LinkStorage, "lifecycle.link_storage", Self::on_link_storage);
        self.listen(bus, Step::UpdateCache, "lifecycle.update_cache", Self::on_update_cache);
        self.listen(bus, Step::GenAssets, "lifecycle.gen_assets", Self::on_gen_assets);
    }

    fn listen(&self, bus: &mut EventBus, step: Step, name: &str, method: Method) {
        let this = self.clone();
        bus.subscribe(step, name, BUILTIN_PRIORITY, move |ctx| method(&this, ctx));
    }

    fn on_generate_key(&self, ctx: &mut dyn StepContext) -> Result<(), HandlerError> {
        ctx.call(actions::GENERATE_KEY, &ActionFlags::new())?;

        let key = self.config.get(&self.key_name).ok_or_else(|| {
            DispatchError::new(format!("{} not found after key generation", self.key_name))
        })?;
        self.secrets.set_key(&key);
        info!(key_name = %self.key_name, "Application key refreshed");
        Ok(())
    }

    fn on_cache_config(&self, ctx: &mut dyn StepContext) -> Result<(), HandlerError> {
        Ok(ctx.call(actions::CACHE_CONFIG, &ActionFlags::new())?)
    }

    fn on_cache_routes(&self, ctx: &mut dyn StepContext) -> Result<(), HandlerError> {
        Ok(ctx.call(actions::CACHE_ROUTES, &ActionFlags::new())?)
    }

    fn on_publish_vendors(&self, ctx: &mut dyn StepContext) -> Result<(), HandlerError> {
        Ok(ctx.call(actions::PUBLISH_VENDORS, &ActionFlags::new())?)
    }

    fn on_reset_migrations(&self, ctx: &mut dyn StepContext) -> Result<(), HandlerError> {
        Ok(ctx.call(actions::RESET_MIGRATIONS, &force_flags(self.force))?)
    }

    fn on_run_migrations(&self, ctx: &mut dyn StepContext) -> Result<(), HandlerError> {
        Ok(ctx.call(actions::RUN_MIGRATIONS, &force_flags(self.force))?)
    }

    fn on_run_seeding(&self, ctx: &mut dyn StepContext) -> Result<(), HandlerError> {
        Ok(ctx.call(actions::RUN_SEEDING, &force_flags(self.force))?)
    }

    fn on_link_storage(&self, ctx: &mut dyn StepContext) -> Result<(), HandlerError> {
        self.call_if_available(ctx, actions::LINK_STORAGE)
    }

    fn on_update_cache(&self, ctx: &mut dyn StepContext) -> Result<(), HandlerError> {
        ctx.line("Clearing cache...");
        ctx.call(actions::CLEAR_CACHE, &ActionFlags::new())?;
        ctx.info("Cache cleared!");
        Ok(())
    }

    fn on_gen_assets(&self, ctx: &mut dyn StepContext) -> Result<(), HandlerError> {
        self.call_if_available(ctx, actions::PUBLISH_DEBUGBAR)?;
        self.call_if_available(ctx, actions::GENERATE_ASSETS)
    }

    fn call_if_available(&self, ctx: &mut dyn StepContext, action: &str) -> Result<(), HandlerError> {
        if !self.capabilities.has_capability(action) {
            debug!(%action, "LifecycleSubscriber: capability absent, skipping");
            return Ok(());
        }
        Ok(ctx.call(action, &ActionFlags::new())?)
    }
}

/// Builder for [`LifecycleSubscriber`]
///
/// The configuration store and secret manager are required. Without a
/// capability registry every optional integration counts as absent.
#[derive(Default)]
pub struct LifecycleSubscriberBuilder {
    config: Option<Arc<dyn ConfigStore>>,
    secrets: Option<Arc<dyn SecretManager>>,
    capabilities: Option<Arc<dyn CapabilityRegistry>>,
    key_name: Option<String>,
    force: bool,
}

impl LifecycleSubscriberBuilder {
    pub fn config(mut self, config: Arc<dyn ConfigStore>) -> Self {
        self.config = Some(config);
        self
    }

    pub fn secrets(mut self, secrets: Arc<dyn SecretManager>) -> Self {
        self.secrets = Some(secrets);
        self
    }

    pub fn capabilities(mut self, capabilities: Arc<dyn CapabilityRegistry>) -> Self {
        self.capabilities = Some(capabilities);
        self
    }

    /// Settings key re-read after key generation (default `APP_KEY`)
    pub fn key_name(mut self, key_name: impl Into<String>) -> Self {
        self.key_name = Some(key_name.into());
        self
    }

    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn build(self) -> Result<LifecycleSubscriber, ConfigurationError> {
        let config = self
            .config
            .ok_or(ConfigurationError::MissingCollaborator("configuration store"))?;
        let secrets = self
            .secrets
            .ok_or(ConfigurationError::MissingCollaborator("secret manager"))?;

        Ok(LifecycleSubscriber {
            config,
            secrets,
            capabilities: self.capabilities.unwrap_or_else(|| Arc::new(CapabilitySet::new())),
            key_name: self.key_name.unwrap_or_else(|| DEFAULT_KEY_NAME.to_string()),
            force: self.force,
        })
    }
}

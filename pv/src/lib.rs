//! Provisioner - event-driven install and reset pipelines
//!
//! An application is provisioned by publishing a fixed sequence of lifecycle
//! steps (`command.generatekey`, `command.runmigrations`, ...) to an
//! in-process event bus. Handlers bound to those steps invoke named actions
//! through a step context, which in the CLI runs configured shell commands.
//!
//! # Core Concepts
//!
//! - **Ordered dispatch**: handlers run by descending priority, ties in
//!   registration order, all on the calling thread
//! - **Fail fast**: the first failing handler stops its step and the pipeline
//! - **Extensible**: hooks and custom handlers subscribe to the same steps as
//!   the built-in ones, ahead of them by default
//!
//! # Modules
//!
//! - [`events`] - step identifiers and the event bus
//! - [`subscriber`] - built-in lifecycle handlers and config hooks
//! - [`pipeline`] - install and reset step sequences
//! - [`executor`] - step contexts (shell, recording)
//! - [`collab`] - config store, secret manager, capability registry
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface

pub mod app;
pub mod cli;
pub mod collab;
pub mod config;
pub mod events;
pub mod executor;
pub mod pipeline;
pub mod subscriber;

// Re-export commonly used types
pub use app::App;
pub use collab::{
    CapabilityRegistry, CapabilitySet, ConfigStore, EnvFileStore, MemoryStore, SecretKeeper, SecretManager,
};
pub use config::{Config, HookConfig};
pub use events::{DEFAULT_PRIORITY, DispatchError, EventBus, HandlerError, PublishError, Step};
pub use executor::{ActionError, ActionFlags, RecordingContext, ShellExecutor, StepContext};
pub use pipeline::{Pipeline, PipelineError, RunSummary};
pub use subscriber::{BUILTIN_PRIORITY, ConfigurationError, LifecycleSubscriber, LifecycleSubscriberBuilder};

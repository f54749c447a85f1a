//! Event Bus for lifecycle steps
//!
//! Pipelines publish steps; subscribers register handlers for them. Dispatch
//! is synchronous and ordered:
//!
//! ```text
//! Pipeline ──publish(step)──▶ EventBus ──▶ handler (priority 10, hook)
//!                                      ──▶ handler (priority 5, built-in)
//!                                      ──▶ ...
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use provisioner::events::{EventBus, Step, DEFAULT_PRIORITY};
//!
//! let mut bus = EventBus::new();
//! bus.subscribe(Step::ExtraStuff, "notify", DEFAULT_PRIORITY, |ctx| {
//!     ctx.info("Almost done");
//!     Ok(())
//! });
//! bus.publish(Step::ExtraStuff, &mut executor)?;
//! ```

mod bus;
mod error;
mod step;

pub use bus::{DEFAULT_PRIORITY, EventBus, Handler};
pub use error::{DispatchError, HandlerError, PublishError};
pub use step::{STEP_PREFIX, Step};

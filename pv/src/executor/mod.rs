//! Step executors - the boundary between handlers and real provisioning work
//!
//! Every handler receives a `&mut dyn StepContext`. The context runs named
//! actions (key generation, migrations, cache clearing, ...) and emits status
//! lines for the user. Two implementations ship with the crate:
//!
//! - [`ShellExecutor`] maps action names to shell command lines
//! - [`RecordingContext`] records calls in memory

mod error;
mod recording;
mod shell;

use std::collections::BTreeMap;

pub use error::ActionError;
pub use recording::{RecordedCall, RecordingContext};
pub use shell::ShellExecutor;

/// Flags passed along with an action; a `true` flag is rendered as `--<name>`
pub type ActionFlags = BTreeMap<String, bool>;

/// Flag that suppresses interactive confirmation for destructive actions
pub const NO_CONFIRM_FLAG: &str = "force";

/// What a handler can do while a step is being dispatched
pub trait StepContext {
    /// Run a named action
    fn call(&mut self, action: &str, flags: &ActionFlags) -> Result<(), ActionError>;

    /// Emit a plain status line
    fn line(&mut self, text: &str);

    /// Emit a highlighted status line
    fn info(&mut self, text: &str) {
        self.line(text);
    }
}

/// Build a flag set holding the no-confirmation flag when `force` is set
pub fn force_flags(force: bool) -> ActionFlags {
    let mut flags = ActionFlags::new();
    if force {
        flags.insert(NO_CONFIRM_FLAG.to_string(), true);
    }
    flags
}

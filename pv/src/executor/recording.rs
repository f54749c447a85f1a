//! In-memory step context that records every call

use std::collections::HashSet;

use tracing::debug;

use super::{ActionError, ActionFlags, StepContext};

/// One recorded action invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub action: String,
    pub flags: ActionFlags,
}

impl RecordedCall {
    /// Whether the given flag was passed as `true`
    pub fn has_flag(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }
}

/// Step context that records actions and status lines instead of running anything
///
/// Actions named with [`failing_on`](Self::failing_on) fail with exit code 1
/// after being recorded.
#[derive(Debug, Default)]
pub struct RecordingContext {
    calls: Vec<RecordedCall>,
    lines: Vec<String>,
    failing: HashSet<String>,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the named action fail when called
    pub fn failing_on(mut self, action: impl Into<String>) -> Self {
        self.failing.insert(action.into());
        self
    }

    pub fn calls(&self) -> &[RecordedCall] {
        &self.calls
    }

    /// Names of the recorded actions, in call order
    pub fn actions(&self) -> Vec<&str> {
        self.calls.iter().map(|c| c.action.as_str()).collect()
    }

    /// Status lines, in emission order
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl StepContext for RecordingContext {
    fn call(&mut self, action: &str, flags: &ActionFlags) -> Result<(), ActionError> {
        debug!(%action, ?flags, "RecordingContext::call: called");
        self.calls.push(RecordedCall {
            action: action.to_string(),
            flags: flags.clone(),
        });

        if self.failing.contains(action) {
            return Err(ActionError::Failed {
                action: action.to_string(),
                exit_code: 1,
            });
        }
        Ok(())
    }

    fn line(&mut self, text: &str) {
        self.lines.push(text.to_string());
    }
}

//! Action error types

use thiserror::Error;

/// Errors raised by a step context while running a named action
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("Action not configured: {action}")]
    UnknownAction { action: String },

    #[error("Failed to start action {action}")]
    Spawn {
        action: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Action {action} exited with code {exit_code}")]
    Failed { action: String, exit_code: i32 },
}

impl ActionError {
    /// Name of the action that failed
    pub fn action(&self) -> &str {
        match self {
            Self::UnknownAction { action } | Self::Spawn { action, .. } | Self::Failed { action, .. } => action,
        }
    }
}

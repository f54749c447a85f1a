//! Subscriber construction errors

use thiserror::Error;

/// Raised while wiring handlers, before any pipeline runs
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Missing required collaborator: {0}")]
    MissingCollaborator(&'static str),

    #[error("Hook {index} targets unknown step '{step}'")]
    UnknownStep { index: usize, step: String },

    #[error("Hook {index} runs action '{action}', which is not configured under actions")]
    UnknownAction { index: usize, action: String },
}

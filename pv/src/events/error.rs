//! Dispatch error types

use thiserror::Error;

use super::step::Step;
use crate::executor::ActionError;

/// A handler itself failed, as opposed to the action it wrapped
#[derive(Debug, Error)]
#[error("{message}")]
pub struct DispatchError {
    pub message: String,
}

impl DispatchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// What a handler returns when it fails
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Action(#[from] ActionError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

/// Failure observed by the publisher of a step
///
/// Dispatch to the remaining handlers of `step` was abandoned.
#[derive(Debug, Error)]
#[error("Handler '{handler}' for {step} failed")]
pub struct PublishError {
    pub step: Step,
    pub handler: String,
    #[source]
    pub source: HandlerError,
}

impl PublishError {
    /// The action failure behind this error, if an action was what failed
    pub fn action_error(&self) -> Option<&ActionError> {
        match &self.source {
            HandlerError::Action(e) => Some(e),
            HandlerError::Dispatch(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_error_message() {
        let err = PublishError {
            step: Step::RunSeeding,
            handler: "lifecycle.run_seeding".to_string(),
            source: DispatchError::new("boom").into(),
        };

        let msg = err.to_string();
        assert!(msg.contains("command.runseeding"));
        assert!(msg.contains("lifecycle.run_seeding"));
        assert!(err.action_error().is_none());
    }

    #[test]
    fn test_action_error_is_exposed() {
        let err = PublishError {
            step: Step::RunMigrations,
            handler: "h".to_string(),
            source: ActionError::Failed {
                action: "migrate".to_string(),
                exit_code: 3,
            }
            .into(),
        };

        let action = err.action_error().expect("should carry an action error");
        assert_eq!(action.action(), "migrate");
    }
}

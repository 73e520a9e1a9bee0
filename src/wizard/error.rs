use thiserror::Error;

use super::WizardStep;

/// Errors raised by wizard transitions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    /// The form has invalid fields, one message per problem
    #[error("{}", .0.join("; "))]
    Validation(Vec<String>),

    /// The event makes no sense in the current step
    #[error("cannot {event} during {step}")]
    InvalidTransition {
        /// Current step
        step: WizardStep,
        /// Rejected event
        event: &'static str,
    },

    /// The session has no connected account
    #[error("no wallet connected")]
    NotConnected,
}

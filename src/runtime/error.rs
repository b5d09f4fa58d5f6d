//! Errors raised while a machine is running.

use crate::effects::HookError;
use thiserror::Error;

/// Errors returned by transitions, dispatch and wait futures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MachineError {
    #[error("Assertion error: There is no state named \"{state}\"!")]
    NoSuchState { state: String },

    #[error("A root action named '{action}' was not found in {host}")]
    NoRootAction { action: String, host: String },

    #[error("There is no state running!")]
    NoRunningState,

    #[error("Hook of state {state} failed: {source}")]
    Hook { state: String, source: HookError },

    #[error("The machine was dropped while waiting for state {state}")]
    Closed { state: String },
}

impl MachineError {
    /// Name of the state involved, when the error concerns one.
    pub fn state(&self) -> Option<&str> {
        match self {
            Self::NoSuchState { state } | Self::Hook { state, .. } | Self::Closed { state } => {
                Some(state)
            }
            Self::NoRootAction { .. } | Self::NoRunningState => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn messages_embed_offending_names() {
        let error = MachineError::NoSuchState {
            state: "on.missing".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Assertion error: There is no state named \"on.missing\"!"
        );

        let error = MachineError::NoRootAction {
            action: "shake".to_string(),
            host: "<lamp:1>".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "A root action named 'shake' was not found in <lamp:1>"
        );
    }

    #[test]
    fn hook_failure_keeps_its_source() {
        let error = MachineError::Hook {
            state: "online".to_string(),
            source: HookError::new("refused"),
        };
        assert_eq!(error.state(), Some("online"));
        assert_eq!(error.source().map(|s| s.to_string()), Some("refused".to_string()));
        assert_eq!(MachineError::NoRunningState.state(), None);
    }
}

//! Errors raised while turning declarations into a state tree.

use thiserror::Error;

/// Errors that can occur when building a state tree.
///
/// Building never yields a partial tree: the first violation aborts it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("Assertion error: the default substate for {state} is not defined")]
    DefaultSubstateNotDefined { state: String },

    #[error("Assertion error: there are multiple default substates defined for {state}: {substates:?}")]
    MultipleDefaultSubstates { state: String, substates: Vec<String> },

    #[error("State {state} is declared more than once")]
    DuplicateState { state: String },

    #[error("Action '{action}' is declared more than once in state {state}")]
    DuplicateAction { state: String, action: String },

    #[error("Invalid state name '{name}' in {parent}: names must be non-empty, dot-free and not '_root'")]
    InvalidStateName { parent: String, name: String },
}

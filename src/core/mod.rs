//! Core state hierarchy types.
//!
//! This module contains the data side of the state machine:
//! - Path arithmetic on dot-joined state names
//! - The immutable state tree and its default substate mapping
//! - Immutable transition history
//!
//! Nothing here runs hooks or holds runtime state.

pub mod path;
mod history;
mod tree;

pub use history::{StateHistory, TransitionRecord};
pub use tree::{DefaultStateMapping, NodeId, StateNode, StateTree};

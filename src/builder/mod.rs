//! Declaring state hierarchies and turning them into machines.
//!
//! [`StateDecl`] is the in-memory declaration of a hierarchy. It is
//! validated into an immutable [`StateTree`](crate::core::StateTree) and
//! bound to a host environment by [`MachineBuilder`].

mod decl;
mod error;
mod machine;
mod tree;

pub use decl::StateDecl;
pub use error::BuildError;
pub use machine::{MachineBuilder, DEFAULT_HISTORY_LIMIT};

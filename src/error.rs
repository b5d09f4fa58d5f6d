//! Crate-level error type.

use crate::builder::BuildError;
use crate::runtime::MachineError;
use thiserror::Error;

/// Any failure of building or running a machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Machine(#[from] MachineError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

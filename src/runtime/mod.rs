//! The running side of a state machine.
//!
//! - One task per state, started on entry and stopped after its exit hook
//! - Transitions through the youngest common ancestor
//! - Action dispatch with bubbling up to the root
//! - Entry/exit notifications and futures waiting on them

mod dispatch;
mod error;
mod machine;
mod notify;
mod task;
mod transition;
mod view;
mod wait;

pub use dispatch::Dispatch;
pub use error::MachineError;
pub use machine::{MachineId, StatefulMachine};
pub use notify::{ListenerId, Notifier, StateEvent, StateEventKind};
pub use view::ActiveState;
pub use wait::StateWait;

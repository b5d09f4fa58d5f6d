//! Stateful: hierarchical state machines with cancellable entry/exit hooks
//!
//! A host declares a tree of states. Each state may carry entry, error and
//! exit hooks and handlers for named actions. The machine keeps exactly one
//! root-to-leaf chain of states active and moves between chains through
//! their youngest common ancestor.
//!
//! # Core Concepts
//!
//! - **StateDecl**: In-memory declaration of a state, its hooks, actions and substates
//! - **StateTree**: Immutable hierarchy with resolved default substates
//! - **Hooks**: Stillwater effects run on entry (`on_try`), failure (`on_catch`) and exit (`on_finally`)
//! - **Actions**: Handlers that bubble from the active leaf toward the root
//! - **StatefulMachine**: The runtime driving transitions and dispatch
//!
//! # Example
//!
//! ```rust
//! use stateful::builder::{MachineBuilder, StateDecl};
//! use stateful::effects::{sync, Propagation};
//! use std::sync::{Arc, Mutex};
//!
//! #[derive(Clone, Default)]
//! struct Lamp {
//!     log: Arc<Mutex<Vec<&'static str>>>,
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), stateful::Error> {
//! let root = StateDecl::new()
//!     .state(
//!         "off",
//!         StateDecl::new()
//!             .default_state()
//!             .action("toggle", |ctx| {
//!                 ctx.transition_to("on");
//!                 Propagation::Stop
//!             }),
//!     )
//!     .state(
//!         "on",
//!         StateDecl::new()
//!             .on_try(sync(|lamp: &Lamp| {
//!                 lamp.log.lock().unwrap().push("lit");
//!                 Ok(())
//!             }))
//!             .action("toggle", |ctx| {
//!                 ctx.transition_to("off");
//!                 Propagation::Stop
//!             }),
//!     );
//!
//! let lamp = Lamp::default();
//! let machine = MachineBuilder::new(root).label("lamp").start(lamp.clone()).await?;
//! assert_eq!(machine.current_state()?, "off");
//!
//! machine.dispatch("toggle", ()).await?;
//! assert!(machine.state().is("on"));
//! assert_eq!(*lamp.log.lock().unwrap(), vec!["lit"]);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod core;
pub mod effects;
mod error;
pub mod runtime;

// Re-export commonly used types
pub use builder::{BuildError, MachineBuilder, StateDecl};
pub use core::{StateHistory, StateTree, TransitionRecord};
pub use effects::{HookError, Propagation, StateScope};
pub use error::{Error, Result};
pub use runtime::{ActiveState, Dispatch, MachineError, StateEvent, StatefulMachine};

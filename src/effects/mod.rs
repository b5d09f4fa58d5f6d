//! Effectful surface of a state: hooks and action handlers.
//!
//! Hooks follow Stillwater 0.11 conventions: each hook is a factory that
//! builds a fresh `BoxedEffect` per activation, and the machine runs that
//! effect against the host environment.
//!
//! - Use free-standing constructors: `pure()`, `from_fn()`, `from_async()`
//! - [`sync`] wraps a plain `Fn(&Env)` for the common synchronous case
//!
//! Action handlers are plain synchronous functions. Their return value
//! decides whether the action keeps bubbling toward the root.

mod action;
mod hook;

pub use action::{ActionContext, ActionHandler, Propagation};
pub use hook::{sync, CatchHook, HookError, StateHook, StateHooks, StateScope};

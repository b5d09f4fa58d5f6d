//! Declarations of states, hooks and actions.

use crate::effects::{
    ActionContext, ActionHandler, CatchHook, HookError, Propagation, StateHook, StateHooks,
    StateScope,
};
use std::sync::Arc;
use stillwater::effect::BoxedEffect;

/// Declaration of one state: its hooks, actions and substates.
///
/// The root of a hierarchy is a `StateDecl` too. Its actions are the root
/// handlers that catch whatever bubbles out of the active states.
///
/// # Example
///
/// ```rust
/// use stateful::builder::StateDecl;
/// use stateful::effects::Propagation;
/// use stillwater::prelude::*;
///
/// let root: StateDecl<()> = StateDecl::new()
///     .action("doStuff", |_| Propagation::Stop)
///     .state(
///         "off",
///         StateDecl::new()
///             .default_state()
///             .on_try(|_| pure(()).boxed())
///             .action("turnOn", |ctx| {
///                 ctx.transition_to("on");
///                 Propagation::Stop
///             }),
///     )
///     .state("on", StateDecl::new());
///
/// assert_eq!(root.substates().count(), 2);
/// ```
pub struct StateDecl<Env, Msg = ()> {
    pub(crate) hooks: StateHooks<Env>,
    pub(crate) is_default: bool,
    pub(crate) actions: Vec<(String, ActionHandler<Env, Msg>)>,
    pub(crate) states: Vec<(String, StateDecl<Env, Msg>)>,
}

impl<Env, Msg> StateDecl<Env, Msg> {
    /// An empty state: no hooks, no actions, no substates.
    pub fn new() -> Self {
        Self {
            hooks: StateHooks::none(),
            is_default: false,
            actions: Vec::new(),
            states: Vec::new(),
        }
    }

    /// Mark this state as the default substate of its parent.
    pub fn default_state(mut self) -> Self {
        self.is_default = true;
        self
    }

    /// Set the entry hook.
    pub fn on_try<F>(mut self, hook: F) -> Self
    where
        F: Fn(&StateScope) -> BoxedEffect<(), HookError, Env> + Send + Sync + 'static,
    {
        self.hooks.on_try = Some(Arc::new(hook) as StateHook<Env>);
        self
    }

    /// Set the hook that handles a failed entry hook.
    pub fn on_catch<F>(mut self, hook: F) -> Self
    where
        F: Fn(&StateScope, HookError) -> BoxedEffect<(), HookError, Env> + Send + Sync + 'static,
    {
        self.hooks.on_catch = Some(Arc::new(hook) as CatchHook<Env>);
        self
    }

    /// Set the exit hook.
    pub fn on_finally<F>(mut self, hook: F) -> Self
    where
        F: Fn(&StateScope) -> BoxedEffect<(), HookError, Env> + Send + Sync + 'static,
    {
        self.hooks.on_finally = Some(Arc::new(hook) as StateHook<Env>);
        self
    }

    /// Register a handler for `name` on this state.
    pub fn action<F>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&mut ActionContext<'_, Env, Msg>) -> Propagation + Send + Sync + 'static,
    {
        self.actions
            .push((name.into(), Arc::new(handler) as ActionHandler<Env, Msg>));
        self
    }

    /// Declare a substate.
    pub fn state(mut self, name: impl Into<String>, decl: StateDecl<Env, Msg>) -> Self {
        self.states.push((name.into(), decl));
        self
    }

    /// Whether this state is marked as its parent's default.
    pub fn is_default(&self) -> bool {
        self.is_default
    }

    /// Hooks declared so far.
    pub fn hooks(&self) -> &StateHooks<Env> {
        &self.hooks
    }

    /// Names of the actions declared on this state.
    pub fn action_names(&self) -> impl Iterator<Item = &str> {
        self.actions.iter().map(|(name, _)| name.as_str())
    }

    /// Declared substates in order.
    pub fn substates(&self) -> impl Iterator<Item = (&str, &StateDecl<Env, Msg>)> {
        self.states.iter().map(|(name, decl)| (name.as_str(), decl))
    }
}

impl<Env, Msg> Default for StateDecl<Env, Msg> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Env, Msg> std::fmt::Debug for StateDecl<Env, Msg> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateDecl")
            .field("hooks", &self.hooks)
            .field("is_default", &self.is_default)
            .field("actions", &self.action_names().collect::<Vec<_>>())
            .field("states", &self.states)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::sync;

    #[test]
    fn new_declaration_is_empty() {
        let decl: StateDecl<()> = StateDecl::new();
        assert!(!decl.is_default());
        assert!(!decl.hooks().has_try());
        assert_eq!(decl.action_names().count(), 0);
        assert_eq!(decl.substates().count(), 0);
    }

    #[test]
    fn fluent_calls_accumulate() {
        let decl: StateDecl<()> = StateDecl::new()
            .default_state()
            .on_try(sync(|_: &()| Ok(())))
            .on_finally(sync(|_: &()| Ok(())))
            .action("connect", |_| Propagation::Stop)
            .action("sync", |_| Propagation::Bubble)
            .state("idle", StateDecl::new())
            .state("busy", StateDecl::new().default_state());

        assert!(decl.is_default());
        assert!(decl.hooks().has_try());
        assert!(!decl.hooks().has_catch());
        assert!(decl.hooks().has_finally());
        assert_eq!(decl.action_names().collect::<Vec<_>>(), vec!["connect", "sync"]);

        let substates: Vec<(&str, bool)> = decl
            .substates()
            .map(|(name, decl)| (name, decl.is_default()))
            .collect();
        assert_eq!(substates, vec![("idle", false), ("busy", true)]);
    }
}

//! Entry, exit and error hooks attached to states.

use std::sync::Arc;
use stillwater::effect::BoxedEffect;
use stillwater::prelude::*;
use tokio::sync::watch;

/// Failure raised by a state hook.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct HookError {
    message: String,
}

impl HookError {
    /// Create a hook failure with a human readable message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The failure message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Factory producing a fresh effect each time a state is entered or exited.
///
/// Synchronous hooks build their effect with `pure` or `from_fn`; hooks that
/// need to wait use `from_async`. The machine awaits the effect before it
/// moves on to the next state.
pub type StateHook<Env> =
    Arc<dyn Fn(&StateScope) -> BoxedEffect<(), HookError, Env> + Send + Sync>;

/// Factory for the effect run when a state's entry hook fails.
pub type CatchHook<Env> =
    Arc<dyn Fn(&StateScope, HookError) -> BoxedEffect<(), HookError, Env> + Send + Sync>;

/// Optional try/catch/finally hooks of one state.
pub struct StateHooks<Env> {
    pub(crate) on_try: Option<StateHook<Env>>,
    pub(crate) on_catch: Option<CatchHook<Env>>,
    pub(crate) on_finally: Option<StateHook<Env>>,
}

impl<Env> StateHooks<Env> {
    /// Hooks with nothing attached.
    pub fn none() -> Self {
        Self {
            on_try: None,
            on_catch: None,
            on_finally: None,
        }
    }

    /// Whether an entry hook is attached.
    pub fn has_try(&self) -> bool {
        self.on_try.is_some()
    }

    /// Whether an error hook is attached.
    pub fn has_catch(&self) -> bool {
        self.on_catch.is_some()
    }

    /// Whether an exit hook is attached.
    pub fn has_finally(&self) -> bool {
        self.on_finally.is_some()
    }
}

impl<Env> Default for StateHooks<Env> {
    fn default() -> Self {
        Self::none()
    }
}

impl<Env> Clone for StateHooks<Env> {
    fn clone(&self) -> Self {
        Self {
            on_try: self.on_try.clone(),
            on_catch: self.on_catch.clone(),
            on_finally: self.on_finally.clone(),
        }
    }
}

impl<Env> std::fmt::Debug for StateHooks<Env> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateHooks")
            .field("on_try", &self.has_try())
            .field("on_catch", &self.has_catch())
            .field("on_finally", &self.has_finally())
            .finish()
    }
}

/// View of one activation of a state, handed to its hooks.
///
/// The scope stays valid after the hook returns. Work started from an entry
/// hook can hold on to a clone and stop once [`StateScope::exited`]
/// resolves, which happens as soon as the state starts exiting.
#[derive(Debug, Clone)]
pub struct StateScope {
    state: String,
    exited: watch::Receiver<bool>,
}

impl StateScope {
    pub(crate) fn new(state: String, exited: watch::Receiver<bool>) -> Self {
        Self { state, exited }
    }

    /// Full name of the state this scope belongs to.
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Whether the state has begun exiting.
    pub fn is_exited(&self) -> bool {
        *self.exited.borrow()
    }

    /// Resolve once the state begins exiting.
    ///
    /// Also resolves if the machine that owns the state is dropped.
    pub async fn exited(&self) {
        let mut exited = self.exited.clone();
        loop {
            if *exited.borrow_and_update() {
                return;
            }
            if exited.changed().await.is_err() {
                return;
            }
        }
    }
}

/// Build a synchronous hook from a plain function of the environment.
///
/// # Example
///
/// ```rust
/// use stateful::builder::StateDecl;
/// use stateful::effects::sync;
/// use std::sync::{Arc, Mutex};
///
/// #[derive(Clone, Default)]
/// struct Env {
///     log: Arc<Mutex<Vec<String>>>,
/// }
///
/// let idle: StateDecl<Env> = StateDecl::new().on_try(sync(|env: &Env| {
///     env.log.lock().unwrap().push("idle".to_string());
///     Ok(())
/// }));
/// assert!(idle.hooks().has_try());
/// ```
pub fn sync<Env, F>(
    f: F,
) -> impl Fn(&StateScope) -> BoxedEffect<(), HookError, Env> + Send + Sync + 'static
where
    Env: Clone + Send + Sync + 'static,
    F: Fn(&Env) -> Result<(), HookError> + Send + Sync + 'static,
{
    let f = Arc::new(f);
    move |_scope: &StateScope| {
        let f = Arc::clone(&f);
        from_fn(move |env: &Env| f(env)).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use stillwater::effect::Effect;

    #[test]
    fn hook_error_displays_message() {
        let error = HookError::new("connection refused");
        assert_eq!(error.to_string(), "connection refused");
        assert_eq!(error.message(), "connection refused");
    }

    #[test]
    fn empty_hooks_report_nothing_attached() {
        let hooks: StateHooks<()> = StateHooks::default();
        assert!(!hooks.has_try());
        assert!(!hooks.has_catch());
        assert!(!hooks.has_finally());
    }

    #[tokio::test]
    async fn scope_resolves_when_state_exits() {
        let (tx, rx) = watch::channel(false);
        let scope = StateScope::new("on.idle".to_string(), rx);
        assert!(!scope.is_exited());

        let pending = tokio::time::timeout(Duration::from_millis(20), scope.exited()).await;
        assert!(pending.is_err());

        tx.send_replace(true);
        assert!(scope.is_exited());
        scope.exited().await;
    }

    #[tokio::test]
    async fn scope_resolves_when_owner_is_dropped() {
        let (tx, rx) = watch::channel(false);
        let scope = StateScope::new("on".to_string(), rx);
        drop(tx);
        scope.exited().await;
    }

    #[tokio::test]
    async fn sync_hook_runs_against_environment() {
        #[derive(Clone, Default)]
        struct Env {
            hits: Arc<std::sync::Mutex<u32>>,
        }

        let (_tx, rx) = watch::channel(false);
        let scope = StateScope::new("A".to_string(), rx);
        let hook = sync(|env: &Env| {
            *env.hits.lock().unwrap() += 1;
            Ok(())
        });

        let env = Env::default();
        hook(&scope).run(&env).await.unwrap();
        hook(&scope).run(&env).await.unwrap();
        assert_eq!(*env.hits.lock().unwrap(), 2);
    }
}

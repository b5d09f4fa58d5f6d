//! Routing of named actions from the active leaf up to the root.

use super::machine::StatefulMachine;
use super::MachineError;
use crate::core::path::{self, ROOT};
use crate::effects::{ActionContext, ActionHandler, Propagation};
use tracing::debug;

/// Outcome of one action dispatch.
///
/// A requested transition has not happened yet; pass it to
/// [`StatefulMachine::transition_to`] or use [`StatefulMachine::dispatch`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[must_use = "a requested transition is only performed by `dispatch` or `transition_to`"]
pub struct Dispatch {
    /// States whose handler ran, deepest first.
    pub handled_by: Vec<String>,
    /// Transition requested by the handlers, if any.
    pub transition: Option<String>,
}

impl Dispatch {
    pub fn was_handled_by(&self, state: &str) -> bool {
        self.handled_by.iter().any(|handler| handler == state)
    }
}

impl<Env, Msg> StatefulMachine<Env, Msg> {
    /// Run the handlers of `action`, starting at the active leaf.
    ///
    /// Each active state that declares `action` runs its handler. A handler
    /// returning [`Propagation::Stop`] ends the dispatch; otherwise the
    /// action keeps bubbling and finally reaches the handler declared on the
    /// root. Transitions requested by handlers are validated and returned
    /// in [`Dispatch::transition`], not performed: `machine.send(..)?;`
    /// drops the request. Use [`StatefulMachine::dispatch`] to perform it.
    ///
    /// # Errors
    ///
    /// - [`MachineError::NoRunningState`] before the machine has started
    /// - [`MachineError::NoRootAction`] when the action bubbles past every
    ///   active state and the root declares no handler for it
    /// - [`MachineError::NoSuchState`] when a handler requests a transition
    ///   to an unknown state
    pub fn send(&self, action: &str, msg: Msg) -> Result<Dispatch, MachineError> {
        let current = self.current_state()?;
        let mut dispatch = Dispatch::default();

        for state in path::ancestors_deepest_first(&current) {
            let Some(handler) = self.tree.get(&state).and_then(|node| node.action(action)) else {
                continue;
            };
            let propagation = self.invoke(handler, action, &msg, &state, &current, &mut dispatch);
            dispatch.handled_by.push(state);
            if propagation == Propagation::Stop {
                return self.validate(dispatch);
            }
        }

        let handler = self
            .tree
            .root()
            .action(action)
            .ok_or_else(|| MachineError::NoRootAction {
                action: action.to_string(),
                host: self.id.to_string(),
            })?;
        self.invoke(handler, action, &msg, ROOT, &current, &mut dispatch);
        dispatch.handled_by.push(ROOT.to_string());
        self.validate(dispatch)
    }

    fn invoke(
        &self,
        handler: &ActionHandler<Env, Msg>,
        action: &str,
        msg: &Msg,
        state: &str,
        current: &str,
        dispatch: &mut Dispatch,
    ) -> Propagation {
        debug!(host = %self.id, action, state, "running action handler");
        let mut ctx = ActionContext::new(&self.env, msg, state, current, dispatch.transition.take());
        let propagation = handler(&mut ctx);
        dispatch.transition = ctx.into_requested();
        propagation
    }

    fn validate(&self, dispatch: Dispatch) -> Result<Dispatch, MachineError> {
        match dispatch.transition.as_deref() {
            Some(target) if !self.tree.contains(target) => Err(MachineError::NoSuchState {
                state: target.to_string(),
            }),
            _ => Ok(dispatch),
        }
    }
}

impl<Env, Msg> StatefulMachine<Env, Msg>
where
    Env: Clone + Send + Sync + 'static,
{
    /// [`send`](StatefulMachine::send) the action, then perform the
    /// transition its handlers requested.
    ///
    /// Returns the states whose handler ran, deepest first.
    pub async fn dispatch(&self, action: &str, msg: Msg) -> Result<Vec<String>, MachineError> {
        let Dispatch {
            handled_by,
            transition,
        } = self.send(action, msg)?;
        if let Some(target) = transition {
            self.transition_to(&target).await?;
        }
        Ok(handled_by)
    }
}

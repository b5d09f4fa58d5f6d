//! Action handlers and the context they run in.

use std::sync::Arc;

/// What a handler wants to happen after it ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    /// The action is fully handled here.
    Stop,
    /// Keep offering the action to the enclosing state.
    Bubble,
}

impl From<bool> for Propagation {
    /// `true` bubbles, anything else stops.
    fn from(bubble: bool) -> Self {
        if bubble {
            Self::Bubble
        } else {
            Self::Stop
        }
    }
}

impl From<()> for Propagation {
    fn from(_: ()) -> Self {
        Self::Stop
    }
}

/// Handler registered for a named action on one state.
pub type ActionHandler<Env, Msg> =
    Arc<dyn Fn(&mut ActionContext<'_, Env, Msg>) -> Propagation + Send + Sync>;

/// Everything a handler can see while it runs.
pub struct ActionContext<'a, Env, Msg> {
    env: &'a Env,
    msg: &'a Msg,
    state: &'a str,
    current_state: &'a str,
    requested: Option<String>,
}

impl<'a, Env, Msg> ActionContext<'a, Env, Msg> {
    pub(crate) fn new(
        env: &'a Env,
        msg: &'a Msg,
        state: &'a str,
        current_state: &'a str,
        requested: Option<String>,
    ) -> Self {
        Self {
            env,
            msg,
            state,
            current_state,
            requested,
        }
    }

    /// The host environment.
    pub fn env(&self) -> &'a Env {
        self.env
    }

    /// The payload passed to `send`.
    pub fn msg(&self) -> &'a Msg {
        self.msg
    }

    /// Full name of the state whose handler is running.
    pub fn state(&self) -> &'a str {
        self.state
    }

    /// Full name of the active leaf state.
    pub fn current_state(&self) -> &'a str {
        self.current_state
    }

    /// Ask the machine to move to `state` once the dispatch is over.
    ///
    /// Handlers further up the bubble chain may override the request.
    pub fn transition_to(&mut self, state: impl Into<String>) {
        self.requested = Some(state.into());
    }

    /// The pending transition request, if any.
    pub fn requested_transition(&self) -> Option<&str> {
        self.requested.as_deref()
    }

    pub(crate) fn into_requested(self) -> Option<String> {
        self.requested
    }
}

impl<Env, Msg> std::fmt::Debug for ActionContext<'_, Env, Msg> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionContext")
            .field("state", &self.state)
            .field("current_state", &self.current_state)
            .field("requested", &self.requested)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_true_bubbles() {
        assert_eq!(Propagation::from(true), Propagation::Bubble);
        assert_eq!(Propagation::from(false), Propagation::Stop);
        assert_eq!(Propagation::from(()), Propagation::Stop);
    }

    #[test]
    fn later_requests_replace_earlier_ones() {
        let env = ();
        let msg = ();
        let mut ctx = ActionContext::new(&env, &msg, "on", "on.idle", Some("off".to_string()));
        assert_eq!(ctx.requested_transition(), Some("off"));

        ctx.transition_to("on.active");
        assert_eq!(ctx.into_requested(), Some("on.active".to_string()));
    }

    #[test]
    fn context_exposes_dispatch_position() {
        let env = 7u32;
        let msg = "hello".to_string();
        let ctx = ActionContext::new(&env, &msg, "on", "on.idle", None);
        assert_eq!(*ctx.env(), 7);
        assert_eq!(ctx.msg(), "hello");
        assert_eq!(ctx.state(), "on");
        assert_eq!(ctx.current_state(), "on.idle");
        assert_eq!(ctx.requested_transition(), None);
    }
}

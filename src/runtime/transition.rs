//! Activation, deactivation and transitions between states.
//!
//! Entry runs shallow to deep, exit runs deep to shallow, and the exit
//! phase of a transition always completes before its entry phase begins.

use super::machine::StatefulMachine;
use super::notify::StateEvent;
use super::task::TaskTable;
use super::MachineError;
use crate::core::path::{self, ROOT};
use crate::core::{NodeId, TransitionRecord};
use crate::effects::{HookError, StateScope};
use chrono::Utc;
use std::sync::{Mutex, PoisonError};
use stillwater::effect::Effect;
use tracing::{debug, info, warn};

impl<Env, Msg> StatefulMachine<Env, Msg>
where
    Env: Clone + Send + Sync + 'static,
{
    /// Activate the root and cascade through default substates to a leaf.
    ///
    /// Does nothing if the machine is already running.
    pub async fn start(&self) -> Result<(), MachineError> {
        let _transition = self.transitions.lock().await;
        if self.lock_tasks().is_running(NodeId::ROOT) {
            return Ok(());
        }

        debug!(host = %self.id, "starting state machine");
        self.perform(NodeId::ROOT).await?;
        self.record(ROOT, ROOT);
        info!(host = %self.id, state = %self.leaf_name(), "state machine started");
        Ok(())
    }

    /// Leave the current chain up to the youngest common ancestor, then
    /// enter `state` and cascade into its defaults.
    ///
    /// Transitioning to a state that is already active is a no-op: no hook
    /// runs and nothing is published. Calls are served one at a time in
    /// arrival order.
    ///
    /// The returned future resolves once the whole default cascade below
    /// `state` has been entered, not as soon as `state` itself is. A pending
    /// entry hook deeper in the cascade keeps it pending; await
    /// [`StatefulMachine::wait_for_enter_state`] to observe `state` alone.
    ///
    /// Dropping the future stops at the last completed step: a state whose
    /// exit has begun is stopped, states already entered stay active.
    ///
    /// # Errors
    ///
    /// [`MachineError::NoSuchState`] for unknown names, [`MachineError::Hook`]
    /// when an exit hook fails or an entry hook fails without a catch hook.
    pub async fn transition_to(&self, state: &str) -> Result<(), MachineError> {
        let target = self
            .tree
            .lookup(state)
            .ok_or_else(|| MachineError::NoSuchState {
                state: state.to_string(),
            })?;

        let _transition = self.transitions.lock().await;
        if self.lock_tasks().is_running(target) {
            debug!(host = %self.id, state, "already in state");
            return Ok(());
        }

        let from = self.leaf_name();
        let ancestor = self
            .tree
            .lookup(&path::youngest_common_ancestor(&from, state))
            .unwrap_or(NodeId::ROOT);

        self.exit_below(ancestor).await?;
        self.perform(target).await?;
        self.record(&from, state);
        info!(host = %self.id, from = %from, to = %self.leaf_name(), "transitioned");
        Ok(())
    }

    /// Exit every active state, deepest first, root included.
    ///
    /// The machine can be started again afterwards.
    pub async fn shutdown(&self) -> Result<(), MachineError> {
        let _transition = self.transitions.lock().await;
        self.exit_below(NodeId::ROOT).await?;
        self.exit_one(NodeId::ROOT).await?;
        info!(host = %self.id, "state machine shut down");
        Ok(())
    }

    /// Enter the dormant states on the way to `target`, then cascade.
    ///
    /// Ancestors are entered without following their own defaults; only the
    /// target cascades.
    async fn perform(&self, target: NodeId) -> Result<(), MachineError> {
        for id in self.tree.path_from_root(target) {
            if self.lock_tasks().is_running(id) {
                continue;
            }
            if !self.enter_one(id).await? {
                return Ok(());
            }
        }

        let mut next = self.tree.state_at(target).default_child();
        while let Some(id) = next {
            if !self.enter_one(id).await? {
                return Ok(());
            }
            next = self.tree.state_at(id).default_child();
        }
        Ok(())
    }

    /// Exit running states deeper than `ancestor`, one at a time.
    async fn exit_below(&self, ancestor: NodeId) -> Result<(), MachineError> {
        while let Some(current) = self.current_node() {
            if current == ancestor || !self.tree.is_ancestor(ancestor, current) {
                break;
            }
            self.exit_one(current).await?;
        }
        Ok(())
    }

    /// Start the task of `id` and run its entry hook.
    ///
    /// Returns `false` when the hook failed and a catch hook handled it; the
    /// state has been exited again by then.
    async fn enter_one(&self, id: NodeId) -> Result<bool, MachineError> {
        let node = self.tree.state_at(id);
        let scope = self.lock_tasks().start(id, node.full_name());
        debug!(host = %self.id, state = node.full_name(), "entering state");
        self.notifier.trigger(&StateEvent::enter(node.full_name()));

        let Some(hook) = node.hooks().on_try.as_ref() else {
            return Ok(true);
        };
        match hook(&scope).run(&self.env).await {
            Ok(()) => Ok(true),
            Err(error) => self.recover(id, &scope, error).await.map(|()| false),
        }
    }

    async fn recover(
        &self,
        id: NodeId,
        scope: &StateScope,
        error: HookError,
    ) -> Result<(), MachineError> {
        let node = self.tree.state_at(id);
        let handled = match node.hooks().on_catch.as_ref() {
            Some(catch) => {
                warn!(host = %self.id, state = node.full_name(), %error, "entry hook failed, running catch hook");
                catch(scope, error).run(&self.env).await
            }
            None => {
                warn!(host = %self.id, state = node.full_name(), %error, "entry hook failed");
                Err(error)
            }
        };
        let exited = self.exit_one(id).await;
        handled.map_err(|source| MachineError::Hook {
            state: node.full_name().to_string(),
            source,
        })?;
        exited
    }

    /// Fire the exit signal of `id`, run its exit hook and stop its task.
    ///
    /// The task stops even when the hook fails, or when this future is
    /// dropped while the hook is pending.
    async fn exit_one(&self, id: NodeId) -> Result<(), MachineError> {
        let node = self.tree.state_at(id);
        let Some(scope) = self.lock_tasks().begin_exit(id) else {
            return Ok(());
        };
        let stopping = StopOnDrop {
            tasks: &self.tasks,
            id,
            parent: node.parent(),
        };
        debug!(host = %self.id, state = node.full_name(), "exiting state");
        self.notifier.trigger(&StateEvent::exit(node.full_name()));

        let outcome = match node.hooks().on_finally.as_ref() {
            Some(hook) => hook(&scope).run(&self.env).await,
            None => Ok(()),
        };
        drop(stopping);

        outcome.map_err(|source| {
            warn!(host = %self.id, state = node.full_name(), error = %source, "exit hook failed");
            MachineError::Hook {
                state: node.full_name().to_string(),
                source,
            }
        })
    }

    fn leaf_name(&self) -> String {
        self.current_state().unwrap_or_else(|_| ROOT.to_string())
    }

    fn record(&self, from: &str, requested: &str) {
        if self.history_limit == 0 {
            return;
        }
        let record = TransitionRecord {
            from: from.to_string(),
            requested: requested.to_string(),
            to: self.leaf_name(),
            timestamp: Utc::now(),
        };
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record, self.history_limit);
    }
}

/// Stops a task once its exit has begun, however the exit ends.
struct StopOnDrop<'a> {
    tasks: &'a Mutex<TaskTable>,
    id: NodeId,
    parent: Option<NodeId>,
}

impl Drop for StopOnDrop<'_> {
    fn drop(&mut self) {
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .stop(self.id, self.parent);
    }
}

//! The running state machine of one host.

use super::notify::{ListenerId, Notifier, StateEvent};
use super::task::TaskTable;
use super::view::ActiveState;
use super::wait::StateWait;
use super::MachineError;
use crate::core::{DefaultStateMapping, NodeId, StateHistory, StateTree};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;
use uuid::Uuid;

/// Identity of a machine, used in errors and logs.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MachineId {
    label: String,
    uuid: Uuid,
}

impl MachineId {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            uuid: Uuid::new_v4(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }
}

impl fmt::Display for MachineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}:{}>", self.label, self.uuid)
    }
}

/// A state tree bound to a host environment, with one task per state.
///
/// All operations take `&self`; transitions are serialized internally so
/// concurrent callers queue up in arrival order.
pub struct StatefulMachine<Env, Msg = ()> {
    pub(crate) id: MachineId,
    pub(crate) tree: StateTree<Env, Msg>,
    pub(crate) env: Env,
    pub(crate) tasks: Mutex<TaskTable>,
    pub(crate) notifier: Arc<Notifier>,
    pub(crate) history: Mutex<StateHistory>,
    /// Most records kept; `0` disables recording.
    pub(crate) history_limit: usize,
    pub(crate) transitions: tokio::sync::Mutex<()>,
}

impl<Env, Msg> StatefulMachine<Env, Msg> {
    pub(crate) fn new(
        id: MachineId,
        tree: StateTree<Env, Msg>,
        env: Env,
        history_limit: usize,
    ) -> Self {
        let tasks = TaskTable::new(tree.len());
        Self {
            id,
            tree,
            env,
            tasks: Mutex::new(tasks),
            notifier: Arc::new(Notifier::new()),
            history: Mutex::new(StateHistory::new()),
            history_limit,
            transitions: tokio::sync::Mutex::new(()),
        }
    }

    pub fn id(&self) -> &MachineId {
        &self.id
    }

    /// The host environment handed to hooks and actions.
    pub fn env(&self) -> &Env {
        &self.env
    }

    pub fn tree(&self) -> &StateTree<Env, Msg> {
        &self.tree
    }

    pub fn has_state(&self, state: &str) -> bool {
        self.tree.contains(state)
    }

    pub fn state_names(&self) -> Vec<&str> {
        self.tree.state_names()
    }

    pub fn has_action(&self, action: &str) -> bool {
        self.tree.has_action(action)
    }

    pub fn action_names(&self) -> &[String] {
        self.tree.action_names()
    }

    pub fn default_mapping(&self) -> &DefaultStateMapping {
        self.tree.default_mapping()
    }

    /// Full name of the deepest running state.
    ///
    /// While a transition is in flight this is the deepest state whose task
    /// has started, which may be above the requested target.
    pub fn current_state(&self) -> Result<String, MachineError> {
        self.current_node()
            .map(|id| self.tree.state_at(id).full_name().to_string())
            .ok_or(MachineError::NoRunningState)
    }

    /// Snapshot of the active chain.
    pub fn state(&self) -> ActiveState {
        ActiveState::new(self.current_state().ok())
    }

    /// Whether `state` has a running task.
    pub fn is_active(&self, state: &str) -> bool {
        self.tree
            .lookup(state)
            .is_some_and(|id| self.lock_tasks().is_running(id))
    }

    /// Whether the root has been activated and not shut down.
    pub fn is_started(&self) -> bool {
        self.lock_tasks().is_running(NodeId::ROOT)
    }

    /// Most recent completed transitions, oldest first.
    pub fn history(&self) -> StateHistory {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Subscribe to a state notification.
    pub fn on<F>(&self, event: StateEvent, callback: F) -> ListenerId
    where
        F: Fn(&StateEvent) + Send + Sync + 'static,
    {
        self.notifier.on(event, callback)
    }

    /// Subscribe to the next occurrence of a state notification.
    pub fn once<F>(&self, event: StateEvent, callback: F) -> ListenerId
    where
        F: Fn(&StateEvent) + Send + Sync + 'static,
    {
        self.notifier.once(event, callback)
    }

    pub fn off(&self, id: ListenerId) -> bool {
        self.notifier.off(id)
    }

    /// Number of subscriptions waiting for `event`.
    pub fn listener_count(&self, event: &StateEvent) -> usize {
        self.notifier.listener_count(event)
    }

    /// Resolve the next time `state` is entered.
    ///
    /// Being in `state` already does not count: only a fresh entry
    /// resolves the returned future. The subscription is made before this
    /// method returns, so an entry that happens before the first poll is not
    /// missed. Dropping the future removes the subscription.
    ///
    /// # Errors
    ///
    /// The future yields [`MachineError::NoSuchState`] for unknown names and
    /// [`MachineError::Closed`] if the machine is dropped first.
    pub fn wait_for_enter_state(&self, state: &str) -> StateWait {
        if !self.tree.contains(state) {
            return StateWait::failed(MachineError::NoSuchState {
                state: state.to_string(),
            });
        }
        let (entered, receiver) = oneshot::channel();
        let entered = Mutex::new(Some(entered));
        let listener = self.notifier.once(StateEvent::enter(state), move |_| {
            let sender = entered
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take();
            if let Some(sender) = sender {
                let _ = sender.send(());
            }
        });
        StateWait::pending(state.to_string(), receiver)
            .unsubscribing(Arc::downgrade(&self.notifier), listener)
    }

    /// Resolve immediately if `state` is active, else on its next entry.
    pub fn wait_for_state(&self, state: &str) -> StateWait {
        if self.is_active(state) {
            return StateWait::ready();
        }
        self.wait_for_enter_state(state)
    }

    pub(crate) fn current_node(&self) -> Option<NodeId> {
        self.lock_tasks().current()
    }

    pub(crate) fn lock_tasks(&self) -> MutexGuard<'_, TaskTable> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<Env, Msg> fmt::Debug for StatefulMachine<Env, Msg> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatefulMachine")
            .field("id", &self.id)
            .field("current_state", &self.current_state().ok())
            .field("running_states", &self.lock_tasks().running_count())
            .field("tree", &self.tree)
            .field("history_limit", &self.history_limit)
            .finish_non_exhaustive()
    }
}

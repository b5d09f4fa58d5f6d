//! Bookkeeping for the state tasks of one machine.
//!
//! A task is running from the moment its state starts entering until its
//! exit hook has completed. The table also tracks the deepest running
//! state, updated exactly when a task starts or stops.

use crate::core::NodeId;
use crate::effects::StateScope;
use tokio::sync::watch;

/// Signal owned by an active state, observed through its [`StateScope`].
#[derive(Debug)]
struct Lifetime {
    exited: watch::Sender<bool>,
}

impl Lifetime {
    fn begin(state: &str) -> (Self, StateScope) {
        let (exited, observer) = watch::channel(false);
        (Self { exited }, StateScope::new(state.to_string(), observer))
    }

    fn end(&self) {
        self.exited.send_replace(true);
    }
}

#[derive(Debug)]
struct ActiveTask {
    lifetime: Lifetime,
    scope: StateScope,
}

#[derive(Debug)]
pub(crate) struct TaskTable {
    tasks: Vec<Option<ActiveTask>>,
    current: Option<NodeId>,
}

impl TaskTable {
    pub(crate) fn new(states: usize) -> Self {
        Self {
            tasks: (0..states).map(|_| None).collect(),
            current: None,
        }
    }

    pub(crate) fn is_running(&self, id: NodeId) -> bool {
        self.tasks[id.index()].is_some()
    }

    /// Deepest running state.
    pub(crate) fn current(&self) -> Option<NodeId> {
        self.current
    }

    pub(crate) fn running_count(&self) -> usize {
        self.tasks.iter().filter(|task| task.is_some()).count()
    }

    /// Mark `id` running with a fresh lifetime; it becomes the current state.
    pub(crate) fn start(&mut self, id: NodeId, state: &str) -> StateScope {
        let (lifetime, scope) = Lifetime::begin(state);
        self.tasks[id.index()] = Some(ActiveTask {
            lifetime,
            scope: scope.clone(),
        });
        self.current = Some(id);
        scope
    }

    /// Fire the exit signal of `id`. The task keeps running until `stop`.
    pub(crate) fn begin_exit(&mut self, id: NodeId) -> Option<StateScope> {
        self.tasks[id.index()].as_ref().map(|task| {
            task.lifetime.end();
            task.scope.clone()
        })
    }

    pub(crate) fn stop(&mut self, id: NodeId, parent: Option<NodeId>) {
        if let Some(task) = self.tasks[id.index()].take() {
            task.lifetime.end();
        }
        if self.current == Some(id) {
            self.current = parent;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_tracks_deepest_state() {
        let mut table = TaskTable::new(3);
        assert_eq!(table.current(), None);

        table.start(NodeId(0), "_root");
        table.start(NodeId(1), "A");
        assert!(table.is_running(NodeId(0)));
        assert!(table.is_running(NodeId(1)));
        assert!(!table.is_running(NodeId(2)));
        assert_eq!(table.current(), Some(NodeId(1)));
        assert_eq!(table.running_count(), 2);
    }

    #[test]
    fn exit_signal_fires_before_stop() {
        let mut table = TaskTable::new(2);
        table.start(NodeId(0), "_root");
        let scope = table.start(NodeId(1), "A");
        assert!(!scope.is_exited());

        let exiting = table.begin_exit(NodeId(1)).unwrap();
        assert_eq!(exiting.state(), "A");
        assert!(scope.is_exited());
        assert!(table.is_running(NodeId(1)));

        table.stop(NodeId(1), Some(NodeId(0)));
        assert!(!table.is_running(NodeId(1)));
        assert_eq!(table.current(), Some(NodeId(0)));
    }

    #[test]
    fn restarted_task_gets_fresh_scope() {
        let mut table = TaskTable::new(2);
        let first = table.start(NodeId(1), "A");
        table.stop(NodeId(1), None);
        assert!(first.is_exited());
        assert_eq!(table.current(), None);

        let second = table.start(NodeId(1), "A");
        assert!(!second.is_exited());
    }

    #[test]
    fn dormant_task_has_nothing_to_exit() {
        let mut table = TaskTable::new(1);
        assert!(table.begin_exit(NodeId(0)).is_none());
    }
}

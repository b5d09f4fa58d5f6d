//! Builder binding a state declaration to a host environment.

use crate::builder::decl::StateDecl;
use crate::builder::error::BuildError;
use crate::core::StateTree;
use crate::runtime::{MachineId, StatefulMachine};

/// Records kept by default in a machine's history.
pub const DEFAULT_HISTORY_LIMIT: usize = 128;

/// Builder for [`StatefulMachine`] with a fluent API.
pub struct MachineBuilder<Env, Msg = ()> {
    root: StateDecl<Env, Msg>,
    label: String,
    record_history: bool,
    history_limit: usize,
}

impl<Env, Msg> MachineBuilder<Env, Msg> {
    /// Create a builder for the hierarchy declared by `root`.
    pub fn new(root: StateDecl<Env, Msg>) -> Self {
        Self {
            root,
            label: "stateful".to_string(),
            record_history: true,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Name of the host, shown in errors and logs.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Whether completed transitions are kept in the machine's history.
    pub fn record_history(mut self, enabled: bool) -> Self {
        self.record_history = enabled;
        self
    }

    /// Most transitions kept in the history; older records are dropped
    /// first. Defaults to [`DEFAULT_HISTORY_LIMIT`].
    pub fn history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Build a dormant machine. Nothing is entered until
    /// [`StatefulMachine::start`] is awaited.
    pub fn build(self, env: Env) -> Result<StatefulMachine<Env, Msg>, BuildError> {
        let tree = StateTree::build(self.root)?;
        let history_limit = if self.record_history {
            self.history_limit
        } else {
            0
        };
        Ok(StatefulMachine::new(
            MachineId::new(self.label),
            tree,
            env,
            history_limit,
        ))
    }
}

impl<Env, Msg> MachineBuilder<Env, Msg>
where
    Env: Clone + Send + Sync + 'static,
{
    /// Build the machine and enter its default chain.
    pub async fn start(self, env: Env) -> Result<StatefulMachine<Env, Msg>, crate::Error> {
        let machine = self.build(env)?;
        machine.start().await?;
        Ok(machine)
    }
}

//! Immutable state tree produced by the builder.
//!
//! Nodes live in an arena owned by the [`StateTree`]; parents refer to
//! children (and children back to parents) by [`NodeId`]. The tree is never
//! mutated after construction.

use super::path;
use crate::effects::{ActionHandler, StateHooks};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Index of a state inside its tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The root state.
    pub const ROOT: NodeId = NodeId(0);

    /// Position in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// One state of the hierarchy.
pub struct StateNode<Env, Msg> {
    pub(crate) name: String,
    pub(crate) full_name: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) is_default: bool,
    pub(crate) default_child: Option<NodeId>,
    pub(crate) hooks: StateHooks<Env>,
    pub(crate) actions: HashMap<String, ActionHandler<Env, Msg>>,
}

impl<Env, Msg> StateNode<Env, Msg> {
    /// Last path segment (`"idle"` for `"on.idle"`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dot-joined path from the root.
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Enclosing state, `None` for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Substates in declaration order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Whether the parent enters this state on its own.
    pub fn is_default(&self) -> bool {
        self.is_default
    }

    /// Substate entered automatically when this state is entered.
    pub fn default_child(&self) -> Option<NodeId> {
        self.default_child
    }

    /// Whether this state has no substates.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Entry, error and exit hooks.
    pub fn hooks(&self) -> &StateHooks<Env> {
        &self.hooks
    }

    /// Handler registered here for `action`.
    pub fn action(&self, action: &str) -> Option<&ActionHandler<Env, Msg>> {
        self.actions.get(action)
    }

    /// Whether a handler for `action` is registered here.
    pub fn handles(&self, action: &str) -> bool {
        self.actions.contains_key(action)
    }
}

impl<Env, Msg> fmt::Debug for StateNode<Env, Msg> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut actions: Vec<&str> = self.actions.keys().map(String::as_str).collect();
        actions.sort_unstable();
        f.debug_struct("StateNode")
            .field("full_name", &self.full_name)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("is_default", &self.is_default)
            .field("default_child", &self.default_child)
            .field("hooks", &self.hooks)
            .field("actions", &actions)
            .finish_non_exhaustive()
    }
}

/// Full name of each state mapped to the full name of its default substate.
///
/// Derived once while the tree is built.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultStateMapping {
    defaults: BTreeMap<String, String>,
}

impl DefaultStateMapping {
    pub(crate) fn insert(&mut self, state: String, default_substate: String) {
        self.defaults.insert(state, default_substate);
    }

    /// Default substate of `state`, if it has substates.
    pub fn get(&self, state: &str) -> Option<&str> {
        self.defaults.get(state).map(String::as_str)
    }

    /// Number of states with a default substate.
    pub fn len(&self) -> usize {
        self.defaults.len()
    }

    /// Whether no state has substates.
    pub fn is_empty(&self) -> bool {
        self.defaults.is_empty()
    }

    /// `(state, default substate)` pairs ordered by state name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.defaults
            .iter()
            .map(|(state, default)| (state.as_str(), default.as_str()))
    }

    /// Follow defaults from `state` down to a leaf.
    ///
    /// # Example
    ///
    /// ```rust
    /// use stateful::builder::StateDecl;
    /// use stateful::core::StateTree;
    ///
    /// let root: StateDecl<()> = StateDecl::new()
    ///     .state("off", StateDecl::new().state("dead", StateDecl::new()))
    ///     .state("on", StateDecl::new().default_state());
    /// let tree = StateTree::build(root).unwrap();
    ///
    /// assert_eq!(tree.default_mapping().leaf_of("_root"), "on");
    /// assert_eq!(tree.default_mapping().leaf_of("off"), "off.dead");
    /// ```
    pub fn leaf_of(&self, state: &str) -> String {
        let mut leaf = state;
        while let Some(next) = self.get(leaf) {
            leaf = next;
        }
        leaf.to_string()
    }
}

/// The whole state hierarchy of one host.
pub struct StateTree<Env, Msg = ()> {
    pub(crate) nodes: Vec<StateNode<Env, Msg>>,
    pub(crate) index: HashMap<String, NodeId>,
    pub(crate) defaults: DefaultStateMapping,
    pub(crate) action_names: Vec<String>,
}

impl<Env, Msg> StateTree<Env, Msg> {
    /// The root state.
    pub fn root(&self) -> &StateNode<Env, Msg> {
        &self.nodes[NodeId::ROOT.0]
    }

    /// State stored at `id`, `None` for an id from another tree.
    pub fn node(&self, id: NodeId) -> Option<&StateNode<Env, Msg>> {
        self.nodes.get(id.0)
    }

    /// State stored at an id handed out by this tree.
    pub(crate) fn state_at(&self, id: NodeId) -> &StateNode<Env, Msg> {
        &self.nodes[id.0]
    }

    /// Id of the state named `full_name`.
    pub fn lookup(&self, full_name: &str) -> Option<NodeId> {
        self.index.get(full_name).copied()
    }

    /// State named `full_name`.
    pub fn get(&self, full_name: &str) -> Option<&StateNode<Env, Msg>> {
        self.lookup(full_name).map(|id| self.state_at(id))
    }

    /// Whether a state named `full_name` exists.
    pub fn contains(&self, full_name: &str) -> bool {
        self.index.contains_key(full_name)
    }

    /// Number of states, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the root is the only state.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Every state name, shallowest first, root included.
    pub fn state_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.nodes.iter().map(|n| n.full_name()).collect();
        names.sort_by_key(|name| path::depth(name));
        names
    }

    /// Default substate of every non-leaf state.
    pub fn default_mapping(&self) -> &DefaultStateMapping {
        &self.defaults
    }

    /// Every action name declared anywhere, in discovery order.
    pub fn action_names(&self) -> &[String] {
        &self.action_names
    }

    /// Whether any state declares `action`.
    pub fn has_action(&self, action: &str) -> bool {
        self.action_names.iter().any(|name| name == action)
    }

    /// Chain of states from the root down to `id`, both included.
    pub fn path_from_root(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = vec![id];
        let mut cursor = self.state_at(id).parent;
        while let Some(parent) = cursor {
            chain.push(parent);
            cursor = self.state_at(parent).parent;
        }
        chain.reverse();
        chain
    }

    /// Whether `ancestor` is `id` or encloses it.
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.state_at(current).parent;
        }
        false
    }
}

impl<Env, Msg> fmt::Debug for StateTree<Env, Msg> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateTree")
            .field("states", &self.state_names())
            .field("defaults", &self.defaults)
            .field("action_names", &self.action_names)
            .finish_non_exhaustive()
    }
}

//! Construction of the immutable [`StateTree`] from a [`StateDecl`].

use crate::builder::decl::StateDecl;
use crate::builder::error::BuildError;
use crate::core::path::{self, ROOT, SEPARATOR};
use crate::core::{DefaultStateMapping, NodeId, StateNode, StateTree};
use std::collections::{HashMap, HashSet};

impl<Env, Msg> StateTree<Env, Msg> {
    /// Build the tree declared by `root`, resolving default substates.
    ///
    /// - no substates: nothing to resolve
    /// - one substate: it is the default
    /// - several substates: exactly one must be marked with
    ///   [`StateDecl::default_state`]
    ///
    /// # Example
    ///
    /// ```rust
    /// use stateful::builder::{BuildError, StateDecl};
    /// use stateful::core::StateTree;
    ///
    /// let ambiguous: StateDecl<()> = StateDecl::new()
    ///     .state("A", StateDecl::new())
    ///     .state("B", StateDecl::new());
    ///
    /// assert_eq!(
    ///     StateTree::build(ambiguous).unwrap_err(),
    ///     BuildError::DefaultSubstateNotDefined { state: "_root".to_string() }
    /// );
    /// ```
    pub fn build(root: StateDecl<Env, Msg>) -> Result<Self, BuildError> {
        let mut tree = StateTree {
            nodes: Vec::new(),
            index: HashMap::new(),
            defaults: DefaultStateMapping::default(),
            action_names: Vec::new(),
        };
        tree.insert(root, ROOT.to_string(), ROOT.to_string(), None, false)?;
        Ok(tree)
    }

    fn insert(
        &mut self,
        decl: StateDecl<Env, Msg>,
        name: String,
        full_name: String,
        parent: Option<NodeId>,
        is_default: bool,
    ) -> Result<NodeId, BuildError> {
        let StateDecl {
            hooks,
            is_default: _,
            actions,
            states,
        } = decl;

        let mut handlers = HashMap::with_capacity(actions.len());
        for (action, handler) in actions {
            if handlers.contains_key(&action) {
                return Err(BuildError::DuplicateAction {
                    state: full_name,
                    action,
                });
            }
            if !self.action_names.contains(&action) {
                self.action_names.push(action.clone());
            }
            handlers.insert(action, handler);
        }

        validate_substate_names(&full_name, &states)?;
        let default_index = find_default_substate(&full_name, &states)?;

        let id = NodeId(self.nodes.len());
        self.nodes.push(StateNode {
            name,
            full_name: full_name.clone(),
            parent,
            children: Vec::with_capacity(states.len()),
            is_default,
            default_child: None,
            hooks,
            actions: handlers,
        });
        self.index.insert(full_name.clone(), id);

        for (position, (child_name, child_decl)) in states.into_iter().enumerate() {
            let child_full_name = path::full_name(&full_name, &child_name);
            let child_is_default = default_index == Some(position);
            let child = self.insert(
                child_decl,
                child_name,
                child_full_name.clone(),
                Some(id),
                child_is_default,
            )?;
            self.nodes[id.0].children.push(child);
            if child_is_default {
                self.nodes[id.0].default_child = Some(child);
                self.defaults.insert(full_name.clone(), child_full_name);
            }
        }

        Ok(id)
    }
}

fn validate_substate_names<Env, Msg>(
    parent: &str,
    states: &[(String, StateDecl<Env, Msg>)],
) -> Result<(), BuildError> {
    let mut seen = HashSet::with_capacity(states.len());
    for (name, _) in states {
        if name.is_empty() || name.contains(SEPARATOR) || name == ROOT {
            return Err(BuildError::InvalidStateName {
                parent: parent.to_string(),
                name: name.clone(),
            });
        }
        if !seen.insert(name.as_str()) {
            return Err(BuildError::DuplicateState {
                state: path::full_name(parent, name),
            });
        }
    }
    Ok(())
}

/// Position of the substate entered when `state` is entered on its own.
fn find_default_substate<Env, Msg>(
    state: &str,
    states: &[(String, StateDecl<Env, Msg>)],
) -> Result<Option<usize>, BuildError> {
    match states.len() {
        0 => Ok(None),
        1 => Ok(Some(0)),
        _ => {
            let marked: Vec<usize> = states
                .iter()
                .enumerate()
                .filter(|(_, (_, decl))| decl.is_default)
                .map(|(position, _)| position)
                .collect();
            match marked.as_slice() {
                [] => Err(BuildError::DefaultSubstateNotDefined {
                    state: state.to_string(),
                }),
                [only] => Ok(Some(*only)),
                _ => Err(BuildError::MultipleDefaultSubstates {
                    state: state.to_string(),
                    substates: marked
                        .iter()
                        .map(|position| states[*position].0.clone())
                        .collect(),
                }),
            }
        }
    }
}

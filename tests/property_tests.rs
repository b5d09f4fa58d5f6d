//! Property-based tests for state paths and tree construction.
//!
//! These tests use proptest to verify properties hold across
//! many randomly generated inputs.

use proptest::prelude::*;
use stateful::builder::{BuildError, StateDecl};
use stateful::core::path::{self, ROOT};
use stateful::core::StateTree;

prop_compose! {
    fn arbitrary_segment()(segment in "[a-zA-Z][a-zA-Z0-9]{0,6}") -> String {
        segment
    }
}

prop_compose! {
    fn arbitrary_path()(segments in prop::collection::vec(arbitrary_segment(), 1..5)) -> String {
        segments.join(".")
    }
}

/// Nested single-child states, one level per name.
fn chain(names: &[String]) -> StateDecl<()> {
    names
        .iter()
        .rev()
        .fold(StateDecl::new(), |child, name| StateDecl::new().state(name.clone(), child))
}

proptest! {
    #[test]
    fn ancestor_is_symmetric(a in arbitrary_path(), b in arbitrary_path()) {
        prop_assert_eq!(
            path::youngest_common_ancestor(&a, &b),
            path::youngest_common_ancestor(&b, &a)
        );
    }

    #[test]
    fn ancestor_contains_both_paths(a in arbitrary_path(), b in arbitrary_path()) {
        let ancestor = path::youngest_common_ancestor(&a, &b);
        prop_assert!(path::is_within(&a, &ancestor));
        prop_assert!(path::is_within(&b, &ancestor));
    }

    #[test]
    fn ancestor_of_self_is_self(a in arbitrary_path()) {
        prop_assert_eq!(path::youngest_common_ancestor(&a, &a), a);
    }

    #[test]
    fn ancestor_respects_segment_boundaries(
        parent in arbitrary_path(),
        stem in arbitrary_segment(),
        left in "[a-z]{1,3}",
        right in "[A-Z]{1,3}",
    ) {
        let a = format!("{parent}.{stem}{left}");
        let b = format!("{parent}.{stem}{right}");
        prop_assert_eq!(path::youngest_common_ancestor(&a, &b), parent);
    }

    #[test]
    fn disjoint_roots_share_only_root(a in arbitrary_path(), b in arbitrary_path()) {
        let a = format!("x{a}");
        let b = format!("y{b}");
        prop_assert_eq!(path::youngest_common_ancestor(&a, &b), ROOT);
    }

    #[test]
    fn every_ancestor_is_within(leaf in arbitrary_path()) {
        for ancestor in path::ancestors_deepest_first(&leaf) {
            prop_assert!(path::is_within(&leaf, &ancestor));
        }
        prop_assert!(path::is_within(&leaf, ROOT));
    }

    #[test]
    fn ancestors_shrink_by_one_segment(leaf in arbitrary_path()) {
        let ancestors = path::ancestors_deepest_first(&leaf);
        prop_assert_eq!(ancestors.len(), path::depth(&leaf));
        for pair in ancestors.windows(2) {
            prop_assert_eq!(path::super_state_name(&pair[0]), Some(pair[1].clone()));
        }
    }

    #[test]
    fn single_children_are_implicit_defaults(
        names in prop::collection::vec(arbitrary_segment(), 1..6)
    ) {
        let tree = StateTree::build(chain(&names)).unwrap();
        let leaf = names.join(".");
        prop_assert_eq!(tree.default_mapping().leaf_of(ROOT), leaf);
        prop_assert_eq!(tree.len(), names.len() + 1);
    }

    #[test]
    fn siblings_without_default_are_rejected(
        first in arbitrary_segment(),
        second in arbitrary_segment(),
    ) {
        prop_assume!(first != second);
        let decl: StateDecl<()> = StateDecl::new()
            .state(first, StateDecl::new())
            .state(second, StateDecl::new());
        prop_assert_eq!(
            StateTree::build(decl).unwrap_err(),
            BuildError::DefaultSubstateNotDefined { state: ROOT.to_string() }
        );
    }

    #[test]
    fn marked_sibling_becomes_default(
        names in prop::collection::hash_set(arbitrary_segment(), 2..6),
        pick in any::<prop::sample::Index>(),
    ) {
        let names: Vec<String> = names.into_iter().collect();
        let chosen = pick.index(names.len());
        let decl = names.iter().enumerate().fold(StateDecl::<()>::new(), |decl, (i, name)| {
            let child = if i == chosen { StateDecl::new().default_state() } else { StateDecl::new() };
            decl.state(name.clone(), child)
        });

        let tree = StateTree::build(decl).unwrap();
        prop_assert_eq!(tree.default_mapping().get(ROOT), Some(names[chosen].as_str()));
    }
}

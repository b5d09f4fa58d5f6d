//! State path arithmetic.
//!
//! States are addressed by their full, dot-joined path from the root
//! (`"on.active.walking"`). The root itself carries the reserved name
//! [`ROOT`] and contributes no segments to its descendants' paths.
//!
//! Everything here is pure string work on segment boundaries, never on
//! raw characters: `"A.Foo"` and `"A.FooBar"` share `"A"`, nothing more.

/// Reserved full name of the root state.
pub const ROOT: &str = "_root";

/// Separator between path segments.
pub const SEPARATOR: char = '.';

/// Split a full state name into its segments.
///
/// The root has no segments.
///
/// # Example
///
/// ```rust
/// use stateful::core::path::segments;
///
/// assert_eq!(segments("on.idle"), vec!["on", "idle"]);
/// assert!(segments("_root").is_empty());
/// ```
pub fn segments(full_name: &str) -> Vec<&str> {
    if full_name == ROOT || full_name.is_empty() {
        return Vec::new();
    }
    full_name.split(SEPARATOR).collect()
}

/// Join segments back into a full state name, yielding [`ROOT`] for none.
pub fn join(segments: &[&str]) -> String {
    if segments.is_empty() {
        ROOT.to_string()
    } else {
        segments.join(".")
    }
}

/// Full name of `name` declared under `parent_full_name`.
///
/// # Example
///
/// ```rust
/// use stateful::core::path::full_name;
///
/// assert_eq!(full_name("_root", "on"), "on");
/// assert_eq!(full_name("on", "idle"), "on.idle");
/// ```
pub fn full_name(parent_full_name: &str, name: &str) -> String {
    if parent_full_name == ROOT {
        name.to_string()
    } else {
        format!("{parent_full_name}{SEPARATOR}{name}")
    }
}

/// Full name of the enclosing state, `None` for the root.
pub fn super_state_name(full_name: &str) -> Option<String> {
    if full_name == ROOT {
        return None;
    }
    let parts = segments(full_name);
    Some(join(&parts[..parts.len().saturating_sub(1)]))
}

/// Depth of a state below the root (root = 0).
pub fn depth(full_name: &str) -> usize {
    segments(full_name).len()
}

/// Deepest state that is an ancestor-or-self of both paths.
///
/// Falls back to [`ROOT`] when the paths share no leading segment.
///
/// # Example
///
/// ```rust
/// use stateful::core::path::youngest_common_ancestor;
///
/// assert_eq!(youngest_common_ancestor("A.B.C", "A.X.Y"), "A");
/// assert_eq!(youngest_common_ancestor("A.B.C", "Z.X.Y"), "_root");
/// assert_eq!(youngest_common_ancestor("A.FooBaz", "A.FooBar"), "A");
/// ```
pub fn youngest_common_ancestor(first: &str, second: &str) -> String {
    let shared: Vec<&str> = segments(first)
        .into_iter()
        .zip(segments(second))
        .take_while(|(a, b)| a == b)
        .map(|(a, _)| a)
        .collect();
    join(&shared)
}

/// Whether `candidate` is `leaf` itself or one of its ancestors.
///
/// This is the membership test behind the nested `state` view: in state
/// `"a.b.c"`, each of `"a"`, `"a.b"` and `"a.b.c"` is within.
pub fn is_within(leaf: &str, candidate: &str) -> bool {
    let leaf_parts = segments(leaf);
    let candidate_parts = segments(candidate);
    candidate_parts.len() <= leaf_parts.len()
        && leaf_parts
            .iter()
            .zip(candidate_parts.iter())
            .all(|(a, b)| a == b)
}

/// Ancestor chain of `full_name` from the state itself up to, but not
/// including, the root.
pub fn ancestors_deepest_first(full_name: &str) -> Vec<String> {
    let parts = segments(full_name);
    (1..=parts.len()).rev().map(|i| join(&parts[..i])).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_youngest_common_ancestor() {
        assert_eq!(youngest_common_ancestor("A.B.C", "A.X.Y"), "A");
    }

    #[test]
    fn falls_back_to_root_without_common_ancestor() {
        assert_eq!(youngest_common_ancestor("A.B.C", "Z.X.Y"), ROOT);
    }

    #[test]
    fn compares_whole_segments() {
        assert_eq!(youngest_common_ancestor("A.FooBaz", "A.FooBar"), "A");
        assert_eq!(youngest_common_ancestor("A.Foo", "A.FooBar"), "A");
    }

    #[test]
    fn ancestor_of_nested_pair_is_shallower_one() {
        assert_eq!(youngest_common_ancestor("A.B", "A.B.C"), "A.B");
        assert_eq!(youngest_common_ancestor("A.B.C", "A.B.C"), "A.B.C");
    }

    #[test]
    fn root_shares_nothing() {
        assert_eq!(youngest_common_ancestor(ROOT, "A.B"), ROOT);
        assert_eq!(youngest_common_ancestor("A", ROOT), ROOT);
    }

    #[test]
    fn super_state_of_top_level_is_root() {
        assert_eq!(super_state_name("on"), Some(ROOT.to_string()));
        assert_eq!(super_state_name("on.idle"), Some("on".to_string()));
        assert_eq!(super_state_name(ROOT), None);
    }

    #[test]
    fn membership_follows_segments() {
        assert!(is_within("a.b.c", "a"));
        assert!(is_within("a.b.c", "a.b"));
        assert!(is_within("a.b.c", "a.b.c"));
        assert!(is_within("a.b.c", ROOT));
        assert!(!is_within("a.b.c", "a.b.c.d"));
        assert!(!is_within("a.bc", "a.b"));
        assert!(!is_within(ROOT, "a"));
    }

    #[test]
    fn ancestors_are_listed_deepest_first() {
        assert_eq!(
            ancestors_deepest_first("a.b.c"),
            vec!["a.b.c".to_string(), "a.b".to_string(), "a".to_string()]
        );
        assert!(ancestors_deepest_first(ROOT).is_empty());
    }

    #[test]
    fn depth_counts_segments() {
        assert_eq!(depth(ROOT), 0);
        assert_eq!(depth("a"), 1);
        assert_eq!(depth("a.b.c"), 3);
    }
}

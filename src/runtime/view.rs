//! Read-only view of the active state chain.

use crate::core::path;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// Snapshot of which states were active when it was taken.
///
/// For an active leaf `a.b.c`, the states `a`, `a.b` and `a.b.c` are all
/// reported active and the JSON form is `{"a":{"b":{"c":{}}}}`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActiveState {
    leaf: Option<String>,
}

impl ActiveState {
    pub(crate) fn new(leaf: Option<String>) -> Self {
        Self { leaf }
    }

    /// Full name of the active leaf, `None` before the machine starts.
    pub fn leaf(&self) -> Option<&str> {
        self.leaf.as_deref()
    }

    /// Whether `state` is the leaf or one of its ancestors.
    pub fn is(&self, state: &str) -> bool {
        self.leaf
            .as_deref()
            .is_some_and(|leaf| path::is_within(leaf, state))
    }

    /// Segments of the active path, shallowest first.
    pub fn path(&self) -> Vec<&str> {
        self.leaf.as_deref().map(path::segments).unwrap_or_default()
    }

    /// Nested object mirroring the active path.
    pub fn to_json(&self) -> Value {
        self.path()
            .into_iter()
            .rev()
            .fold(Value::Object(Map::new()), |inner, segment| {
                let mut outer = Map::new();
                outer.insert(segment.to_string(), inner);
                Value::Object(outer)
            })
    }
}

impl Serialize for ActiveState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl fmt::Display for ActiveState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.leaf.as_deref().unwrap_or(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn leaf_and_ancestors_are_active() {
        let view = ActiveState::new(Some("a.b.c".to_string()));
        assert!(view.is("a"));
        assert!(view.is("a.b"));
        assert!(view.is("a.b.c"));
        assert!(view.is("_root"));
        assert!(!view.is("a.x"));
        assert!(!view.is("a.b.c.d"));
        assert_eq!(view.path(), vec!["a", "b", "c"]);
    }

    #[test]
    fn json_mirrors_the_path() {
        let view = ActiveState::new(Some("a.b.c".to_string()));
        assert_eq!(view.to_json(), json!({"a": {"b": {"c": {}}}}));
        assert_eq!(serde_json::to_value(&view).unwrap(), view.to_json());
    }

    #[test]
    fn dormant_and_root_views_are_empty() {
        let dormant = ActiveState::new(None);
        assert!(!dormant.is("_root"));
        assert_eq!(dormant.to_json(), json!({}));

        let root = ActiveState::new(Some("_root".to_string()));
        assert!(root.is("_root"));
        assert_eq!(root.to_json(), json!({}));
        assert_eq!(root.to_string(), "_root");
    }
}

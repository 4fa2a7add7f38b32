use serde_json::{Map, Value};

/// Longest dotted path the resolver will walk.
pub const MAX_PATH_DEPTH: usize = 16;

/// Outcome of a dotted-path lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolved<'a> {
    Found(&'a Value),
    Missing,
}

impl<'a> Resolved<'a> {
    /// The value, treating JSON `null` the same as a missing field.
    pub fn present(self) -> Option<&'a Value> {
        match self {
            Resolved::Found(Value::Null) | Resolved::Missing => None,
            Resolved::Found(v) => Some(v),
        }
    }
}

/// Walk `path` (e.g. `prev.data.items.0`) through objects and arrays.
///
/// Empty paths, paths longer than `MAX_PATH_DEPTH` segments, and any step
/// through a scalar resolve to `Missing`.
pub fn resolve_path<'a>(root: &'a Value, path: &str) -> Resolved<'a> {
    let path = path.trim();
    if path.is_empty() {
        return Resolved::Missing;
    }

    let mut current = root;
    for (depth, part) in path.split('.').enumerate() {
        if depth >= MAX_PATH_DEPTH {
            return Resolved::Missing;
        }
        let next = match current {
            Value::Object(map) => map.get(part),
            Value::Array(items) => part.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };
        match next {
            Some(v) => current = v,
            None => return Resolved::Missing,
        }
    }
    Resolved::Found(current)
}

/// Data visible to a node while it runs.
///
/// Shaped as `{ "<parentId>": output, ..., "parents": {..}, "prev": output }`
/// where `prev` is the output of the source of the node's first incoming edge.
/// `prev` is absent for entry nodes.
#[derive(Debug, Clone)]
pub struct NodeContext {
    data: Value,
}

impl NodeContext {
    pub fn new(prev: Option<Value>, parents: Vec<(String, Value)>) -> Self {
        let mut data = Map::new();
        let mut by_id = Map::new();
        for (id, output) in parents {
            data.insert(id.clone(), output.clone());
            by_id.insert(id, output);
        }
        data.insert("parents".into(), Value::Object(by_id));
        if let Some(prev) = prev {
            data.insert("prev".into(), prev);
        }
        Self {
            data: Value::Object(data),
        }
    }

    /// Context of a node with no upstream.
    pub fn empty() -> Self {
        Self::new(None, vec![])
    }

    pub fn prev(&self) -> Option<&Value> {
        self.data.get("prev")
    }

    pub fn resolve(&self, path: &str) -> Resolved<'_> {
        resolve_path(&self.data, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolve_nested_object() {
        let root = json!({ "prev": { "data": { "status": "ok" } } });
        assert_eq!(
            resolve_path(&root, "prev.data.status"),
            Resolved::Found(&json!("ok"))
        );
    }

    #[test]
    fn test_resolve_array_index() {
        let root = json!({ "prev": { "items": ["a", "b"] } });
        assert_eq!(resolve_path(&root, "prev.items.1"), Resolved::Found(&json!("b")));
        assert_eq!(resolve_path(&root, "prev.items.7"), Resolved::Missing);
        assert_eq!(resolve_path(&root, "prev.items.x"), Resolved::Missing);
    }

    #[test]
    fn test_resolve_through_scalar_is_missing() {
        let root = json!({ "prev": "text" });
        assert_eq!(resolve_path(&root, "prev.length"), Resolved::Missing);
    }

    #[test]
    fn test_resolve_empty_path_is_missing() {
        let root = json!({ "prev": 1 });
        assert_eq!(resolve_path(&root, "  "), Resolved::Missing);
    }

    #[test]
    fn test_resolve_depth_is_bounded() {
        let mut root = json!("leaf");
        for _ in 0..(MAX_PATH_DEPTH + 1) {
            root = json!({ "a": root });
        }
        let too_long = vec!["a"; MAX_PATH_DEPTH + 1].join(".");
        assert_eq!(resolve_path(&root, &too_long), Resolved::Missing);

        let within = vec!["a"; MAX_PATH_DEPTH].join(".");
        assert!(matches!(resolve_path(&root, &within), Resolved::Found(_)));
    }

    #[test]
    fn test_null_is_not_present() {
        let root = json!({ "prev": null });
        assert!(resolve_path(&root, "prev").present().is_none());
    }

    #[test]
    fn test_context_exposes_prev_and_parents() {
        let ctx = NodeContext::new(
            Some(json!({ "type": "manual" })),
            vec![("t".into(), json!({ "type": "manual" })), ("u".into(), json!(2))],
        );
        assert_eq!(ctx.resolve("prev.type"), Resolved::Found(&json!("manual")));
        assert_eq!(ctx.resolve("parents.u"), Resolved::Found(&json!(2)));
        assert_eq!(ctx.resolve("u"), Resolved::Found(&json!(2)));
    }

    #[test]
    fn test_prev_wins_over_parent_named_prev() {
        let ctx = NodeContext::new(Some(json!("real")), vec![("prev".into(), json!("shadow"))]);
        assert_eq!(ctx.prev(), Some(&json!("real")));
    }

    #[test]
    fn test_empty_context_has_no_prev() {
        let ctx = NodeContext::empty();
        assert!(ctx.prev().is_none());
        assert_eq!(ctx.resolve("prev.type"), Resolved::Missing);
    }
}

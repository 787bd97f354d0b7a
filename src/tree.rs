//! Dot-path access and deep merge over the accumulated value tree.
//!
//! Merge semantics:
//! - Objects: deep-merge by key (recursive)
//! - Arrays: REPLACE (overlay wins entirely)
//! - Scalars: override (overlay wins)

use serde_json::{Map, Value};

use crate::defaults::PATH_SEPARATOR;

/// Deep merge `overlay` onto `base`.
#[must_use]
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (_, overlay) => overlay,
    }
}

/// Returns the value at a dot-path, if every segment exists.
#[must_use]
pub fn lookup<'a>(tree: &'a Value, path: &str) -> Option<&'a Value> {
    path.split(PATH_SEPARATOR)
        .try_fold(tree, |node, segment| node.as_object()?.get(segment))
}

/// Sets the value at a dot-path, creating intermediate objects.
///
/// A non-object found on the way is replaced by an object, matching the
/// "higher layer wins" rule for a scalar shadowed by a section.
pub fn insert(tree: &mut Value, path: &str, value: Value) {
    match path.split_once(PATH_SEPARATOR) {
        None => {
            object_mut(tree).insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let child = object_mut(tree)
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            insert(child, rest, value);
        }
    }
}

fn object_mut(node: &mut Value) -> &mut Map<String, Value> {
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(map) => map,
        _ => unreachable!("node was just made an object"),
    }
}

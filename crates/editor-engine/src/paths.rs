//! Dotted-path access into nested config values
//!
//! Config edits address nested fields with dotted paths ("llm.temperature").
//! Writes are clone-then-set: the caller gets a new value tree and the live
//! object is never mutated through a path operation.

use serde_json::{Map, Value};

use crate::error::{EditorError, Result};

/// Read the value at a dotted path, if every segment resolves
pub fn get_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return None;
    }
    let mut cur = root;
    for seg in path.split('.') {
        cur = cur.get(seg)?;
    }
    Some(cur)
}

/// Return a clone of `root` with `value` set at the dotted path
///
/// Missing intermediate objects are created; traversing through an existing
/// non-object value is an error.
pub fn with_path_set(root: &Value, path: &str, value: Value) -> Result<Value> {
    if path.is_empty() {
        return Err(EditorError::invalid_path(path, "empty path"));
    }
    let mut cloned = root.clone();
    set_recursive(&mut cloned, path, path, value)?;
    Ok(cloned)
}

fn set_recursive(cur: &mut Value, full_path: &str, remaining: &str, value: Value) -> Result<()> {
    let (seg, rest) = match remaining.split_once('.') {
        Some((head, tail)) => (head, Some(tail)),
        None => (remaining, None),
    };
    if seg.is_empty() {
        return Err(EditorError::invalid_path(full_path, "empty path segment"));
    }
    if cur.is_null() {
        *cur = Value::Object(Map::new());
    }
    let map = match cur.as_object_mut() {
        Some(map) => map,
        None => {
            return Err(EditorError::invalid_path(
                full_path,
                format!("segment '{seg}' is inside a non-object value"),
            ))
        }
    };
    match rest {
        None => {
            map.insert(seg.to_string(), value);
            Ok(())
        }
        Some(rest) => {
            let child = map
                .entry(seg.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            set_recursive(child, full_path, rest, value)
        }
    }
}

//! Handle schema mappings
//!
//! A node's input/output schema maps handle keys to declared value-type
//! tokens (e.g. "str"). Keys double as form labels and as connection-point
//! identifiers, so every mutation here has a counterpart in the rename
//! coordination that keeps edges consistent.

use std::collections::BTreeMap;

use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Mapping from handle key to declared value-type token
///
/// Backed by a `BTreeMap`, so iteration (and the key order observed after a
/// rename) is lexicographic and deterministic.
pub type SchemaMap = BTreeMap<String, String>;

/// Which side of a node a schema describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaSide {
    /// The node's input handles (`config.input_schema`)
    InputSchema,
    /// The node's output handles (`config.output_schema`)
    OutputSchema,
}

impl SchemaSide {
    /// The config key this side's mapping is stored under
    pub fn config_key(&self) -> &'static str {
        match self {
            SchemaSide::InputSchema => "input_schema",
            SchemaSide::OutputSchema => "output_schema",
        }
    }
}

/// Normalize a user-entered handle key: trim and collapse whitespace runs
/// to underscores
pub fn normalize_key(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join("_")
}

/// Read a schema mapping out of a node's config object
///
/// Missing or malformed entries degrade to an empty mapping; non-string
/// type tokens are skipped.
pub fn schema_from_config(config: &Value, side: SchemaSide) -> SchemaMap {
    let mut schema = SchemaMap::new();
    if let Some(obj) = config.get(side.config_key()).and_then(|v| v.as_object()) {
        for (key, token) in obj {
            if let Some(token) = token.as_str() {
                schema.insert(key.clone(), token.to_string());
            }
        }
    }
    schema
}

/// Convert a schema mapping back to its JSON config form
pub fn schema_to_value(schema: &SchemaMap) -> Value {
    let mut obj = Map::new();
    for (key, token) in schema {
        obj.insert(key.clone(), Value::String(token.clone()));
    }
    Value::Object(obj)
}

/// Build the mapping that results from renaming `old_key` to `new_key`
///
/// The new key takes the value previously stored under the old key; the old
/// key is removed. When the new key collides with a different existing key,
/// the renamed entry wins (last write wins) and the collision is logged.
/// The old key being absent leaves the mapping unchanged.
pub fn rename_schema_key(schema: &SchemaMap, old_key: &str, new_key: &str) -> SchemaMap {
    let mut renamed = schema.clone();
    let Some(token) = renamed.remove(old_key) else {
        return renamed;
    };
    if renamed.contains_key(new_key) {
        debug!("schema rename '{old_key}' -> '{new_key}' overwrites an existing key");
    }
    renamed.insert(new_key.to_string(), token);
    renamed
}

/// Add a key to the mapping; `None` when the key already exists
pub fn add_key(schema: &SchemaMap, key: &str, token: &str) -> Option<SchemaMap> {
    let key = normalize_key(key);
    if key.is_empty() || schema.contains_key(&key) {
        return None;
    }
    let mut updated = schema.clone();
    updated.insert(key, token.to_string());
    Some(updated)
}

/// Remove a key from the mapping
pub fn remove_key(schema: &SchemaMap, key: &str) -> SchemaMap {
    let mut updated = schema.clone();
    updated.remove(key);
    updated
}

/// Rewrite every `{{ old_key }}` placeholder (arbitrary interior spacing) to
/// `{{new_key}}` in a free-text field
pub fn rewrite_handle_refs(text: &str, old_key: &str, new_key: &str) -> String {
    let pattern = format!(r"\{{\{{\s*{}\s*\}}\}}", regex::escape(old_key));
    let replacement = format!("{{{{{new_key}}}}}");
    match Regex::new(&pattern) {
        Ok(re) => re
            .replace_all(text, regex::NoExpand(&replacement))
            .into_owned(),
        Err(_) => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema(pairs: &[(&str, &str)]) -> SchemaMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("  my   key "), "my_key");
        assert_eq!(normalize_key("plain"), "plain");
        assert_eq!(normalize_key("   "), "");
        assert_eq!(normalize_key("a\tb\nc"), "a_b_c");
    }

    #[test]
    fn test_schema_from_config() {
        let config = json!({
            "input_schema": {"foo": "str", "count": "int", "bad": 3},
            "output_schema": {"response": "str"}
        });
        let input = schema_from_config(&config, SchemaSide::InputSchema);
        assert_eq!(input, schema(&[("foo", "str"), ("count", "int")]));

        let output = schema_from_config(&config, SchemaSide::OutputSchema);
        assert_eq!(output, schema(&[("response", "str")]));

        assert!(schema_from_config(&json!({}), SchemaSide::InputSchema).is_empty());
    }

    #[test]
    fn test_rename_moves_value() {
        let before = schema(&[("foo", "int"), ("other", "str")]);
        let after = rename_schema_key(&before, "foo", "bar");

        assert_eq!(after.get("bar").map(String::as_str), Some("int"));
        assert!(!after.contains_key("foo"));
        assert_eq!(after.get("other").map(String::as_str), Some("str"));
        // Input untouched
        assert!(before.contains_key("foo"));
    }

    #[test]
    fn test_rename_collision_last_write_wins() {
        let before = schema(&[("foo", "int"), ("bar", "str")]);
        let after = rename_schema_key(&before, "foo", "bar");

        assert_eq!(after.len(), 1);
        assert_eq!(after.get("bar").map(String::as_str), Some("int"));
    }

    #[test]
    fn test_rename_missing_key_is_noop() {
        let before = schema(&[("foo", "str")]);
        let after = rename_schema_key(&before, "missing", "bar");
        assert_eq!(after, before);
    }

    #[test]
    fn test_add_key_rejects_duplicates() {
        let base = schema(&[("foo", "str")]);
        assert!(add_key(&base, "foo", "str").is_none());
        assert!(add_key(&base, "  foo ", "str").is_none());
        assert!(add_key(&base, "", "str").is_none());

        let updated = add_key(&base, "new field", "str").unwrap();
        assert!(updated.contains_key("new_field"));
    }

    #[test]
    fn test_remove_key() {
        let base = schema(&[("foo", "str"), ("bar", "str")]);
        let updated = remove_key(&base, "foo");
        assert_eq!(updated, schema(&[("bar", "str")]));
    }

    #[test]
    fn test_rewrite_handle_refs_spacing_variants() {
        let text = "Use {{ foo }}, {{foo}} and {{  foo  }} but not {{ food }}.";
        let rewritten = rewrite_handle_refs(text, "foo", "bar");
        assert_eq!(
            rewritten,
            "Use {{bar}}, {{bar}} and {{bar}} but not {{ food }}."
        );
    }

    #[test]
    fn test_rewrite_escapes_regex_metacharacters() {
        let text = "{{ a.b }} stays literal";
        assert_eq!(rewrite_handle_refs(text, "a.b", "c"), "{{c}} stays literal");
        // A dot in the old key must not match arbitrary characters
        assert_eq!(
            rewrite_handle_refs("{{ aXb }}", "a.b", "c"),
            "{{ aXb }}"
        );
    }
}

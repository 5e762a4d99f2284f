//! Handle rename coordination
//!
//! Renaming a schema key touches three places at once: the schema mapping in
//! the node's config, any `{{ key }}` placeholders embedded in the node's
//! message fields, and every edge bound to the old handle identifier. The
//! helpers here compute each rewrite; the store applies them in a single
//! dispatch so an edge never references a key absent from its node's schema.

use serde_json::{Map, Value};

use crate::schema::{
    normalize_key, rename_schema_key, rewrite_handle_refs, schema_from_config, schema_to_value,
    SchemaSide,
};
use crate::types::GraphEdge;

/// Free-text config fields that may embed `{{ key }}` placeholders for
/// input handles
const TEMPLATE_FIELDS: [&str; 2] = ["system_message", "user_message"];

/// Normalize a requested rename target
///
/// Returns `None` for the no-op cases: the normalized key is empty, or it
/// equals the key being renamed. Callers treat `None` as "close the rename
/// editor, change nothing".
pub fn normalized_rename_target(old_key: &str, raw_new_key: &str) -> Option<String> {
    let normalized = normalize_key(raw_new_key);
    if normalized.is_empty() || normalized == old_key {
        None
    } else {
        Some(normalized)
    }
}

/// Compute a node's config after renaming `old_key` to `new_key` on one side
///
/// The schema mapping is rewritten, and for input-side renames every
/// `{{ old_key }}` placeholder in the message fields is rewritten to
/// `{{new_key}}`. The input config is never mutated.
pub fn renamed_config(config: &Value, old_key: &str, new_key: &str, side: SchemaSide) -> Value {
    let mut updated = config.as_object().cloned().unwrap_or_else(Map::new);

    let schema = schema_from_config(config, side);
    updated.insert(
        side.config_key().to_string(),
        schema_to_value(&rename_schema_key(&schema, old_key, new_key)),
    );

    if side == SchemaSide::InputSchema {
        for field in TEMPLATE_FIELDS {
            let rewritten = updated
                .get(field)
                .and_then(|v| v.as_str())
                .map(|text| rewrite_handle_refs(text, old_key, new_key));
            if let Some(rewritten) = rewritten {
                updated.insert(field.to_string(), Value::String(rewritten));
            }
        }
    }

    Value::Object(updated)
}

/// Repoint every edge bound to the renamed handle
///
/// Input-side renames match `target`/`target_handle`, output-side renames
/// match `source`/`source_handle`. Returns the number of edges rewritten.
pub fn remap_edges(
    edges: &mut [GraphEdge],
    node_id: &str,
    side: SchemaSide,
    old_key: &str,
    new_key: &str,
) -> usize {
    let mut rewritten = 0;
    for edge in edges.iter_mut() {
        let handle = match side {
            SchemaSide::InputSchema if edge.target == node_id => &mut edge.target_handle,
            SchemaSide::OutputSchema if edge.source == node_id => &mut edge.source_handle,
            _ => continue,
        };
        if handle == old_key {
            *handle = new_key.to_string();
            rewritten += 1;
        }
    }
    rewritten
}

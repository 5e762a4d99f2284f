//! Node type catalog
//!
//! The catalog maps category names to ordered lists of node type templates.
//! It is loaded once at startup and treated as read-only afterwards; the
//! node factory resolves type names against it when instantiating nodes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Type name of the layout-container node, which has no catalog template
pub const GROUP_NODE_TYPE: &str = "group";

/// Type name of the designated graph-input node
pub const INPUT_NODE_TYPE: &str = "input";

/// Placeholder value-type token used when no declared type is known
pub const DEFAULT_TYPE_TOKEN: &str = "str";

/// Visual identity of a node type: the short acronym shown on the node
/// header and its accent color
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualTag {
    pub acronym: String,
    pub color: String,
}

/// Declared input or output properties of a node type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortSchema {
    /// Property name to property descriptor
    #[serde(default)]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

/// Immutable catalog entry describing one node kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeTemplate {
    /// Unique type name (e.g. "single-llm-call")
    pub name: String,
    /// Visual identity for rendering
    pub visual_tag: VisualTag,
    /// Default configuration object for new instances
    #[serde(default)]
    pub config: serde_json::Map<String, serde_json::Value>,
    /// Declared input properties, if the type has inputs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<PortSchema>,
    /// Declared output properties, if the type has outputs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PortSchema>,
}

/// Read-only catalog of node type templates, grouped by category
///
/// Categories keep their registration order for each template list; the
/// category map itself iterates in name order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeCatalog {
    categories: BTreeMap<String, Vec<NodeTemplate>>,
}

impl NodeCatalog {
    /// Create a new empty catalog
    pub fn new() -> Self {
        Self {
            categories: BTreeMap::new(),
        }
    }

    /// Load a catalog from its JSON form: a mapping from category name to a
    /// list of templates
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let categories: BTreeMap<String, Vec<NodeTemplate>> = serde_json::from_value(value)?;
        Ok(Self { categories })
    }

    /// Register a template under a category
    pub fn register(&mut self, category: impl Into<String>, template: NodeTemplate) {
        self.categories
            .entry(category.into())
            .or_default()
            .push(template);
    }

    /// Look up a template by type name across all categories
    ///
    /// Returns `None` (not an error) when the name is unknown.
    pub fn find(&self, type_name: &str) -> Option<&NodeTemplate> {
        self.categories
            .values()
            .flat_map(|templates| templates.iter())
            .find(|t| t.name == type_name)
    }

    /// Check whether a type name is registered
    pub fn has_node_type(&self, type_name: &str) -> bool {
        self.find(type_name).is_some()
    }

    /// Templates registered under a single category
    pub fn templates_in(&self, category: &str) -> &[NodeTemplate] {
        self.categories
            .get(category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Category names, in name order
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    /// All templates across every category
    pub fn all_templates(&self) -> impl Iterator<Item = &NodeTemplate> {
        self.categories.values().flat_map(|templates| templates.iter())
    }

    /// Merge another catalog into this one
    ///
    /// Templates from `other` are appended to their categories; a template
    /// whose name already exists replaces the existing entry.
    pub fn merge(&mut self, other: NodeCatalog) {
        for (category, templates) in other.categories {
            for template in templates {
                if let Some(existing) = self
                    .categories
                    .values_mut()
                    .flat_map(|list| list.iter_mut())
                    .find(|t| t.name == template.name)
                {
                    *existing = template;
                } else {
                    self.categories
                        .entry(category.clone())
                        .or_default()
                        .push(template);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn template(name: &str) -> NodeTemplate {
        NodeTemplate {
            name: name.to_string(),
            visual_tag: VisualTag {
                acronym: name[..1].to_uppercase(),
                color: "#6366f1".to_string(),
            },
            config: serde_json::Map::new(),
            input: None,
            output: None,
        }
    }

    #[test]
    fn test_find_across_categories() {
        let mut catalog = NodeCatalog::new();
        catalog.register("primitives", template("input"));
        catalog.register("llm", template("single-llm-call"));

        assert!(catalog.find("single-llm-call").is_some());
        assert!(catalog.find("input").is_some());
        assert!(catalog.find("missing").is_none());
        assert!(catalog.has_node_type("input"));
        assert!(!catalog.has_node_type("missing"));
    }

    #[test]
    fn test_templates_in_unknown_category_is_empty() {
        let catalog = NodeCatalog::new();
        assert!(catalog.templates_in("nope").is_empty());
    }

    #[test]
    fn test_from_value() {
        let catalog = NodeCatalog::from_value(json!({
            "llm": [{
                "name": "single-llm-call",
                "visual_tag": {"acronym": "LLM", "color": "#059669"},
                "config": {"system_message": "You are a helpful assistant."},
                "input": {"properties": {"user_message": {"type": "string"}}},
                "output": {"properties": {"response": {"type": "string"}}}
            }]
        }))
        .unwrap();

        let t = catalog.find("single-llm-call").unwrap();
        assert_eq!(t.visual_tag.acronym, "LLM");
        assert!(t.input.as_ref().unwrap().properties.contains_key("user_message"));
    }

    #[test]
    fn test_merge_replaces_by_name() {
        let mut a = NodeCatalog::new();
        a.register("llm", template("single-llm-call"));

        let mut b = NodeCatalog::new();
        let mut replacement = template("single-llm-call");
        replacement.visual_tag.color = "#ef4444".to_string();
        b.register("llm", replacement);
        b.register("python", template("python-func"));

        a.merge(b);
        assert_eq!(a.all_templates().count(), 2);
        assert_eq!(a.find("single-llm-call").unwrap().visual_tag.color, "#ef4444");
    }
}

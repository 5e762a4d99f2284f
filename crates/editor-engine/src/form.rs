//! Dynamic config form model
//!
//! Renders a node's configuration object as a list of typed field rows and
//! routes every edit back through one funnel. Widget dispatch goes by key
//! name first (reserved keys get dedicated editors), then by external field
//! metadata (enums, numeric bounds), then by the value's runtime type.
//! Slider-originated edits commit through a trailing debounce so drag
//! gestures don't flood the store; every other edit commits immediately.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::debounce::Debouncer;
use crate::error::Result;
use crate::paths::with_path_set;
use crate::schema::{schema_from_config, SchemaSide};
use crate::store::EditorAction;
use crate::types::{GraphNode, NodeId};

/// Default trailing-debounce window for slider-originated commits
pub const COMMIT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Config keys that carry the few-shot example list
const FEW_SHOT_KEY: &str = "few_shot_examples";

/// Externally supplied metadata about one config field
///
/// Looked up by dotted path; used to choose and parametrize the field's
/// widget (enum options, slider bounds).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldMetadata {
    /// Allowed values for enum-valued fields
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Lookup of field metadata by node type and dotted config path
pub trait FieldMetadataSource: Send + Sync {
    fn field_metadata(&self, node_type: &str, path: &str) -> Option<FieldMetadata>;
}

/// Metadata source with no entries
pub struct NoMetadata;

impl FieldMetadataSource for NoMetadata {
    fn field_metadata(&self, _node_type: &str, _path: &str) -> Option<FieldMetadata> {
        None
    }
}

/// Map-backed metadata source
#[derive(Default)]
pub struct MapMetadataSource {
    entries: HashMap<(String, String), FieldMetadata>,
}

impl MapMetadataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        node_type: impl Into<String>,
        path: impl Into<String>,
        metadata: FieldMetadata,
    ) {
        self.entries.insert((node_type.into(), path.into()), metadata);
    }
}

impl FieldMetadataSource for MapMetadataSource {
    fn field_metadata(&self, node_type: &str, path: &str) -> Option<FieldMetadata> {
        self.entries
            .get(&(node_type.to_string(), path.to_string()))
            .cloned()
    }
}

/// The widget chosen for one config field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldWidget {
    /// Schema key/type editor for `input_schema` / `output_schema`
    SchemaEditor { side: SchemaSide },
    /// Rich text editor pre-seeded with the node's input-handle names for
    /// variable insertion
    PromptEditor { variables: Vec<String> },
    /// Few-shot example list editor, rendered after `user_message`
    FewShotEditor,
    /// Code editor
    CodeEditor,
    /// Multi-line text field
    TextArea,
    /// Boolean toggle
    Toggle,
    /// Single-select populated from the enum's allowed values
    Select { options: Vec<Value> },
    /// Bounded slider
    Slider { minimum: f64, maximum: f64 },
    /// Free numeric input
    NumberInput,
    /// Recursive rendering of a nested object's own keys
    Nested { fields: Vec<FieldRow> },
}

/// One editable row of the form
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRow {
    /// Config key (last path segment)
    pub key: String,
    /// Dotted path from the config root
    pub path: String,
    /// Display label (metadata title, falling back to the key)
    pub label: String,
    /// Current value
    pub value: Value,
    pub widget: FieldWidget,
}

/// Build the form rows for a node's current config
pub fn rows_for_node(node: &GraphNode, metadata: &dyn FieldMetadataSource) -> Vec<FieldRow> {
    let config = node
        .data
        .get("config")
        .cloned()
        .unwrap_or_else(|| Value::Object(Map::new()));
    form_rows(&node.node_type, &config, metadata)
}

/// Build the form rows for a config object
pub fn form_rows(
    node_type: &str,
    config: &Value,
    metadata: &dyn FieldMetadataSource,
) -> Vec<FieldRow> {
    let Some(object) = config.as_object() else {
        return Vec::new();
    };
    let variables: Vec<String> = schema_from_config(config, SchemaSide::InputSchema)
        .keys()
        .cloned()
        .collect();
    rows_for_object(node_type, object, "", &variables, metadata)
}

fn rows_for_object(
    node_type: &str,
    object: &Map<String, Value>,
    prefix: &str,
    variables: &[String],
    metadata: &dyn FieldMetadataSource,
) -> Vec<FieldRow> {
    let mut rows = Vec::new();
    for (key, value) in object {
        let path = join_path(prefix, key);
        let meta = metadata.field_metadata(node_type, &path);
        let Some(widget) = classify(node_type, key, &path, value, &meta, variables, metadata)
        else {
            continue;
        };
        let label = meta
            .as_ref()
            .and_then(|m| m.title.clone())
            .unwrap_or_else(|| key.clone());
        rows.push(FieldRow {
            key: key.clone(),
            path: path.clone(),
            label,
            value: value.clone(),
            widget,
        });

        // The few-shot block renders immediately after the user message
        if key == "user_message" {
            let examples = object
                .get(FEW_SHOT_KEY)
                .cloned()
                .unwrap_or_else(|| json!([]));
            rows.push(FieldRow {
                key: FEW_SHOT_KEY.to_string(),
                path: join_path(prefix, FEW_SHOT_KEY),
                label: FEW_SHOT_KEY.to_string(),
                value: examples,
                widget: FieldWidget::FewShotEditor,
            });
        }
    }
    rows
}

/// Key-name dispatch first, then metadata, then runtime value type.
/// Returns `None` for values with no widget (arrays, null).
fn classify(
    node_type: &str,
    key: &str,
    path: &str,
    value: &Value,
    meta: &Option<FieldMetadata>,
    variables: &[String],
    metadata: &dyn FieldMetadataSource,
) -> Option<FieldWidget> {
    match key {
        "input_schema" => {
            return Some(FieldWidget::SchemaEditor {
                side: SchemaSide::InputSchema,
            })
        }
        "output_schema" => {
            return Some(FieldWidget::SchemaEditor {
                side: SchemaSide::OutputSchema,
            })
        }
        "code" => return Some(FieldWidget::CodeEditor),
        _ if key == "system_message" || key == "user_message" || key.ends_with("_prompt") => {
            return Some(FieldWidget::PromptEditor {
                variables: variables.to_vec(),
            })
        }
        _ => {}
    }

    if let Some(options) = meta.as_ref().and_then(|m| m.enum_values.clone()) {
        return Some(FieldWidget::Select { options });
    }

    match value {
        Value::String(_) => Some(FieldWidget::TextArea),
        Value::Bool(_) => Some(FieldWidget::Toggle),
        Value::Number(_) => {
            let bounds = meta
                .as_ref()
                .and_then(|m| m.minimum.zip(m.maximum));
            match bounds {
                Some((minimum, maximum)) => Some(FieldWidget::Slider { minimum, maximum }),
                None => Some(FieldWidget::NumberInput),
            }
        }
        Value::Object(nested) => Some(FieldWidget::Nested {
            fields: rows_for_object(node_type, nested, path, variables, metadata),
        }),
        // Arrays and null degrade to no rendered control
        _ => None,
    }
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

/// Parse free numeric input, coercing malformed text to 0
pub fn parse_numeric(raw: &str) -> f64 {
    raw.trim().parse().unwrap_or(0.0)
}

/// A `{input, output}` pair used to seed example-based prompting
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FewShotExample {
    #[serde(default)]
    pub input: String,
    #[serde(default)]
    pub output: String,
}

/// Editing state for the few-shot example list
///
/// One example is open for editing at a time, by index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FewShotSession {
    examples: Vec<FewShotExample>,
    editing: Option<usize>,
}

impl FewShotSession {
    /// Load the session from the config's example array; malformed entries
    /// degrade to defaults
    pub fn from_value(value: &Value) -> Self {
        let examples = serde_json::from_value(value.clone()).unwrap_or_default();
        Self {
            examples,
            editing: None,
        }
    }

    /// The example array in its config form
    pub fn to_value(&self) -> Value {
        json!(self.examples)
    }

    pub fn examples(&self) -> &[FewShotExample] {
        &self.examples
    }

    /// Index of the example currently open for editing
    pub fn editing(&self) -> Option<usize> {
        self.editing
    }

    /// Append an empty pair and immediately open it for editing
    pub fn add(&mut self) {
        self.examples.push(FewShotExample::default());
        self.editing = Some(self.examples.len() - 1);
    }

    /// Open an existing example for editing
    pub fn open(&mut self, index: usize) {
        if index < self.examples.len() {
            self.editing = Some(index);
        }
    }

    /// Close the open example
    pub fn close(&mut self) {
        self.editing = None;
    }

    /// Replace the example at an index
    pub fn set(&mut self, index: usize, example: FewShotExample) {
        if let Some(slot) = self.examples.get_mut(index) {
            *slot = example;
        }
    }

    /// Remove by index; the editing index is unset when it points past the
    /// end of the shortened list
    pub fn remove(&mut self, index: usize) {
        if index >= self.examples.len() {
            return;
        }
        self.examples.remove(index);
        if let Some(editing) = self.editing {
            if editing >= self.examples.len() {
                self.editing = None;
            }
        }
    }
}

/// Where an edit originated; sliders commit through the debounced channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOrigin {
    Direct,
    Slider,
}

/// A config patch headed for the store's `UpdateNodeData` contract
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigCommit {
    pub node_id: NodeId,
    /// Data patch (`{"config": ...}`) to merge into the node's data
    pub data: Value,
}

impl ConfigCommit {
    /// The store action carrying this commit
    pub fn into_action(self) -> EditorAction {
        EditorAction::UpdateNodeData {
            node_id: self.node_id,
            data: self.data,
        }
    }
}

/// Receives config commits on their way to the store
pub trait UpdateSink: Send + Sync {
    fn commit(&self, commit: ConfigCommit);
}

/// Sink collecting commits, for tests and buffered hosts
#[derive(Default)]
pub struct VecUpdateSink {
    commits: parking_lot::Mutex<Vec<ConfigCommit>>,
}

impl VecUpdateSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commits(&self) -> Vec<ConfigCommit> {
        self.commits.lock().clone()
    }

    pub fn drain(&self) -> Vec<ConfigCommit> {
        std::mem::take(&mut *self.commits.lock())
    }
}

impl UpdateSink for VecUpdateSink {
    fn commit(&self, commit: ConfigCommit) {
        self.commits.lock().push(commit);
    }
}

/// An open configuration form for one node: the single edit funnel
///
/// Holds a local draft of the config for synchronous responsiveness and
/// propagates each edit to the store through the sink. The debounced
/// slider channel reads the draft at fire time, so a coalesced commit
/// always carries the latest state. Tearing the form down cancels any
/// pending slider commit.
pub struct ConfigForm {
    node_id: NodeId,
    node_type: String,
    draft: Arc<parking_lot::Mutex<Value>>,
    sink: Arc<dyn UpdateSink>,
    slider_commits: Debouncer<()>,
}

impl ConfigForm {
    /// Open a form over the node's current config with the default slider
    /// debounce window
    pub fn open(node: &GraphNode, sink: Arc<dyn UpdateSink>) -> Self {
        Self::with_commit_window(node, sink, COMMIT_DEBOUNCE)
    }

    /// Open a form with the commit window from an engine config
    pub fn with_config(
        node: &GraphNode,
        sink: Arc<dyn UpdateSink>,
        config: &crate::config::EngineConfig,
    ) -> Self {
        Self::with_commit_window(node, sink, config.commit_debounce())
    }

    /// Open a form with an explicit slider debounce window
    pub fn with_commit_window(
        node: &GraphNode,
        sink: Arc<dyn UpdateSink>,
        window: Duration,
    ) -> Self {
        let draft = Arc::new(parking_lot::Mutex::new(
            node.data
                .get("config")
                .cloned()
                .unwrap_or_else(|| Value::Object(Map::new())),
        ));
        let debounce_sink = Arc::clone(&sink);
        let debounce_draft = Arc::clone(&draft);
        let node_id = node.id.clone();
        let commit_node_id = node_id.clone();
        let slider_commits = Debouncer::new(window, move |()| {
            debounce_sink.commit(ConfigCommit {
                node_id: commit_node_id.clone(),
                data: json!({ "config": debounce_draft.lock().clone() }),
            });
        });
        Self {
            node_id,
            node_type: node.node_type.clone(),
            draft,
            sink,
            slider_commits,
        }
    }

    /// The node this form edits
    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// A snapshot of the local draft config
    pub fn draft(&self) -> Value {
        self.draft.lock().clone()
    }

    /// The form rows for the current draft
    pub fn rows(&self, metadata: &dyn FieldMetadataSource) -> Vec<FieldRow> {
        form_rows(&self.node_type, &self.draft.lock(), metadata)
    }

    /// Apply an edit at a dotted path
    ///
    /// The draft updates synchronously; propagation to the store is
    /// immediate for direct edits and debounced for slider edits.
    pub fn edit(&mut self, path: &str, value: Value, origin: EditOrigin) -> Result<()> {
        let updated = with_path_set(&self.draft.lock(), path, value)?;
        *self.draft.lock() = updated.clone();
        match origin {
            EditOrigin::Slider => self.slider_commits.call(()),
            EditOrigin::Direct => self.sink.commit(ConfigCommit {
                node_id: self.node_id.clone(),
                data: json!({ "config": updated }),
            }),
        }
        Ok(())
    }

    /// Cancel any pending debounced commit (called on teardown; dropping
    /// the form does the same)
    pub fn teardown(&self) {
        self.slider_commits.cancel();
    }
}

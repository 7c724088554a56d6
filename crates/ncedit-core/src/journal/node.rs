//! Journal node state and its detached builder.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{ChangeType, EditChangeSource, EDIT_CHANGE_SOURCE, IMPLIED_CHANGE};
use crate::model::{DataElement, EditOperation, InsertOperation, ModelNodeId, QName, SchemaPath};
use crate::schema::{SchemaNodeKind, SchemaRegistry};

/// Arena handle of a node inside one [`ChangeTree`](super::ChangeTree)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeRef(pub(crate) usize);

impl NodeRef {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// The schema facts a journal node needs about itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaNodeRef {
    pub path: SchemaPath,
    pub kind: SchemaNodeKind,
    pub mount_point: bool,
}

impl SchemaNodeRef {
    pub fn new(path: SchemaPath, kind: SchemaNodeKind) -> Self {
        Self {
            path,
            kind,
            mount_point: false,
        }
    }

    pub fn with_mount_point(mut self, mount_point: bool) -> Self {
        self.mount_point = mount_point;
        self
    }

    /// Look the node up in a registry
    pub fn from_registry(registry: &dyn SchemaRegistry, path: &SchemaPath) -> Option<Self> {
        let kind = registry.node_kind(path)?;
        Some(Self {
            path: path.clone(),
            kind,
            mount_point: registry.is_mount_point(path),
        })
    }

    pub fn qname(&self) -> Option<&QName> {
        self.path.last()
    }
}

/// A leaf value as it appears in the datastore
///
/// Keeps the element so snapshots can reproduce attributes and prefixes; two
/// values are equal when their trimmed text is equal.
#[derive(Debug, Clone)]
pub struct ConfigLeafAttribute {
    element: DataElement,
    value: String,
}

impl ConfigLeafAttribute {
    pub fn new(
        namespace: impl Into<String>,
        local_name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::from_element(DataElement::leaf(namespace, local_name, value))
    }

    pub fn from_element(element: DataElement) -> Self {
        let value = element.text();
        Self { element, value }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn element(&self) -> &DataElement {
        &self.element
    }
}

impl PartialEq for ConfigLeafAttribute {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for ConfigLeafAttribute {}

/// One leaf-list entry with its ordered-by-user insert metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafListEntry {
    pub attribute: ConfigLeafAttribute,
    pub insert: Option<InsertOperation>,
}

impl LeafListEntry {
    pub fn new(attribute: ConfigLeafAttribute) -> Self {
        Self {
            attribute,
            insert: None,
        }
    }

    pub fn with_insert(mut self, insert: InsertOperation) -> Self {
        self.insert = Some(insert);
        self
    }

    /// Read value and `yang:insert` metadata from an entry element
    pub fn from_element(element: DataElement) -> Self {
        let insert = InsertOperation::from_element(&element).ok().flatten();
        Self {
            attribute: ConfigLeafAttribute::from_element(element),
            insert,
        }
    }

    pub fn value(&self) -> &str {
        self.attribute.value()
    }
}

/// Ordered leaf-list values keyed by value
pub type LeafListValues = IndexMap<String, LeafListEntry>;

fn collect_entries(entries: Vec<LeafListEntry>) -> Option<LeafListValues> {
    let values: LeafListValues = entries
        .into_iter()
        .map(|e| (e.value().to_string(), e))
        .collect();
    (!values.is_empty()).then_some(values)
}

/// Detached journal node, filled in before it is appended to a tree
///
/// Every value setter recomputes the change classification, so the type a
/// node is appended with always reflects its latest previous/current pair.
#[derive(Debug, Clone)]
pub struct WritableChangeTreeNode {
    pub(crate) model_node_id: ModelNodeId,
    pub(crate) schema: SchemaNodeRef,
    pub(crate) change_type: ChangeType,
    pub(crate) previous_value: Option<ConfigLeafAttribute>,
    pub(crate) current_value: Option<ConfigLeafAttribute>,
    pub(crate) previous_values: Option<LeafListValues>,
    pub(crate) current_values: Option<LeafListValues>,
    pub(crate) context: BTreeMap<String, serde_json::Value>,
    pub(crate) edit_operation: Option<EditOperation>,
    pub(crate) insert_operation: Option<InsertOperation>,
}

impl WritableChangeTreeNode {
    pub fn new(model_node_id: ModelNodeId, schema: SchemaNodeRef) -> Self {
        Self {
            model_node_id,
            schema,
            change_type: ChangeType::None,
            previous_value: None,
            current_value: None,
            previous_values: None,
            current_values: None,
            context: BTreeMap::new(),
            edit_operation: None,
            insert_operation: None,
        }
    }

    pub fn set_previous_value(&mut self, value: Option<ConfigLeafAttribute>) -> &mut Self {
        self.previous_value = value;
        self.reclassify_leaf();
        self
    }

    pub fn set_current_value(&mut self, value: Option<ConfigLeafAttribute>) -> &mut Self {
        self.current_value = value;
        self.reclassify_leaf();
        self
    }

    /// Previous leaf-list entries; an empty list means "absent"
    pub fn set_previous_values(&mut self, entries: Vec<LeafListEntry>) -> &mut Self {
        self.previous_values = collect_entries(entries);
        self.reclassify_leaf_list();
        self
    }

    pub fn set_current_values(&mut self, entries: Vec<LeafListEntry>) -> &mut Self {
        self.current_values = collect_entries(entries);
        self.reclassify_leaf_list();
        self
    }

    /// Explicit classification, for container and list nodes
    pub fn set_change_type(&mut self, change_type: ChangeType) -> &mut Self {
        self.change_type = change_type;
        self
    }

    pub fn set_edit_operation(&mut self, operation: EditOperation) -> &mut Self {
        self.edit_operation = Some(operation);
        self
    }

    pub fn set_insert_operation(&mut self, insert: InsertOperation) -> &mut Self {
        self.insert_operation = Some(insert);
        self
    }

    pub fn set_context_value(
        &mut self,
        key: impl Into<String>,
        value: serde_json::Value,
    ) -> &mut Self {
        self.context.insert(key.into(), value);
        self
    }

    /// Flag a change the server made on its own (defaults, cascades)
    pub fn mark_implied(&mut self, implied: bool) -> &mut Self {
        self.set_context_value(IMPLIED_CHANGE, serde_json::Value::Bool(implied))
    }

    pub fn set_edit_change_source(&mut self, source: EditChangeSource) -> &mut Self {
        self.set_context_value(
            EDIT_CHANGE_SOURCE,
            serde_json::Value::String(source.as_str().to_string()),
        )
    }

    pub fn change_type(&self) -> ChangeType {
        self.change_type
    }

    pub fn has_changed(&self) -> bool {
        self.change_type.is_changed()
    }

    pub fn model_node_id(&self) -> &ModelNodeId {
        &self.model_node_id
    }

    pub fn schema(&self) -> &SchemaNodeRef {
        &self.schema
    }

    fn reclassify_leaf(&mut self) {
        self.change_type = ChangeType::classify(
            self.previous_value.is_some(),
            self.current_value.is_some(),
            self.previous_value == self.current_value,
        );
    }

    fn reclassify_leaf_list(&mut self) {
        let equal = match (&self.previous_values, &self.current_values) {
            (Some(previous), Some(current)) => {
                previous.len() == current.len() && previous.keys().all(|k| current.contains_key(k))
            }
            (None, None) => true,
            _ => false,
        };
        self.change_type = ChangeType::classify(
            self.previous_values.is_some(),
            self.current_values.is_some(),
            equal,
        );
    }
}

/// A journal node after it has been appended
#[derive(Debug, Clone)]
pub struct ChangeTreeNode {
    pub(crate) state: WritableChangeTreeNode,
    pub(crate) parent: Option<NodeRef>,
    pub(crate) children: IndexMap<ModelNodeId, NodeRef>,
    /// Mount scope this node's children register in
    pub(crate) descendant_scope: usize,
}

impl ChangeTreeNode {
    pub fn model_node_id(&self) -> &ModelNodeId {
        &self.state.model_node_id
    }

    pub fn schema(&self) -> &SchemaNodeRef {
        &self.state.schema
    }

    pub fn change_type(&self) -> ChangeType {
        self.state.change_type
    }

    pub fn has_changed(&self) -> bool {
        self.state.has_changed()
    }

    pub fn is_mount_point(&self) -> bool {
        self.state.schema.mount_point
    }

    pub fn is_leaf(&self) -> bool {
        self.state.schema.kind == SchemaNodeKind::Leaf
    }

    pub fn is_leaf_list(&self) -> bool {
        self.state.schema.kind == SchemaNodeKind::LeafList
    }

    pub fn is_implied(&self) -> bool {
        self.context_value(IMPLIED_CHANGE)
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false)
    }

    pub fn edit_change_source(&self) -> Option<EditChangeSource> {
        self.context_value(EDIT_CHANGE_SOURCE)
            .and_then(serde_json::Value::as_str)
            .and_then(|s| s.parse().ok())
    }

    pub fn edit_operation(&self) -> Option<EditOperation> {
        self.state.edit_operation
    }

    pub fn insert_operation(&self) -> Option<&InsertOperation> {
        self.state.insert_operation.as_ref()
    }

    pub fn previous_value(&self) -> Option<&ConfigLeafAttribute> {
        self.state.previous_value.as_ref()
    }

    pub fn current_value(&self) -> Option<&ConfigLeafAttribute> {
        self.state.current_value.as_ref()
    }

    pub fn previous_values(&self) -> Option<&LeafListValues> {
        self.state.previous_values.as_ref()
    }

    pub fn current_values(&self) -> Option<&LeafListValues> {
        self.state.current_values.as_ref()
    }

    pub fn context_value(&self, key: &str) -> Option<&serde_json::Value> {
        self.state.context.get(key)
    }

    pub fn context(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.state.context
    }

    pub fn parent(&self) -> Option<NodeRef> {
        self.parent
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Promote to modify; create and delete are kept
    pub(crate) fn promote(&mut self) -> bool {
        if self.state.change_type == ChangeType::None {
            self.state.change_type = ChangeType::Modify;
            return true;
        }
        false
    }
}

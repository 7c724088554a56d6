//! Shared lookup structures of one change journal.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::trace;

use super::node::NodeRef;
use crate::model::{ModelNodeId, SchemaPath};

/// Reverse-lookup key: which parents hold `value` in a leaf at `schema_path`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AttributeIndex {
    pub schema_path: SchemaPath,
    pub value: String,
}

impl AttributeIndex {
    pub fn new(schema_path: SchemaPath, value: impl Into<String>) -> Self {
        Self {
            schema_path,
            value: value.into(),
        }
    }
}

type TypeIndex = IndexMap<SchemaPath, Vec<NodeRef>>;

/// Indices shared by every node of a [`ChangeTree`](super::ChangeTree)
///
/// Scope 0 is the root scope; every mount-point node opens a new scope for
/// its descendants.
#[derive(Debug, Clone, Default)]
pub struct JournalIndex {
    by_id: HashMap<ModelNodeId, NodeRef>,
    by_type: TypeIndex,
    mount_scopes: Vec<TypeIndex>,
    by_attribute: HashMap<AttributeIndex, Vec<NodeRef>>,
    changed_types: IndexSet<SchemaPath>,
}

impl JournalIndex {
    pub(crate) fn new() -> Self {
        Self {
            mount_scopes: vec![TypeIndex::new()],
            ..Self::default()
        }
    }

    pub(crate) fn open_scope(&mut self) -> usize {
        self.mount_scopes.push(TypeIndex::new());
        self.mount_scopes.len() - 1
    }

    pub(crate) fn register(
        &mut self,
        node: NodeRef,
        id: &ModelNodeId,
        path: &SchemaPath,
        scope: usize,
    ) {
        self.by_id.insert(id.clone(), node);
        self.by_type.entry(path.clone()).or_default().push(node);
        if let Some(scoped) = self.mount_scopes.get_mut(scope) {
            scoped.entry(path.clone()).or_default().push(node);
        }
        trace!(node_id = %id, schema_path = %path, scope, "indexed journal node");
    }

    pub(crate) fn record_changed_type(&mut self, path: &SchemaPath) {
        self.changed_types.insert(path.clone());
    }

    pub(crate) fn record_attribute(&mut self, key: AttributeIndex, parent: NodeRef) {
        let holders = self.by_attribute.entry(key).or_default();
        if !holders.contains(&parent) {
            holders.push(parent);
        }
    }

    pub fn find(&self, id: &ModelNodeId) -> Option<NodeRef> {
        self.by_id.get(id).copied()
    }

    pub fn nodes_of_type(&self, path: &SchemaPath) -> &[NodeRef] {
        self.by_type.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn nodes_of_type_in_scope(&self, scope: usize, path: &SchemaPath) -> &[NodeRef] {
        self.mount_scopes
            .get(scope)
            .and_then(|scoped| scoped.get(path))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn nodes_of_attribute(&self, key: &AttributeIndex) -> &[NodeRef] {
        self.by_attribute
            .get(key)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn changed_types(&self) -> &IndexSet<SchemaPath> {
        &self.changed_types
    }

    pub fn scope_count(&self) -> usize {
        self.mount_scopes.len()
    }
}

//! Arena-backed change journal.

use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use super::index::{AttributeIndex, JournalIndex};
use super::node::{ChangeTreeNode, NodeRef, WritableChangeTreeNode};
use crate::errors::{EditError, Result};
use crate::model::{ModelNodeId, SchemaPath, SyntheticPrefixes};
use crate::schema::SchemaNodeKind;

/// The journal of one edit transaction
///
/// Owns every node and the shared [`JournalIndex`]. Nodes are appended top
/// down; appending a changed node promotes each unchanged ancestor to
/// `modify`.
#[derive(Debug, Clone)]
pub struct ChangeTree {
    nodes: Vec<ChangeTreeNode>,
    index: JournalIndex,
}

impl ChangeTree {
    pub fn new(root: WritableChangeTreeNode) -> Self {
        let mut index = JournalIndex::new();
        let descendant_scope = if root.schema.mount_point {
            index.open_scope()
        } else {
            0
        };
        let root_ref = NodeRef(0);
        index.register(root_ref, &root.model_node_id, &root.schema.path, 0);

        Self {
            nodes: vec![ChangeTreeNode {
                state: root,
                parent: None,
                children: IndexMap::new(),
                descendant_scope,
            }],
            index,
        }
    }

    /// Attach a detached node under `parent`
    ///
    /// # Errors
    ///
    /// `InvalidJournalParent` if `parent` is a leaf or leaf-list (or not a
    /// node of this tree), `DuplicateJournalChild` if `parent` already has a
    /// child with the same id.
    pub fn append_child(
        &mut self,
        parent: NodeRef,
        child: WritableChangeTreeNode,
    ) -> Result<NodeRef> {
        let parent_node = self.nodes.get(parent.0).ok_or_else(|| {
            EditError::InvalidJournalParent {
                reason: format!("node handle {} does not belong to this journal", parent.0),
                path: child.model_node_id.xpath(&SyntheticPrefixes),
            }
        })?;

        if parent_node.schema().kind.is_leaf_like() {
            return Err(EditError::InvalidJournalParent {
                reason: format!("parent is a {}", parent_node.schema().kind.as_str()),
                path: parent_node.model_node_id().xpath(&SyntheticPrefixes),
            });
        }
        if parent_node.children.contains_key(&child.model_node_id) {
            return Err(EditError::DuplicateJournalChild {
                path: child.model_node_id.xpath(&SyntheticPrefixes),
            });
        }

        let descendant_scope = if child.schema.mount_point {
            self.index.open_scope()
        } else {
            parent_node.descendant_scope
        };
        let registration_scope = parent_node.descendant_scope;

        let child_ref = NodeRef(self.nodes.len());
        let child_id = child.model_node_id.clone();
        let changed = child.has_changed();

        self.nodes.push(ChangeTreeNode {
            state: child,
            parent: Some(parent),
            children: IndexMap::new(),
            descendant_scope,
        });
        self.nodes[parent.0].children.insert(child_id, child_ref);

        if changed {
            self.promote_ancestors(child_ref);
        }
        self.update_index(child_ref, registration_scope);

        Ok(child_ref)
    }

    fn promote_ancestors(&mut self, from: NodeRef) {
        let mut cursor = self.nodes[from.0].parent;
        while let Some(ancestor) = cursor {
            let node = &mut self.nodes[ancestor.0];
            if node.promote() {
                debug!(node_id = %node.model_node_id(), "promoted to modify");
            }
            cursor = node.parent;
        }
    }

    fn update_index(&mut self, node_ref: NodeRef, scope: usize) {
        let node = &self.nodes[node_ref.0];
        let path = node.schema().path.clone();
        self.index
            .register(node_ref, node.model_node_id(), &path, scope);

        if node.has_changed() && node.schema().kind.is_leaf_like() {
            self.index.record_changed_type(&path);
        }

        let Some(parent) = node.parent else {
            return;
        };

        let mut keys: Vec<AttributeIndex> = Vec::new();
        match node.schema().kind {
            SchemaNodeKind::Leaf => {
                let current = node.current_value().map(|v| v.value());
                if let Some(value) = current {
                    keys.push(AttributeIndex::new(path.clone(), value));
                }
                if node.has_changed() {
                    if let Some(previous) = node.previous_value().map(|v| v.value()) {
                        if current != Some(previous) {
                            keys.push(AttributeIndex::new(path.clone(), previous));
                        }
                    }
                }
            }
            SchemaNodeKind::LeafList => {
                let current = node.current_values();
                if let Some(values) = current {
                    keys.extend(values.keys().map(|v| AttributeIndex::new(path.clone(), v.as_str())));
                }
                if node.has_changed() {
                    if let Some(previous) = node.previous_values() {
                        keys.extend(
                            previous
                                .keys()
                                .filter(|v| !current.is_some_and(|c| c.contains_key(*v)))
                                .map(|v| AttributeIndex::new(path.clone(), v.as_str())),
                        );
                    }
                }
            }
            SchemaNodeKind::Container | SchemaNodeKind::List { .. } => {}
        }

        for key in keys {
            self.index.record_attribute(key, parent);
        }
    }

    pub fn root(&self) -> NodeRef {
        NodeRef(0)
    }

    pub fn node(&self, node: NodeRef) -> Option<&ChangeTreeNode> {
        self.nodes.get(node.0)
    }

    pub fn parent(&self, node: NodeRef) -> Option<NodeRef> {
        self.node(node).and_then(|n| n.parent)
    }

    pub fn children(&self, node: NodeRef) -> Vec<NodeRef> {
        self.node(node)
            .map(|n| n.children.values().copied().collect())
            .unwrap_or_default()
    }

    pub fn child(&self, node: NodeRef, id: &ModelNodeId) -> Option<NodeRef> {
        self.node(node).and_then(|n| n.children.get(id).copied())
    }

    pub fn modified_children(&self, node: NodeRef) -> Vec<NodeRef> {
        self.children(node)
            .into_iter()
            .filter(|c| self.nodes[c.0].has_changed())
            .collect()
    }

    pub fn find(&self, id: &ModelNodeId) -> Option<NodeRef> {
        self.index.find(id)
    }

    /// Every node of the given schema type, across mount boundaries
    pub fn nodes_of_type(&self, path: &SchemaPath) -> &[NodeRef] {
        self.index.nodes_of_type(path)
    }

    /// Nodes of the given type in the mount scope `node`'s children belong to
    pub fn nodes_of_type_within_schema_mount(&self, node: NodeRef, path: &SchemaPath) -> &[NodeRef] {
        match self.node(node) {
            Some(n) => self.index.nodes_of_type_in_scope(n.descendant_scope, path),
            None => &[],
        }
    }

    /// Parents holding the indexed value, before or after the edit
    pub fn nodes_of_attribute(&self, key: &AttributeIndex) -> &[NodeRef] {
        self.index.nodes_of_attribute(key)
    }

    pub fn changed_node_types(&self) -> &IndexSet<SchemaPath> {
        self.index.changed_types()
    }

    pub fn index(&self) -> &JournalIndex {
        &self.index
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Pre-order walk starting at `node`
    pub fn depth_first(&self, node: NodeRef) -> Vec<NodeRef> {
        let mut order = Vec::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            let Some(n) = self.node(current) else {
                continue;
            };
            order.push(current);
            stack.extend(n.children.values().rev().copied());
        }
        order
    }

    /// Changed nodes in pre-order
    pub fn changed_nodes(&self) -> Vec<NodeRef> {
        self.depth_first(self.root())
            .into_iter()
            .filter(|n| self.nodes[n.0].has_changed())
            .collect()
    }
}

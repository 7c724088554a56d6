//! Before/after subtree snapshots of a journal.

use super::node::{ChangeTreeNode, NodeRef};
use super::tree::ChangeTree;
use super::ChangeType;
use crate::model::{DataElement, DomBuilder, TreeSink};
use crate::schema::SchemaNodeKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Snapshot {
    Previous,
    Current,
}

impl ChangeTree {
    /// Replay the post-edit state of `node` into `sink`
    ///
    /// Returns `false` (and emits nothing) when the node does not exist after
    /// the edit.
    pub fn current_subtree<S: TreeSink + ?Sized>(&self, node: NodeRef, sink: &mut S) -> bool {
        self.write_snapshot(node, Snapshot::Current, sink)
    }

    /// Replay the pre-edit state of `node` into `sink`
    pub fn previous_subtree<S: TreeSink + ?Sized>(&self, node: NodeRef, sink: &mut S) -> bool {
        self.write_snapshot(node, Snapshot::Previous, sink)
    }

    pub fn current_subtree_xml(&self, node: NodeRef) -> Option<DataElement> {
        self.snapshot_element(node, Snapshot::Current)
    }

    pub fn previous_subtree_xml(&self, node: NodeRef) -> Option<DataElement> {
        self.snapshot_element(node, Snapshot::Previous)
    }

    fn snapshot_element(&self, node: NodeRef, snapshot: Snapshot) -> Option<DataElement> {
        let mut builder = DomBuilder::new();
        if !self.write_snapshot(node, snapshot, &mut builder) {
            return None;
        }
        builder.finish().into_iter().next()
    }

    fn write_snapshot<S: TreeSink + ?Sized>(
        &self,
        node_ref: NodeRef,
        snapshot: Snapshot,
        sink: &mut S,
    ) -> bool {
        let Some(node) = self.node(node_ref) else {
            return false;
        };

        match node.schema().kind {
            SchemaNodeKind::Leaf => {
                let value = match snapshot {
                    Snapshot::Previous => node.previous_value(),
                    Snapshot::Current => node.current_value(),
                };
                match value {
                    Some(value) => {
                        value.element().emit(sink);
                        true
                    }
                    None => false,
                }
            }
            SchemaNodeKind::LeafList => {
                let values = match snapshot {
                    Snapshot::Previous => node.previous_values(),
                    Snapshot::Current => node.current_values(),
                };
                match values {
                    Some(values) => {
                        for entry in values.values() {
                            entry.attribute.element().emit(sink);
                        }
                        true
                    }
                    None => false,
                }
            }
            SchemaNodeKind::Container | SchemaNodeKind::List { .. } => {
                if absent_in(node, snapshot) {
                    return false;
                }
                let Some(qname) = node.schema().qname() else {
                    return false;
                };
                sink.open_element(qname, None);
                for child in self.children(node_ref) {
                    self.write_snapshot(child, snapshot, sink);
                }
                sink.close_element();
                true
            }
        }
    }
}

fn absent_in(node: &ChangeTreeNode, snapshot: Snapshot) -> bool {
    matches!(
        (snapshot, node.change_type()),
        (Snapshot::Current, ChangeType::Delete) | (Snapshot::Previous, ChangeType::Create)
    )
}

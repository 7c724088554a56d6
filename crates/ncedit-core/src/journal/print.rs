//! Deterministic text dump of a journal, one line per node or leaf-list entry.

use indexmap::IndexSet;

use super::node::{ChangeTreeNode, NodeRef};
use super::tree::ChangeTree;
use super::ChangeType;
use crate::schema::SchemaNodeKind;

const INDENT: &str = "  ";

impl ChangeTree {
    /// Render the subtree at `node`
    ///
    /// ```text
    /// device[/container=device] -> modify
    ///   hostname -> modify { previousVal = 'r1', currentVal = 'r2' }
    ///   tag -> create { previousVal = null, currentVal = 'blue' }
    /// ```
    pub fn print(&self, node: NodeRef) -> String {
        let mut out = String::new();
        self.print_node(node, 0, &mut out);
        out
    }

    fn print_node(&self, node_ref: NodeRef, depth: usize, out: &mut String) {
        let Some(node) = self.node(node_ref) else {
            return;
        };
        let indent = INDENT.repeat(depth);
        let name = node
            .schema()
            .qname()
            .map(|q| q.local_name().to_string())
            .unwrap_or_default();

        match node.schema().kind {
            SchemaNodeKind::Leaf => {
                out.push_str(&format!(
                    "{}{} -> {} {{ previousVal = {}, currentVal = {} }}\n",
                    indent,
                    name,
                    node.change_type(),
                    quoted(node.previous_value().map(|v| v.value())),
                    quoted(node.current_value().map(|v| v.value())),
                ));
            }
            SchemaNodeKind::LeafList => print_leaf_list(node, &indent, &name, out),
            SchemaNodeKind::Container | SchemaNodeKind::List { .. } => {
                out.push_str(&format!(
                    "{}{}[{}] -> {}\n",
                    indent,
                    name,
                    node.model_node_id(),
                    node.change_type()
                ));
                for child in self.children(node_ref) {
                    self.print_node(child, depth + 1, out);
                }
            }
        }
    }
}

fn print_leaf_list(node: &ChangeTreeNode, indent: &str, name: &str, out: &mut String) {
    let previous = node.previous_values();
    let current = node.current_values();

    let mut union: IndexSet<&str> = IndexSet::new();
    union.extend(previous.into_iter().flat_map(|v| v.keys().map(String::as_str)));
    union.extend(current.into_iter().flat_map(|v| v.keys().map(String::as_str)));

    for value in union {
        let before = previous.is_some_and(|v| v.contains_key(value));
        let after = current.is_some_and(|v| v.contains_key(value));
        let change = ChangeType::classify(before, after, true);
        out.push_str(&format!(
            "{}{} -> {} {{ previousVal = {}, currentVal = {} }}\n",
            indent,
            name,
            change,
            quoted(before.then_some(value)),
            quoted(after.then_some(value)),
        ));
    }
}

fn quoted(value: Option<&str>) -> String {
    match value {
        Some(v) => format!("'{}'", v),
        None => "null".to_string(),
    }
}

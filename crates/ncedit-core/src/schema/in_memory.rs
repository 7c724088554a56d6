//! Map-backed [`SchemaRegistry`] for embedding callers and tests.

use std::collections::HashMap;

use super::{CaseMembership, SchemaNodeKind, SchemaRegistry};
use crate::model::{PrefixResolver, QName, SchemaPath};

#[derive(Debug, Clone)]
struct SchemaEntry {
    kind: SchemaNodeKind,
    cases: Vec<CaseMembership>,
    mount_point: bool,
}

/// Schema registry built node by node
///
/// # Example
/// ```
/// use ncedit_core::model::{QName, SchemaPath};
/// use ncedit_core::schema::{InMemorySchemaRegistry, SchemaNodeKind, SchemaRegistry};
///
/// let ns = "urn:example:device";
/// let device = SchemaPath::root(QName::new(ns, "device"));
/// let registry = InMemorySchemaRegistry::new()
///     .with_prefix(ns, "dev")
///     .with_container(device.clone())
///     .with_leaf(device.child(QName::new(ns, "name")));
///
/// let name = registry.child_schema_path(&device, &QName::new(ns, "name")).unwrap();
/// assert_eq!(registry.node_kind(&name), Some(SchemaNodeKind::Leaf));
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemorySchemaRegistry {
    nodes: HashMap<SchemaPath, SchemaEntry>,
    prefixes: HashMap<String, String>,
}

impl InMemorySchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(mut self, namespace: impl Into<String>, prefix: impl Into<String>) -> Self {
        self.prefixes.insert(namespace.into(), prefix.into());
        self
    }

    pub fn with_container(self, path: SchemaPath) -> Self {
        self.with_node(path, SchemaNodeKind::Container)
    }

    pub fn with_list(self, path: SchemaPath, keys: Vec<QName>) -> Self {
        self.with_node(path, SchemaNodeKind::List { keys })
    }

    pub fn with_leaf(self, path: SchemaPath) -> Self {
        self.with_node(path, SchemaNodeKind::Leaf)
    }

    pub fn with_leaf_list(self, path: SchemaPath) -> Self {
        self.with_node(path, SchemaNodeKind::LeafList)
    }

    pub fn with_node(mut self, path: SchemaPath, kind: SchemaNodeKind) -> Self {
        self.add_node(path, kind);
        self
    }

    /// Place an already registered node inside `case` of `choice`
    ///
    /// Call once per nesting level, innermost choice first.
    pub fn with_case(mut self, path: &SchemaPath, choice: QName, case: QName) -> Self {
        if let Some(entry) = self.nodes.get_mut(path) {
            entry.cases.push(CaseMembership::new(choice, case));
        }
        self
    }

    pub fn with_mount_point(mut self, path: &SchemaPath) -> Self {
        if let Some(entry) = self.nodes.get_mut(path) {
            entry.mount_point = true;
        }
        self
    }

    /// Register (or re-register) a node in place
    pub fn add_node(&mut self, path: SchemaPath, kind: SchemaNodeKind) {
        self.nodes.insert(
            path,
            SchemaEntry {
                kind,
                cases: Vec::new(),
                mount_point: false,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl PrefixResolver for InMemorySchemaRegistry {
    fn prefix_for(&self, namespace: &str) -> Option<String> {
        self.prefixes.get(namespace).cloned()
    }
}

impl SchemaRegistry for InMemorySchemaRegistry {
    fn root_schema_path(&self, qname: &QName) -> Option<SchemaPath> {
        let path = SchemaPath::root(qname.clone());
        self.nodes.contains_key(&path).then_some(path)
    }

    fn child_schema_path(&self, parent: &SchemaPath, qname: &QName) -> Option<SchemaPath> {
        let path = parent.child(qname.clone());
        self.nodes.contains_key(&path).then_some(path)
    }

    fn node_kind(&self, path: &SchemaPath) -> Option<SchemaNodeKind> {
        self.nodes.get(path).map(|e| e.kind.clone())
    }

    fn case_memberships(&self, path: &SchemaPath) -> Vec<CaseMembership> {
        self.nodes
            .get(path)
            .map(|e| e.cases.clone())
            .unwrap_or_default()
    }

    fn is_mount_point(&self, path: &SchemaPath) -> bool {
        self.nodes.get(path).is_some_and(|e| e.mount_point)
    }
}

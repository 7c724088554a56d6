//! Schema oracle interface
//!
//! The core never compiles YANG itself. It asks a [`SchemaRegistry`] what kind
//! of node a path names, which list keys apply, which choice/case a node sits
//! in and whether a node is a schema-mount boundary.

pub mod in_memory;

pub use in_memory::InMemorySchemaRegistry;

use serde::{Deserialize, Serialize};

use crate::model::{PrefixResolver, QName, SchemaPath};

/// The YANG data node kinds the core distinguishes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SchemaNodeKind {
    Leaf,
    LeafList,
    Container,
    /// Keyed list; `keys` in schema order
    List { keys: Vec<QName> },
}

impl SchemaNodeKind {
    /// Leaf and leaf-list nodes carry values instead of children
    pub fn is_leaf_like(&self) -> bool {
        matches!(self, SchemaNodeKind::Leaf | SchemaNodeKind::LeafList)
    }

    pub fn list_keys(&self) -> &[QName] {
        match self {
            SchemaNodeKind::List { keys } => keys,
            _ => &[],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaNodeKind::Leaf => "leaf",
            SchemaNodeKind::LeafList => "leaf-list",
            SchemaNodeKind::Container => "container",
            SchemaNodeKind::List { .. } => "list",
        }
    }
}

/// One level of choice/case nesting a data node belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CaseMembership {
    pub choice: QName,
    pub case: QName,
}

impl CaseMembership {
    pub fn new(choice: QName, case: QName) -> Self {
        Self { choice, case }
    }
}

/// Read-only view of a compiled schema
pub trait SchemaRegistry: PrefixResolver {
    /// Path of a top-level data node, `None` if no module defines it
    fn root_schema_path(&self, qname: &QName) -> Option<SchemaPath>;

    /// Path of a data child of `parent`, looking through choice and case
    fn child_schema_path(&self, parent: &SchemaPath, qname: &QName) -> Option<SchemaPath>;

    fn node_kind(&self, path: &SchemaPath) -> Option<SchemaNodeKind>;

    /// Choice/case chain of a node, innermost first; empty when the node is
    /// not inside any choice
    fn case_memberships(&self, path: &SchemaPath) -> Vec<CaseMembership>;

    fn is_mount_point(&self, path: &SchemaPath) -> bool;
}

/// True if the two chains place their nodes in different cases of a shared
/// choice
pub fn in_conflicting_cases(a: &[CaseMembership], b: &[CaseMembership]) -> bool {
    a.iter().any(|ma| {
        b.iter()
            .any(|mb| ma.choice == mb.choice && ma.case != mb.case)
    })
}

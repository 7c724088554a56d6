use serde::{Deserialize, Serialize};
use std::fmt;

/// A YANG-qualified name: module namespace plus local identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QName {
    namespace: String,
    local_name: String,
}

impl QName {
    pub fn new(namespace: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            local_name: local_name.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn local_name(&self) -> &str {
        &self.local_name
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}){}", self.namespace, self.local_name)
    }
}

/// Path of a data schema node from its top-level ancestor
///
/// Only data nodes appear as steps: choice and case nodes are transparent in
/// instance data, so their membership is reported by the schema registry
/// instead of being encoded here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemaPath(Vec<QName>);

impl SchemaPath {
    /// Path of a top-level data node
    pub fn root(qname: QName) -> Self {
        Self(vec![qname])
    }

    pub fn from_steps(steps: Vec<QName>) -> Self {
        Self(steps)
    }

    /// Path of a direct child of this node
    pub fn child(&self, qname: QName) -> Self {
        let mut steps = self.0.clone();
        steps.push(qname);
        Self(steps)
    }

    /// Path of the parent node, `None` for a top-level node
    pub fn parent(&self) -> Option<Self> {
        if self.0.len() <= 1 {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_vec()))
    }

    pub fn last(&self) -> Option<&QName> {
        self.0.last()
    }

    pub fn steps(&self) -> &[QName] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.0.len() == 1
    }

    /// True if `self` equals `prefix` or lies below it
    pub fn starts_with(&self, prefix: &SchemaPath) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for SchemaPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "/");
        }
        for step in &self.0 {
            write!(f, "/{}", step)?;
        }
        Ok(())
    }
}

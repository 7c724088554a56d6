//! Instance identity for nodes of a YANG data tree.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::qname::QName;

/// Resolves a module namespace to the prefix used when rendering XPath
///
/// Every schema registry implements this; rendering falls back to synthetic
/// `nsN` prefixes for namespaces the resolver does not know.
pub trait PrefixResolver {
    fn prefix_for(&self, namespace: &str) -> Option<String>;
}

/// Resolver that knows no prefixes; every namespace gets a synthetic one
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticPrefixes;

impl PrefixResolver for SyntheticPrefixes {
    fn prefix_for(&self, _namespace: &str) -> Option<String> {
        None
    }
}

/// One relative distinguished name of a [`ModelNodeId`]
///
/// Structural steps use the reserved [`ModelNodeRdn::CONTAINER`] name with the
/// node's local name as value; list-entry keys use the key leaf name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModelNodeRdn {
    rdn_name: String,
    namespace: String,
    value: String,
}

impl ModelNodeRdn {
    pub const CONTAINER: &'static str = "container";

    pub fn new(
        rdn_name: impl Into<String>,
        namespace: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            rdn_name: rdn_name.into(),
            namespace: namespace.into(),
            value: value.into(),
        }
    }

    pub fn container(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(Self::CONTAINER, namespace, name)
    }

    pub fn rdn_name(&self) -> &str {
        &self.rdn_name
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_container(&self) -> bool {
        self.rdn_name == Self::CONTAINER
    }
}

/// An XPath rendering of a node identity, ready for an `rpc-error`
///
/// `ns_prefixes` maps every prefix used in `xpath` to its namespace so the
/// protocol layer can declare them next to `error-path`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedPath {
    pub xpath: String,
    pub ns_prefixes: BTreeMap<String, String>,
}

impl fmt::Display for RenderedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.xpath.is_empty() {
            write!(f, "/")
        } else {
            write!(f, "{}", self.xpath)
        }
    }
}

/// Hierarchical identity of one instance in the data tree
///
/// Equality and hashing are structural. Key rdns are appended in schema key
/// order by the code that extracts them, so two elements listing their keys in
/// a different order still produce the same id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModelNodeId {
    rdns: Vec<ModelNodeRdn>,
}

impl ModelNodeId {
    pub fn new(rdns: Vec<ModelNodeRdn>) -> Self {
        Self { rdns }
    }

    /// Identity of a top-level container or list node (keys not yet added)
    pub fn root(qname: &QName) -> Self {
        Self {
            rdns: vec![ModelNodeRdn::container(qname.namespace(), qname.local_name())],
        }
    }

    /// Identity of a child container, list or leaf of this node
    pub fn child_container(&self, qname: &QName) -> Self {
        let mut rdns = self.rdns.clone();
        rdns.push(ModelNodeRdn::container(qname.namespace(), qname.local_name()));
        Self { rdns }
    }

    /// Append a list key rdn
    pub fn with_key(mut self, key: &QName, value: impl Into<String>) -> Self {
        self.rdns.push(ModelNodeRdn::new(
            key.local_name(),
            key.namespace(),
            value,
        ));
        self
    }

    pub fn add_rdn(&mut self, rdn: ModelNodeRdn) {
        self.rdns.push(rdn);
    }

    pub fn rdns(&self) -> &[ModelNodeRdn] {
        &self.rdns
    }

    /// Number of structural steps (key rdns are not counted)
    pub fn depth(&self) -> usize {
        self.rdns.iter().filter(|r| r.is_container()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.rdns.is_empty()
    }

    /// Local name of the last structural step
    pub fn local_name(&self) -> Option<&str> {
        self.rdns
            .iter()
            .rev()
            .find(|r| r.is_container())
            .map(|r| r.value())
    }

    /// Identity of the enclosing node, dropping the last step and its keys
    pub fn parent_id(&self) -> Option<ModelNodeId> {
        let last_container = self.rdns.iter().rposition(|r| r.is_container())?;
        if last_container == 0 {
            return None;
        }
        Some(Self {
            rdns: self.rdns[..last_container].to_vec(),
        })
    }

    /// True if `self` is `other` or one of its descendants
    pub fn begins_with(&self, other: &ModelNodeId) -> bool {
        self.rdns.starts_with(&other.rdns)
    }

    /// Render as a prefixed XPath with its namespace map
    pub fn xpath<R: PrefixResolver + ?Sized>(&self, resolver: &R) -> RenderedPath {
        let mut xpath = String::new();
        let mut ns_prefixes: BTreeMap<String, String> = BTreeMap::new();
        let mut by_namespace: BTreeMap<String, String> = BTreeMap::new();

        for rdn in &self.rdns {
            let prefix = by_namespace
                .get(rdn.namespace())
                .cloned()
                .unwrap_or_else(|| {
                    let prefix = resolver
                        .prefix_for(rdn.namespace())
                        .unwrap_or_else(|| synthetic_prefix(&ns_prefixes));
                    by_namespace.insert(rdn.namespace().to_string(), prefix.clone());
                    ns_prefixes.insert(prefix.clone(), rdn.namespace().to_string());
                    prefix
                });

            if rdn.is_container() {
                xpath.push_str(&format!("/{}:{}", prefix, rdn.value()));
            } else {
                xpath.push_str(&format!(
                    "[{}:{}={}]",
                    prefix,
                    rdn.rdn_name(),
                    quote_literal(rdn.value())
                ));
            }
        }

        if xpath.is_empty() {
            xpath.push('/');
        }

        RenderedPath { xpath, ns_prefixes }
    }
}

fn synthetic_prefix(used: &BTreeMap<String, String>) -> String {
    let mut n = used.len() + 1;
    loop {
        let candidate = format!("ns{}", n);
        if !used.contains_key(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

fn quote_literal(value: &str) -> String {
    if value.contains('\'') {
        format!("\"{}\"", value)
    } else {
        format!("'{}'", value)
    }
}

impl fmt::Display for ModelNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rdns.is_empty() {
            return write!(f, "/");
        }
        for rdn in &self.rdns {
            write!(f, "/{}={}", rdn.rdn_name(), rdn.value())?;
        }
        Ok(())
    }
}

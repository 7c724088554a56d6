//! Minimal namespace-aware element tree.
//!
//! The request layer hands the core already-parsed XML; this is the shape the
//! core reads it in and writes merged results back out through [`TreeSink`].

use indexmap::IndexMap;
use std::fmt;

use super::edit_operation::{EditOperation, ParseEditOperationError};
use super::qname::QName;
use super::sink::{TreeSink, XmlTextSink};

/// NETCONF base namespace, home of the `operation` attribute
pub const NETCONF_BASE_NS: &str = "urn:ietf:params:xml:ns:netconf:base:1.0";
/// YANG namespace, home of the `insert`/`value`/`key` attributes
pub const YANG_NS: &str = "urn:ietf:params:xml:ns:yang:1";
/// Local name of the edit operation attribute
pub const OPERATION_ATTR: &str = "operation";

/// Attribute name, optionally namespace-qualified
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttrName {
    namespace: Option<String>,
    local_name: String,
}

impl AttrName {
    pub fn qualified(namespace: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            local_name: local_name.into(),
        }
    }

    pub fn unqualified(local_name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local_name: local_name.into(),
        }
    }

    /// `nc:operation`
    pub fn netconf_operation() -> Self {
        Self::qualified(NETCONF_BASE_NS, OPERATION_ATTR)
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn local_name(&self) -> &str {
        &self.local_name
    }
}

/// Child content of an element
#[derive(Debug, Clone, PartialEq)]
pub enum DataNode {
    Element(DataElement),
    Text(String),
}

/// One XML element of a configuration payload
#[derive(Debug, Clone, PartialEq)]
pub struct DataElement {
    qname: QName,
    prefix: Option<String>,
    attributes: IndexMap<AttrName, String>,
    children: Vec<DataNode>,
}

impl DataElement {
    pub fn new(namespace: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self::from_qname(QName::new(namespace, local_name))
    }

    pub fn from_qname(qname: QName) -> Self {
        Self {
            qname,
            prefix: None,
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Element holding a single text value
    pub fn leaf(
        namespace: impl Into<String>,
        local_name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::new(namespace, local_name).with_text(value)
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_attribute(mut self, name: AttrName, value: impl Into<String>) -> Self {
        self.attributes.insert(name, value.into());
        self
    }

    /// Set `nc:operation`
    pub fn with_operation(self, operation: EditOperation) -> Self {
        self.with_attribute(AttrName::netconf_operation(), operation.as_str())
    }

    pub fn with_child(mut self, child: DataElement) -> Self {
        self.children.push(DataNode::Element(child));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(DataNode::Text(text.into()));
        self
    }

    pub fn push_child(&mut self, child: DataElement) {
        self.children.push(DataNode::Element(child));
    }

    pub fn push_text(&mut self, text: impl Into<String>) {
        self.children.push(DataNode::Text(text.into()));
    }

    pub fn set_attribute(&mut self, name: AttrName, value: impl Into<String>) {
        self.attributes.insert(name, value.into());
    }

    pub fn qname(&self) -> &QName {
        &self.qname
    }

    pub fn namespace(&self) -> &str {
        self.qname.namespace()
    }

    pub fn local_name(&self) -> &str {
        self.qname.local_name()
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn attributes(&self) -> &IndexMap<AttrName, String> {
        &self.attributes
    }

    pub fn attribute(&self, name: &AttrName) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn children(&self) -> &[DataNode] {
        &self.children
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &DataElement> {
        self.children.iter().filter_map(|c| match c {
            DataNode::Element(e) => Some(e),
            DataNode::Text(_) => None,
        })
    }

    pub fn find_child(&self, qname: &QName) -> Option<&DataElement> {
        self.child_elements().find(|e| e.qname() == qname)
    }

    pub fn has_child_elements(&self) -> bool {
        self.child_elements().next().is_some()
    }

    /// Concatenated direct text content, surrounding whitespace trimmed
    pub fn text(&self) -> String {
        let mut text = String::new();
        for child in &self.children {
            if let DataNode::Text(t) = child {
                text.push_str(t);
            }
        }
        text.trim().to_string()
    }

    /// Explicit `nc:operation` attribute, if present
    pub fn edit_operation(&self) -> Result<Option<EditOperation>, ParseEditOperationError> {
        self.attribute(&AttrName::netconf_operation())
            .map(str::parse)
            .transpose()
    }

    /// Replay this element into a sink
    pub fn emit<S: TreeSink + ?Sized>(&self, sink: &mut S) {
        sink.open_element(&self.qname, self.prefix.as_deref());
        for (name, value) in &self.attributes {
            sink.set_attribute(name, value);
        }
        for child in &self.children {
            match child {
                DataNode::Element(e) => e.emit(sink),
                DataNode::Text(t) => sink.append_text(t),
            }
        }
        sink.close_element();
    }

    /// Serialize to an XML string
    pub fn to_xml(&self) -> String {
        let mut sink = XmlTextSink::new();
        self.emit(&mut sink);
        sink.finish()
    }
}

impl fmt::Display for DataElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_xml())
    }
}

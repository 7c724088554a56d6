//! Output abstraction for merged trees and journal snapshots.
//!
//! Producers drive a [`TreeSink`] with open/attribute/text/close events, so the
//! same walk can build an in-memory [`DataElement`] tree or XML text.

use std::collections::BTreeMap;

use super::element::{AttrName, DataElement, NETCONF_BASE_NS, YANG_NS};
use super::qname::QName;

/// Receiver of a depth-first element stream
///
/// `set_attribute` applies to the most recently opened element and must be
/// called before any child or text of that element.
pub trait TreeSink {
    fn open_element(&mut self, qname: &QName, prefix: Option<&str>);
    fn set_attribute(&mut self, name: &AttrName, value: &str);
    fn append_text(&mut self, text: &str);
    fn close_element(&mut self);
}

/// Builds owned [`DataElement`] trees
#[derive(Debug, Default)]
pub struct DomBuilder {
    open: Vec<DataElement>,
    roots: Vec<DataElement>,
}

impl DomBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Completed top-level elements; elements left open are closed first
    pub fn finish(mut self) -> Vec<DataElement> {
        while !self.open.is_empty() {
            self.close_element();
        }
        self.roots
    }
}

impl TreeSink for DomBuilder {
    fn open_element(&mut self, qname: &QName, prefix: Option<&str>) {
        let mut element = DataElement::from_qname(qname.clone());
        if let Some(prefix) = prefix {
            element = element.with_prefix(prefix);
        }
        self.open.push(element);
    }

    fn set_attribute(&mut self, name: &AttrName, value: &str) {
        if let Some(top) = self.open.last_mut() {
            top.set_attribute(name.clone(), value);
        }
    }

    fn append_text(&mut self, text: &str) {
        if let Some(top) = self.open.last_mut() {
            top.push_text(text);
        }
    }

    fn close_element(&mut self) {
        let Some(done) = self.open.pop() else {
            return;
        };
        match self.open.last_mut() {
            Some(parent) => parent.push_child(done),
            None => self.roots.push(done),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Scope {
    tag: String,
    default_ns: Option<String>,
    prefixes: BTreeMap<String, String>,
}

#[derive(Debug)]
struct PendingTag {
    declarations: Vec<(String, String)>,
    attributes: Vec<(String, String)>,
}

/// Serializes the stream to compact XML text
///
/// Namespace declarations are emitted only where the namespace changes.
#[derive(Debug, Default)]
pub struct XmlTextSink {
    out: String,
    scopes: Vec<Scope>,
    pending: Option<PendingTag>,
}

impl XmlTextSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish(mut self) -> String {
        while !self.scopes.is_empty() {
            self.close_element();
        }
        self.out
    }

    fn flush_start_tag(&mut self, self_closing: bool) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        for (name, value) in pending.declarations.iter().chain(&pending.attributes) {
            self.out
                .push_str(&format!(" {}=\"{}\"", name, escape_attribute(value)));
        }
        self.out.push_str(if self_closing { "/>" } else { ">" });
    }

    fn attribute_prefix(&mut self, namespace: &str) -> String {
        let Some(scope) = self.scopes.last_mut() else {
            return String::new();
        };
        if let Some(prefix) = scope.prefixes.get(namespace) {
            return prefix.clone();
        }
        let prefix = match namespace {
            NETCONF_BASE_NS => "nc".to_string(),
            YANG_NS => "yang".to_string(),
            _ => format!("ns{}", scope.prefixes.len() + 1),
        };
        scope
            .prefixes
            .insert(namespace.to_string(), prefix.clone());
        if let Some(pending) = self.pending.as_mut() {
            pending
                .declarations
                .push((format!("xmlns:{}", prefix), namespace.to_string()));
        }
        prefix
    }
}

impl TreeSink for XmlTextSink {
    fn open_element(&mut self, qname: &QName, prefix: Option<&str>) {
        self.flush_start_tag(false);

        let mut scope = self.scopes.last().cloned().unwrap_or_default();
        let mut declarations = Vec::new();
        let namespace = qname.namespace();

        scope.tag = match prefix {
            Some(prefix) => {
                if scope.prefixes.get(namespace).map(String::as_str) != Some(prefix) {
                    declarations.push((format!("xmlns:{}", prefix), namespace.to_string()));
                    scope
                        .prefixes
                        .insert(namespace.to_string(), prefix.to_string());
                }
                format!("{}:{}", prefix, qname.local_name())
            }
            None => {
                if scope.default_ns.as_deref() != Some(namespace) {
                    declarations.push(("xmlns".to_string(), namespace.to_string()));
                    scope.default_ns = Some(namespace.to_string());
                }
                qname.local_name().to_string()
            }
        };

        self.out.push('<');
        self.out.push_str(&scope.tag);
        self.scopes.push(scope);
        self.pending = Some(PendingTag {
            declarations,
            attributes: Vec::new(),
        });
    }

    fn set_attribute(&mut self, name: &AttrName, value: &str) {
        if self.pending.is_none() {
            return;
        }
        let qualified = match name.namespace() {
            Some(ns) => format!("{}:{}", self.attribute_prefix(ns), name.local_name()),
            None => name.local_name().to_string(),
        };
        if let Some(pending) = self.pending.as_mut() {
            pending.attributes.push((qualified, value.to_string()));
        }
    }

    fn append_text(&mut self, text: &str) {
        self.flush_start_tag(false);
        self.out.push_str(&escape_text(text));
    }

    fn close_element(&mut self) {
        let Some(scope) = self.scopes.pop() else {
            return;
        };
        if self.pending.is_some() {
            self.flush_start_tag(true);
        } else {
            self.out.push_str(&format!("</{}>", scope.tag));
        }
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attribute(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

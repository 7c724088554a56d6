//! Merge-in-progress tree for one edit target root.

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::errors::{EditError, Result};
use crate::model::{
    AttrName, DataElement, DomBuilder, EditOperation, ModelNodeId, QName, RenderedPath, SchemaPath,
    TreeSink,
};
use crate::options::EditOptions;
use crate::schema::{in_conflicting_cases, SchemaNodeKind, SchemaRegistry};

/// A leaf recorded by some payload, with the operation it was written under
#[derive(Debug, Clone, PartialEq)]
pub struct StagedLeaf {
    pub element: DataElement,
    pub operation: EditOperation,
    /// `operation` came from the leaf's own attribute rather than an ancestor
    pub explicit: bool,
}

/// One container or list-entry node of a merged edit tree
///
/// Built with [`AggregatedTreeNode::new`] from the first payload touching a
/// target root, then extended with [`AggregatedTreeNode::add`] once per further
/// payload. [`AggregatedTreeNode::to_dom`] renders the merged request body.
#[derive(Debug, Clone)]
pub struct AggregatedTreeNode {
    schema_path: SchemaPath,
    qname: QName,
    prefix: Option<String>,
    model_node_id: ModelNodeId,
    list_keys: Vec<QName>,
    attributes: IndexMap<AttrName, String>,
    /// Operation inherited when the node was first created
    inherited_operation: EditOperation,
    explicit_operation: Option<EditOperation>,
    edit_operation: EditOperation,
    children: IndexMap<SchemaPath, IndexMap<ModelNodeId, AggregatedTreeNode>>,
    leaves: IndexMap<SchemaPath, StagedLeaf>,
    leaf_lists: IndexMap<SchemaPath, Vec<DataElement>>,
}

/// Schema resolution of a top-level payload element
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRoot {
    pub schema_path: SchemaPath,
    pub kind: SchemaNodeKind,
    pub model_node_id: ModelNodeId,
}

impl AggregatedTreeNode {
    /// Start a merged tree from the first payload's root element
    pub fn new(
        registry: &dyn SchemaRegistry,
        root: &DataElement,
        options: EditOptions,
    ) -> Result<Self> {
        let resolved = Self::resolve_root(registry, root)?;
        let mut node = Self::empty(
            resolved.schema_path,
            root,
            resolved.model_node_id,
            resolved.kind.list_keys().to_vec(),
            options.default_operation,
        );
        node.fold(registry, root, options.default_operation)?;
        Ok(node)
    }

    /// Resolve the schema node and instance identity of a top-level element
    pub fn resolve_root(registry: &dyn SchemaRegistry, root: &DataElement) -> Result<ResolvedRoot> {
        let qname = root.qname();
        let unresolved_id = ModelNodeId::root(qname);

        let schema_path =
            registry
                .root_schema_path(qname)
                .ok_or_else(|| EditError::UnknownElement {
                    element: qname.local_name().to_string(),
                    path: unresolved_id.xpath(registry),
                })?;
        let kind = registry
            .node_kind(&schema_path)
            .ok_or_else(|| EditError::UnknownElement {
                element: qname.local_name().to_string(),
                path: unresolved_id.xpath(registry),
            })?;

        if kind.is_leaf_like() {
            return Err(EditError::InvalidRootElement {
                element: qname.local_name().to_string(),
                kind: kind.as_str(),
                path: unresolved_id.xpath(registry),
            });
        }

        let model_node_id = with_list_keys(registry, unresolved_id, kind.list_keys(), root)?;
        Ok(ResolvedRoot {
            schema_path,
            kind,
            model_node_id,
        })
    }

    fn empty(
        schema_path: SchemaPath,
        element: &DataElement,
        model_node_id: ModelNodeId,
        list_keys: Vec<QName>,
        inherited_operation: EditOperation,
    ) -> Self {
        Self {
            schema_path,
            qname: element.qname().clone(),
            prefix: element.prefix().map(str::to_string),
            model_node_id,
            list_keys,
            attributes: IndexMap::new(),
            inherited_operation,
            explicit_operation: None,
            edit_operation: inherited_operation,
            children: IndexMap::new(),
            leaves: IndexMap::new(),
            leaf_lists: IndexMap::new(),
        }
    }

    /// Fold another payload's element for the same target root into this tree
    pub fn add(&mut self, registry: &dyn SchemaRegistry, element: &DataElement) -> Result<()> {
        self.fold(registry, element, self.inherited_operation)
    }

    fn fold(
        &mut self,
        registry: &dyn SchemaRegistry,
        element: &DataElement,
        inherited: EditOperation,
    ) -> Result<()> {
        let explicit = explicit_operation(registry, element, &self.model_node_id)?;
        let was_replace = self.edit_operation == EditOperation::Replace;
        self.reconcile_operation(registry, explicit, inherited)?;

        for (name, value) in element.attributes() {
            self.attributes.insert(name.clone(), value.clone());
        }
        if let Some(op) = self.explicit_operation {
            self.attributes
                .insert(AttrName::netconf_operation(), op.as_str().to_string());
        }

        let payload_operation = explicit.unwrap_or(inherited);
        if self.edit_operation.is_destructive() || payload_operation.is_destructive() {
            self.discard_for_destructive(element);
            return Ok(());
        }

        let mut staged_leaf_lists: IndexMap<SchemaPath, Vec<DataElement>> = IndexMap::new();

        for child in element.child_elements() {
            self.fold_child(registry, child, payload_operation, &mut staged_leaf_lists)?;
        }

        for (path, entries) in staged_leaf_lists {
            if self
                .leaf_lists
                .get(&path)
                .is_some_and(|existing| !existing.is_empty())
            {
                let qname = path.last().cloned().unwrap_or_else(|| self.qname.clone());
                return Err(EditError::LeafListClash {
                    leaf_list: qname.local_name().to_string(),
                    path: self.model_node_id.child_container(&qname).xpath(registry),
                });
            }
            self.leaf_lists.insert(path, entries);
        }

        if !was_replace && self.edit_operation == EditOperation::Replace {
            self.enforce_replace_below(registry)?;
        }
        Ok(())
    }

    /// Bring content staged by earlier payloads under a newly adopted replace
    ///
    /// Explicit non-replace operations below it are rejected as they would be
    /// within a single payload; implicit ones now inherit replace.
    fn enforce_replace_below(&mut self, registry: &dyn SchemaRegistry) -> Result<()> {
        let forbidden = |child: EditOperation, path: RenderedPath| {
            EditError::ForbiddenNestedOperation {
                parent: EditOperation::Replace,
                child,
                path,
            }
        };

        for leaf in self.leaves.values_mut() {
            if !leaf.explicit {
                leaf.operation = EditOperation::Replace;
            } else if leaf.operation != EditOperation::Replace {
                let id = self.model_node_id.child_container(leaf.element.qname());
                return Err(forbidden(leaf.operation, id.xpath(registry)));
            }
        }

        for entry in self.leaf_lists.values().flatten() {
            if let Some(op) = entry.edit_operation().ok().flatten() {
                if op != EditOperation::Replace {
                    let id = self.model_node_id.child_container(entry.qname());
                    return Err(forbidden(op, id.xpath(registry)));
                }
            }
        }

        for child in self.children.values_mut().flat_map(|group| group.values_mut()) {
            match child.explicit_operation {
                Some(op) if op != EditOperation::Replace => {
                    return Err(forbidden(op, child.model_node_id.xpath(registry)));
                }
                Some(_) => {}
                None => {
                    child.inherited_operation = EditOperation::Replace;
                    child.edit_operation = EditOperation::Replace;
                }
            }
            child.enforce_replace_below(registry)?;
        }
        Ok(())
    }

    fn reconcile_operation(
        &mut self,
        registry: &dyn SchemaRegistry,
        explicit: Option<EditOperation>,
        inherited: EditOperation,
    ) -> Result<()> {
        match (self.explicit_operation, explicit) {
            (Some(existing), Some(new)) => {
                if !EditOperation::can_overwrite(existing, new) {
                    return Err(self.clash(registry, existing, new));
                }
                self.explicit_operation = Some(new);
                self.edit_operation = new;
            }
            (Some(existing), None) => {
                if existing.is_destructive() && !EditOperation::can_overwrite(existing, inherited) {
                    return Err(self.clash(registry, existing, inherited));
                }
            }
            (None, Some(new)) => {
                debug!(
                    node_id = %self.model_node_id,
                    edit_operation = new.as_str(),
                    "adopting explicit operation"
                );
                self.explicit_operation = Some(new);
                self.edit_operation = new;
            }
            (None, None) => {}
        }
        Ok(())
    }

    fn clash(
        &self,
        registry: &dyn SchemaRegistry,
        existing: EditOperation,
        new: EditOperation,
    ) -> EditError {
        EditError::OperationClash {
            existing,
            new,
            path: self.model_node_id.xpath(registry),
        }
    }

    /// Drop everything but list keys; the node is going away
    fn discard_for_destructive(&mut self, element: &DataElement) {
        trace!(node_id = %self.model_node_id, "discarding staged descendants");
        self.children.clear();
        self.leaf_lists.clear();
        let keys = &self.list_keys;
        self.leaves
            .retain(|path, _| path.last().is_some_and(|q| keys.contains(q)));

        for key in &self.list_keys {
            let path = self.schema_path.child(key.clone());
            if self.leaves.contains_key(&path) {
                continue;
            }
            if let Some(key_element) = element.find_child(key) {
                self.leaves.insert(
                    path,
                    StagedLeaf {
                        element: key_element.clone(),
                        operation: self.edit_operation,
                        explicit: false,
                    },
                );
            }
        }
    }

    fn fold_child(
        &mut self,
        registry: &dyn SchemaRegistry,
        child: &DataElement,
        parent_operation: EditOperation,
        staged_leaf_lists: &mut IndexMap<SchemaPath, Vec<DataElement>>,
    ) -> Result<()> {
        let qname = child.qname();
        let child_id = self.model_node_id.child_container(qname);

        let (path, kind) = registry
            .child_schema_path(&self.schema_path, qname)
            .and_then(|path| registry.node_kind(&path).map(|kind| (path, kind)))
            .ok_or_else(|| EditError::UnknownElement {
                element: qname.local_name().to_string(),
                path: child_id.xpath(registry),
            })?;

        // The merged node may be under replace from an earlier payload
        let parent_operation = if self.edit_operation == EditOperation::Replace {
            EditOperation::Replace
        } else {
            parent_operation
        };

        let explicit = explicit_operation(registry, child, &child_id)?;
        if let Some(child_op) = explicit {
            if parent_operation == EditOperation::Replace && child_op != EditOperation::Replace {
                return Err(EditError::ForbiddenNestedOperation {
                    parent: parent_operation,
                    child: child_op,
                    path: child_id.xpath(registry),
                });
            }
        }

        self.purge_other_cases(registry, &path, staged_leaf_lists);

        let operation = explicit.unwrap_or(parent_operation);
        match kind {
            SchemaNodeKind::Leaf => {
                let is_key = self.list_keys.contains(qname);
                if let Some(existing) = self.leaves.get(&path) {
                    if !is_key && !EditOperation::can_overwrite(existing.operation, operation) {
                        return Err(EditError::OperationClash {
                            existing: existing.operation,
                            new: operation,
                            path: child_id.xpath(registry),
                        });
                    }
                }
                self.leaves.insert(
                    path,
                    StagedLeaf {
                        element: child.clone(),
                        operation,
                        explicit: explicit.is_some(),
                    },
                );
            }
            SchemaNodeKind::LeafList => {
                staged_leaf_lists
                    .entry(path)
                    .or_default()
                    .push(child.clone());
            }
            SchemaNodeKind::Container | SchemaNodeKind::List { .. } => {
                let keys = kind.list_keys().to_vec();
                let id = with_list_keys(registry, child_id, &keys, child)?;
                let siblings = self.children.entry(path.clone()).or_default();
                let node = siblings.entry(id.clone()).or_insert_with(|| {
                    Self::empty(path, child, id, keys, parent_operation)
                });
                node.fold(registry, child, parent_operation)?;
            }
        }
        Ok(())
    }

    /// Remove data of sibling cases of every choice `path` belongs to
    fn purge_other_cases(
        &mut self,
        registry: &dyn SchemaRegistry,
        path: &SchemaPath,
        staged_leaf_lists: &mut IndexMap<SchemaPath, Vec<DataElement>>,
    ) {
        let memberships = registry.case_memberships(path);
        if memberships.is_empty() {
            return;
        }
        let conflicts =
            |other: &SchemaPath| in_conflicting_cases(&memberships, &registry.case_memberships(other));

        let before = self.leaves.len()
            + self.leaf_lists.len()
            + self.children.len()
            + staged_leaf_lists.len();
        self.leaves.retain(|p, _| !conflicts(p));
        self.leaf_lists.retain(|p, _| !conflicts(p));
        self.children.retain(|p, _| !conflicts(p));
        staged_leaf_lists.retain(|p, _| !conflicts(p));
        let after = self.leaves.len()
            + self.leaf_lists.len()
            + self.children.len()
            + staged_leaf_lists.len();

        if after < before {
            debug!(
                node_id = %self.model_node_id,
                schema_path = %path,
                purged = before - after,
                "purged data of other cases"
            );
        }
    }

    pub fn schema_path(&self) -> &SchemaPath {
        &self.schema_path
    }

    pub fn qname(&self) -> &QName {
        &self.qname
    }

    pub fn model_node_id(&self) -> &ModelNodeId {
        &self.model_node_id
    }

    /// Effective operation: the recorded explicit one, else the inherited one
    pub fn edit_operation(&self) -> EditOperation {
        self.edit_operation
    }

    pub fn explicit_operation(&self) -> Option<EditOperation> {
        self.explicit_operation
    }

    pub fn attributes(&self) -> &IndexMap<AttrName, String> {
        &self.attributes
    }

    pub fn leaf(&self, path: &SchemaPath) -> Option<&StagedLeaf> {
        self.leaves.get(path)
    }

    pub fn leaves(&self) -> impl Iterator<Item = &StagedLeaf> {
        self.leaves.values()
    }

    pub fn leaf_list(&self, path: &SchemaPath) -> Option<&[DataElement]> {
        self.leaf_lists.get(path).map(Vec::as_slice)
    }

    pub fn child(&self, path: &SchemaPath, id: &ModelNodeId) -> Option<&AggregatedTreeNode> {
        self.children.get(path).and_then(|group| group.get(id))
    }

    pub fn children_of_type(&self, path: &SchemaPath) -> impl Iterator<Item = &AggregatedTreeNode> {
        self.children
            .get(path)
            .into_iter()
            .flat_map(|group| group.values())
    }

    /// Replay the merged tree: attributes, leaves, leaf-lists, then children
    pub fn write_to<S: TreeSink + ?Sized>(&self, sink: &mut S) {
        sink.open_element(&self.qname, self.prefix.as_deref());
        for (name, value) in &self.attributes {
            sink.set_attribute(name, value);
        }
        for leaf in self.leaves.values() {
            leaf.element.emit(sink);
        }
        for entries in self.leaf_lists.values() {
            for entry in entries {
                entry.emit(sink);
            }
        }
        for group in self.children.values() {
            for child in group.values() {
                child.write_to(sink);
            }
        }
        sink.close_element();
    }

    /// Build the merged request body for this root
    pub fn to_dom(&self) -> DataElement {
        let mut builder = DomBuilder::new();
        self.write_to(&mut builder);
        builder
            .finish()
            .into_iter()
            .next()
            .unwrap_or_else(|| DataElement::from_qname(self.qname.clone()))
    }
}

fn explicit_operation(
    registry: &dyn SchemaRegistry,
    element: &DataElement,
    id: &ModelNodeId,
) -> Result<Option<EditOperation>> {
    element
        .edit_operation()
        .map_err(|err| EditError::InvalidOperation {
            value: err.0,
            path: id.xpath(registry),
        })
}

/// Append list key rdns in schema key order
fn with_list_keys(
    registry: &dyn SchemaRegistry,
    id: ModelNodeId,
    keys: &[QName],
    element: &DataElement,
) -> Result<ModelNodeId> {
    let mut keyed = id.clone();
    for key in keys {
        let value = element
            .find_child(key)
            .map(DataElement::text)
            .ok_or_else(|| EditError::MissingListKey {
                key: key.local_name().to_string(),
                path: id.xpath(registry),
            })?;
        keyed = keyed.with_key(key, value);
    }
    Ok(keyed)
}

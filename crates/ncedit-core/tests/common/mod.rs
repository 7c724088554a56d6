use ncedit_core::journal::{ConfigLeafAttribute, SchemaNodeRef, WritableChangeTreeNode};
use ncedit_core::model::{DataElement, ModelNodeId, QName, SchemaPath};
use ncedit_core::schema::{InMemorySchemaRegistry, SchemaRegistry};

#[allow(dead_code)]
pub const NS: &str = "urn:example:device";
#[allow(dead_code)]
pub const NC_NS: &str = "urn:ietf:params:xml:ns:netconf:base:1.0";

#[allow(dead_code)]
pub fn q(name: &str) -> QName {
    QName::new(NS, name)
}

/// Schema path from `device` down through `names`
#[allow(dead_code)]
pub fn path(names: &[&str]) -> SchemaPath {
    let mut path = SchemaPath::root(q("device"));
    for name in names {
        path = path.child(q(name));
    }
    path
}

/// Sample schema:
///
/// ```text
/// device
///   name, hostname          leaf
///   tag                     leaf-list
///   interface [name]        list: name, mtu, description
///   choice address
///     case static: ip, gateway
///     case dhcp:   dhcp-client
///   slot [id]               list: id, mounted (mount point) / system / hostname
/// system
///   contact                 leaf
/// ```
#[allow(dead_code)]
pub fn registry() -> InMemorySchemaRegistry {
    InMemorySchemaRegistry::new()
        .with_prefix(NS, "dev")
        .with_container(path(&[]))
        .with_leaf(path(&["name"]))
        .with_leaf(path(&["hostname"]))
        .with_leaf_list(path(&["tag"]))
        .with_list(path(&["interface"]), vec![q("name")])
        .with_leaf(path(&["interface", "name"]))
        .with_leaf(path(&["interface", "mtu"]))
        .with_leaf(path(&["interface", "description"]))
        .with_leaf(path(&["ip"]))
        .with_case(&path(&["ip"]), q("address"), q("static"))
        .with_leaf(path(&["gateway"]))
        .with_case(&path(&["gateway"]), q("address"), q("static"))
        .with_leaf(path(&["dhcp-client"]))
        .with_case(&path(&["dhcp-client"]), q("address"), q("dhcp"))
        .with_list(path(&["slot"]), vec![q("id")])
        .with_leaf(path(&["slot", "id"]))
        .with_container(path(&["slot", "mounted"]))
        .with_mount_point(&path(&["slot", "mounted"]))
        .with_container(path(&["slot", "mounted", "system"]))
        .with_leaf(path(&["slot", "mounted", "system", "hostname"]))
        .with_container(SchemaPath::root(q("system")))
        .with_leaf(SchemaPath::root(q("system")).child(q("contact")))
}

#[allow(dead_code)]
pub fn element(name: &str) -> DataElement {
    DataElement::new(NS, name)
}

#[allow(dead_code)]
pub fn leaf(name: &str, value: &str) -> DataElement {
    DataElement::leaf(NS, name, value)
}

/// `<config>` body holding the given top-level elements
#[allow(dead_code)]
pub fn config(children: Vec<DataElement>) -> DataElement {
    children
        .into_iter()
        .fold(DataElement::new(NC_NS, "config"), |c, child| c.with_child(child))
}

#[allow(dead_code)]
pub fn interface(name: &str) -> DataElement {
    element("interface").with_child(leaf("name", name))
}

#[allow(dead_code)]
pub fn device_id() -> ModelNodeId {
    ModelNodeId::root(&q("device"))
}

#[allow(dead_code)]
pub fn interface_id(name: &str) -> ModelNodeId {
    device_id()
        .child_container(&q("interface"))
        .with_key(&q("name"), name)
}

#[allow(dead_code)]
pub fn slot_id(id: &str) -> ModelNodeId {
    device_id().child_container(&q("slot")).with_key(&q("id"), id)
}

/// Detached journal node for the schema node at `names`
#[allow(dead_code)]
pub fn journal_node(id: ModelNodeId, names: &[&str]) -> WritableChangeTreeNode {
    let registry = registry();
    let schema = SchemaNodeRef::from_registry(&registry, &path(names))
        .unwrap_or_else(|| panic!("fixture schema has no node at {:?}", names));
    WritableChangeTreeNode::new(id, schema)
}

#[allow(dead_code)]
pub fn value(name: &str, v: &str) -> Option<ConfigLeafAttribute> {
    Some(ConfigLeafAttribute::new(NS, name, v))
}

#[allow(dead_code)]
pub fn assert_schema_knows(registry: &InMemorySchemaRegistry, names: &[&str]) {
    assert!(
        registry.node_kind(&path(names)).is_some(),
        "missing fixture node {:?}",
        names
    );
}

//! Change journal construction and queries
//!
//! Classification, ancestor promotion, the type, mount-scope and attribute
//! indices, subtree snapshots and the diagnostic dump.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{device_id, interface_id, journal_node, path, q, slot_id, value, NS};
use ncedit_core::errors::EditError;
use ncedit_core::journal::{
    AttributeIndex, ChangeTree, ChangeType, ConfigLeafAttribute, EditChangeSource, LeafListEntry,
    NodeRef,
};
use ncedit_core::model::{InsertOperation, ModelNodeId, XmlTextSink};

fn device_tree() -> ChangeTree {
    ChangeTree::new(journal_node(device_id(), &[]))
}

fn leaf_id(parent: &ModelNodeId, name: &str) -> ModelNodeId {
    parent.child_container(&q(name))
}

fn tags(values: &[&str]) -> Vec<LeafListEntry> {
    values
        .iter()
        .map(|v| LeafListEntry::new(ConfigLeafAttribute::new(NS, "tag", *v)))
        .collect()
}

/// device / interface[eth0] / {name, mtu, description}
fn interface_tree(description: (Option<&str>, Option<&str>)) -> (ChangeTree, NodeRef) {
    let mut tree = device_tree();
    let iface_id = interface_id("eth0");
    let iface = tree
        .append_child(tree.root(), journal_node(iface_id.clone(), &["interface"]))
        .unwrap();

    let mut name = journal_node(leaf_id(&iface_id, "name"), &["interface", "name"]);
    name.set_previous_value(value("name", "eth0"))
        .set_current_value(value("name", "eth0"));
    tree.append_child(iface, name).unwrap();

    let mut desc = journal_node(leaf_id(&iface_id, "description"), &["interface", "description"]);
    desc.set_previous_value(description.0.and_then(|v| value("description", v)))
        .set_current_value(description.1.and_then(|v| value("description", v)));
    tree.append_child(iface, desc).unwrap();

    (tree, iface)
}

#[test]
fn test_leaf_change_types() {
    let mut tree = device_tree();
    let cases = [
        ("name", None, Some("r1"), ChangeType::Create),
        ("hostname", Some("a"), None, ChangeType::Delete),
        ("ip", Some("192.0.2.1"), Some("192.0.2.2"), ChangeType::Modify),
        ("gateway", Some("192.0.2.254"), Some("192.0.2.254"), ChangeType::None),
    ];

    for (name, previous, current, expected) in cases {
        let mut node = journal_node(leaf_id(&device_id(), name), &[name]);
        node.set_previous_value(previous.and_then(|v| value(name, v)))
            .set_current_value(current.and_then(|v| value(name, v)));
        let node_ref = tree.append_child(tree.root(), node).unwrap();
        assert_eq!(
            tree.node(node_ref).unwrap().change_type(),
            expected,
            "leaf {}",
            name
        );
    }

    assert_eq!(tree.changed_nodes().len(), 4);
    assert_eq!(tree.modified_children(tree.root()).len(), 3);
}

#[test]
fn test_unchanged_tree_stays_unchanged() {
    let (tree, iface) = interface_tree((Some("uplink"), Some("uplink")));

    assert!(!tree.node(tree.root()).unwrap().has_changed());
    assert!(!tree.node(iface).unwrap().has_changed());
    assert!(tree.changed_nodes().is_empty());
    assert!(tree.changed_node_types().is_empty());
}

#[test]
fn test_change_promotes_every_ancestor() {
    let mut tree = device_tree();
    let slot = tree
        .append_child(tree.root(), journal_node(slot_id("1"), &["slot"]))
        .unwrap();
    let mounted_id = leaf_id(&slot_id("1"), "mounted");
    let mounted = tree
        .append_child(slot, journal_node(mounted_id.clone(), &["slot", "mounted"]))
        .unwrap();
    let system_id = leaf_id(&mounted_id, "system");
    let system = tree
        .append_child(mounted, journal_node(system_id.clone(), &["slot", "mounted", "system"]))
        .unwrap();

    let mut hostname = journal_node(
        leaf_id(&system_id, "hostname"),
        &["slot", "mounted", "system", "hostname"],
    );
    hostname.set_current_value(value("hostname", "lc1"));
    tree.append_child(system, hostname).unwrap();

    for node in [system, mounted, slot, tree.root()] {
        assert_eq!(tree.node(node).unwrap().change_type(), ChangeType::Modify);
    }
}

#[test]
fn test_promotion_does_not_override_explicit_create() {
    let mut tree = device_tree();
    let mut iface = journal_node(interface_id("eth0"), &["interface"]);
    iface.set_change_type(ChangeType::Create);
    let iface = tree.append_child(tree.root(), iface).unwrap();

    let mut mtu = journal_node(leaf_id(&interface_id("eth0"), "mtu"), &["interface", "mtu"]);
    mtu.set_current_value(value("mtu", "1500"));
    tree.append_child(iface, mtu).unwrap();

    assert_eq!(tree.node(iface).unwrap().change_type(), ChangeType::Create);
    assert_eq!(tree.node(tree.root()).unwrap().change_type(), ChangeType::Modify);
}

#[test]
fn test_attribute_index_holds_previous_and_current_values() {
    let (tree, iface) = interface_tree((Some("A"), Some("B")));
    let description = path(&["interface", "description"]);

    assert_eq!(
        tree.nodes_of_attribute(&AttributeIndex::new(description.clone(), "A")),
        &[iface]
    );
    assert_eq!(
        tree.nodes_of_attribute(&AttributeIndex::new(description.clone(), "B")),
        &[iface]
    );
    assert!(tree
        .nodes_of_attribute(&AttributeIndex::new(description, "C"))
        .is_empty());
}

#[test]
fn test_attribute_index_for_unchanged_leaf_uses_current_value() {
    let (tree, iface) = interface_tree((None, None));

    assert_eq!(
        tree.nodes_of_attribute(&AttributeIndex::new(path(&["interface", "name"]), "eth0")),
        &[iface]
    );
}

#[test]
fn test_attribute_index_for_deleted_leaf_keeps_previous_value() {
    let (tree, iface) = interface_tree((Some("old"), None));

    assert_eq!(
        tree.nodes_of_attribute(&AttributeIndex::new(
            path(&["interface", "description"]),
            "old"
        )),
        &[iface]
    );
}

#[test]
fn test_leaf_list_values_are_indexed() {
    let mut tree = device_tree();
    let mut tag = journal_node(leaf_id(&device_id(), "tag"), &["tag"]);
    tag.set_previous_values(tags(&["blue", "green"]))
        .set_current_values(tags(&["blue", "red"]));
    let tag = tree.append_child(tree.root(), tag).unwrap();

    assert_eq!(tree.node(tag).unwrap().change_type(), ChangeType::Modify);
    for v in ["blue", "green", "red"] {
        assert_eq!(
            tree.nodes_of_attribute(&AttributeIndex::new(path(&["tag"]), v)),
            &[tree.root()],
            "value {}",
            v
        );
    }
}

#[test]
fn test_insert_metadata_is_carried_through() {
    let mut tree = device_tree();
    let mut tag = journal_node(leaf_id(&device_id(), "tag"), &["tag"]);
    let moved = LeafListEntry::new(ConfigLeafAttribute::new(NS, "tag", "red"))
        .with_insert(InsertOperation::Before("blue".to_string()));
    tag.set_previous_values(tags(&["blue"]))
        .set_current_values(vec![moved, tags(&["blue"]).remove(0)])
        .set_insert_operation(InsertOperation::First);
    let tag = tree.append_child(tree.root(), tag).unwrap();

    let node = tree.node(tag).unwrap();
    assert_eq!(node.insert_operation(), Some(&InsertOperation::First));
    let anchors: Vec<_> = node
        .current_values()
        .unwrap()
        .values()
        .map(|entry| entry.insert.as_ref().and_then(InsertOperation::anchor_value))
        .collect();
    assert_eq!(anchors, vec![Some("blue"), None]);
    assert_eq!(node.change_type(), ChangeType::Modify);
}

#[test]
fn test_changed_types_only_track_leaves() {
    let (tree, _) = interface_tree((Some("A"), Some("B")));

    let changed: Vec<_> = tree.changed_node_types().iter().cloned().collect();
    assert_eq!(changed, vec![path(&["interface", "description"])]);
}

#[test]
fn test_type_index_across_and_within_mounts() {
    let mut tree = device_tree();
    let system_path = path(&["slot", "mounted", "system"]);
    let mut mounted_refs = Vec::new();
    let mut system_refs = Vec::new();

    for id in ["1", "2"] {
        let slot = tree
            .append_child(tree.root(), journal_node(slot_id(id), &["slot"]))
            .unwrap();
        let mounted_id = leaf_id(&slot_id(id), "mounted");
        let mounted = tree
            .append_child(slot, journal_node(mounted_id.clone(), &["slot", "mounted"]))
            .unwrap();
        let system = tree
            .append_child(
                mounted,
                journal_node(leaf_id(&mounted_id, "system"), &["slot", "mounted", "system"]),
            )
            .unwrap();
        mounted_refs.push(mounted);
        system_refs.push(system);
    }

    assert!(tree.node(mounted_refs[0]).unwrap().is_mount_point());
    assert_eq!(tree.nodes_of_type(&system_path), system_refs.as_slice());
    assert_eq!(
        tree.nodes_of_type_within_schema_mount(mounted_refs[0], &system_path),
        &[system_refs[0]]
    );
    assert_eq!(
        tree.nodes_of_type_within_schema_mount(mounted_refs[1], &system_path),
        &[system_refs[1]]
    );
    assert!(tree
        .nodes_of_type_within_schema_mount(tree.root(), &system_path)
        .is_empty());
    assert_eq!(
        tree.nodes_of_type_within_schema_mount(tree.root(), &path(&["slot", "mounted"])),
        mounted_refs.as_slice()
    );
    assert_eq!(tree.index().scope_count(), 3);
}

#[test]
fn test_lookup_by_id() {
    let (tree, iface) = interface_tree((None, Some("uplink")));

    assert_eq!(tree.find(&interface_id("eth0")), Some(iface));
    assert_eq!(tree.child(tree.root(), &interface_id("eth0")), Some(iface));
    assert_eq!(tree.find(&interface_id("eth9")), None);
    assert_eq!(tree.parent(iface), Some(tree.root()));
    assert_eq!(tree.children(iface).len(), 2);
}

#[test]
fn test_leaf_parent_is_rejected() {
    let mut tree = device_tree();
    let name = tree
        .append_child(
            tree.root(),
            journal_node(leaf_id(&device_id(), "name"), &["name"]),
        )
        .unwrap();

    let err = tree
        .append_child(name, journal_node(interface_id("eth0"), &["interface"]))
        .unwrap_err();

    assert!(matches!(err, EditError::InvalidJournalParent { .. }));
    assert_eq!(tree.len(), 2);
}

#[test]
fn test_duplicate_child_is_rejected() {
    let mut tree = device_tree();
    tree.append_child(tree.root(), journal_node(interface_id("eth0"), &["interface"]))
        .unwrap();

    let err = tree
        .append_child(tree.root(), journal_node(interface_id("eth0"), &["interface"]))
        .unwrap_err();

    assert!(matches!(err, EditError::DuplicateJournalChild { .. }));
}

#[test]
fn test_context_annotations() {
    let mut tree = device_tree();
    let mut hostname = journal_node(leaf_id(&device_id(), "hostname"), &["hostname"]);
    hostname
        .set_current_value(value("hostname", "edge"))
        .mark_implied(true)
        .set_edit_change_source(EditChangeSource::System)
        .set_context_value("reason", serde_json::json!("default"));
    let node = tree.append_child(tree.root(), hostname).unwrap();

    let node = tree.node(node).unwrap();
    assert!(node.is_implied());
    assert_eq!(node.edit_change_source(), Some(EditChangeSource::System));
    assert_eq!(
        node.context_value("reason"),
        Some(&serde_json::json!("default"))
    );
    assert!(!tree.node(tree.root()).unwrap().is_implied());
}

#[test]
fn test_deleted_entry_snapshots() {
    let mut tree = device_tree();
    let mut iface = journal_node(interface_id("eth0"), &["interface"]);
    iface.set_change_type(ChangeType::Delete);
    let iface = tree.append_child(tree.root(), iface).unwrap();

    let mut name = journal_node(leaf_id(&interface_id("eth0"), "name"), &["interface", "name"]);
    name.set_previous_value(value("name", "eth0"));
    tree.append_child(iface, name).unwrap();
    let mut mtu = journal_node(leaf_id(&interface_id("eth0"), "mtu"), &["interface", "mtu"]);
    mtu.set_previous_value(value("mtu", "1500"));
    tree.append_child(iface, mtu).unwrap();

    assert!(tree.current_subtree_xml(iface).is_none());
    assert_eq!(
        tree.previous_subtree_xml(tree.root()).unwrap().to_xml(),
        "<device xmlns=\"urn:example:device\"><interface><name>eth0</name><mtu>1500</mtu></interface></device>"
    );
    assert_eq!(
        tree.current_subtree_xml(tree.root()).unwrap().to_xml(),
        "<device xmlns=\"urn:example:device\"/>"
    );
}

#[test]
fn test_snapshot_into_text_sink() {
    let (tree, iface) = interface_tree((Some("A"), Some("B")));

    let mut sink = XmlTextSink::new();
    assert!(tree.current_subtree(iface, &mut sink));
    assert_eq!(
        sink.finish(),
        "<interface xmlns=\"urn:example:device\"><name>eth0</name><description>B</description></interface>"
    );

    let mut sink = XmlTextSink::new();
    assert!(tree.previous_subtree(iface, &mut sink));
    assert!(sink.finish().contains("<description>A</description>"));
}

#[test]
fn test_print_dump() {
    let mut tree = device_tree();
    let mut hostname = journal_node(leaf_id(&device_id(), "hostname"), &["hostname"]);
    hostname
        .set_previous_value(value("hostname", "r1"))
        .set_current_value(value("hostname", "r2"));
    tree.append_child(tree.root(), hostname).unwrap();
    let mut name = journal_node(leaf_id(&device_id(), "name"), &["name"]);
    name.set_previous_value(value("name", "core"));
    tree.append_child(tree.root(), name).unwrap();

    assert_eq!(
        tree.print(tree.root()),
        "device[/container=device] -> modify\n\
         \x20 hostname -> modify { previousVal = 'r1', currentVal = 'r2' }\n\
         \x20 name -> delete { previousVal = 'core', currentVal = null }\n"
    );
}

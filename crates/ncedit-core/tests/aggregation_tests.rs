//! Aggregation of several edit-config payloads into one request body per root
//!
//! Covers pass-through of a single payload, the leaf operation matrix,
//! forbidden nesting below `replace` (within and across payloads), schema
//! mismatches, leaf-list exclusivity, choice/case purging and delete handling.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{config, element, interface, leaf, path, registry, NS};
use ncedit_core::errors::{EditError, ExError};
use ncedit_core::model::{AttrName, DataElement, EditOperation, QName};
use ncedit_core::schema::InMemorySchemaRegistry;
use ncedit_core::{aggregate_edit_payloads, AggregatedTreeNode, EditOptions, SchemaPath};

fn aggregate(payloads: Vec<DataElement>) -> ncedit_core::Result<Vec<DataElement>> {
    aggregate_edit_payloads(&registry(), &payloads, EditOptions::default())
}

fn error_xpath(err: &EditError) -> String {
    err.error_path().expect("error carries a path").xpath.clone()
}

fn q(name: &str) -> QName {
    QName::new(NS, name)
}

#[test]
fn test_single_payload_passes_through() {
    let device = element("device")
        .with_child(leaf("name", "r1"))
        .with_child(leaf("hostname", "edge"));

    let merged = aggregate(vec![config(vec![device])]).unwrap();

    assert_eq!(merged.len(), 1);
    assert_eq!(
        merged[0].to_xml(),
        "<device xmlns=\"urn:example:device\"><name>r1</name><hostname>edge</hostname></device>"
    );
}

#[test]
fn test_disjoint_leaves_from_two_payloads_are_combined() {
    let first = config(vec![element("device").with_child(leaf("name", "r1"))]);
    let second = config(vec![element("device").with_child(leaf("hostname", "edge"))]);

    let merged = aggregate(vec![first, second]).unwrap();

    assert_eq!(merged.len(), 1);
    let device = &merged[0];
    assert_eq!(device.find_child(&q("name")).unwrap().text(), "r1");
    assert_eq!(device.find_child(&q("hostname")).unwrap().text(), "edge");
}

#[test]
fn test_later_merge_overwrites_earlier_merge() {
    let first = config(vec![element("device").with_child(leaf("name", "a"))]);
    let second = config(vec![element("device").with_child(leaf("name", "b"))]);

    let merged = aggregate(vec![first, second]).unwrap();

    assert_eq!(merged[0].find_child(&q("name")).unwrap().text(), "b");
}

#[test]
fn test_merge_then_replace_on_leaf_clashes() {
    let first = config(vec![element("device")
        .with_child(leaf("name", "Alice").with_operation(EditOperation::Merge))]);
    let second = config(vec![element("device")
        .with_operation(EditOperation::Replace)
        .with_child(leaf("name", "Bob").with_operation(EditOperation::Replace))]);

    let err = aggregate(vec![first, second]).unwrap_err();

    match &err {
        EditError::OperationClash { existing, new, .. } => {
            assert_eq!(*existing, EditOperation::Merge);
            assert_eq!(*new, EditOperation::Replace);
        }
        other => panic!("expected OperationClash, got {:?}", other),
    }
    assert_eq!(error_xpath(&err), "/dev:device/dev:name");
    assert_eq!(
        err.error_path().unwrap().ns_prefixes.get("dev").map(String::as_str),
        Some(NS)
    );
}

#[test]
fn test_replace_then_remove_is_allowed() {
    let first = config(vec![element("device")
        .with_child(leaf("name", "a").with_operation(EditOperation::Replace))]);
    let second = config(vec![element("device")
        .with_child(DataElement::new(NS, "name").with_operation(EditOperation::Remove))]);

    let merged = aggregate(vec![first, second]).unwrap();

    let name = merged[0].find_child(&q("name")).unwrap();
    assert_eq!(name.edit_operation().unwrap(), Some(EditOperation::Remove));
    assert_eq!(merged[0].attribute(&AttrName::netconf_operation()), None);
}

#[test]
fn test_create_below_earlier_replace_is_forbidden() {
    let replaced = config(vec![element("device")
        .with_operation(EditOperation::Replace)
        .with_child(leaf("name", "r1"))]);
    let created = config(vec![element("device")
        .with_child(interface("eth0").with_operation(EditOperation::Create))]);

    let err = aggregate(vec![replaced, created]).unwrap_err();

    assert!(matches!(
        err,
        EditError::ForbiddenNestedOperation {
            parent: EditOperation::Replace,
            child: EditOperation::Create,
            ..
        }
    ));
    assert_eq!(error_xpath(&err), "/dev:device/dev:interface");
}

#[test]
fn test_later_replace_over_staged_create_is_forbidden() {
    let created = config(vec![element("device")
        .with_child(interface("eth0").with_operation(EditOperation::Create))]);
    let replaced = config(vec![element("device")
        .with_operation(EditOperation::Replace)
        .with_child(leaf("name", "r1"))]);

    let err = aggregate(vec![created, replaced]).unwrap_err();

    assert!(matches!(
        err,
        EditError::ForbiddenNestedOperation {
            parent: EditOperation::Replace,
            child: EditOperation::Create,
            ..
        }
    ));
    assert_eq!(
        error_xpath(&err),
        "/dev:device/dev:interface[dev:name='eth0']"
    );
}

#[test]
fn test_later_replace_over_staged_leaf_operation_is_forbidden() {
    let removed = config(vec![element("device")
        .with_child(DataElement::new(NS, "hostname").with_operation(EditOperation::Remove))]);
    let replaced = config(vec![element("device")
        .with_operation(EditOperation::Replace)
        .with_child(leaf("name", "r1"))]);

    let err = aggregate(vec![removed, replaced]).unwrap_err();

    assert!(matches!(
        err,
        EditError::ForbiddenNestedOperation {
            child: EditOperation::Remove,
            ..
        }
    ));
    assert_eq!(error_xpath(&err), "/dev:device/dev:hostname");
}

#[test]
fn test_earlier_replace_reaches_new_descendants() {
    let replaced = config(vec![element("device").with_operation(EditOperation::Replace)]);
    let nested = config(vec![element("device").with_child(
        interface("eth0").with_child(leaf("mtu", "9000").with_operation(EditOperation::Create)),
    )]);

    let err = aggregate(vec![replaced, nested]).unwrap_err();

    assert!(matches!(err, EditError::ForbiddenNestedOperation { .. }));
    assert_eq!(
        error_xpath(&err),
        "/dev:device/dev:interface[dev:name='eth0']/dev:mtu"
    );
}

#[test]
fn test_adopted_replace_covers_implicit_content() {
    let plain = config(vec![element("device").with_child(leaf("hostname", "a"))]);
    let replaced = config(vec![element("device")
        .with_operation(EditOperation::Replace)
        .with_child(leaf("name", "r1"))]);
    let refined = config(vec![element("device")
        .with_child(leaf("hostname", "b").with_operation(EditOperation::Replace))]);

    let merged = aggregate(vec![plain, replaced, refined]).unwrap();

    let device = &merged[0];
    assert_eq!(device.attribute(&AttrName::netconf_operation()), Some("replace"));
    assert_eq!(device.find_child(&q("hostname")).unwrap().text(), "b");
    assert_eq!(device.find_child(&q("name")).unwrap().text(), "r1");
}

#[test]
fn test_unknown_child_element() {
    let payload = config(vec![element("device").with_child(leaf("bogus", "x"))]);

    let err = aggregate(vec![payload]).unwrap_err();

    assert!(matches!(&err, EditError::UnknownElement { element, .. } if element == "bogus"));
    assert_eq!(error_xpath(&err), "/dev:device/dev:bogus");
}

#[test]
fn test_unknown_root_element() {
    let payload = config(vec![element("chassis")]);

    let err = aggregate(vec![payload]).unwrap_err();

    assert!(matches!(err, EditError::UnknownElement { .. }));
    assert_eq!(error_xpath(&err), "/dev:chassis");
}

#[test]
fn test_leaf_cannot_be_an_edit_root() {
    let registry = InMemorySchemaRegistry::new()
        .with_prefix(NS, "dev")
        .with_leaf(SchemaPath::root(q("standalone")));
    let payload = config(vec![leaf("standalone", "x")]);

    let err = aggregate_edit_payloads(&registry, &[payload], EditOptions::default()).unwrap_err();

    assert!(matches!(
        err,
        EditError::InvalidRootElement { kind: "leaf", .. }
    ));
}

#[test]
fn test_list_entry_without_key() {
    let payload = config(vec![element("device")
        .with_child(element("interface").with_child(leaf("mtu", "1500")))]);

    let err = aggregate(vec![payload]).unwrap_err();

    assert!(matches!(&err, EditError::MissingListKey { key, .. } if key == "name"));
    assert_eq!(error_xpath(&err), "/dev:device/dev:interface");
}

#[test]
fn test_merge_below_replace_is_forbidden() {
    let payload = config(vec![element("device")
        .with_operation(EditOperation::Replace)
        .with_child(leaf("name", "x").with_operation(EditOperation::Merge))]);

    let err = aggregate(vec![payload]).unwrap_err();

    assert!(matches!(
        err,
        EditError::ForbiddenNestedOperation {
            parent: EditOperation::Replace,
            child: EditOperation::Merge,
            ..
        }
    ));
    assert_eq!(error_xpath(&err), "/dev:device/dev:name");
}

#[test]
fn test_replace_default_operation_forbids_nested_delete() {
    let payload = config(vec![element("device")
        .with_child(leaf("name", "x").with_operation(EditOperation::Delete))]);
    let options = EditOptions::default().with_default_operation(EditOperation::Replace);

    let err = aggregate_edit_payloads(&registry(), &[payload], options).unwrap_err();

    assert!(matches!(err, EditError::ForbiddenNestedOperation { .. }));
}

#[test]
fn test_invalid_default_operation_rejected() {
    let payload = config(vec![element("device")]);
    let options = EditOptions::default().with_default_operation(EditOperation::Delete);

    let err = aggregate_edit_payloads(&registry(), &[payload], options).unwrap_err();

    assert!(matches!(&err, EditError::InvalidDefaultOperation { value } if value == "delete"));
    assert_eq!(ExError::from(err).to_rpc_error().error_tag, "invalid-value");
}

#[test]
fn test_unrecognised_operation_attribute() {
    let payload = config(vec![element("device")
        .with_attribute(AttrName::netconf_operation(), "frobnicate")]);

    let err = aggregate(vec![payload]).unwrap_err();

    assert!(matches!(&err, EditError::InvalidOperation { value, .. } if value == "frobnicate"));
    assert_eq!(error_xpath(&err), "/dev:device");
}

#[test]
fn test_leaf_list_from_two_payloads_clashes() {
    let first = config(vec![element("device").with_child(leaf("tag", "blue"))]);
    let second = config(vec![element("device").with_child(leaf("tag", "red"))]);

    let err = aggregate(vec![first, second]).unwrap_err();

    assert!(matches!(&err, EditError::LeafListClash { leaf_list, .. } if leaf_list == "tag"));
    assert_eq!(error_xpath(&err), "/dev:device/dev:tag");
}

#[test]
fn test_identical_leaf_list_entries_still_clash() {
    let first = config(vec![element("device").with_child(leaf("tag", "blue"))]);
    let second = config(vec![element("device").with_child(leaf("tag", "blue"))]);

    let err = aggregate(vec![first, second]).unwrap_err();

    assert!(matches!(err, EditError::LeafListClash { .. }));
}

#[test]
fn test_leaf_list_entries_of_one_payload_are_kept_together() {
    let device = element("device")
        .with_child(leaf("tag", "blue"))
        .with_child(leaf("tag", "red"));
    let other = config(vec![element("device").with_child(leaf("name", "r1"))]);

    let merged = aggregate(vec![config(vec![device]), other]).unwrap();

    let tags: Vec<String> = merged[0]
        .child_elements()
        .filter(|c| c.local_name() == "tag")
        .map(DataElement::text)
        .collect();
    assert_eq!(tags, vec!["blue".to_string(), "red".to_string()]);
}

#[test]
fn test_other_case_data_is_purged() {
    let static_address = config(vec![element("device")
        .with_child(leaf("ip", "192.0.2.1"))
        .with_child(leaf("gateway", "192.0.2.254"))]);
    let dhcp = config(vec![element("device").with_child(leaf("dhcp-client", "true"))]);

    let merged = aggregate(vec![static_address, dhcp]).unwrap();

    let device = &merged[0];
    assert!(device.find_child(&q("ip")).is_none());
    assert!(device.find_child(&q("gateway")).is_none());
    assert_eq!(device.find_child(&q("dhcp-client")).unwrap().text(), "true");
}

#[test]
fn test_same_case_siblings_are_kept() {
    let payload = config(vec![element("device")
        .with_child(leaf("ip", "192.0.2.1"))
        .with_child(leaf("gateway", "192.0.2.254"))]);

    let merged = aggregate(vec![payload]).unwrap();

    assert!(merged[0].find_child(&q("ip")).is_some());
    assert!(merged[0].find_child(&q("gateway")).is_some());
}

#[test]
fn test_delete_discards_everything_but_keys() {
    let first = config(vec![element("device")
        .with_child(interface("eth0").with_child(leaf("mtu", "1500")))]);
    let second = config(vec![element("device").with_child(
        interface("eth0")
            .with_operation(EditOperation::Delete)
            .with_child(leaf("description", "gone")),
    )]);

    let merged = aggregate(vec![first, second]).unwrap();

    let entry = merged[0].find_child(&q("interface")).unwrap();
    assert_eq!(entry.edit_operation().unwrap(), Some(EditOperation::Delete));
    assert_eq!(entry.find_child(&q("name")).unwrap().text(), "eth0");
    assert!(entry.find_child(&q("mtu")).is_none());
    assert!(entry.find_child(&q("description")).is_none());
}

#[test]
fn test_merge_into_deleted_entry_clashes() {
    let deleted = config(vec![
        element("device").with_child(interface("eth0").with_operation(EditOperation::Delete))
    ]);
    let merged_again = config(vec![element("device")
        .with_child(interface("eth0").with_child(leaf("mtu", "9000")))]);

    let err = aggregate(vec![deleted, merged_again]).unwrap_err();

    assert!(matches!(
        err,
        EditError::OperationClash {
            existing: EditOperation::Delete,
            new: EditOperation::Merge,
            ..
        }
    ));
    assert_eq!(
        error_xpath(&err),
        "/dev:device/dev:interface[dev:name='eth0']"
    );
}

#[test]
fn test_key_leaf_is_exempt_from_clash_check() {
    let first = config(vec![element("device")
        .with_child(interface("eth0").with_child(leaf("mtu", "1500")))]);
    let second = config(vec![element("device").with_child(
        interface("eth0")
            .with_operation(EditOperation::Replace)
            .with_child(leaf("mtu", "9000")),
    )]);

    let err = aggregate(vec![first, second]).unwrap_err();

    assert!(matches!(err, EditError::OperationClash { .. }));
    assert_eq!(
        error_xpath(&err),
        "/dev:device/dev:interface[dev:name='eth0']/dev:mtu"
    );
}

#[test]
fn test_list_entries_are_grouped_by_key() {
    let first = config(vec![element("device").with_child(interface("eth0"))]);
    let second = config(vec![element("device")
        .with_child(interface("eth1"))
        .with_child(interface("eth0").with_child(leaf("mtu", "1500")))]);

    let merged = aggregate(vec![first, second]).unwrap();

    let names: Vec<String> = merged[0]
        .child_elements()
        .filter(|c| c.local_name() == "interface")
        .map(|c| c.find_child(&q("name")).unwrap().text())
        .collect();
    assert_eq!(names, vec!["eth0".to_string(), "eth1".to_string()]);
}

#[test]
fn test_roots_are_grouped_in_first_seen_order() {
    let first = config(vec![
        element("device").with_child(leaf("name", "r1")),
        DataElement::new(NS, "system").with_child(leaf("contact", "noc")),
    ]);
    let second = config(vec![element("device").with_child(leaf("hostname", "edge"))]);

    let merged = aggregate(vec![first, second]).unwrap();

    let roots: Vec<&str> = merged.iter().map(DataElement::local_name).collect();
    assert_eq!(roots, vec!["device", "system"]);
    assert!(merged[0].find_child(&q("hostname")).is_some());
}

#[test]
fn test_aggregated_node_exposes_staged_state() {
    let registry = registry();
    let device = element("device")
        .with_child(leaf("name", "r1"))
        .with_child(interface("eth0").with_child(leaf("mtu", "1500")));

    let mut node = AggregatedTreeNode::new(&registry, &device, EditOptions::default()).unwrap();
    node.add(
        &registry,
        &element("device").with_child(leaf("hostname", "edge")),
    )
    .unwrap();

    assert_eq!(node.edit_operation(), EditOperation::Merge);
    assert_eq!(node.explicit_operation(), None);
    assert_eq!(
        node.leaf(&path(&["name"])).map(|l| l.element.text()),
        Some("r1".to_string())
    );
    assert_eq!(node.leaves().count(), 2);
    assert_eq!(node.children_of_type(&path(&["interface"])).count(), 1);
    let entry = node
        .child(&path(&["interface"]), &common::interface_id("eth0"))
        .unwrap();
    assert!(entry.leaf(&path(&["interface", "mtu"])).is_some());
}

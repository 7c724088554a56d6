//! Edit aggregation
//!
//! Folds several `<edit-config>` payloads into one conflict-checked request
//! body per target root. Operation compatibility between payloads follows
//! [`EditOperation::can_overwrite`](crate::model::EditOperation::can_overwrite).

pub mod node;

pub use node::{AggregatedTreeNode, ResolvedRoot, StagedLeaf};

use indexmap::IndexMap;

use crate::errors::Result;
use crate::model::{DataElement, ModelNodeId};
use crate::options::EditOptions;
use crate::schema::SchemaRegistry;
use crate::{log_op_end, log_op_error, log_op_start};

/// Merge the `<config>` bodies of several edit requests
///
/// Top-level elements are grouped by instance identity in first-seen order;
/// each group yields one merged element.
///
/// # Errors
///
/// Fails with the first structural error met; nothing is merged partially.
pub fn aggregate_edit_payloads(
    registry: &dyn SchemaRegistry,
    payloads: &[DataElement],
    options: EditOptions,
) -> Result<Vec<DataElement>> {
    log_op_start!("aggregate_edit_payloads", payload_count = payloads.len());
    let start = std::time::Instant::now();

    let merged = aggregate_impl(registry, payloads, options).map_err(|e| {
        log_op_error!(
            "aggregate_edit_payloads",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "aggregate_edit_payloads",
        duration_ms = start.elapsed().as_millis() as u64,
        root_count = merged.len()
    );

    Ok(merged)
}

fn aggregate_impl(
    registry: &dyn SchemaRegistry,
    payloads: &[DataElement],
    options: EditOptions,
) -> Result<Vec<DataElement>> {
    options.validate()?;

    let mut roots: IndexMap<ModelNodeId, AggregatedTreeNode> = IndexMap::new();
    for payload in payloads {
        for element in payload.child_elements() {
            let resolved = AggregatedTreeNode::resolve_root(registry, element)?;
            match roots.get_mut(&resolved.model_node_id) {
                Some(node) => node.add(registry, element)?,
                None => {
                    let node = AggregatedTreeNode::new(registry, element, options)?;
                    roots.insert(resolved.model_node_id, node);
                }
            }
        }
    }

    Ok(roots.values().map(AggregatedTreeNode::to_dom).collect())
}

//! ncedit Core - NETCONF edit-config aggregation and change tracking
//!
//! This crate provides the in-memory engine that sits between the NETCONF
//! request layer and the datastore apply phase:
//! - Node identity (`ModelNodeId`) and schema paths for YANG data trees
//! - A narrow schema oracle interface (`SchemaRegistry`) consumed by the core
//! - The edit aggregator, folding several edit-config payloads into one
//!   conflict-checked effective subtree
//! - The change journal, recording before/after state of every touched node
//!   with type, mount-scoped and attribute-value indices
//! - Audit records over a finished journal
//!
//! Transport, XML parsing, schema compilation and persistence live elsewhere.

pub mod aggregate;
pub mod audit;
pub mod errors;
pub mod journal;
pub mod logging_facility;
pub mod model;
pub mod options;
pub mod schema;

pub use ncedit_core_types as core_types;

// Re-export commonly used types
pub use aggregate::{aggregate_edit_payloads, AggregatedTreeNode};
pub use audit::{compute_journal_digest, JournalAuditRecord};
pub use errors::{EditError, ExError, ExErrorKind, Result, RpcErrorInfo};
pub use journal::{
    AttributeIndex, ChangeTree, ChangeTreeNode, ChangeType, ConfigLeafAttribute, EditChangeSource,
    LeafListEntry, NodeRef, SchemaNodeRef, WritableChangeTreeNode,
};
pub use model::{
    AttrName, DataElement, EditOperation, InsertOperation, ModelNodeId, QName, RenderedPath,
    SchemaPath, TreeSink,
};
pub use options::EditOptions;
pub use schema::{CaseMembership, InMemorySchemaRegistry, SchemaNodeKind, SchemaRegistry};

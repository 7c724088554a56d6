//! Data model shared by the aggregator and the change journal

pub mod edit_operation;
pub mod element;
pub mod node_id;
pub mod qname;
pub mod sink;

pub use edit_operation::{EditOperation, InsertOperation, ParseEditOperationError};
pub use element::{AttrName, DataElement, DataNode, NETCONF_BASE_NS, OPERATION_ATTR, YANG_NS};
pub use node_id::{ModelNodeId, ModelNodeRdn, PrefixResolver, RenderedPath, SyntheticPrefixes};
pub use qname::{QName, SchemaPath};
pub use sink::{DomBuilder, TreeSink, XmlTextSink};

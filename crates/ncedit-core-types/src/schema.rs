//! Canonical schema constants for structured logging and events
//!
//! These constants ensure consistency across all logging and error reporting.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_MESSAGE_ID: &str = "message_id";
pub const FIELD_SESSION_ID: &str = "session_id";
pub const FIELD_TRACE_ID: &str = "trace_id";

// Data tree identifiers
pub const FIELD_NODE_ID: &str = "node_id";
pub const FIELD_SCHEMA_PATH: &str = "schema_path";
pub const FIELD_EDIT_OPERATION: &str = "edit_operation";

// Collection sizes
pub const FIELD_PAYLOAD_COUNT: &str = "payload_count";
pub const FIELD_ROOT_COUNT: &str = "root_count";
pub const FIELD_CHANGED_COUNT: &str = "changed_count";

// Error fields
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";
pub const FIELD_ERR_PATH: &str = "err_path";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";

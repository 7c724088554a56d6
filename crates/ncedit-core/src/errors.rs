use ncedit_core_types::{MessageId, SessionId, TraceId};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::model::{EditOperation, RenderedPath};

/// Result type alias using EditError
pub type Result<T> = std::result::Result<T, EditError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code for programmatic handling and tests,
/// and to the RFC 6241 `error-tag`/`error-type` pair the protocol layer puts in
/// an `<rpc-error>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExErrorKind {
    // Schema mismatch
    UnknownElement,
    InvalidRootElement,

    // Aggregation
    OperationClash,
    ForbiddenNestedOperation,
    MissingListKey,
    LeafListClash,
    InvalidOperation,

    // Change journal
    InvalidJournalParent,
    DuplicateJournalChild,

    // Configuration
    InvalidInput,

    // Integration
    Serialization,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::UnknownElement => "ERR_UNKNOWN_ELEMENT",
            ExErrorKind::InvalidRootElement => "ERR_INVALID_ROOT_ELEMENT",
            ExErrorKind::OperationClash => "ERR_OPERATION_CLASH",
            ExErrorKind::ForbiddenNestedOperation => "ERR_FORBIDDEN_NESTED_OPERATION",
            ExErrorKind::MissingListKey => "ERR_MISSING_LIST_KEY",
            ExErrorKind::LeafListClash => "ERR_LEAF_LIST_CLASH",
            ExErrorKind::InvalidOperation => "ERR_INVALID_OPERATION",
            ExErrorKind::InvalidJournalParent => "ERR_INVALID_JOURNAL_PARENT",
            ExErrorKind::DuplicateJournalChild => "ERR_DUPLICATE_JOURNAL_CHILD",
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// RFC 6241 Appendix A `error-tag`
    pub fn rpc_error_tag(&self) -> &'static str {
        match self {
            ExErrorKind::UnknownElement => "unknown-element",
            ExErrorKind::MissingListKey => "missing-element",
            ExErrorKind::ForbiddenNestedOperation => "operation-not-supported",
            ExErrorKind::InvalidOperation => "bad-attribute",
            ExErrorKind::InvalidRootElement | ExErrorKind::InvalidInput => "invalid-value",
            ExErrorKind::OperationClash
            | ExErrorKind::LeafListClash
            | ExErrorKind::InvalidJournalParent
            | ExErrorKind::DuplicateJournalChild
            | ExErrorKind::Serialization
            | ExErrorKind::Internal => "operation-failed",
        }
    }

    /// RFC 6241 `error-type` layer
    pub fn rpc_error_type(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidOperation | ExErrorKind::InvalidInput => "protocol",
            _ => "application",
        }
    }
}

/// The fields a NETCONF `<rpc-error>` is rendered from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RpcErrorInfo {
    pub error_type: &'static str,
    pub error_tag: &'static str,
    pub error_severity: &'static str,
    /// `error-path`, absent when the failure is not tied to a node
    pub error_path: Option<String>,
    /// Prefix declarations needed to interpret `error_path`
    pub ns_prefixes: BTreeMap<String, String>,
    pub error_message: String,
    /// Stable `ERR_*` code, carried in `error-info`
    pub error_app_tag: &'static str,
}

/// Canonical structured error type
///
/// Classification plus the transaction context needed to correlate a failure
/// with the `<rpc>` that caused it.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    message_id: Option<MessageId>,
    session_id: Option<SessionId>,
    trace_id: Option<TraceId>,
    error_path: Option<RenderedPath>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            message_id: None,
            session_id: None,
            trace_id: None,
            error_path: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    pub fn with_message_id(mut self, message_id: MessageId) -> Self {
        self.message_id = Some(message_id);
        self
    }

    pub fn with_session_id(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
        self
    }

    /// Add trace ID context
    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    /// Attach the offending node's rendered path
    pub fn with_error_path(mut self, path: RenderedPath) -> Self {
        self.error_path = Some(path);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn message_id(&self) -> Option<&MessageId> {
        self.message_id.as_ref()
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.session_id
    }

    pub fn trace_id(&self) -> Option<&TraceId> {
        self.trace_id.as_ref()
    }

    pub fn error_path(&self) -> Option<&RenderedPath> {
        self.error_path.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }

    /// Project onto the `<rpc-error>` fields
    pub fn to_rpc_error(&self) -> RpcErrorInfo {
        RpcErrorInfo {
            error_type: self.kind.rpc_error_type(),
            error_tag: self.kind.rpc_error_tag(),
            error_severity: "error",
            error_path: self.error_path.as_ref().map(|p| p.xpath.clone()),
            ns_prefixes: self
                .error_path
                .as_ref()
                .map(|p| p.ns_prefixes.clone())
                .unwrap_or_default(),
            error_message: self.message.clone(),
            error_app_tag: self.code(),
        }
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.kind.rpc_error_tag())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(path) = &self.error_path {
            write!(f, " (path: {})", path)?;
        }
        if let Some(message_id) = &self.message_id {
            write!(f, " (message-id: {})", message_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

// ========== End Error Facility ==========

/// Failures raised while aggregating payloads or building a change journal
///
/// Every structural variant carries the offending node rendered as an XPath
/// plus its prefix map.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditError {
    /// Element does not match any schema node at its position
    #[error("Unknown element '{element}' at {path}")]
    UnknownElement { element: String, path: RenderedPath },

    /// Top-level element is not a container or list
    #[error("Element '{element}' is a {kind} and cannot be an edit root ({path})")]
    InvalidRootElement {
        element: String,
        kind: &'static str,
        path: RenderedPath,
    },

    /// Two payloads disagree on an operation the aggregation matrix forbids
    #[error("Operation clash at {path}: '{new}' cannot be combined with '{existing}'")]
    OperationClash {
        existing: EditOperation,
        new: EditOperation,
        path: RenderedPath,
    },

    /// Child operation undercuts a replace ancestor
    #[error("Operation '{child}' is not allowed below a '{parent}' ancestor ({path})")]
    ForbiddenNestedOperation {
        parent: EditOperation,
        child: EditOperation,
        path: RenderedPath,
    },

    #[error("List entry at {path} is missing key '{key}'")]
    MissingListKey { key: String, path: RenderedPath },

    /// Leaf-list supplied by more than one payload
    #[error("Leaf-list '{leaf_list}' is supplied by more than one payload ({path})")]
    LeafListClash {
        leaf_list: String,
        path: RenderedPath,
    },

    #[error("Invalid edit operation attribute value '{value}' at {path}")]
    InvalidOperation { value: String, path: RenderedPath },

    /// `default-operation` other than merge or replace
    #[error("Invalid default-operation '{value}': expected 'merge' or 'replace'")]
    InvalidDefaultOperation { value: String },

    /// Journal child appended below a leaf or leaf-list
    #[error("Cannot append a journal child below {path}: {reason}")]
    InvalidJournalParent { reason: String, path: RenderedPath },

    #[error("Journal node {path} is already present under its parent")]
    DuplicateJournalChild { path: RenderedPath },

    #[error("Serialization failed: {message}")]
    Serialization { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl EditError {
    /// Offending node, for `error-path`
    pub fn error_path(&self) -> Option<&RenderedPath> {
        match self {
            EditError::UnknownElement { path, .. }
            | EditError::InvalidRootElement { path, .. }
            | EditError::OperationClash { path, .. }
            | EditError::ForbiddenNestedOperation { path, .. }
            | EditError::MissingListKey { path, .. }
            | EditError::LeafListClash { path, .. }
            | EditError::InvalidOperation { path, .. }
            | EditError::InvalidJournalParent { path, .. }
            | EditError::DuplicateJournalChild { path } => Some(path),
            EditError::InvalidDefaultOperation { .. }
            | EditError::Serialization { .. }
            | EditError::Internal { .. } => None,
        }
    }

    pub fn kind(&self) -> ExErrorKind {
        match self {
            EditError::UnknownElement { .. } => ExErrorKind::UnknownElement,
            EditError::InvalidRootElement { .. } => ExErrorKind::InvalidRootElement,
            EditError::OperationClash { .. } => ExErrorKind::OperationClash,
            EditError::ForbiddenNestedOperation { .. } => ExErrorKind::ForbiddenNestedOperation,
            EditError::MissingListKey { .. } => ExErrorKind::MissingListKey,
            EditError::LeafListClash { .. } => ExErrorKind::LeafListClash,
            EditError::InvalidOperation { .. } => ExErrorKind::InvalidOperation,
            EditError::InvalidDefaultOperation { .. } => ExErrorKind::InvalidInput,
            EditError::InvalidJournalParent { .. } => ExErrorKind::InvalidJournalParent,
            EditError::DuplicateJournalChild { .. } => ExErrorKind::DuplicateJournalChild,
            EditError::Serialization { .. } => ExErrorKind::Serialization,
            EditError::Internal { .. } => ExErrorKind::Internal,
        }
    }
}

impl From<EditError> for ExError {
    fn from(err: EditError) -> Self {
        let message = err.to_string();
        let ex = ExError::new(err.kind()).with_message(message);
        match err {
            EditError::UnknownElement { path, .. }
            | EditError::InvalidRootElement { path, .. }
            | EditError::OperationClash { path, .. }
            | EditError::ForbiddenNestedOperation { path, .. }
            | EditError::MissingListKey { path, .. }
            | EditError::LeafListClash { path, .. }
            | EditError::InvalidOperation { path, .. }
            | EditError::InvalidJournalParent { path, .. }
            | EditError::DuplicateJournalChild { path } => ex.with_error_path(path),
            EditError::InvalidDefaultOperation { .. }
            | EditError::Serialization { .. }
            | EditError::Internal { .. } => ex,
        }
    }
}

impl From<serde_json::Error> for EditError {
    fn from(err: serde_json::Error) -> Self {
        EditError::Serialization {
            message: err.to_string(),
        }
    }
}

//! Correlation types for request tracking and tracing
//!
//! An edit-config transaction is identified by the NETCONF session that
//! carried it and the `message-id` of the `<rpc>`. These types let the
//! aggregator, the change journal and the audit record agree on that identity.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The `message-id` attribute of a NETCONF `<rpc>` element
///
/// RFC 6241 treats it as an opaque string chosen by the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(String);

impl MessageId {
    /// Wrap a client-supplied message-id
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// NETCONF session identifier assigned in the server `<hello>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(u32);

impl SessionId {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier tying the log events and audit record of one transaction together
///
/// Fresh ids are UUIDv7, so they sort by creation time in the audit log.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TraceId(String);

impl TraceId {
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Reuse an id minted upstream, e.g. by the transport that received the rpc
    pub fn inherit(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TraceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TraceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Context carried through one edit transaction for correlation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditContext {
    pub message_id: Option<MessageId>,
    pub session_id: Option<SessionId>,
    pub trace_id: TraceId,
}

impl EditContext {
    /// Create a new context with a fresh TraceId
    pub fn new() -> Self {
        Self {
            message_id: None,
            session_id: None,
            trace_id: TraceId::new(),
        }
    }

    /// Attach the rpc message-id
    pub fn with_message_id(mut self, message_id: MessageId) -> Self {
        self.message_id = Some(message_id);
        self
    }

    /// Attach the NETCONF session
    pub fn with_session_id(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
        self
    }

    /// Replace the generated TraceId with an inherited one
    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = trace_id;
        self
    }
}

impl Default for EditContext {
    fn default() -> Self {
        Self::new()
    }
}

//! Audit records for completed change journals.
//!
//! A record captures which nodes a transaction changed, the full text dump of
//! the journal and SHA-256 digests over it.
//!
//! ## Digests
//!
//! - **Journal digest**: hash of the `print()` dump; identical journals give
//!   identical digests.
//! - **Semantic digest**: hash of the record with `created_at`, `trace_id` and
//!   the digest itself blanked, so replays of the same edit compare equal.

use chrono::Utc;
use ncedit_core_types::EditContext;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::errors::Result;
use crate::journal::{ChangeTree, ChangeType};
use crate::{log_op_end, log_op_error, log_op_start};

/// Current audit record schema version
pub const AUDIT_SCHEMA_VERSION: u32 = 1;

/// One changed node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// `ModelNodeId` display form
    pub node_id: String,
    pub schema_path: String,
    pub change_type: ChangeType,
}

/// Serialisable summary of one edit transaction's journal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalAuditRecord {
    pub audit_schema_version: u32,

    /// RFC3339 timestamp of record creation
    pub created_at: String,

    pub message_id: Option<String>,
    pub session_id: Option<u32>,
    pub trace_id: String,

    pub changed_node_count: usize,

    /// Schema paths of changed leaf and leaf-list types
    pub changed_types: Vec<String>,

    /// Changed nodes in depth-first order
    pub entries: Vec<AuditEntry>,

    pub journal_dump: String,
    pub journal_digest: String,

    /// Digest excluding `created_at` and `trace_id`
    pub semantic_digest: String,
}

impl JournalAuditRecord {
    /// Summarise `tree` for the transaction described by `ctx`
    ///
    /// # Errors
    ///
    /// `EditError::Serialization` if the record cannot be serialised for the
    /// semantic digest.
    pub fn from_tree(tree: &ChangeTree, ctx: &EditContext) -> Result<Self> {
        let entries: Vec<AuditEntry> = tree
            .changed_nodes()
            .into_iter()
            .filter_map(|r| tree.node(r))
            .map(|node| AuditEntry {
                node_id: node.model_node_id().to_string(),
                schema_path: node.schema().path.to_string(),
                change_type: node.change_type(),
            })
            .collect();

        let journal_dump = tree.print(tree.root());
        let journal_digest = compute_journal_digest(&journal_dump);

        let mut record = Self {
            audit_schema_version: AUDIT_SCHEMA_VERSION,
            created_at: Utc::now().to_rfc3339(),
            message_id: ctx.message_id.as_ref().map(|m| m.as_str().to_string()),
            session_id: ctx.session_id.map(|s| s.get()),
            trace_id: ctx.trace_id.as_str().to_string(),
            changed_node_count: entries.len(),
            changed_types: tree
                .changed_node_types()
                .iter()
                .map(|p| p.to_string())
                .collect(),
            entries,
            journal_dump,
            journal_digest,
            semantic_digest: String::new(),
        };
        record.semantic_digest = compute_semantic_digest(&record)?;
        Ok(record)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl ChangeTree {
    /// Build the audit record for this journal, logged as the `journal_audit` op
    pub fn audit(&self, ctx: &EditContext) -> Result<JournalAuditRecord> {
        log_op_start!(
            "journal_audit",
            trace_id = ctx.trace_id.as_str(),
            node_count = self.len()
        );
        let start = std::time::Instant::now();

        let record = JournalAuditRecord::from_tree(self, ctx).map_err(|e| {
            log_op_error!(
                "journal_audit",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

        log_op_end!(
            "journal_audit",
            duration_ms = start.elapsed().as_millis() as u64,
            changed_count = record.changed_node_count
        );
        Ok(record)
    }
}

/// SHA-256 of a journal dump, hex-encoded (64 characters)
pub fn compute_journal_digest(dump: &str) -> String {
    hash_string(dump)
}

/// Digest of a record with its volatile fields blanked
pub fn compute_semantic_digest(record: &JournalAuditRecord) -> Result<String> {
    let mut copy = record.clone();
    copy.created_at = String::new();
    copy.trace_id = String::new();
    copy.semantic_digest = String::new();

    let canonical = serde_json::to_string(&copy)?;
    Ok(hash_string(&canonical))
}

fn hash_string(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

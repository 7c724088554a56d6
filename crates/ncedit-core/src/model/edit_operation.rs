//! NETCONF edit operations and the aggregation compatibility policy.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::element::{AttrName, DataElement, YANG_NS};

/// The `operation` attribute values of RFC 6241 §7.2
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditOperation {
    #[default]
    Merge,
    Replace,
    Create,
    Delete,
    Remove,
}

/// An `operation` (or `insert`) attribute carried a value outside the protocol
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognised edit operation value '{0}'")]
pub struct ParseEditOperationError(pub String);

// Row = operation already recorded, column = operation of the newer payload.
// Column/row order: create, replace, delete, remove, merge.
const AGGREGATION_MATRIX: [[bool; 5]; 5] = [
    // create
    [false, false, false, false, false],
    // replace
    [false, true, false, true, false],
    // delete
    [false, false, false, false, false],
    // remove
    [false, true, false, true, false],
    // merge
    [false, false, false, true, true],
];

impl EditOperation {
    /// All operations in matrix order
    pub const ALL: [EditOperation; 5] = [
        EditOperation::Create,
        EditOperation::Replace,
        EditOperation::Delete,
        EditOperation::Remove,
        EditOperation::Merge,
    ];

    fn matrix_index(self) -> usize {
        match self {
            EditOperation::Create => 0,
            EditOperation::Replace => 1,
            EditOperation::Delete => 2,
            EditOperation::Remove => 3,
            EditOperation::Merge => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EditOperation::Merge => "merge",
            EditOperation::Replace => "replace",
            EditOperation::Create => "create",
            EditOperation::Delete => "delete",
            EditOperation::Remove => "remove",
        }
    }

    /// Delete and remove discard whatever the subtree held
    pub fn is_destructive(self) -> bool {
        matches!(self, EditOperation::Delete | EditOperation::Remove)
    }

    /// Whether a later payload using `new` may overwrite data an earlier
    /// payload recorded with `existing`
    pub fn can_overwrite(existing: EditOperation, new: EditOperation) -> bool {
        AGGREGATION_MATRIX[existing.matrix_index()][new.matrix_index()]
    }
}

impl FromStr for EditOperation {
    type Err = ParseEditOperationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "merge" => Ok(EditOperation::Merge),
            "replace" => Ok(EditOperation::Replace),
            "create" => Ok(EditOperation::Create),
            "delete" => Ok(EditOperation::Delete),
            "remove" => Ok(EditOperation::Remove),
            other => Err(ParseEditOperationError(other.to_string())),
        }
    }
}

impl fmt::Display for EditOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Position requested for an entry of an ordered-by-user leaf-list
/// (RFC 7950 §7.7.9, `yang:insert` / `yang:value` attributes)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "insert", content = "value")]
pub enum InsertOperation {
    First,
    Last,
    Before(String),
    After(String),
}

impl InsertOperation {
    pub const INSERT_ATTR: &'static str = "insert";
    pub const VALUE_ATTR: &'static str = "value";

    /// Read the insert attributes of a leaf-list entry element
    ///
    /// Returns `Ok(None)` when the element carries no `insert` attribute.
    pub fn from_element(element: &DataElement) -> Result<Option<Self>, ParseEditOperationError> {
        let insert = match element.attribute(&AttrName::qualified(YANG_NS, Self::INSERT_ATTR)) {
            Some(value) => value,
            None => return Ok(None),
        };
        let anchor = element
            .attribute(&AttrName::qualified(YANG_NS, Self::VALUE_ATTR))
            .map(str::to_string);

        match (insert.trim(), anchor) {
            ("first", _) => Ok(Some(InsertOperation::First)),
            ("last", _) => Ok(Some(InsertOperation::Last)),
            ("before", Some(value)) => Ok(Some(InsertOperation::Before(value))),
            ("after", Some(value)) => Ok(Some(InsertOperation::After(value))),
            (other, _) => Err(ParseEditOperationError(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InsertOperation::First => "first",
            InsertOperation::Last => "last",
            InsertOperation::Before(_) => "before",
            InsertOperation::After(_) => "after",
        }
    }

    pub fn anchor_value(&self) -> Option<&str> {
        match self {
            InsertOperation::Before(v) | InsertOperation::After(v) => Some(v),
            InsertOperation::First | InsertOperation::Last => None,
        }
    }
}

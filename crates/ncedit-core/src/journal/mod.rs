//! Change journal
//!
//! Records, for every node a transaction touches, its previous and current
//! state. The tree is an arena ([`ChangeTree`]) addressed by [`NodeRef`]; the
//! type, mount-scope and attribute indices live in the tree's
//! [`JournalIndex`] and are filled in as nodes are appended.

pub mod index;
pub mod node;
mod print;
mod snapshot;
pub mod tree;

pub use index::{AttributeIndex, JournalIndex};
pub use node::{
    ChangeTreeNode, ConfigLeafAttribute, LeafListEntry, LeafListValues, NodeRef, SchemaNodeRef,
    WritableChangeTreeNode,
};
pub use tree::ChangeTree;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Context key marking a change the server made implicitly
pub const IMPLIED_CHANGE: &str = "implied-change";
/// Context key recording who originated a change
pub const EDIT_CHANGE_SOURCE: &str = "edit-change-source";

/// Classification of one journal node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Create,
    Delete,
    Modify,
    None,
}

impl ChangeType {
    /// Derive a leaf classification from its previous/current presence
    pub fn classify(previous_present: bool, current_present: bool, equal: bool) -> Self {
        match (previous_present, current_present) {
            (false, false) => ChangeType::None,
            (false, true) => ChangeType::Create,
            (true, false) => ChangeType::Delete,
            (true, true) if equal => ChangeType::None,
            (true, true) => ChangeType::Modify,
        }
    }

    pub fn is_changed(&self) -> bool {
        *self != ChangeType::None
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Create => "create",
            ChangeType::Delete => "delete",
            ChangeType::Modify => "modify",
            ChangeType::None => "none",
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Originator of a change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditChangeSource {
    User,
    System,
}

impl EditChangeSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            EditChangeSource::User => "user",
            EditChangeSource::System => "system",
        }
    }
}

impl FromStr for EditChangeSource {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "user" => Ok(EditChangeSource::User),
            "system" => Ok(EditChangeSource::System),
            other => Err(format!("unknown edit change source '{}'", other)),
        }
    }
}

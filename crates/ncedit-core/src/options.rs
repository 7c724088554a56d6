//! Per-request edit options

use serde::{Deserialize, Serialize};

use crate::errors::{EditError, Result};
use crate::model::EditOperation;

/// Options of one `<edit-config>` request that influence aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EditOptions {
    /// NETCONF `default-operation`; applies to roots without an explicit
    /// `operation` attribute
    pub default_operation: EditOperation,
}

impl EditOptions {
    pub fn with_default_operation(mut self, operation: EditOperation) -> Self {
        self.default_operation = operation;
        self
    }

    /// Parse from a JSON object such as `{"default_operation": "replace"}`
    ///
    /// Only `merge` and `replace` are valid defaults (RFC 6241 §7.2 also
    /// allows `none`, which callers express by marking every node explicitly).
    pub fn from_json(json: &str) -> Result<Self> {
        let options: EditOptions = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        match self.default_operation {
            EditOperation::Merge | EditOperation::Replace => Ok(()),
            other => Err(EditError::InvalidDefaultOperation {
                value: other.to_string(),
            }),
        }
    }
}

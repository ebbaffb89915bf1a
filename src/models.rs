use crate::fuzzy::{self, FlatEntry};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Usage data returned by the Claude OAuth usage endpoint.
///
/// The response shape varies between plans and API revisions, so the raw
/// document is kept as-is and interpreted when it is displayed or queried.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Usage {
    pub raw: Value,
}

impl Usage {
    pub fn new(raw: Value) -> Self {
        Self { raw }
    }

    /// Pretty-printed JSON; `{}` when nothing was received.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        if self.raw.is_null() {
            return Ok("{}".to_string());
        }
        serde_json::to_string_pretty(&self.raw)
    }

    pub fn flatten(&self) -> Vec<FlatEntry> {
        fuzzy::flatten(&self.raw)
    }

    /// Resolves a free-text query such as "5h" or "weekly" to a single field.
    pub fn lookup(&self, query: &str) -> crate::error::Result<FlatEntry> {
        fuzzy::lookup(&self.raw, query)
    }
}

//! Capability seam over the document database's indexed views.

use serde::{Deserialize, Serialize};

/// One row of a view query result. Only `value` carries decision payload;
/// `key` is echoed back for callers that want it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewRow {
    pub key: String,
    pub value: String,
}

impl ViewRow {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: key.into(), value: value.into() }
    }
}

/// Read-only access to a server-side indexed view, queried by exact key.
///
/// An empty result set means "no match" and is never an error. Transport or
/// protocol failures surface as `Err` and propagate unchanged through the
/// policies; retry policy belongs to the implementor.
pub trait ViewStore: Send + Sync {
    fn query(&self, view: &str, key: &str) -> anyhow::Result<Vec<ViewRow>>;
}

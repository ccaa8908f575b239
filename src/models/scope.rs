use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A list filter that knows whether it carries the scope its endpoint needs.
///
/// Read hooks built from a filter that is not ready stay disabled and never
/// touch the network.
pub trait Scope {
    fn is_ready(&self) -> bool;
}

// ============================================================================
// Common filters
// ============================================================================

/// Filter for resources that are not scoped to a parent (customers).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Unscoped {}

impl Scope for Unscoped {
    fn is_ready(&self) -> bool {
        true
    }
}

/// Filter for the many resources that live under one consorcio.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ConsorcioScope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consorcio_id: Option<i64>,
}

impl ConsorcioScope {
    pub fn new(consorcio_id: i64) -> Self {
        Self {
            consorcio_id: Some(consorcio_id),
        }
    }
}

impl From<Option<i64>> for ConsorcioScope {
    fn from(consorcio_id: Option<i64>) -> Self {
        Self { consorcio_id }
    }
}

impl Scope for ConsorcioScope {
    fn is_ready(&self) -> bool {
        self.consorcio_id.is_some()
    }
}

use serde::{Deserialize, Serialize};

/// Outcome of a sync run. Partial failures are reported, not raised.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    pub imported_count: usize,
    pub errors: Vec<RecordError>,
}

/// A single record that could not be persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordError {
    pub order_id: String,
    pub message: String,
}

use serde::{Deserialize, Serialize};

/// Storage model for the single calculator session.
///
/// The form snapshot and its computed assessment are kept as opaque JSON;
/// the domain layer owns their shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Unique identifier for this snapshot
    pub id: String,

    /// The submitted form snapshot
    pub request: serde_json::Value,

    /// The assessment computed from `request`
    pub assessment: serde_json::Value,

    /// When the snapshot was stored (RFC 3339)
    pub updated_at: String,
}

/// Input data for replacing the session snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveSessionRequest {
    /// The submitted form snapshot
    pub request: serde_json::Value,

    /// The assessment computed from `request`
    pub assessment: serde_json::Value,
}

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One `voucher-history` entry: the voucher snapshot plus who did what
/// and when. The snapshot columns vary with backend version, so anything
/// beyond the fixed fields is kept as-is and rendered generically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    #[serde(default)]
    pub serial: String,
    #[serde(default)]
    pub transaction: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(flatten)]
    pub snapshot: Map<String, Value>,
}

//! Audit history

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{DefectId, UserId};

/// One immutable audit record of a tracked-field change on a defect.
/// Append-only; never updated or deleted once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub defect_id: DefectId,
    pub actor_id: UserId,
    pub field: String,
    pub old_value: String,
    pub new_value: String,
    pub recorded_at: DateTime<Utc>,
}

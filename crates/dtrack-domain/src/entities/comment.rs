//! Defect comments

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{CommentId, DefectId, UserId};

/// A single comment on a defect. Created once, immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub defect_id: DefectId,
    pub author_id: UserId,
    pub author_name: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// A validated comment ready to persist.
///
/// The body is already trimmed and known to be non-empty; the author
/// display name has been resolved (or substituted) by the service.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub defect_id: DefectId,
    pub author_id: UserId,
    pub author_name: String,
    pub body: String,
}

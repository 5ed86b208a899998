//! Defect attachments

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{AttachmentId, DefectId};

/// Attachment metadata. The binary bytes live with the external storage
/// collaborator; `storage_key` is the opaque location inside it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub id: AttachmentId,
    pub defect_id: DefectId,
    pub filename: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub storage_key: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Attachment metadata to persist. The bytes were already handed to the
/// storage collaborator; `size_bytes` is the size it reported.
#[derive(Debug, Clone)]
pub struct AttachmentCreate {
    pub defect_id: DefectId,
    pub filename: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub storage_key: String,
}

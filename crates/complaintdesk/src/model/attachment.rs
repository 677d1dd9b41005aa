use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Evidence file metadata. The bytes live in the blob store under `filename`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: i64,
    pub complaint_id: i64,
    /// Stored (generated) filename.
    pub filename: String,
    /// Filename as uploaded by the citizen.
    pub original_name: String,
    pub mime_type: String,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for an attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAttachment {
    pub complaint_id: i64,
    pub filename: String,
    pub original_name: String,
    pub mime_type: String,
}

/// File metadata for an attachment whose complaint is not stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentFile {
    pub filename: String,
    pub original_name: String,
    pub mime_type: String,
}

impl AttachmentFile {
    pub fn for_complaint(self, complaint_id: i64) -> NewAttachment {
        NewAttachment {
            complaint_id,
            filename: self.filename,
            original_name: self.original_name,
            mime_type: self.mime_type,
        }
    }
}

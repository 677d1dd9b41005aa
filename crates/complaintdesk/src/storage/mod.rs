//! Evidence blob storage.
//!
//! Intake receives [`AttachmentUpload`]s that are already on disk. If the
//! complaint is not committed, intake calls [`BlobStore::discard`] for each.

use std::path::PathBuf;

use serde::Serialize;

use crate::error::Result;

pub mod filesystem;

pub use filesystem::FileBlobStore;

/// A persisted upload waiting to be linked to a complaint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentUpload {
    /// Generated name inside the blob store.
    pub filename: String,
    pub original_name: String,
    pub mime_type: String,
    pub size: u64,
}

impl AttachmentUpload {
    /// Evidence must be an image or a PDF.
    pub fn is_allowed_type(&self) -> bool {
        self.mime_type.starts_with("image/") || self.mime_type == "application/pdf"
    }
}

pub trait BlobStore: Send + Sync {
    /// Writes `bytes` under a fresh generated name.
    fn persist(&self, original_name: &str, bytes: &[u8]) -> Result<AttachmentUpload>;

    /// Removes a stored blob. Missing blobs are not an error.
    fn discard(&self, filename: &str) -> Result<()>;

    /// Absolute path of an existing blob.
    fn resolve(&self, filename: &str) -> Result<PathBuf>;
}

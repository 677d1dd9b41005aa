//! SQLite backend error types.

use std::path::PathBuf;
use thiserror::Error;

use crate::store::{RecordKind, StoreError};

/// Errors from the SQLite backend.
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Creating the database directory failed.
    #[error("IO error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Migration failed at version {version}: {reason}")]
    Migration { version: u32, reason: String },

    /// A stored value could not be mapped back onto a record field.
    #[error("Corrupt row {id} in '{table}': {reason}")]
    CorruptRow {
        table: &'static str,
        id: i64,
        reason: String,
    },

    #[error("Database lock poisoned")]
    LockPoisoned,
}

impl DatabaseError {
    /// `table.column` named by a failed UNIQUE constraint.
    pub fn unique_violation(&self) -> Option<&str> {
        match self {
            DatabaseError::Sqlite(rusqlite::Error::SqliteFailure(e, Some(message)))
                if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                message.strip_prefix("UNIQUE constraint failed: ")
            }
            _ => None,
        }
    }
}

impl From<DatabaseError> for StoreError {
    fn from(err: DatabaseError) -> Self {
        let duplicate = match err.unique_violation() {
            Some("complaints.tracking_id") => Some((RecordKind::Complaint, "trackingId")),
            Some("attachments.filename") => Some((RecordKind::Attachment, "filename")),
            _ => None,
        };
        match duplicate {
            Some((kind, field)) => StoreError::Duplicate { kind, field },
            None => StoreError::Database(err),
        }
    }
}

//! Entity store error types.

use std::fmt;

use thiserror::Error;

use crate::db::DatabaseError;

/// The record families held by the entity store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Complaint,
    Category,
    Attachment,
    Response,
    User,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordKind::Complaint => "complaint",
            RecordKind::Category => "category",
            RecordKind::Attachment => "attachment",
            RecordKind::Response => "response",
            RecordKind::User => "user",
        };
        f.write_str(name)
    }
}

/// Errors from entity store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failure in the SQLite backend.
    #[error("Database error: {0}")]
    Database(DatabaseError),

    /// `replace` targeted an id that does not exist.
    #[error("{kind} {id} does not exist")]
    Missing { kind: RecordKind, id: i64 },

    /// `replace` tried to change a field that is fixed at insertion.
    #[error("Refusing to change immutable field '{field}' of {kind} {id}")]
    ImmutableField {
        kind: RecordKind,
        id: i64,
        field: &'static str,
    },

    /// `insert` collided with a value that must be unique.
    #[error("A {kind} with this {field} already exists")]
    Duplicate {
        kind: RecordKind,
        field: &'static str,
    },

    /// An in-memory table lock was poisoned by a panicking writer.
    #[error("Store lock poisoned")]
    LockPoisoned,
}

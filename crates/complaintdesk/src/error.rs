use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::model::ComplaintStatus;
use crate::store::StoreError;

/// Error kinds surfaced to the request layer, one per transport status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Forbidden,
    Unauthorized,
    InvalidState,
    MissingField,
    Internal,
}

#[derive(Error, Debug)]
pub enum ComplaintError {
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Cannot {action} complaint {id}: status is '{current}'")]
    InvalidState {
        id: i64,
        action: &'static str,
        current: ComplaintStatus,
    },

    #[error("Missing required field '{0}'")]
    MissingField(&'static str),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    #[error("Could not allocate a unique tracking id with prefix '{0}'")]
    TrackingIdExhausted(String),
}

impl ComplaintError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ComplaintError::Validation(_) => ErrorKind::Validation,
            ComplaintError::NotFound(_) => ErrorKind::NotFound,
            ComplaintError::Forbidden(_) => ErrorKind::Forbidden,
            ComplaintError::Unauthorized(_) => ErrorKind::Unauthorized,
            ComplaintError::InvalidState { .. } => ErrorKind::InvalidState,
            ComplaintError::MissingField(_) => ErrorKind::MissingField,
            ComplaintError::Store(_)
            | ComplaintError::Storage(_)
            | ComplaintError::Config(_)
            | ComplaintError::PasswordHash(_)
            | ComplaintError::TrackingIdExhausted(_) => ErrorKind::Internal,
        }
    }

    /// HTTP status the request layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Validation | ErrorKind::MissingField => 400,
            ErrorKind::Unauthorized => 401,
            ErrorKind::Forbidden => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::InvalidState => 409,
            ErrorKind::Internal => 500,
        }
    }

    /// Message safe to show to the caller. Internal detail stays in the logs.
    pub fn public_message(&self) -> String {
        match self.kind() {
            ErrorKind::Internal => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }

    pub(crate) fn not_found(what: impl fmt::Display) -> Self {
        ComplaintError::NotFound(what.to_string())
    }
}

impl From<ValidationErrors> for ComplaintError {
    fn from(errors: ValidationErrors) -> Self {
        ComplaintError::Validation(errors)
    }
}

/// One rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Field-level validation failures, collected rather than fail-fast.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    pub fields: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a single failing field.
    pub fn single(field: &str, message: &str) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: &str) {
        self.fields.push(FieldError {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn has(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f.field == field)
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> std::result::Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },
}

/// Blob-store failures while persisting or discarding evidence files.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to create directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to remove file '{path}': {source}")]
    RemoveFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not allocate a unique name in '{0}'")]
    NameExhausted(PathBuf),
}

pub type Result<T> = std::result::Result<T, ComplaintError>;

pub mod access;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod intake;
pub mod lifecycle;
pub mod logging;
pub mod model;
pub mod query;
pub mod sanitize;
pub mod service;
pub mod stats;
pub mod storage;
pub mod store;

pub use access::{Access, AccessControl, AdminSession, OwnerCredential};
pub use config::{load_config, load_config_from_str, Config};
pub use db::{Database, DatabaseError};
pub use error::{
    ComplaintError, ConfigError, ErrorKind, FieldError, Result, StorageError, ValidationErrors,
};
pub use intake::{ComplaintSubmission, CreatedComplaint};
pub use lifecycle::{Action, LifecycleEngine};
pub use logging::init_logging;
pub use model::{
    Attachment, Category, Complaint, ComplaintStatus, Response, SessionUser, User,
};
pub use query::{
    AdminComplaint, ComplaintFilter, ComplaintQueryParams, ComplaintWithRelations, Page,
    Pagination, PublicComplaint, QueryEngine,
};
pub use service::{ComplaintService, Responder};
pub use stats::{ComplaintStats, StatsAggregator};
pub use storage::{AttachmentUpload, BlobStore, FileBlobStore};
pub use store::{EntityStore, MemoryStore, SharedStore, StoreError};

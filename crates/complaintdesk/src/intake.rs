//! Complaint intake: field validation, identifier generation, and linking
//! uploads that the blob store already persisted.

use std::sync::{Arc, LazyLock};

use chrono::Utc;
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{info, info_span, warn};

use crate::config::AttachmentsConfig;
use crate::error::{ComplaintError, Result, ValidationErrors};
use crate::model::{AttachmentFile, NewComplaint};
use crate::sanitize::{redact_email, redact_token};
use crate::storage::{AttachmentUpload, BlobStore};
use crate::store::{SharedStore, StoreError};

static RE_NIK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{16}$").unwrap());
static RE_PHONE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^08\d{8,11}$").unwrap());
static RE_EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

const TRACKING_ID_ATTEMPTS: usize = 10;

/// Citizen-supplied complaint fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintSubmission {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub category_id: Option<i64>,
    pub name: String,
    pub nik: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

/// Handed back to the citizen once. The token is never shown again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedComplaint {
    pub id: i64,
    pub tracking_id: String,
    pub access_token: String,
}

fn require_text(errors: &mut ValidationErrors, field: &str, value: &str, label: &str) {
    if value.trim().is_empty() {
        errors.add(field, &format!("{} is required", label));
    }
}

impl ComplaintSubmission {
    /// Field-level checks that need no store access.
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        require_text(&mut errors, "title", &self.title, "Title");
        require_text(&mut errors, "description", &self.description, "Description");
        require_text(&mut errors, "name", &self.name, "Name");
        require_text(&mut errors, "address", &self.address, "Address");

        if !RE_NIK.is_match(self.nik.trim()) {
            errors.add("nik", "NIK must be exactly 16 digits");
        }
        if !RE_PHONE.is_match(self.phone.trim()) {
            errors.add("phone", "Phone number must start with 08 and have 10-13 digits");
        }
        if !RE_EMAIL.is_match(self.email.trim()) {
            errors.add("email", "Invalid email address");
        }
        errors
    }

    fn into_new_complaint(self, tracking_id: String, access_token: String) -> NewComplaint {
        NewComplaint {
            tracking_id,
            access_token,
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            location: self
                .location
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty()),
            category_id: self.category_id,
            name: self.name.trim().to_string(),
            nik: self.nik.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            address: self.address.trim().to_string(),
        }
    }
}

/// 32 lowercase hex characters.
pub fn generate_access_token() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// `<prefix>-<yyyyMMdd><4 digits>`.
pub fn generate_tracking_id(prefix: &str) -> String {
    let digits: u16 = rand::thread_rng().gen_range(0..10_000);
    format!("{}-{}{:04}", prefix, Utc::now().format("%Y%m%d"), digits)
}

type TrackingIdGenerator = Box<dyn Fn(&str) -> String + Send + Sync>;

pub struct IntakeEngine {
    store: SharedStore,
    blobs: Arc<dyn BlobStore>,
    tracking_prefix: String,
    tracking_ids: TrackingIdGenerator,
    limits: AttachmentsConfig,
}

impl IntakeEngine {
    pub fn new(
        store: SharedStore,
        blobs: Arc<dyn BlobStore>,
        tracking_prefix: &str,
        limits: AttachmentsConfig,
    ) -> Self {
        Self {
            store,
            blobs,
            tracking_prefix: tracking_prefix.to_string(),
            tracking_ids: Box::new(generate_tracking_id),
            limits,
        }
    }

    /// Replaces the tracking id source. It receives the configured prefix.
    pub fn with_tracking_ids(
        mut self,
        generator: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.tracking_ids = Box::new(generator);
        self
    }

    pub fn blobs(&self) -> &Arc<dyn BlobStore> {
        &self.blobs
    }

    /// Persists several files for one submission. If any file is refused,
    /// the ones already written are discarded before the error is returned.
    pub fn persist_all(&self, files: &[(&str, &[u8])]) -> Result<Vec<AttachmentUpload>> {
        let mut uploads = Vec::with_capacity(files.len());
        for (name, bytes) in files {
            match self.blobs.persist(name, bytes) {
                Ok(upload) => uploads.push(upload),
                Err(e) => {
                    warn!(file = %name, error = %e, "Upload refused, discarding siblings");
                    self.discard_all(&uploads);
                    return Err(e);
                }
            }
        }
        Ok(uploads)
    }

    /// Creates a pending, unpublished complaint and links its uploads.
    ///
    /// The complaint and its attachment rows are stored as one unit. Every
    /// upload is discarded again if anything fails.
    pub fn create(
        &self,
        submission: ComplaintSubmission,
        uploads: Vec<AttachmentUpload>,
    ) -> Result<CreatedComplaint> {
        let _span = info_span!(
            "intake.create",
            email = %redact_email(submission.email.trim()),
            uploads = uploads.len()
        )
        .entered();

        let result = self.create_inner(submission, &uploads);
        if let Err(e) = &result {
            warn!(error = %e, "Intake failed, discarding uploads");
            self.discard_all(&uploads);
        }
        result
    }

    fn create_inner(
        &self,
        submission: ComplaintSubmission,
        uploads: &[AttachmentUpload],
    ) -> Result<CreatedComplaint> {
        self.validate(&submission, uploads)?;

        let access_token = generate_access_token();
        let files: Vec<AttachmentFile> = uploads
            .iter()
            .map(|u| AttachmentFile {
                filename: u.filename.clone(),
                original_name: u.original_name.clone(),
                mime_type: u.mime_type.clone(),
            })
            .collect();

        let mut stored = None;
        for _ in 0..TRACKING_ID_ATTEMPTS {
            let tracking_id = (self.tracking_ids)(&self.tracking_prefix);
            let new = submission
                .clone()
                .into_new_complaint(tracking_id.clone(), access_token.clone());
            match self.store.insert_complaint_with_attachments(new, files.clone()) {
                Ok((complaint, _)) => {
                    stored = Some(complaint);
                    break;
                }
                Err(StoreError::Duplicate {
                    field: "trackingId",
                    ..
                }) => {
                    warn!(tracking_id = %tracking_id, "Tracking id collision, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
        let complaint = stored.ok_or_else(|| {
            ComplaintError::TrackingIdExhausted(self.tracking_prefix.clone())
        })?;

        info!(
            complaint_id = complaint.id,
            tracking_id = %complaint.tracking_id,
            token = %redact_token(&complaint.access_token),
            "Complaint created"
        );
        Ok(CreatedComplaint {
            id: complaint.id,
            tracking_id: complaint.tracking_id,
            access_token: complaint.access_token,
        })
    }

    fn validate(&self, submission: &ComplaintSubmission, uploads: &[AttachmentUpload]) -> Result<()> {
        let mut errors = submission.validate();

        if let Some(category_id) = submission.category_id {
            if self.store.get_category(category_id)?.is_none() {
                errors.add("categoryId", "Unknown category");
            }
        }

        if uploads.len() > self.limits.max_files {
            errors.add(
                "attachments",
                &format!("At most {} files may be attached", self.limits.max_files),
            );
        }
        for upload in uploads {
            if !upload.is_allowed_type() {
                errors.add(
                    "attachments",
                    &format!(
                        "'{}' is not an image or PDF ({})",
                        upload.original_name, upload.mime_type
                    ),
                );
            }
            if upload.size > self.limits.max_file_bytes {
                errors.add(
                    "attachments",
                    &format!("'{}' is too large", upload.original_name),
                );
            }
        }

        errors.into_result().map_err(ComplaintError::from)
    }

    fn discard_all(&self, uploads: &[AttachmentUpload]) {
        for upload in uploads {
            if let Err(e) = self.blobs.discard(&upload.filename) {
                warn!(file = %upload.filename, error = %e, "Upload cleanup failed");
            }
        }
    }
}

//! Request-level facade over the engines.
//!
//! Each method performs the access check for its operation, then delegates
//! to the lifecycle, query, intake or stats engine. Errors carry the kind the
//! transport layer maps to a status code.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, info_span};

use crate::access::{AccessControl, AdminSession, OwnerCredential};
use crate::auth::{self, BootstrapReport};
use crate::config::Config;
use crate::db::Database;
use crate::error::{ComplaintError, Result, ValidationErrors};
use crate::intake::{ComplaintSubmission, CreatedComplaint, IntakeEngine};
use crate::lifecycle::LifecycleEngine;
use crate::model::{Category, Complaint, NewCategory, Response};
use crate::query::{
    AdminComplaint, ComplaintFilter, ComplaintQueryParams, ComplaintWithRelations, Page,
    PublicComplaint, QueryEngine,
};
use crate::sanitize::{redact_email, redact_token};
use crate::stats::{ComplaintStats, StatsAggregator};
use crate::storage::{AttachmentUpload, BlobStore, FileBlobStore};
use crate::store::{MemoryStore, SharedStore, StoreError};

/// Who is adding a response.
#[derive(Debug, Clone, Copy)]
pub enum Responder<'a> {
    Admin(&'a AdminSession),
    Owner(&'a OwnerCredential),
}

pub struct ComplaintService {
    store: SharedStore,
    config: Config,
    access: AccessControl,
    lifecycle: LifecycleEngine,
    query: QueryEngine,
    intake: IntakeEngine,
    stats: StatsAggregator,
}

impl ComplaintService {
    /// Wires the engines around an existing store and blob store.
    pub fn new(store: SharedStore, blobs: Arc<dyn BlobStore>, config: Config) -> Self {
        Self {
            access: AccessControl::new(store.clone()),
            lifecycle: LifecycleEngine::new(store.clone()),
            query: QueryEngine::new(store.clone(), config.pagination),
            intake: IntakeEngine::new(
                store.clone(),
                blobs,
                &config.tracking_prefix,
                config.attachments,
            ),
            stats: StatsAggregator::new(store.clone()),
            store,
            config,
        }
    }

    /// Opens the configured backend and upload directory, then seeds the
    /// admin account and categories.
    pub fn open(config: Config) -> Result<Self> {
        let store: SharedStore = match &config.database_path {
            Some(path) => Arc::new(Database::open(path).map_err(StoreError::from)?),
            None => Arc::new(MemoryStore::new()),
        };
        let blobs = Arc::new(FileBlobStore::new(
            &config.upload_directory,
            config.attachments.max_file_bytes,
        ));

        let service = Self::new(store, blobs, config);
        service.bootstrap()?;
        Ok(service)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn bootstrap(&self) -> Result<BootstrapReport> {
        auth::bootstrap(&self.store, &self.config.admin, &self.config.categories)
    }

    pub fn login(&self, username: &str, password: &str) -> Result<AdminSession> {
        auth::login(&self.store, username, password)
    }

    // ── Citizen operations ─────────────────────────────────────────────────

    /// Persists one uploaded file ahead of [`Self::create_complaint`].
    pub fn store_upload(&self, original_name: &str, bytes: &[u8]) -> Result<AttachmentUpload> {
        self.intake.blobs().persist(original_name, bytes)
    }

    /// Persists every file of one submission. If one is refused, the files
    /// already written for it are removed again.
    pub fn store_uploads(&self, files: &[(&str, &[u8])]) -> Result<Vec<AttachmentUpload>> {
        self.intake.persist_all(files)
    }

    /// Removes uploads that will not be passed to [`Self::create_complaint`].
    pub fn discard_uploads(&self, uploads: &[AttachmentUpload]) -> Result<()> {
        for upload in uploads {
            self.intake.blobs().discard(&upload.filename)?;
        }
        Ok(())
    }

    pub fn create_complaint(
        &self,
        submission: ComplaintSubmission,
        uploads: Vec<AttachmentUpload>,
    ) -> Result<CreatedComplaint> {
        self.intake.create(submission, uploads)
    }

    pub fn list_public_complaints(&self, filter: &ComplaintFilter) -> Result<Page<PublicComplaint>> {
        self.query.list_public(filter)
    }

    /// Same as [`Self::list_public_complaints`], from raw query parameters.
    pub fn list_public_from_params(
        &self,
        params: &ComplaintQueryParams,
    ) -> Result<Page<PublicComplaint>> {
        let filter = ComplaintFilter::from_params(params, self.query.limits())?;
        self.query.list_public(&filter)
    }

    /// Token-only lookup. A supplied email must match the record.
    pub fn get_complaint_by_token(
        &self,
        token: &str,
        email: Option<&str>,
    ) -> Result<ComplaintWithRelations> {
        let _span = info_span!("service.get_by_token", token = %redact_token(token)).entered();

        let complaint = self
            .store
            .find_complaint_by_token(token)?
            .filter(|c| !c.is_archived)
            .ok_or_else(|| ComplaintError::not_found("Complaint"))?;

        if let Some(email) = email.filter(|e| !e.is_empty()) {
            if complaint.email != email {
                return Err(ComplaintError::Forbidden(
                    "Email does not match this complaint".to_string(),
                ));
            }
        }
        self.query.with_relations(complaint)
    }

    /// Both halves of the credential must match one record. The error does
    /// not say which half was wrong.
    pub fn check_complaint(&self, email: &str, token: &str) -> Result<ComplaintWithRelations> {
        let _span = info_span!(
            "service.check",
            email = %redact_email(email),
            token = %redact_token(token)
        )
        .entered();

        let complaint = self
            .access
            .find_owned(email, token)?
            .ok_or_else(|| ComplaintError::not_found("Complaint"))?;
        self.query.with_relations(complaint)
    }

    pub fn close_complaint(&self, id: i64, email: &str, token: &str) -> Result<Complaint> {
        self.require_active(id)?;
        if !self
            .access
            .authorize_owner(email, token, id)?
            .is_granted()
        {
            return Err(ComplaintError::Forbidden(
                "Credentials do not match this complaint".to_string(),
            ));
        }
        self.lifecycle.close(id)
    }

    // ── Shared ─────────────────────────────────────────────────────────────

    /// Admin responses need an admin session; citizen responses need the
    /// owner credential.
    pub fn add_response(
        &self,
        complaint_id: i64,
        content: &str,
        responder: Responder<'_>,
    ) -> Result<Response> {
        let is_from_admin = match responder {
            Responder::Admin(session) => {
                self.access.require_admin(session)?;
                true
            }
            Responder::Owner(credential) => {
                self.require_active(complaint_id)?;
                let access = self.access.authorize_owner(
                    &credential.email,
                    &credential.token,
                    complaint_id,
                )?;
                if !access.is_granted() {
                    return Err(ComplaintError::Forbidden(
                        "Credentials do not match this complaint".to_string(),
                    ));
                }
                false
            }
        };
        self.lifecycle
            .record_response(complaint_id, content, is_from_admin)
    }

    pub fn list_categories(&self) -> Result<Vec<Category>> {
        Ok(self.store.find_categories(&|_: &Category| true)?)
    }

    // ── Admin operations ───────────────────────────────────────────────────

    pub fn list_admin_complaints(
        &self,
        session: &AdminSession,
        filter: &ComplaintFilter,
    ) -> Result<Page<AdminComplaint>> {
        self.access.require_admin(session)?;
        self.query.list_admin(filter)
    }

    pub fn list_admin_from_params(
        &self,
        session: &AdminSession,
        params: &ComplaintQueryParams,
    ) -> Result<Page<AdminComplaint>> {
        self.access.require_admin(session)?;
        let filter = ComplaintFilter::from_params(params, self.query.limits())?;
        self.query.list_admin(&filter)
    }

    pub fn get_complaint_admin(
        &self,
        session: &AdminSession,
        id: i64,
    ) -> Result<ComplaintWithRelations> {
        self.access.require_admin(session)?;
        let complaint = self.require_active(id)?;
        self.query.with_relations(complaint)
    }

    /// Approves or rejects. `response` is posted as an admin reply only on
    /// approval.
    pub fn verify_complaint(
        &self,
        session: &AdminSession,
        id: i64,
        approved: bool,
        rejection_reason: Option<&str>,
        response: Option<&str>,
    ) -> Result<Complaint> {
        let admin = self.access.require_admin(session)?;
        let complaint = self.lifecycle.verify(id, approved, rejection_reason)?;
        info!(complaint_id = id, admin_id = admin.id, approved, "Complaint verified");

        if approved {
            if let Some(content) = response.map(str::trim).filter(|r| !r.is_empty()) {
                self.lifecycle.record_response(id, content, true)?;
            }
        }
        Ok(complaint)
    }

    pub fn get_stats(&self, session: &AdminSession) -> Result<ComplaintStats> {
        self.access.require_admin(session)?;
        self.stats.compute()
    }

    pub fn create_category(
        &self,
        session: &AdminSession,
        name: &str,
        description: Option<&str>,
    ) -> Result<Category> {
        self.access.require_admin(session)?;

        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationErrors::single("name", "Category name is required").into());
        }
        let wanted = name.to_lowercase();
        let duplicate = !self
            .store
            .find_categories(&|c: &Category| c.name.to_lowercase() == wanted)?
            .is_empty();
        if duplicate {
            return Err(ValidationErrors::single("name", "Category already exists").into());
        }

        let description = description.map(str::trim).filter(|d| !d.is_empty());
        let category = self
            .store
            .insert_category(NewCategory::new(name, description))?;
        info!(category_id = category.id, "Category created");
        Ok(category)
    }

    pub fn archive_complaint(&self, session: &AdminSession, id: i64) -> Result<Complaint> {
        self.access.require_admin(session)?;
        self.lifecycle.archive(id)
    }

    /// Location of a stored evidence file, for serving it back.
    pub fn attachment_path(&self, filename: &str) -> Result<PathBuf> {
        self.intake.blobs().resolve(filename)
    }

    fn require_active(&self, id: i64) -> Result<Complaint> {
        self.store
            .get_complaint(id)?
            .filter(|c| !c.is_archived)
            .ok_or_else(|| ComplaintError::not_found(format!("Complaint {}", id)))
    }
}

//! Test harness for isolated test execution.
//!
//! Each `TestHarness` owns a temporary directory for uploads (and the SQLite
//! file when requested), a seeded `ComplaintService` and an admin session.

#![allow(dead_code)]

use std::path::Path;

use tempfile::TempDir;

use complaintdesk::{
    AdminSession, Category, Complaint, ComplaintService, ComplaintSubmission, Config,
    CreatedComplaint, EntityStore,
};

use super::builders::{ConfigBuilder, SubmissionBuilder};

pub struct TestHarness {
    temp_dir: TempDir,
    pub service: ComplaintService,
    pub admin: AdminSession,
}

impl TestHarness {
    /// In-memory store with default configuration.
    pub fn new() -> Self {
        Self::with_config(|builder| builder)
    }

    /// SQLite store in the harness directory.
    pub fn sqlite() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config = ConfigBuilder::new(temp_dir.path())
            .database(temp_dir.path().join("data/complaintdesk.db"))
            .build();
        Self::start(temp_dir, config)
    }

    pub fn with_config(customize: impl FnOnce(ConfigBuilder) -> ConfigBuilder) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config = customize(ConfigBuilder::new(temp_dir.path())).build();
        Self::start(temp_dir, config)
    }

    fn start(temp_dir: TempDir, config: Config) -> Self {
        let service = ComplaintService::open(config).expect("Failed to open service");
        let admin = service
            .login("admin", "admin123")
            .expect("Seeded admin should log in");
        Self {
            temp_dir,
            service,
            admin,
        }
    }

    /// Restarts the service on the same directory with a new configuration.
    pub fn reopen_with(
        self,
        customize: impl FnOnce(&Path, ConfigBuilder) -> ConfigBuilder,
    ) -> Self {
        let Self {
            temp_dir, service, ..
        } = self;
        drop(service);
        let config = customize(temp_dir.path(), ConfigBuilder::new(temp_dir.path())).build();
        Self::start(temp_dir, config)
    }

    pub fn base(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn submit(&self, submission: ComplaintSubmission) -> CreatedComplaint {
        self.service
            .create_complaint(submission, vec![])
            .expect("Submission should be accepted")
    }

    pub fn submit_default(&self) -> CreatedComplaint {
        self.submit(SubmissionBuilder::new().build())
    }

    /// Submits and approves a complaint so it shows up publicly.
    pub fn submit_published(&self, submission: ComplaintSubmission) -> CreatedComplaint {
        let created = self.submit(submission);
        self.service
            .verify_complaint(&self.admin, created.id, true, None, None)
            .expect("Approval should succeed");
        created
    }

    pub fn complaint(&self, id: i64) -> Complaint {
        self.service
            .store()
            .get_complaint(id)
            .expect("Store read failed")
            .expect("Complaint should exist")
    }

    pub fn category(&self, name: &str) -> Category {
        self.service
            .list_categories()
            .expect("Categories should list")
            .into_iter()
            .find(|c| c.name == name)
            .expect("Category should be seeded")
    }

    /// Checks both per-record invariants.
    pub fn assert_invariants(&self, id: i64) {
        let c = self.complaint(id);
        assert_eq!(
            c.rejection_reason.is_some(),
            c.status == complaintdesk::ComplaintStatus::Rejected,
            "rejectionReason must be set iff rejected: {:?}",
            c
        );
        if c.is_published {
            assert!(
                c.status.is_publishable(),
                "published complaint in status {}",
                c.status
            );
        }
    }
}

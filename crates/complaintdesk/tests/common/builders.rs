//! Builder patterns for creating test data programmatically.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use complaintdesk::config::{CategoryConfig, Config};
use complaintdesk::ComplaintSubmission;

/// Builder for citizen submissions. Defaults pass validation.
pub struct SubmissionBuilder {
    submission: ComplaintSubmission,
}

impl SubmissionBuilder {
    pub fn new() -> Self {
        Self {
            submission: ComplaintSubmission {
                title: "Jalan berlubang".to_string(),
                description: "Lubang besar di depan pasar".to_string(),
                location: Some("Pasar Baru".to_string()),
                category_id: None,
                name: "Budi Santoso".to_string(),
                nik: "3201010101010001".to_string(),
                email: "budi@example.com".to_string(),
                phone: "081234567890".to_string(),
                address: "Jl. Merdeka 1".to_string(),
            },
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.submission.title = title.to_string();
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.submission.description = description.to_string();
        self
    }

    pub fn category(mut self, id: i64) -> Self {
        self.submission.category_id = Some(id);
        self
    }

    pub fn name(mut self, name: &str) -> Self {
        self.submission.name = name.to_string();
        self
    }

    pub fn email(mut self, email: &str) -> Self {
        self.submission.email = email.to_string();
        self
    }

    pub fn nik(mut self, nik: &str) -> Self {
        self.submission.nik = nik.to_string();
        self
    }

    pub fn phone(mut self, phone: &str) -> Self {
        self.submission.phone = phone.to_string();
        self
    }

    pub fn build(self) -> ComplaintSubmission {
        self.submission
    }
}

impl Default for SubmissionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `Config` instances rooted in a test directory.
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new(base: &Path) -> Self {
        Self {
            config: Config {
                upload_directory: base.join("uploads"),
                ..Config::default()
            },
        }
    }

    pub fn database(mut self, path: PathBuf) -> Self {
        self.config.database_path = Some(path);
        self
    }

    pub fn limits(mut self, default_limit: u32, max_limit: u32) -> Self {
        self.config.pagination.default_limit = default_limit;
        self.config.pagination.max_limit = max_limit;
        self
    }

    pub fn max_files(mut self, max_files: usize) -> Self {
        self.config.attachments.max_files = max_files;
        self
    }

    pub fn categories(mut self, names: &[&str]) -> Self {
        self.config.categories = names
            .iter()
            .map(|name| CategoryConfig {
                name: name.to_string(),
                description: None,
            })
            .collect();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

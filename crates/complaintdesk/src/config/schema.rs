use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub version: String,
    /// `None` keeps all records in memory.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
    #[serde(default = "default_upload_directory")]
    pub upload_directory: PathBuf,
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub attachments: AttachmentsConfig,
    #[serde(default = "default_tracking_prefix")]
    pub tracking_prefix: String,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default = "default_categories")]
    pub categories: Vec<CategoryConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            database_path: None,
            upload_directory: default_upload_directory(),
            pagination: PaginationConfig::default(),
            attachments: AttachmentsConfig::default(),
            tracking_prefix: default_tracking_prefix(),
            admin: AdminConfig::default(),
            categories: default_categories(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_upload_directory() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_tracking_prefix() -> String {
    "PGD".to_string()
}

fn default_categories() -> Vec<CategoryConfig> {
    [
        ("Infrastruktur", "Jalan, jembatan, drainase dan fasilitas umum"),
        ("Lingkungan", "Kebersihan, sampah dan pencemaran"),
        ("Pelayanan Publik", "Administrasi dan layanan pemerintahan"),
        ("Kesehatan", "Fasilitas dan layanan kesehatan"),
        ("Pendidikan", "Sekolah dan layanan pendidikan"),
        ("Lainnya", "Pengaduan lain di luar kategori di atas"),
    ]
    .into_iter()
    .map(|(name, description)| CategoryConfig {
        name: name.to_string(),
        description: Some(description.to_string()),
    })
    .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationConfig {
    #[serde(default = "default_limit")]
    pub default_limit: u32,
    #[serde(default = "default_max_limit")]
    pub max_limit: u32,
}

fn default_limit() -> u32 {
    10
}

fn default_max_limit() -> u32 {
    100
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentsConfig {
    #[serde(default = "default_max_files")]
    pub max_files: usize,
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,
}

fn default_max_files() -> usize {
    5
}

fn default_max_file_bytes() -> u64 {
    10 * 1024 * 1024
}

impl Default for AttachmentsConfig {
    fn default() -> Self {
        Self {
            max_files: default_max_files(),
            max_file_bytes: default_max_file_bytes(),
        }
    }
}

/// Account seeded when the user table is empty.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminConfig {
    #[serde(default = "default_admin_username")]
    pub username: String,
    #[serde(default = "default_admin_password")]
    pub password: String,
    #[serde(default = "default_admin_name")]
    pub name: String,
}

fn default_admin_username() -> String {
    "admin".to_string()
}

fn default_admin_password() -> String {
    "admin123".to_string()
}

fn default_admin_name() -> String {
    "Administrator".to_string()
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: default_admin_username(),
            password: default_admin_password(),
            name: default_admin_name(),
        }
    }
}

// Keeps the password out of debug output.
impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("name", &self.name)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryConfig {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

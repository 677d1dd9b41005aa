pub mod loader;
pub mod schema;

pub use loader::{load_config, load_config_from_str, ADMIN_PASSWORD_ENV};
pub use schema::{
    AdminConfig, AttachmentsConfig, CategoryConfig, Config, LoggingConfig, PaginationConfig,
};

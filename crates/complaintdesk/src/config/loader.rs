use std::collections::HashSet;
use std::path::Path;

use crate::config::schema::Config;
use crate::error::ConfigError;

const SCHEMA_JSON: &str = include_str!("../../schema/config-v1.json");

/// Overrides the seeded admin password without writing it to the config file.
pub const ADMIN_PASSWORD_ENV: &str = "COMPLAINTDESK_ADMIN_PASSWORD";

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;

    validate_schema(&json_value)?;

    let mut config: Config = serde_json::from_value(json_value)?;
    apply_env_overrides(&mut config)?;

    validate_config(&config)?;

    Ok(config)
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let error_messages: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();
    if !error_messages.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

fn apply_env_overrides(config: &mut Config) -> Result<(), ConfigError> {
    match std::env::var(ADMIN_PASSWORD_ENV) {
        Ok(value) => {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                config.admin.password = trimmed.to_string();
            }
            Ok(())
        }
        Err(std::env::VarError::NotPresent) => Ok(()),
        Err(std::env::VarError::NotUnicode(_)) => Err(ConfigError::Validation {
            message: format!("{} is not valid unicode", ADMIN_PASSWORD_ENV),
        }),
    }
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    let pagination = &config.pagination;
    if pagination.default_limit == 0 || pagination.default_limit > pagination.max_limit {
        return Err(ConfigError::Validation {
            message: format!(
                "pagination.defaultLimit ({}) must be between 1 and maxLimit ({})",
                pagination.default_limit, pagination.max_limit
            ),
        });
    }

    if config.attachments.max_file_bytes == 0 {
        return Err(ConfigError::Validation {
            message: "attachments.maxFileBytes must be positive".to_string(),
        });
    }

    let prefix_pattern = regex::Regex::new(r"^[A-Z0-9]{1,8}$").map_err(|e| {
        ConfigError::Validation {
            message: format!("Invalid tracking prefix pattern: {}", e),
        }
    })?;
    if !prefix_pattern.is_match(&config.tracking_prefix) {
        return Err(ConfigError::Validation {
            message: format!(
                "trackingPrefix '{}' must be 1-8 uppercase letters or digits",
                config.tracking_prefix
            ),
        });
    }

    if config.admin.username.trim().is_empty() || config.admin.password.is_empty() {
        return Err(ConfigError::Validation {
            message: "admin.username and admin.password must not be empty".to_string(),
        });
    }

    let mut names = HashSet::new();
    for category in &config.categories {
        let name = category.name.trim();
        if name.is_empty() {
            return Err(ConfigError::Validation {
                message: "Category names must not be empty".to_string(),
            });
        }
        if !names.insert(name.to_lowercase()) {
            return Err(ConfigError::Validation {
                message: format!("Duplicate category '{}'", name),
            });
        }
    }

    Ok(())
}

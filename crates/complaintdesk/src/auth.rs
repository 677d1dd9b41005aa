//! Admin accounts: Argon2id password hashing, login and first-run seeding.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::{info, info_span, warn};

use crate::access::AdminSession;
use crate::config::{AdminConfig, CategoryConfig};
use crate::error::{ComplaintError, Result};
use crate::model::{Category, NewCategory, NewUser, SessionUser, User};
use crate::sanitize::fingerprint;
use crate::store::SharedStore;

/// Returned for both unknown users and wrong passwords.
const LOGIN_FAILED: &str = "Invalid username or password";

/// Hash a password using Argon2id. Returns the PHC string.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ComplaintError::PasswordHash(format!("Failed to hash password: {e}")))
}

/// Verify a password against a stored PHC hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| ComplaintError::PasswordHash(format!("Invalid password hash format: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Checks credentials against the user store.
pub fn login(store: &SharedStore, username: &str, password: &str) -> Result<AdminSession> {
    let _span = info_span!("auth.login", user = %fingerprint(&username.to_lowercase())).entered();

    let user = store.find_user_by_username(username.trim())?;
    let Some(user) = user else {
        warn!("Login failed: unknown user");
        return Err(ComplaintError::Unauthorized(LOGIN_FAILED.to_string()));
    };

    if !verify_password(password, &user.password_hash)? {
        warn!(user_id = user.id, "Login failed: wrong password");
        return Err(ComplaintError::Unauthorized(LOGIN_FAILED.to_string()));
    }

    info!(user_id = user.id, "Admin logged in");
    Ok(AdminSession::authenticated(SessionUser::from(&user)))
}

/// What [`bootstrap`] created.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    pub admin: Option<User>,
    pub categories: Vec<Category>,
}

/// Seeds the admin account and default categories into empty tables.
pub fn bootstrap(
    store: &SharedStore,
    admin: &AdminConfig,
    categories: &[CategoryConfig],
) -> Result<BootstrapReport> {
    let _span = info_span!("auth.bootstrap").entered();
    let mut report = BootstrapReport::default();

    if store.find_users(&|_: &User| true)?.is_empty() {
        let user = store.insert_user(NewUser {
            username: admin.username.trim().to_string(),
            password_hash: hash_password(&admin.password)?,
            name: admin.name.clone(),
            role: "admin".to_string(),
        })?;
        info!(user_id = user.id, "Seeded admin account");
        report.admin = Some(user);
    }

    if store.find_categories(&|_: &Category| true)?.is_empty() {
        for category in categories {
            let created = store.insert_category(NewCategory::new(
                category.name.trim(),
                category.description.as_deref(),
            ))?;
            report.categories.push(created);
        }
        info!(count = report.categories.len(), "Seeded categories");
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::Config;
    use crate::store::MemoryStore;

    fn seeded() -> SharedStore {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let config = Config::default();
        bootstrap(&store, &config.admin, &config.categories).unwrap();
        store
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("admin123").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("admin123", &hash).unwrap());
        assert!(!verify_password("admin124", &hash).unwrap());
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(matches!(
            verify_password("x", "not-a-phc-string"),
            Err(ComplaintError::PasswordHash(_))
        ));
    }

    #[test]
    fn test_bootstrap_is_idempotent() {
        let store = seeded();
        let config = Config::default();
        let second = bootstrap(&store, &config.admin, &config.categories).unwrap();
        assert_eq!(second, BootstrapReport::default());
        assert_eq!(store.find_users(&|_: &User| true).unwrap().len(), 1);
        assert_eq!(store.find_categories(&|_: &Category| true).unwrap().len(), 6);
    }

    #[test]
    fn test_login_case_insensitive_username() {
        let store = seeded();
        let session = login(&store, "ADMIN", "admin123").unwrap();
        let user = session.user().unwrap();
        assert_eq!(user.username, "admin");
        assert_eq!(user.role, "admin");
    }

    #[test]
    fn test_login_failures_share_message() {
        let store = seeded();
        let wrong_password = login(&store, "admin", "nope").unwrap_err();
        let unknown_user = login(&store, "ghost", "admin123").unwrap_err();
        assert!(matches!(wrong_password, ComplaintError::Unauthorized(_)));
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    }
}

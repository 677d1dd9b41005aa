//! Access control: the admin-session path and the owner-credential path.
//!
//! Both checks are pure reads against the store.

use crate::error::ComplaintError;
use crate::model::{Complaint, SessionUser};
use crate::store::{SharedStore, StoreError};

/// Outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    Denied,
}

impl Access {
    pub fn is_granted(self) -> bool {
        self == Access::Granted
    }
}

/// Caller identity as established by the session layer.
///
/// How the session was authenticated is opaque here; only the presence of a
/// user matters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminSession {
    user: Option<SessionUser>,
}

impl AdminSession {
    pub fn anonymous() -> Self {
        Self { user: None }
    }

    pub fn authenticated(user: SessionUser) -> Self {
        Self { user: Some(user) }
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    pub fn logout(&mut self) {
        self.user = None;
    }
}

/// The email + access token pair a citizen presents for self-service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerCredential {
    pub email: String,
    pub token: String,
}

impl OwnerCredential {
    pub fn new(email: &str, token: &str) -> Self {
        Self {
            email: email.to_string(),
            token: token.to_string(),
        }
    }
}

pub struct AccessControl {
    store: SharedStore,
}

impl AccessControl {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub fn authorize_admin(&self, session: &AdminSession) -> Access {
        if session.user().is_some() {
            Access::Granted
        } else {
            Access::Denied
        }
    }

    /// Granted only when both `email` and `token` equal the stored values of
    /// the same non-archived complaint.
    pub fn authorize_owner(
        &self,
        email: &str,
        token: &str,
        complaint_id: i64,
    ) -> Result<Access, StoreError> {
        let granted = self
            .store
            .get_complaint(complaint_id)?
            .is_some_and(|c| !c.is_archived && c.owned_by(email, token));
        Ok(if granted {
            Access::Granted
        } else {
            Access::Denied
        })
    }

    /// The non-archived complaint owned by this credential, if any.
    pub fn find_owned(&self, email: &str, token: &str) -> Result<Option<Complaint>, StoreError> {
        Ok(self
            .store
            .find_complaints(&|c: &Complaint| !c.is_archived && c.owned_by(email, token))?
            .into_iter()
            .next())
    }

    /// Fails with `Unauthorized` unless the session carries an admin.
    pub fn require_admin<'a>(
        &self,
        session: &'a AdminSession,
    ) -> Result<&'a SessionUser, ComplaintError> {
        match (self.authorize_admin(session), session.user()) {
            (Access::Granted, Some(user)) => Ok(user),
            _ => Err(ComplaintError::Unauthorized(
                "Authentication required".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::model::NewComplaint;
    use crate::store::{EntityStore, MemoryStore};

    fn setup() -> (Arc<MemoryStore>, AccessControl, Complaint) {
        let store = Arc::new(MemoryStore::new());
        let complaint = store
            .insert_complaint(NewComplaint {
                tracking_id: "PGD-1".to_string(),
                access_token: "secret-token".to_string(),
                title: "t".to_string(),
                description: "d".to_string(),
                location: None,
                category_id: None,
                name: "n".to_string(),
                nik: "3201010101010001".to_string(),
                email: "owner@example.com".to_string(),
                phone: "081234567890".to_string(),
                address: "a".to_string(),
            })
            .unwrap();
        let access = AccessControl::new(store.clone());
        (store, access, complaint)
    }

    fn admin_user() -> SessionUser {
        SessionUser {
            id: 1,
            username: "admin".to_string(),
            name: "Administrator".to_string(),
            role: "admin".to_string(),
        }
    }

    #[test]
    fn test_admin_session() {
        let (_, access, _) = setup();
        assert_eq!(
            access.authorize_admin(&AdminSession::anonymous()),
            Access::Denied
        );
        let mut session = AdminSession::authenticated(admin_user());
        assert!(access.authorize_admin(&session).is_granted());
        assert_eq!(access.require_admin(&session).unwrap().username, "admin");

        session.logout();
        assert!(matches!(
            access.require_admin(&session),
            Err(ComplaintError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_owner_requires_both_fields() {
        let (_, access, c) = setup();
        let ok = access
            .authorize_owner("owner@example.com", "secret-token", c.id)
            .unwrap();
        assert_eq!(ok, Access::Granted);

        for (email, token) in [
            ("other@example.com", "secret-token"),
            ("owner@example.com", "wrong"),
            ("OWNER@example.com", "secret-token"),
        ] {
            assert_eq!(
                access.authorize_owner(email, token, c.id).unwrap(),
                Access::Denied,
                "{} / {}",
                email,
                token
            );
        }
    }

    #[test]
    fn test_owner_denied_for_other_complaint_id() {
        let (_, access, c) = setup();
        assert_eq!(
            access
                .authorize_owner("owner@example.com", "secret-token", c.id + 1)
                .unwrap(),
            Access::Denied
        );
    }

    #[test]
    fn test_owner_denied_when_archived() {
        let (store, access, mut c) = setup();
        c.is_archived = true;
        store.replace_complaint(c.id, c.clone()).unwrap();
        assert_eq!(
            access
                .authorize_owner("owner@example.com", "secret-token", c.id)
                .unwrap(),
            Access::Denied
        );
        assert!(access
            .find_owned("owner@example.com", "secret-token")
            .unwrap()
            .is_none());
    }
}

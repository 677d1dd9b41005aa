//! Entity store: the single owner of every record.
//!
//! Components reach records only through [`EntityStore`]. There is no delete;
//! archival is a field flip through `replace_complaint`. Two backends exist:
//! [`MemoryStore`] and the SQLite-backed [`crate::db::Database`].

use std::sync::Arc;

use crate::model::{
    Attachment, AttachmentFile, Category, Complaint, NewAttachment, NewCategory, NewComplaint,
    NewResponse, NewUser, Response, User,
};

pub mod error;
pub mod memory;

pub use error::{RecordKind, StoreError};
pub use memory::MemoryStore;

/// Shared handle injected into the engines.
pub type SharedStore = Arc<dyn EntityStore>;

/// Record accessor contract.
///
/// `insert_*` assigns a fresh, monotonically increasing id and creation
/// timestamps. Complaint tracking ids and stored attachment filenames are
/// unique; a collision fails with [`StoreError::Duplicate`].
/// `replace_complaint` overwrites the whole record and rejects changes to
/// identity fields with [`StoreError::ImmutableField`].
pub trait EntityStore: Send + Sync {
    fn get_complaint(&self, id: i64) -> Result<Option<Complaint>, StoreError>;
    fn find_complaints(
        &self,
        predicate: &dyn Fn(&Complaint) -> bool,
    ) -> Result<Vec<Complaint>, StoreError>;
    fn insert_complaint(&self, new: NewComplaint) -> Result<Complaint, StoreError>;
    fn replace_complaint(&self, id: i64, complaint: Complaint) -> Result<Complaint, StoreError>;

    /// Inserts a complaint and its attachments as one unit. On error nothing
    /// is stored.
    fn insert_complaint_with_attachments(
        &self,
        new: NewComplaint,
        files: Vec<AttachmentFile>,
    ) -> Result<(Complaint, Vec<Attachment>), StoreError>;

    fn get_category(&self, id: i64) -> Result<Option<Category>, StoreError>;
    fn find_categories(
        &self,
        predicate: &dyn Fn(&Category) -> bool,
    ) -> Result<Vec<Category>, StoreError>;
    fn insert_category(&self, new: NewCategory) -> Result<Category, StoreError>;

    fn get_attachment(&self, id: i64) -> Result<Option<Attachment>, StoreError>;
    fn find_attachments(
        &self,
        predicate: &dyn Fn(&Attachment) -> bool,
    ) -> Result<Vec<Attachment>, StoreError>;
    fn insert_attachment(&self, new: NewAttachment) -> Result<Attachment, StoreError>;

    fn get_response(&self, id: i64) -> Result<Option<Response>, StoreError>;
    fn find_responses(
        &self,
        predicate: &dyn Fn(&Response) -> bool,
    ) -> Result<Vec<Response>, StoreError>;
    fn insert_response(&self, new: NewResponse) -> Result<Response, StoreError>;

    /// Appends a response and replaces its complaint as one unit. On error
    /// neither write is kept.
    fn insert_response_with_update(
        &self,
        new: NewResponse,
        complaint: Complaint,
    ) -> Result<(Response, Complaint), StoreError>;

    fn get_user(&self, id: i64) -> Result<Option<User>, StoreError>;
    fn find_users(&self, predicate: &dyn Fn(&User) -> bool) -> Result<Vec<User>, StoreError>;
    fn insert_user(&self, new: NewUser) -> Result<User, StoreError>;

    /// Case-insensitive username lookup.
    fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let wanted = username.to_lowercase();
        Ok(self
            .find_users(&|u: &User| u.username.to_lowercase() == wanted)?
            .into_iter()
            .next())
    }

    /// Looks a complaint up by its access token alone.
    fn find_complaint_by_token(&self, token: &str) -> Result<Option<Complaint>, StoreError> {
        Ok(self
            .find_complaints(&|c: &Complaint| c.access_token == token)?
            .into_iter()
            .next())
    }

    /// Attachments of one complaint in insertion order.
    fn attachments_of(&self, complaint_id: i64) -> Result<Vec<Attachment>, StoreError> {
        self.find_attachments(&|a: &Attachment| a.complaint_id == complaint_id)
    }

    /// Responses of one complaint, oldest first.
    fn responses_of(&self, complaint_id: i64) -> Result<Vec<Response>, StoreError> {
        let mut responses = self.find_responses(&|r: &Response| r.complaint_id == complaint_id)?;
        responses.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(responses)
    }
}

/// Checks a replacement complaint against the stored one.
pub(crate) fn check_complaint_replacement(
    id: i64,
    existing: &Complaint,
    replacement: &Complaint,
) -> Result<(), StoreError> {
    if replacement.id != id {
        return Err(StoreError::ImmutableField {
            kind: RecordKind::Complaint,
            id,
            field: "id",
        });
    }
    if let Some(field) = existing.changed_identity_field(replacement) {
        log::error!(
            "Contract violation: attempted to change '{}' of complaint {}",
            field,
            id
        );
        return Err(StoreError::ImmutableField {
            kind: RecordKind::Complaint,
            id,
            field,
        });
    }
    Ok(())
}

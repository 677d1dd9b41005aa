//! [`EntityStore`] on top of the SQLite repositories.

use super::{attachment_repo, category_repo, complaint_repo, response_repo, user_repo, Database};
use crate::model::{
    Attachment, AttachmentFile, Category, Complaint, NewAttachment, NewCategory, NewComplaint,
    NewResponse, NewUser, Response, User,
};
use crate::store::{EntityStore, StoreError};

impl EntityStore for Database {
    fn get_complaint(&self, id: i64) -> Result<Option<Complaint>, StoreError> {
        Ok(complaint_repo::find_by_id(self, id)?)
    }

    fn find_complaints(
        &self,
        predicate: &dyn Fn(&Complaint) -> bool,
    ) -> Result<Vec<Complaint>, StoreError> {
        Ok(complaint_repo::find(self, predicate)?)
    }

    fn insert_complaint(&self, new: NewComplaint) -> Result<Complaint, StoreError> {
        Ok(complaint_repo::insert(self, new)?)
    }

    fn replace_complaint(&self, id: i64, complaint: Complaint) -> Result<Complaint, StoreError> {
        complaint_repo::replace(self, id, complaint)
    }

    fn insert_complaint_with_attachments(
        &self,
        new: NewComplaint,
        files: Vec<AttachmentFile>,
    ) -> Result<(Complaint, Vec<Attachment>), StoreError> {
        complaint_repo::insert_with_attachments(self, new, files)
    }

    fn find_complaint_by_token(&self, token: &str) -> Result<Option<Complaint>, StoreError> {
        Ok(complaint_repo::find_by_token(self, token)?)
    }

    fn get_category(&self, id: i64) -> Result<Option<Category>, StoreError> {
        Ok(category_repo::find_by_id(self, id)?)
    }

    fn find_categories(
        &self,
        predicate: &dyn Fn(&Category) -> bool,
    ) -> Result<Vec<Category>, StoreError> {
        let rows = category_repo::all(self)?;
        Ok(rows.into_iter().filter(|c| predicate(c)).collect())
    }

    fn insert_category(&self, new: NewCategory) -> Result<Category, StoreError> {
        Ok(category_repo::insert(self, new)?)
    }

    fn get_attachment(&self, id: i64) -> Result<Option<Attachment>, StoreError> {
        Ok(attachment_repo::find_by_id(self, id)?)
    }

    fn find_attachments(
        &self,
        predicate: &dyn Fn(&Attachment) -> bool,
    ) -> Result<Vec<Attachment>, StoreError> {
        let rows = attachment_repo::all(self)?;
        Ok(rows.into_iter().filter(|a| predicate(a)).collect())
    }

    fn insert_attachment(&self, new: NewAttachment) -> Result<Attachment, StoreError> {
        Ok(attachment_repo::insert(self, new)?)
    }

    fn attachments_of(&self, complaint_id: i64) -> Result<Vec<Attachment>, StoreError> {
        Ok(attachment_repo::for_complaint(self, complaint_id)?)
    }

    fn get_response(&self, id: i64) -> Result<Option<Response>, StoreError> {
        Ok(response_repo::find_by_id(self, id)?)
    }

    fn find_responses(
        &self,
        predicate: &dyn Fn(&Response) -> bool,
    ) -> Result<Vec<Response>, StoreError> {
        let rows = response_repo::all(self)?;
        Ok(rows.into_iter().filter(|r| predicate(r)).collect())
    }

    fn insert_response(&self, new: NewResponse) -> Result<Response, StoreError> {
        Ok(response_repo::insert(self, new)?)
    }

    fn insert_response_with_update(
        &self,
        new: NewResponse,
        complaint: Complaint,
    ) -> Result<(Response, Complaint), StoreError> {
        self.in_transaction(|conn| {
            let response = response_repo::insert_row(conn, new)?;
            let complaint = complaint_repo::replace_row(conn, complaint.id, complaint)?;
            Ok((response, complaint))
        })
    }

    fn responses_of(&self, complaint_id: i64) -> Result<Vec<Response>, StoreError> {
        Ok(response_repo::for_complaint(self, complaint_id)?)
    }

    fn get_user(&self, id: i64) -> Result<Option<User>, StoreError> {
        Ok(user_repo::find_by_id(self, id)?)
    }

    fn find_users(&self, predicate: &dyn Fn(&User) -> bool) -> Result<Vec<User>, StoreError> {
        let rows = user_repo::all(self)?;
        Ok(rows.into_iter().filter(|u| predicate(u)).collect())
    }

    fn insert_user(&self, new: NewUser) -> Result<User, StoreError> {
        Ok(user_repo::insert(self, new)?)
    }

    fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(user_repo::find_by_username(self, username)?)
    }
}

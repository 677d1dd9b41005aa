//! In-memory reference implementation of [`EntityStore`].

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{check_complaint_replacement, EntityStore, RecordKind, StoreError};
use crate::model::{
    self, Attachment, AttachmentFile, Category, Complaint, NewAttachment, NewCategory,
    NewComplaint, NewResponse, NewUser, Response, User,
};

/// One record family. Ids come from a per-table sequence, so `BTreeMap`
/// iteration order is insertion order.
struct Table<T> {
    rows: BTreeMap<i64, T>,
    next_id: i64,
}

impl<T: Clone> Table<T> {
    fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }

    fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn get(&self, id: i64) -> Option<T> {
        self.rows.get(&id).cloned()
    }

    fn find(&self, predicate: &dyn Fn(&T) -> bool) -> Vec<T> {
        self.rows.values().filter(|r| predicate(r)).cloned().collect()
    }

    fn push(&mut self, id: i64, row: T) -> T {
        self.rows.insert(id, row.clone());
        row
    }
}

struct Tables {
    complaints: Table<Complaint>,
    categories: Table<Category>,
    attachments: Table<Attachment>,
    responses: Table<Response>,
    users: Table<User>,
}

impl Tables {
    fn require_complaint(&self, id: i64) -> Result<&Complaint, StoreError> {
        self.complaints.rows.get(&id).ok_or(StoreError::Missing {
            kind: RecordKind::Complaint,
            id,
        })
    }

    fn check_tracking_id(&self, tracking_id: &str) -> Result<(), StoreError> {
        if self
            .complaints
            .rows
            .values()
            .any(|c| c.tracking_id == tracking_id)
        {
            return Err(StoreError::Duplicate {
                kind: RecordKind::Complaint,
                field: "trackingId",
            });
        }
        Ok(())
    }

    fn check_filenames<'a>(
        &self,
        filenames: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), StoreError> {
        let mut seen: Vec<&str> = Vec::new();
        for name in filenames {
            let taken = seen.contains(&name)
                || self.attachments.rows.values().any(|a| a.filename == name);
            if taken {
                return Err(StoreError::Duplicate {
                    kind: RecordKind::Attachment,
                    field: "filename",
                });
            }
            seen.push(name);
        }
        Ok(())
    }

    fn check_replacement(&self, id: i64, complaint: &Complaint) -> Result<(), StoreError> {
        check_complaint_replacement(id, self.require_complaint(id)?, complaint)
    }

    // The `push_*` helpers assume the caller already ran the checks above.

    fn push_complaint(&mut self, new: NewComplaint) -> Complaint {
        let id = self.complaints.allocate_id();
        let complaint = new.into_complaint(id, model::now());
        self.complaints.push(id, complaint)
    }

    fn push_attachment(&mut self, new: NewAttachment) -> Attachment {
        let id = self.attachments.allocate_id();
        let attachment = Attachment {
            id,
            complaint_id: new.complaint_id,
            filename: new.filename,
            original_name: new.original_name,
            mime_type: new.mime_type,
            created_at: model::now(),
        };
        self.attachments.push(id, attachment)
    }

    fn push_response(&mut self, new: NewResponse) -> Response {
        let id = self.responses.allocate_id();
        let response = Response {
            id,
            complaint_id: new.complaint_id,
            content: new.content,
            is_from_admin: new.is_from_admin,
            created_at: model::now(),
        };
        self.responses.push(id, response)
    }
}

/// Map-of-records store guarded by a single `RwLock`.
///
/// Every call holds the lock for its whole duration, so callers never observe
/// a partially applied write.
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables {
                complaints: Table::new(),
                categories: Table::new(),
                attachments: Table::new(),
                responses: Table::new(),
                users: Table::new(),
            }),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables.write().map_err(|_| StoreError::LockPoisoned)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityStore for MemoryStore {
    fn get_complaint(&self, id: i64) -> Result<Option<Complaint>, StoreError> {
        Ok(self.read()?.complaints.get(id))
    }

    fn find_complaints(
        &self,
        predicate: &dyn Fn(&Complaint) -> bool,
    ) -> Result<Vec<Complaint>, StoreError> {
        Ok(self.read()?.complaints.find(predicate))
    }

    fn insert_complaint(&self, new: NewComplaint) -> Result<Complaint, StoreError> {
        let mut tables = self.write()?;
        tables.check_tracking_id(&new.tracking_id)?;
        Ok(tables.push_complaint(new))
    }

    fn replace_complaint(&self, id: i64, complaint: Complaint) -> Result<Complaint, StoreError> {
        let mut tables = self.write()?;
        tables.check_replacement(id, &complaint)?;
        Ok(tables.complaints.push(id, complaint))
    }

    fn insert_complaint_with_attachments(
        &self,
        new: NewComplaint,
        files: Vec<AttachmentFile>,
    ) -> Result<(Complaint, Vec<Attachment>), StoreError> {
        let mut tables = self.write()?;
        tables.check_tracking_id(&new.tracking_id)?;
        tables.check_filenames(files.iter().map(|f| f.filename.as_str()))?;

        let complaint = tables.push_complaint(new);
        let attachments = files
            .into_iter()
            .map(|f| tables.push_attachment(f.for_complaint(complaint.id)))
            .collect();
        Ok((complaint, attachments))
    }

    fn get_category(&self, id: i64) -> Result<Option<Category>, StoreError> {
        Ok(self.read()?.categories.get(id))
    }

    fn find_categories(
        &self,
        predicate: &dyn Fn(&Category) -> bool,
    ) -> Result<Vec<Category>, StoreError> {
        Ok(self.read()?.categories.find(predicate))
    }

    fn insert_category(&self, new: NewCategory) -> Result<Category, StoreError> {
        let mut tables = self.write()?;
        let id = tables.categories.allocate_id();
        let category = Category {
            id,
            name: new.name,
            description: new.description,
        };
        Ok(tables.categories.push(id, category))
    }

    fn get_attachment(&self, id: i64) -> Result<Option<Attachment>, StoreError> {
        Ok(self.read()?.attachments.get(id))
    }

    fn find_attachments(
        &self,
        predicate: &dyn Fn(&Attachment) -> bool,
    ) -> Result<Vec<Attachment>, StoreError> {
        Ok(self.read()?.attachments.find(predicate))
    }

    fn insert_attachment(&self, new: NewAttachment) -> Result<Attachment, StoreError> {
        let mut tables = self.write()?;
        tables.require_complaint(new.complaint_id)?;
        tables.check_filenames([new.filename.as_str()])?;
        Ok(tables.push_attachment(new))
    }

    fn get_response(&self, id: i64) -> Result<Option<Response>, StoreError> {
        Ok(self.read()?.responses.get(id))
    }

    fn find_responses(
        &self,
        predicate: &dyn Fn(&Response) -> bool,
    ) -> Result<Vec<Response>, StoreError> {
        Ok(self.read()?.responses.find(predicate))
    }

    fn insert_response(&self, new: NewResponse) -> Result<Response, StoreError> {
        let mut tables = self.write()?;
        tables.require_complaint(new.complaint_id)?;
        Ok(tables.push_response(new))
    }

    fn insert_response_with_update(
        &self,
        new: NewResponse,
        complaint: Complaint,
    ) -> Result<(Response, Complaint), StoreError> {
        let mut tables = self.write()?;
        tables.require_complaint(new.complaint_id)?;
        tables.check_replacement(complaint.id, &complaint)?;

        let response = tables.push_response(new);
        let id = complaint.id;
        let complaint = tables.complaints.push(id, complaint);
        Ok((response, complaint))
    }

    fn get_user(&self, id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.read()?.users.get(id))
    }

    fn find_users(&self, predicate: &dyn Fn(&User) -> bool) -> Result<Vec<User>, StoreError> {
        Ok(self.read()?.users.find(predicate))
    }

    fn insert_user(&self, new: NewUser) -> Result<User, StoreError> {
        let mut tables = self.write()?;
        let id = tables.users.allocate_id();
        let user = User {
            id,
            username: new.username,
            password_hash: new.password_hash,
            name: new.name,
            role: new.role,
            created_at: model::now(),
        };
        Ok(tables.users.push(id, user))
    }
}

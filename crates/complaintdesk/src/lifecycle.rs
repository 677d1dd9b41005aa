//! Complaint lifecycle state machine.
//!
//! ```text
//!            approve            citizen reply           close
//! pending ─────────────▶ verified ─────────▶ inprogress ─────▶ resolved
//!    │                                          ▲   ▲             │
//!    │ reject                                   │   └─────────────┘
//!    └──────────────▶ rejected ─────────────────┘   citizen reply
//! ```
//!
//! A citizen reply moves any status to `inprogress`, and the owner may close
//! from any status. `resolved` is therefore not terminal.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::{debug, info, info_span, warn};

use crate::error::{ComplaintError, Result, ValidationErrors};
use crate::model::{self, Complaint, ComplaintStatus, NewResponse, Response};
use crate::store::{SharedStore, StoreError};

/// Events that may move a complaint between statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Approve,
    Reject,
    CitizenReply,
    Close,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Approve => "approve",
            Action::Reject => "reject",
            Action::CitizenReply => "reply to",
            Action::Close => "close",
        }
    }
}

/// The transition table. `None` means the action is refused in that status.
pub fn next_status(current: ComplaintStatus, action: Action) -> Option<ComplaintStatus> {
    use ComplaintStatus::*;

    match (current, action) {
        (Pending, Action::Approve) => Some(Verified),
        (Pending, Action::Reject) => Some(Rejected),
        (_, Action::Approve | Action::Reject) => None,
        (_, Action::CitizenReply) => Some(InProgress),
        (_, Action::Close) => Some(Resolved),
    }
}

/// Applies `action` to an in-memory copy, enforcing the table and the
/// per-status field invariants. Does not touch the store.
pub fn apply(
    mut complaint: Complaint,
    action: Action,
    rejection_reason: Option<&str>,
) -> Result<Complaint> {
    let next = next_status(complaint.status, action).ok_or(ComplaintError::InvalidState {
        id: complaint.id,
        action: action.as_str(),
        current: complaint.status,
    })?;

    match action {
        Action::Approve => {
            complaint.is_published = true;
        }
        Action::Reject => {
            let reason = rejection_reason
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .ok_or(ComplaintError::MissingField("rejectionReason"))?;
            complaint.rejection_reason = Some(reason.to_string());
        }
        Action::CitizenReply => {}
        Action::Close => {
            complaint.closed_at = Some(model::now());
        }
    }

    if next != ComplaintStatus::Rejected {
        complaint.rejection_reason = None;
    }
    complaint.status = next;
    complaint.updated_at = model::bump(complaint.updated_at);
    Ok(complaint)
}

/// Per-complaint mutexes serializing read-check-write sequences.
///
/// An entry lives only while some caller holds or waits on it.
#[derive(Default)]
struct ComplaintLocks {
    inner: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl ComplaintLocks {
    fn acquire(&self, id: i64) -> std::result::Result<Arc<Mutex<()>>, StoreError> {
        let mut map = self.inner.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(map.entry(id).or_default().clone())
    }

    /// Drops the entry for `id` when `lock` is the last handle outside the
    /// map. Handles are only cloned under the map lock, so the count cannot
    /// grow while it is checked.
    fn release(&self, id: i64, lock: Arc<Mutex<()>>) {
        if let Ok(mut map) = self.inner.lock() {
            if Arc::strong_count(&lock) == 2 {
                map.remove(&id);
            }
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.inner.lock().map(|m| m.len()).unwrap_or(0)
    }
}

/// Runs lifecycle transitions against the store.
pub struct LifecycleEngine {
    store: SharedStore,
    locks: ComplaintLocks,
}

impl LifecycleEngine {
    pub fn new(store: SharedStore) -> Self {
        Self {
            store,
            locks: ComplaintLocks::default(),
        }
    }

    /// Runs `f` while holding the lock for complaint `id`.
    fn with_lock<T>(&self, id: i64, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let lock = self.locks.acquire(id)?;
        let result = match lock.lock() {
            Ok(_guard) => f(),
            Err(_) => Err(StoreError::LockPoisoned.into()),
        };
        self.locks.release(id, lock);
        result
    }

    /// Fetches a complaint that is visible to lifecycle operations.
    fn load_active(&self, id: i64) -> Result<Complaint> {
        match self.store.get_complaint(id)? {
            Some(c) if !c.is_archived => Ok(c),
            _ => Err(ComplaintError::not_found(format!("Complaint {}", id))),
        }
    }

    fn transition(
        &self,
        id: i64,
        action: Action,
        rejection_reason: Option<&str>,
    ) -> Result<Complaint> {
        let current = self.load_active(id)?;
        let from = current.status;
        let updated = apply(current, action, rejection_reason)?;
        let stored = self.store.replace_complaint(id, updated)?;
        info!(
            complaint_id = id,
            from = %from,
            to = %stored.status,
            "Complaint transitioned"
        );
        Ok(stored)
    }

    /// Approves or rejects a pending complaint.
    ///
    /// Rejection needs a non-blank reason; approval publishes the complaint.
    pub fn verify(
        &self,
        id: i64,
        approved: bool,
        rejection_reason: Option<&str>,
    ) -> Result<Complaint> {
        let _span = info_span!("lifecycle.verify", complaint_id = id, approved).entered();
        let action = if approved {
            Action::Approve
        } else {
            Action::Reject
        };
        self.with_lock(id, || self.transition(id, action, rejection_reason))
            .inspect_err(|e| warn!(complaint_id = id, error = %e, "Verification refused"))
    }

    /// Appends a response. A citizen response forces the complaint back to
    /// `inprogress`, whatever its current status.
    pub fn record_response(
        &self,
        complaint_id: i64,
        content: &str,
        is_from_admin: bool,
    ) -> Result<Response> {
        let _span =
            info_span!("lifecycle.record_response", complaint_id, is_from_admin).entered();

        let content = content.trim();
        if content.is_empty() {
            return Err(ValidationErrors::single("content", "Response must not be empty").into());
        }

        self.with_lock(complaint_id, || {
            let complaint = self.load_active(complaint_id)?;
            let new = NewResponse {
                complaint_id,
                content: content.to_string(),
                is_from_admin,
            };

            let response = if is_from_admin {
                self.store.insert_response(new)?
            } else {
                let from = complaint.status;
                let updated = apply(complaint, Action::CitizenReply, None)?;
                let (response, _) = self.store.insert_response_with_update(new, updated)?;
                if from == ComplaintStatus::Resolved || from == ComplaintStatus::Rejected {
                    info!(complaint_id, from = %from, "Citizen reply reopens complaint");
                }
                response
            };
            debug!(response_id = response.id, "Response recorded");
            Ok(response)
        })
    }

    /// Marks a complaint resolved. No guard on the prior status; repeating it
    /// only refreshes `closedAt` and `updatedAt`.
    pub fn close(&self, id: i64) -> Result<Complaint> {
        let _span = info_span!("lifecycle.close", complaint_id = id).entered();
        self.with_lock(id, || self.transition(id, Action::Close, None))
    }

    /// Soft-removes a complaint from every listing. Idempotent.
    pub fn archive(&self, id: i64) -> Result<Complaint> {
        let _span = info_span!("lifecycle.archive", complaint_id = id).entered();
        self.with_lock(id, || {
            let mut complaint = self
                .store
                .get_complaint(id)?
                .ok_or_else(|| ComplaintError::not_found(format!("Complaint {}", id)))?;
            if complaint.is_archived {
                return Ok(complaint);
            }
            complaint.is_archived = true;
            complaint.updated_at = model::bump(complaint.updated_at);
            let stored = self.store.replace_complaint(id, complaint)?;
            info!(complaint_id = id, "Complaint archived");
            Ok(stored)
        })
    }
}

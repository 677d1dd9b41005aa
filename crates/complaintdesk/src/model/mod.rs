//! Record types owned by the entity store.

use chrono::{DateTime, Duration, SubsecRound, Utc};

pub mod attachment;
pub mod category;
pub mod complaint;
pub mod response;
pub mod user;

pub use attachment::{Attachment, AttachmentFile, NewAttachment};
pub use category::{Category, NewCategory};
pub use complaint::{Complaint, ComplaintStatus, NewComplaint};
pub use response::{NewResponse, Response};
pub use user::{NewUser, SessionUser, User};

/// Current time truncated to microseconds.
///
/// Both store backends persist at this precision, so values compare equal
/// after a round-trip through SQLite.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Returns a timestamp strictly later than `previous`.
pub fn bump(previous: DateTime<Utc>) -> DateTime<Utc> {
    let current = now();
    if current > previous {
        current
    } else {
        previous + Duration::microseconds(1)
    }
}

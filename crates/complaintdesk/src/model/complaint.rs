use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a complaint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplaintStatus {
    Pending,
    Verified,
    Rejected,
    InProgress,
    Resolved,
}

impl ComplaintStatus {
    pub const ALL: [ComplaintStatus; 5] = [
        ComplaintStatus::Pending,
        ComplaintStatus::Verified,
        ComplaintStatus::Rejected,
        ComplaintStatus::InProgress,
        ComplaintStatus::Resolved,
    ];

    /// Wire/storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplaintStatus::Pending => "pending",
            ComplaintStatus::Verified => "verified",
            ComplaintStatus::Rejected => "rejected",
            ComplaintStatus::InProgress => "inprogress",
            ComplaintStatus::Resolved => "resolved",
        }
    }

    /// Statuses a published complaint may be in.
    pub fn is_publishable(&self) -> bool {
        matches!(
            self,
            ComplaintStatus::Verified | ComplaintStatus::InProgress | ComplaintStatus::Resolved
        )
    }
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a status string is not one of the five known values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown complaint status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for ComplaintStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(ComplaintStatus::Pending),
            "verified" => Ok(ComplaintStatus::Verified),
            "rejected" => Ok(ComplaintStatus::Rejected),
            "inprogress" => Ok(ComplaintStatus::InProgress),
            "resolved" => Ok(ComplaintStatus::Resolved),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// A citizen complaint with its full private record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Complaint {
    pub id: i64,
    pub tracking_id: String,
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub category_id: Option<i64>,
    pub status: ComplaintStatus,
    pub is_published: bool,
    pub is_archived: bool,

    // Reporter info (private)
    pub name: String,
    pub nik: String,
    pub email: String,
    pub phone: String,
    pub address: String,

    pub access_token: String,
    pub rejection_reason: Option<String>,
    pub closed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Complaint {
    /// True when `email` and `token` both match this record exactly.
    pub fn owned_by(&self, email: &str, token: &str) -> bool {
        self.email == email && self.access_token == token
    }

    /// Name of the first identity field that differs from `other`, if any.
    ///
    /// `id`, `trackingId`, `accessToken` and `createdAt` never change after
    /// insertion.
    pub fn changed_identity_field(&self, other: &Complaint) -> Option<&'static str> {
        if self.id != other.id {
            Some("id")
        } else if self.tracking_id != other.tracking_id {
            Some("trackingId")
        } else if self.access_token != other.access_token {
            Some("accessToken")
        } else if self.created_at != other.created_at {
            Some("createdAt")
        } else {
            None
        }
    }
}

/// Insert payload for a complaint. Lifecycle fields are set by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComplaint {
    pub tracking_id: String,
    pub access_token: String,
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub category_id: Option<i64>,
    pub name: String,
    pub nik: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

impl NewComplaint {
    /// Builds the initial record: pending, unpublished, not archived.
    pub fn into_complaint(self, id: i64, at: DateTime<Utc>) -> Complaint {
        Complaint {
            id,
            tracking_id: self.tracking_id,
            title: self.title,
            description: self.description,
            location: self.location,
            category_id: self.category_id,
            status: ComplaintStatus::Pending,
            is_published: false,
            is_archived: false,
            name: self.name,
            nik: self.nik,
            email: self.email,
            phone: self.phone,
            address: self.address,
            access_token: self.access_token,
            rejection_reason: None,
            closed_at: None,
            created_at: at,
            updated_at: at,
        }
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One message in a complaint's thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub id: i64,
    pub complaint_id: i64,
    pub content: String,
    pub is_from_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewResponse {
    pub complaint_id: i64,
    pub content: String,
    pub is_from_admin: bool,
}

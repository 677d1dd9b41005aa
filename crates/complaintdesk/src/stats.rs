use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::model::{Complaint, ComplaintStatus};
use crate::store::SharedStore;

/// Per-status counts for the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintStats {
    pub total: u64,
    pub pending: u64,
    pub verified: u64,
    pub rejected: u64,
    pub inprogress: u64,
    pub resolved: u64,
}

impl ComplaintStats {
    fn record(&mut self, status: ComplaintStatus) {
        self.total += 1;
        let slot = match status {
            ComplaintStatus::Pending => &mut self.pending,
            ComplaintStatus::Verified => &mut self.verified,
            ComplaintStatus::Rejected => &mut self.rejected,
            ComplaintStatus::InProgress => &mut self.inprogress,
            ComplaintStatus::Resolved => &mut self.resolved,
        };
        *slot += 1;
    }

    pub fn count(&self, status: ComplaintStatus) -> u64 {
        match status {
            ComplaintStatus::Pending => self.pending,
            ComplaintStatus::Verified => self.verified,
            ComplaintStatus::Rejected => self.rejected,
            ComplaintStatus::InProgress => self.inprogress,
            ComplaintStatus::Resolved => self.resolved,
        }
    }
}

impl FromIterator<ComplaintStatus> for ComplaintStats {
    fn from_iter<I: IntoIterator<Item = ComplaintStatus>>(iter: I) -> Self {
        let mut stats = ComplaintStats::default();
        for status in iter {
            stats.record(status);
        }
        stats
    }
}

pub struct StatsAggregator {
    store: SharedStore,
}

impl StatsAggregator {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Counts every complaint, archived and unpublished ones included.
    pub fn compute(&self) -> Result<ComplaintStats> {
        let stats: ComplaintStats = self
            .store
            .find_complaints(&|_: &Complaint| true)?
            .into_iter()
            .map(|c| c.status)
            .collect();
        debug!(total = stats.total, "Computed complaint stats");
        Ok(stats)
    }
}

//! Filtered, sorted and paginated complaint views for the public and admin
//! audiences.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info_span};

use crate::config::PaginationConfig;
use crate::error::{ComplaintError, Result, ValidationErrors};
use crate::model::{Attachment, Category, Complaint, ComplaintStatus, Response};
use crate::store::SharedStore;

/// Raw listing parameters as they arrive from a query string.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintQueryParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub search: Option<String>,
}

/// Normalized listing filter shared by both views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplaintFilter {
    pub status: Option<ComplaintStatus>,
    /// Category name, compared case-insensitively.
    pub category: Option<String>,
    /// Case-insensitive substring.
    pub search: Option<String>,
    /// 1-indexed.
    pub page: u32,
    pub limit: u32,
}

impl Default for ComplaintFilter {
    fn default() -> Self {
        Self::with_limits(&PaginationConfig::default())
    }
}

/// `None` for absent, blank or `all`.
fn meaningful(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}

impl ComplaintFilter {
    /// Unfiltered first page with the configured default limit.
    pub fn with_limits(limits: &PaginationConfig) -> Self {
        Self {
            status: None,
            category: None,
            search: None,
            page: 1,
            limit: limits.default_limit,
        }
    }

    /// Parses raw parameters leniently. Only an unknown status is an error.
    pub fn from_params(params: &ComplaintQueryParams, limits: &PaginationConfig) -> Result<Self> {
        let status = match meaningful(params.status.as_deref()) {
            Some(raw) => Some(raw.parse::<ComplaintStatus>().map_err(|e| {
                ComplaintError::from(ValidationErrors::single("status", &e.to_string()))
            })?),
            None => None,
        };

        let page = params
            .page
            .as_deref()
            .and_then(|p| p.trim().parse::<u32>().ok())
            .unwrap_or(1);
        let limit = params
            .limit
            .as_deref()
            .and_then(|l| l.trim().parse::<u32>().ok())
            .unwrap_or(0);

        let search = params
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(Self {
            status,
            category: meaningful(params.category.as_deref()).map(str::to_string),
            search,
            page,
            limit,
        }
        .normalized(limits))
    }

    /// Clamps page and limit into range.
    pub fn normalized(mut self, limits: &PaginationConfig) -> Self {
        self.page = self.page.max(1);
        if self.limit == 0 {
            self.limit = limits.default_limit;
        }
        self.limit = self.limit.min(limits.max_limit);
        self
    }

    pub fn status(mut self, status: ComplaintStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn category(mut self, name: &str) -> Self {
        self.category = Some(name.to_string());
        self
    }

    pub fn search(mut self, needle: &str) -> Self {
        self.search = Some(needle.to_string());
        self
    }

    pub fn page(mut self, page: u32, limit: u32) -> Self {
        self.page = page;
        self.limit = limit;
        self
    }
}

/// Pagination metadata. `from`/`to` are inclusive and 1-indexed, both 0 on
/// an empty page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: u64,
    pub total_pages: u64,
    pub current_page: u32,
    pub limit: u32,
    pub from: u64,
    pub to: u64,
}

impl Pagination {
    pub fn compute(total: u64, page: u32, limit: u32) -> Self {
        let limit_u64 = u64::from(limit.max(1));
        let total_pages = total.div_ceil(limit_u64);
        let offset = u64::from(page.saturating_sub(1)) * limit_u64;
        let (from, to) = if offset >= total {
            (0, 0)
        } else {
            (offset + 1, (offset + limit_u64).min(total))
        };
        Self {
            total,
            total_pages,
            current_page: page,
            limit,
            from,
            to,
        }
    }

    fn offset(&self) -> usize {
        if self.from == 0 {
            0
        } else {
            (self.from - 1) as usize
        }
    }

    fn len(&self) -> usize {
        if self.from == 0 {
            0
        } else {
            (self.to - self.from + 1) as usize
        }
    }
}

/// One page of rows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub complaints: Vec<T>,
    pub pagination: Pagination,
}

/// Public row: reporter identity and the access token are absent by
/// construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicComplaint {
    pub id: i64,
    pub tracking_id: String,
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    pub status: ComplaintStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub attachments: Vec<Attachment>,
    pub responses: Vec<Response>,
}

/// Admin row: the unredacted complaint plus its category name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminComplaint {
    #[serde(flatten)]
    pub complaint: Complaint,
    pub category_name: Option<String>,
}

/// Full detail of one complaint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintWithRelations {
    #[serde(flatten)]
    pub complaint: Complaint,
    pub category: Option<Category>,
    pub attachments: Vec<Attachment>,
    pub responses: Vec<Response>,
}

/// Which audience a listing is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Audience {
    Public,
    Admin,
}

pub struct QueryEngine {
    store: SharedStore,
    limits: PaginationConfig,
}

impl QueryEngine {
    pub fn new(store: SharedStore, limits: PaginationConfig) -> Self {
        Self { store, limits }
    }

    pub fn limits(&self) -> &PaginationConfig {
        &self.limits
    }

    fn category_names(&self) -> Result<HashMap<i64, String>> {
        Ok(self
            .store
            .find_categories(&|_: &Category| true)?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect())
    }

    /// Runs predicates, sort and slicing for one audience.
    fn select(
        &self,
        audience: Audience,
        filter: &ComplaintFilter,
        categories: &HashMap<i64, String>,
    ) -> Result<(Vec<Complaint>, Pagination)> {
        let filter = filter.clone().normalized(&self.limits);
        let category = filter.category.as_deref().map(str::to_lowercase);
        let needle = filter.search.as_deref().map(str::to_lowercase);

        let mut rows = self.store.find_complaints(&|c: &Complaint| {
            if c.is_archived {
                return false;
            }
            if audience == Audience::Public && !c.is_published {
                return false;
            }
            if filter.status.is_some_and(|s| s != c.status) {
                return false;
            }
            if let Some(wanted) = &category {
                let name = c.category_id.and_then(|id| categories.get(&id));
                if !name.is_some_and(|n| n.to_lowercase() == *wanted) {
                    return false;
                }
            }
            match &needle {
                Some(needle) => matches_search(c, needle, audience),
                None => true,
            }
        })?;

        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let pagination = Pagination::compute(rows.len() as u64, filter.page, filter.limit);
        let page = rows
            .into_iter()
            .skip(pagination.offset())
            .take(pagination.len())
            .collect();
        Ok((page, pagination))
    }

    /// Published, non-archived complaints with reporter data stripped.
    pub fn list_public(&self, filter: &ComplaintFilter) -> Result<Page<PublicComplaint>> {
        let _span = info_span!("query.list_public", page = filter.page).entered();
        let categories = self.category_names()?;
        let (rows, pagination) = self.select(Audience::Public, filter, &categories)?;

        let complaints = rows
            .into_iter()
            .map(|c| -> Result<PublicComplaint> {
                Ok(PublicComplaint {
                    category_name: c.category_id.and_then(|id| categories.get(&id).cloned()),
                    attachments: self.store.attachments_of(c.id)?,
                    responses: self.store.responses_of(c.id)?,
                    id: c.id,
                    tracking_id: c.tracking_id,
                    title: c.title,
                    description: c.description,
                    location: c.location,
                    category_id: c.category_id,
                    status: c.status,
                    created_at: c.created_at,
                    updated_at: c.updated_at,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(total = pagination.total, returned = complaints.len(), "Public listing");
        Ok(Page {
            complaints,
            pagination,
        })
    }

    /// Every non-archived complaint, unredacted.
    pub fn list_admin(&self, filter: &ComplaintFilter) -> Result<Page<AdminComplaint>> {
        let _span = info_span!("query.list_admin", page = filter.page).entered();
        let categories = self.category_names()?;
        let (rows, pagination) = self.select(Audience::Admin, filter, &categories)?;

        let complaints: Vec<AdminComplaint> = rows
            .into_iter()
            .map(|c| AdminComplaint {
                category_name: c.category_id.and_then(|id| categories.get(&id).cloned()),
                complaint: c,
            })
            .collect();

        debug!(total = pagination.total, returned = complaints.len(), "Admin listing");
        Ok(Page {
            complaints,
            pagination,
        })
    }

    /// Attaches category, attachments and responses to a complaint.
    pub fn with_relations(&self, complaint: Complaint) -> Result<ComplaintWithRelations> {
        let category = match complaint.category_id {
            Some(id) => self.store.get_category(id)?,
            None => None,
        };
        Ok(ComplaintWithRelations {
            category,
            attachments: self.store.attachments_of(complaint.id)?,
            responses: self.store.responses_of(complaint.id)?,
            complaint,
        })
    }
}

/// `needle` must already be lowercase.
fn matches_search(c: &Complaint, needle: &str, audience: Audience) -> bool {
    let contains = |field: &str| field.to_lowercase().contains(needle);
    if contains(&c.title) || contains(&c.description) {
        return true;
    }
    audience == Audience::Admin
        && (contains(&c.name) || contains(&c.email) || contains(&c.tracking_id))
}

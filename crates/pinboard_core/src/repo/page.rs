//! Pagination and incremental-sync windowing.
//!
//! # Responsibility
//! - Validate page/limit input and compute offset windows.
//! - Count and fetch one window of posts, optionally created after `since`.
//!
//! # Invariants
//! - Order is `created_at DESC, id DESC`; ids are unique, so the order is
//!   total and repeated calls return identical windows.
//! - `total` ignores the window; `total_pages = ceil(total / limit)`.
//! - Count and window are read from one snapshot.
//! - A page past the end yields no items, never an error.
//! - `since` is normalized to the stored timestamp format before comparing.

use crate::model::post::{Post, PostValidationError, MAX_PAGE_LIMIT};
use crate::repo::post_repo::{parse_post_row, RepoResult, POST_SELECT_SQL};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use serde::Serialize;

/// Rewrites a caller timestamp (`Z` or offset suffix, space separator, no
/// fraction, bare date) into the stored `YYYY-MM-DDTHH:MM:SS.fff` UTC form.
/// Text SQLite cannot parse is compared as given.
const SINCE_NORMALIZED_SQL: &str = "COALESCE(strftime('%Y-%m-%dT%H:%M:%f', ?), ?)";

/// Validated listing input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
    since: Option<String>,
}

impl PageRequest {
    /// `page` is 1-indexed; `limit` must be within `1..=MAX_PAGE_LIMIT`.
    pub fn new(page: u32, limit: u32) -> Result<Self, PostValidationError> {
        if page == 0 {
            return Err(PostValidationError::InvalidPage(page));
        }
        if limit == 0 || limit > MAX_PAGE_LIMIT {
            return Err(PostValidationError::InvalidLimit(limit));
        }
        Ok(Self {
            page,
            limit,
            since: None,
        })
    }

    /// Restricts results to posts with `created_at` strictly after `since`.
    pub fn since(mut self, since: impl Into<String>) -> Self {
        self.since = Some(since.into());
        self
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn since_timestamp(&self) -> Option<&str> {
        self.since.as_deref()
    }

    /// Rows skipped before this window.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

/// One window of a listing plus totals for the whole filtered set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
}

/// Integer ceiling of `total / limit`; `0` when `total == 0`.
pub fn total_pages(total: u64, limit: u32) -> u64 {
    total.div_ceil(u64::from(limit.max(1)))
}

pub(crate) fn fetch_page(conn: &mut Connection, request: &PageRequest) -> RepoResult<PageResult<Post>> {
    let mut filter = String::new();
    let mut bind_values: Vec<Value> = Vec::new();
    if let Some(since) = request.since_timestamp() {
        filter.push_str(&format!(" WHERE created_at > {SINCE_NORMALIZED_SQL}"));
        bind_values.push(Value::Text(since.to_string()));
        bind_values.push(Value::Text(since.to_string()));
    }

    let tx = conn.transaction()?;
    let total: i64 = tx.query_row(
        &format!("SELECT COUNT(*) FROM posts{filter};"),
        params_from_iter(bind_values.iter()),
        |row| row.get(0),
    )?;

    let window_sql =
        format!("{POST_SELECT_SQL}{filter} ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?;");
    bind_values.push(Value::Integer(i64::from(request.limit)));
    bind_values.push(Value::Integer(i64::try_from(request.offset()).unwrap_or(i64::MAX)));

    let mut items = Vec::new();
    {
        let mut stmt = tx.prepare(&window_sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values.iter()))?;
        while let Some(row) = rows.next()? {
            items.push(parse_post_row(row)?);
        }
    }
    tx.commit()?;

    let total = u64::try_from(total).unwrap_or(0);
    Ok(PageResult {
        items,
        total,
        page: request.page,
        limit: request.limit,
        total_pages: total_pages(total, request.limit),
    })
}

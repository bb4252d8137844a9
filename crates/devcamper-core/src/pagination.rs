//! Page-based pagination descriptors.
//!
//! Collection listings are paginated with `page` (1-indexed) and `limit`.
//! The response carries the filtered `total` plus optional `next` and
//! `previous` descriptors that a client can feed straight back as query
//! parameters.
//!
//! # Example JSON
//!
//! ```json
//! {
//!   "total": 25,
//!   "next": { "page": 3, "limit": 10 },
//!   "previous": { "page": 1, "limit": 10 }
//! }
//! ```

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 25;
pub const MAX_LIMIT: i64 = 100;
/// Highest page whose offset still fits an `i64` at `MAX_LIMIT`.
pub const MAX_PAGE: i64 = i64::MAX / MAX_LIMIT;

/// A page a client can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PageRef {
    pub page: i64,
    pub limit: i64,
}

/// Pagination block of a listing response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Pagination {
    /// Number of documents matching the filters, across all pages
    pub total: i64,
    /// Present when documents exist after this page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<PageRef>,
    /// Present for every page after the first, even past the end
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<PageRef>,
}

impl Pagination {
    #[must_use]
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let start_index = page.saturating_sub(1).saturating_mul(limit);
        let end_index = page.saturating_mul(limit);

        let next = (end_index < total).then_some(PageRef {
            page: page + 1,
            limit,
        });
        let previous = (start_index > 0).then_some(PageRef {
            page: page - 1,
            limit,
        });

        Self {
            total,
            next,
            previous,
        }
    }
}

/// Parses a raw `page` parameter. Non-numeric input falls back to the first
/// page and the result is clamped to `[1, MAX_PAGE]`.
#[must_use]
pub fn parse_page(raw: Option<&str>) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .unwrap_or(DEFAULT_PAGE)
        .clamp(1, MAX_PAGE)
}

/// Parses a raw `limit` parameter, clamped to `[1, MAX_LIMIT]`.
#[must_use]
pub fn parse_limit(raw: Option<&str>) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .unwrap_or(DEFAULT_LIMIT)
        .clamp(1, MAX_LIMIT)
}

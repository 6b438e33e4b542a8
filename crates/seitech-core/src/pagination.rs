//! Pagination utilities for list routes.
//!
//! Routes accept either `page` or `offset` alongside `limit`. Each route has
//! its own default and ceiling for `limit` (notifications 20, schedules 12
//! capped at 100, blog 10 capped at 50), so the window is resolved with
//! [`PaginationParams::window`].
//!
//! # Example
//!
//! ```ignore
//! let window = params.window(12, 100);
//! let records = odoo.search_read("seitech.schedule", domain, fields, window.offset, window.limit, order).await?;
//! let meta = PageMeta::new(total, &window);
//! ```

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::serde::deserialize_optional_i64;

/// Deepest offset any list route will forward to the ERP.
pub const MAX_OFFSET: i64 = 1_000_000;

/// Clamp a caller-supplied offset into `0..=MAX_OFFSET`.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).clamp(0, MAX_OFFSET)
}

/// Query parameters for pagination. `page` takes precedence over `offset`.
#[derive(Debug, Clone, Default, Hash, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Maximum number of items to return
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub limit: Option<i64>,
    /// Number of items to skip (ignored if `page` is set)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub offset: Option<i64>,
    /// Page number (1-indexed)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page: Option<i64>,
}

/// A resolved limit/offset pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub limit: i64,
    pub offset: i64,
    pub page: i64,
}

impl PaginationParams {
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            limit,
            offset: None,
            page,
        }
    }

    /// Resolve the window with a route-specific default and ceiling.
    #[must_use]
    pub fn window(&self, default_limit: i64, max_limit: i64) -> PageWindow {
        let limit = self.limit.unwrap_or(default_limit).clamp(1, max_limit);
        match self.page {
            Some(page) => {
                let page = page.clamp(1, MAX_OFFSET / limit + 1);
                PageWindow {
                    limit,
                    offset: (page - 1) * limit,
                    page,
                }
            }
            None => {
                let offset = clamp_offset(self.offset);
                PageWindow {
                    limit,
                    offset,
                    page: offset / limit + 1,
                }
            }
        }
    }
}

/// Page-based pagination metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
    pub has_more: bool,
}

impl PageMeta {
    pub fn new(total: i64, window: &PageWindow) -> Self {
        Self {
            page: window.page,
            limit: window.limit,
            total,
            total_pages: total_pages(total, window.limit),
            has_more: window.offset.saturating_add(window.limit) < total,
        }
    }
}

/// Offset-based pagination metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OffsetPagination {
    pub offset: i64,
    pub limit: i64,
    pub total: i64,
    pub has_more: bool,
}

impl OffsetPagination {
    pub fn new(offset: i64, limit: i64, total: i64) -> Self {
        Self {
            offset,
            limit,
            total,
            has_more: offset.saturating_add(limit) < total,
        }
    }
}

/// `ceil(total / per_page)`, zero for empty result sets.
pub fn total_pages(total: i64, per_page: i64) -> i64 {
    if per_page <= 0 || total <= 0 {
        return 0;
    }
    (total - 1) / per_page + 1
}

//! Pagination types and utilities for consistent pagination across all endpoints

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Page size applied when the caller omits `perPage` in paginated mode
pub const DEFAULT_PER_PAGE: u32 = 40;

/// Largest accepted `perPage`; bigger values are clamped, not rejected
pub const MAX_PER_PAGE: u32 = 100;

/// Standard pagination parameters for list endpoints
///
/// All list endpoints should use this type for consistent pagination behavior.
#[derive(Debug, Deserialize, Serialize, IntoParams, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PaginationParams {
    #[param(example = 1, minimum = 1)]
    pub page: Option<u32>,

    #[param(example = 40, minimum = 1, maximum = 100)]
    pub per_page: Option<u32>,
}

impl PaginationParams {
    /// Get the page number (defaults to 1, minimum 1)
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    /// Get the page size (defaults to 40, clamped between 1 and 100)
    pub fn per_page(&self) -> u32 {
        self.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE)
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: Some(1),
            per_page: Some(DEFAULT_PER_PAGE),
        }
    }
}

/// Windowing mode of a list query.
///
/// The mode is always chosen explicitly by the caller: list endpoints run
/// `Paginated`, the CSV exporter runs `Unbounded` with its own row cap.
/// It is never inferred from an absent parameter at query-build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMode {
    Paginated { page: u32, per_page: u32 },
    Unbounded,
}

impl PageMode {
    /// Paginated mode from request parameters, applying defaults and clamps
    pub fn from_params(params: &PaginationParams) -> Self {
        Self::Paginated {
            page: params.page(),
            per_page: params.per_page(),
        }
    }

    /// `LIMIT`/`OFFSET` window, or `None` in unbounded mode
    pub fn limit_offset(&self) -> Option<(i64, i64)> {
        match self {
            Self::Paginated { page, per_page } => {
                let offset = i64::from(page.saturating_sub(1)) * i64::from(*per_page);
                Some((i64::from(*per_page), offset))
            }
            Self::Unbounded => None,
        }
    }
}

/// Standard list endpoint response: one page of rows plus the totals the
/// table UI needs to render pagination controls.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page_count: u32,
}

impl<T> ListResponse<T> {
    pub fn new(data: Vec<T>, total: i64, mode: PageMode) -> Self {
        let page_count = match mode {
            PageMode::Paginated { per_page, .. } => page_count(total, per_page),
            PageMode::Unbounded => 1,
        };
        Self {
            data,
            total,
            page_count,
        }
    }
}

/// `ceil(total / per_page)` for non-negative totals
pub fn page_count(total: i64, per_page: u32) -> u32 {
    if total <= 0 {
        return 0;
    }
    let per_page = i64::from(per_page.max(1));
    let pages = (total + per_page - 1) / per_page;
    u32::try_from(pages).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_pagination_defaults() {
        let params = PaginationParams {
            page: None,
            per_page: None,
        };
        assert_eq!(params.page(), 1);
        assert_eq!(params.per_page(), DEFAULT_PER_PAGE);
    }

    #[test]
    fn test_pagination_with_values() {
        let params = PaginationParams {
            page: Some(2),
            per_page: Some(50),
        };
        assert_eq!(params.page(), 2);
        assert_eq!(params.per_page(), 50);
    }

    #[test]
    fn test_page_min_clamp() {
        let params = PaginationParams {
            page: Some(0),
            per_page: Some(40),
        };
        assert_eq!(params.page(), 1);
    }

    #[test]
    fn test_per_page_clamps() {
        let params = PaginationParams {
            page: Some(1),
            per_page: Some(500),
        };
        assert_eq!(params.per_page(), MAX_PER_PAGE);

        let params = PaginationParams {
            page: Some(1),
            per_page: Some(0),
        };
        assert_eq!(params.per_page(), 1);
    }

    #[test]
    fn test_limit_offset_paginated() {
        let mode = PageMode::Paginated {
            page: 3,
            per_page: 10,
        };
        assert_eq!(mode.limit_offset(), Some((10, 20)));
    }

    #[test]
    fn test_limit_offset_first_page() {
        let mode = PageMode::Paginated {
            page: 1,
            per_page: 40,
        };
        assert_eq!(mode.limit_offset(), Some((40, 0)));
    }

    #[test]
    fn test_limit_offset_unbounded() {
        assert_eq!(PageMode::Unbounded.limit_offset(), None);
    }

    #[test]
    fn test_page_count_basics() {
        assert_eq!(page_count(0, 40), 0);
        assert_eq!(page_count(1, 40), 1);
        assert_eq!(page_count(40, 40), 1);
        assert_eq!(page_count(41, 40), 2);
        assert_eq!(page_count(100, 20), 5);
        assert_eq!(page_count(101, 20), 6);
    }

    #[test]
    fn test_page_count_default_per_page() {
        // The documented default: pageCount == ceil(total / 40)
        let params = PaginationParams {
            page: None,
            per_page: None,
        };
        let mode = PageMode::from_params(&params);
        let response = ListResponse::new(Vec::<u8>::new(), 81, mode);
        assert_eq!(response.page_count, 3);
    }

    #[test]
    fn test_unbounded_response_is_single_page() {
        let response = ListResponse::new(vec![1, 2, 3], 3, PageMode::Unbounded);
        assert_eq!(response.page_count, 1);
        assert_eq!(response.total, 3);
    }

    #[test]
    fn test_list_response_wire_casing() {
        let response = ListResponse::new(vec![1], 1, PageMode::Paginated { page: 1, per_page: 40 });
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("pageCount").is_some());
        assert!(json.get("page_count").is_none());
    }

    proptest! {
        #[test]
        fn prop_page_count_is_ceiling(total in 0i64..1_000_000, per_page in 1u32..1000) {
            let expected = ((total as f64) / (per_page as f64)).ceil() as u32;
            prop_assert_eq!(page_count(total, per_page), expected);
        }

        #[test]
        fn prop_last_page_holds_remainder(total in 1i64..100_000, per_page in 1u32..500) {
            let pages = page_count(total, per_page);
            let covered = i64::from(pages) * i64::from(per_page);
            prop_assert!(covered >= total);
            prop_assert!(covered - total < i64::from(per_page));
        }
    }
}

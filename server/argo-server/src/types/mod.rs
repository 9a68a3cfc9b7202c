//! Shared request/response types for list endpoints

pub mod date_filter;
pub mod pagination;
pub mod sorting;

pub use date_filter::DateFilter;
pub use pagination::{ListResponse, PageMode, PaginationParams, DEFAULT_PER_PAGE};
pub use sorting::SortParam;

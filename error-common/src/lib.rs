//! Common error handling utilities for Argo CRM Engine
//!
//! This module provides standardized error types, error codes, and utilities
//! used across all Argo CRM Engine crates. It ensures consistent error
//! handling and proper error context preservation.
//!
//! # Error Categories
//!
//! - **ValidationError**: Input validation and data format errors
//! - **DatabaseError**: Database connection and query errors
//! - **StorageError**: Object storage (file upload/download) errors
//! - **ExportError**: CSV export failures
//! - **ConfigError**: Configuration errors
//! - **ServerError**: HTTP server lifecycle errors
//!
//! # Example
//!
//! ```rust
//! use error_common::{ArgoError, Result};
//!
//! fn parse_currency(code: &str) -> Result<String> {
//!     if code.len() != 3 {
//!         return Err(ArgoError::ValidationError(format!(
//!             "currency must be a 3-letter ISO code, got '{}'",
//!             code
//!         )));
//!     }
//!     Ok(code.to_uppercase())
//! }
//! ```

pub mod codes;
pub mod context;
pub mod types;

pub use codes::*;
pub use context::*;
pub use types::*;

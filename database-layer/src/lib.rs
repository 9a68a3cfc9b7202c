//! Database access layer for Argo CRM Engine
//!
//! This crate owns the Postgres connection pool, the entity models for the
//! CRM domain (quotes, RFQs, companies, people, projects, registrations,
//! follow-ups), the repositories that perform mutations and point reads,
//! and the reference-number generation used for quotes and RFQs.
//!
//! List queries with dynamic filtering and sorting are built in the server
//! crate on top of `sqlx::QueryBuilder`; this crate only guarantees that
//! every mutation surfaces constraint violations as structured
//! [`DatabaseError`] variants instead of opaque driver errors.

pub mod connection;
pub mod directory_repository;
pub mod error;
pub mod models;
pub mod quote_repository;
pub mod reference;
pub mod registration_repository;
pub mod rfq_repository;

pub use connection::*;
pub use directory_repository::*;
pub use error::*;
pub use models::*;
pub use quote_repository::*;
pub use reference::*;
pub use registration_repository::*;
pub use rfq_repository::*;

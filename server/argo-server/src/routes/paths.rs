//! Centralized API route path constants
//!
//! This module provides constants for all API routes to ensure consistency
//! between runtime route definitions and OpenAPI documentation.
//!
//! **Important**: utoipa `#[path(...)]` attributes require string literals
//! and cannot use these constants directly, so these constants are used for
//! all runtime route definitions, and the paths in utoipa attributes must
//! match them exactly.

/// API base path
pub const API_V1: &str = "/api/v1";

/// Health check endpoints
pub mod health {
    pub const HEALTH: &str = "/health";
    pub const VERSION: &str = "/version";
    pub const STATUS: &str = "/status";
}

/// Quote endpoints
pub mod quotes {
    pub const QUOTES: &str = "/api/v1/quotes";
    pub const QUOTE_METADATA: &str = "/api/v1/quotes/metadata";
    pub const QUOTE_EXPORT: &str = "/api/v1/quotes/export";
    pub const QUOTE_BY_ID: &str = "/api/v1/quotes/:id";
}

/// RFQ endpoints
pub mod rfqs {
    pub const RFQS: &str = "/api/v1/rfqs";
    pub const RFQ_METADATA: &str = "/api/v1/rfqs/metadata";
    pub const RFQ_EXPORT: &str = "/api/v1/rfqs/export";
    pub const RFQ_BY_ID: &str = "/api/v1/rfqs/:id";
    pub const RFQ_RECEIVE: &str = "/api/v1/rfqs/:id/receive";
}

/// Company endpoints
pub mod companies {
    pub const COMPANIES: &str = "/api/v1/companies";
    pub const COMPANY_METADATA: &str = "/api/v1/companies/metadata";
    pub const COMPANY_EXPORT: &str = "/api/v1/companies/export";
    pub const COMPANY_BY_ID: &str = "/api/v1/companies/:id";
}

/// Person endpoints
pub mod people {
    pub const PEOPLE: &str = "/api/v1/people";
    pub const PERSON_EXPORT: &str = "/api/v1/people/export";
    pub const PERSON_BY_ID: &str = "/api/v1/people/:id";
}

/// Project endpoints
pub mod projects {
    pub const PROJECTS: &str = "/api/v1/projects";
    pub const PROJECT_EXPORT: &str = "/api/v1/projects/export";
    pub const PROJECT_BY_ID: &str = "/api/v1/projects/:id";
}

/// Registration endpoints
pub mod registrations {
    pub const REGISTRATIONS: &str = "/api/v1/registrations";
    pub const REGISTRATION_METADATA: &str = "/api/v1/registrations/metadata";
    pub const REGISTRATION_EXPORT: &str = "/api/v1/registrations/export";
    pub const REGISTRATION_BY_ID: &str = "/api/v1/registrations/:id";
}

/// Follow-up endpoints
pub mod follow_ups {
    pub const FOLLOW_UPS: &str = "/api/v1/follow-ups";
    pub const FOLLOW_UP_BY_ID: &str = "/api/v1/follow-ups/:id";
}

/// File retrieval endpoint (wildcard: keys contain slashes)
pub mod files {
    pub const FILE_BY_KEY: &str = "/api/v1/files/*key";
}

// Error codes implementation
// This module contains standardized error codes for the Argo CRM Engine

pub mod validation {
    pub const INVALID_INPUT: &str = "VALIDATION_1001";
    pub const MISSING_REQUIRED_FIELD: &str = "VALIDATION_1002";
    pub const INVALID_FORMAT: &str = "VALIDATION_1003";
}

pub mod database {
    pub const CONNECTION_FAILED: &str = "DB_4001";
    pub const QUERY_FAILED: &str = "DB_4002";
    pub const CONSTRAINT_VIOLATION: &str = "DB_4003";
    pub const RECORD_NOT_FOUND: &str = "DB_4004";
}

pub mod storage {
    pub const OBJECT_NOT_FOUND: &str = "STORAGE_5001";
    pub const INVALID_KEY: &str = "STORAGE_5002";
    pub const DOWNLOAD_FAILED: &str = "STORAGE_5003";
}

pub mod export {
    pub const ROW_LIMIT_EXCEEDED: &str = "EXPORT_6001";
}

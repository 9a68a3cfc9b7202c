use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

/// Map of field name to the validation/constraint messages reported for it
pub type FieldErrors = HashMap<String, Vec<String>>;

/// Standard API error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Error type/code
    pub error_type: String,
    /// Human-readable error message
    pub message: String,
    /// Field-specific validation/constraint errors
    #[serde(rename = "errors", skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<FieldErrors>,
    /// Timestamp when error occurred
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Standard API success response wrapper
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

/// Response body for successful deletes
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Main API error enum
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field_errors: Option<FieldErrors>,
    },

    #[error("Resource not found: {resource_type}")]
    NotFound { resource_type: String },

    #[error("Resource conflict: {message}")]
    Conflict {
        message: String,
        field_errors: Option<FieldErrors>,
    },

    #[error("Unprocessable entity: {message}")]
    UnprocessableEntity {
        message: String,
        field_errors: Option<FieldErrors>,
    },

    #[error("Database error: {0}")]
    Database(database_layer::DatabaseError),

    #[error("Internal server error: {message}")]
    Internal { message: String },

    #[error("Service unavailable: {message}")]
    ServiceUnavailable { message: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },
}

impl ApiError {
    /// Create a simple validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field_errors: None,
        }
    }

    /// Create a validation error reported against a single field
    pub fn field_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut field_errors = FieldErrors::new();
        field_errors.insert(field.into(), vec![message.clone()]);
        Self::Validation {
            message,
            field_errors: Some(field_errors),
        }
    }

    /// Create a not found error
    pub fn not_found(resource_type: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::UnprocessableEntity { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Database(db_err) => match db_err {
                database_layer::DatabaseError::NotFound => StatusCode::NOT_FOUND,
                database_layer::DatabaseError::ConnectionFailed(_) => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        }
    }

    /// Get the error type string
    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "validation_error",
            ApiError::NotFound { .. } => "not_found",
            ApiError::Conflict { .. } => "conflict",
            ApiError::UnprocessableEntity { .. } => "unprocessable_entity",
            ApiError::Database(_) => "database_error",
            ApiError::Internal { .. } => "internal_error",
            ApiError::ServiceUnavailable { .. } => "service_unavailable",
            ApiError::BadRequest { .. } => "bad_request",
        }
    }

    fn field_errors(&self) -> Option<FieldErrors> {
        match self {
            ApiError::Validation { field_errors, .. }
            | ApiError::Conflict { field_errors, .. }
            | ApiError::UnprocessableEntity { field_errors, .. } => field_errors.clone(),
            _ => None,
        }
    }
}

/// Convert database-layer errors to API errors.
///
/// Known constraint violations become field-keyed errors derived from the
/// constraint name; everything else keeps its category so the status-code
/// mapping above applies.
impl From<database_layer::DatabaseError> for ApiError {
    fn from(db_error: database_layer::DatabaseError) -> Self {
        use database_layer::{field_for_constraint, DatabaseError};

        match db_error {
            DatabaseError::UniqueViolation { ref constraint } => {
                let message = "A record with this value already exists".to_string();
                let field_errors = field_for_constraint(constraint).map(|field| {
                    let mut map = FieldErrors::new();
                    map.insert(field, vec![message.clone()]);
                    map
                });
                Self::Conflict {
                    message,
                    field_errors,
                }
            }
            DatabaseError::ForeignKeyViolation { ref constraint } => {
                let message = "Referenced record does not exist or is still referenced".to_string();
                let field_errors = field_for_constraint(constraint).map(|field| {
                    let mut map = FieldErrors::new();
                    map.insert(field, vec![message.clone()]);
                    map
                });
                Self::UnprocessableEntity {
                    message,
                    field_errors,
                }
            }
            DatabaseError::NotNullViolation { ref column } => {
                let message = "Required field is missing or empty".to_string();
                let mut map = FieldErrors::new();
                map.insert(column.clone(), vec![message.clone()]);
                Self::Validation {
                    message,
                    field_errors: Some(map),
                }
            }
            other => Self::Database(other),
        }
    }
}

/// Convert SQLx errors to API errors through the database-layer classifier
impl From<sqlx::Error> for ApiError {
    fn from(sqlx_error: sqlx::Error) -> Self {
        database_layer::DatabaseError::from(sqlx_error).into()
    }
}

/// Convert anyhow errors to API errors
impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        ApiError::Internal {
            message: error.to_string(),
        }
    }
}

/// Convert serde JSON errors to API errors
impl From<serde_json::Error> for ApiError {
    fn from(error: serde_json::Error) -> Self {
        ApiError::BadRequest {
            message: format!("Invalid JSON: {}", error),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4().to_string();
        let status_code = self.status_code();

        // Log the error with correlation ID
        error!(
            error_id = %error_id,
            error_type = %self.error_type(),
            status_code = %status_code.as_u16(),
            error = %self,
            "API error occurred"
        );

        let error_response = ApiErrorResponse {
            error_id,
            error_type: self.error_type().to_string(),
            message: self.to_string(),
            field_errors: self.field_errors(),
            timestamp: chrono::Utc::now(),
        };

        (status_code, Json(error_response)).into_response()
    }
}

/// Helper function to create successful API responses
pub fn api_success<T>(data: T) -> ApiResponse<T> {
    ApiResponse {
        success: true,
        data,
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use database_layer::DatabaseError;

    #[test]
    fn test_unique_violation_maps_to_conflict_with_field() {
        let err: ApiError = DatabaseError::UniqueViolation {
            constraint: "quotes_reference_number_key".to_string(),
        }
        .into();

        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        let fields = err.field_errors().expect("field errors expected");
        assert!(fields.contains_key("referenceNumber"));
    }

    #[test]
    fn test_foreign_key_violation_maps_to_unprocessable_with_field() {
        let err: ApiError = DatabaseError::ForeignKeyViolation {
            constraint: "projects_company_id_fkey".to_string(),
        }
        .into();

        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        let fields = err.field_errors().expect("field errors expected");
        assert_eq!(
            fields.get("companyId").map(Vec::len),
            Some(1)
        );
    }

    #[test]
    fn test_unconventional_constraint_has_no_field_map() {
        let err: ApiError = DatabaseError::UniqueViolation {
            constraint: "weird_constraint".to_string(),
        }
        .into();

        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert!(err.field_errors().is_none());
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let err: ApiError = DatabaseError::NotFound.into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_field_validation_shape() {
        let err = ApiError::field_validation("currency", "Currency is required");
        let fields = err.field_errors().expect("field errors expected");
        assert_eq!(
            fields.get("currency"),
            Some(&vec!["Currency is required".to_string()])
        );
    }
}

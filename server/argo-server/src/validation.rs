//! Request validation utilities for consistent validation across handlers
//!
//! This module provides a `RequestValidation` trait and helper macros to
//! centralize validation logic. Failures are reported against the field
//! that caused them, matching the field-keyed error map the API returns
//! for constraint violations.

use crate::error::ApiError;

/// Trait for validating request payloads
///
/// Implement this trait for all create/update request types to ensure
/// consistent validation across the API.
///
/// # Example
///
/// ```ignore
/// impl RequestValidation for CompanyInput {
///     fn validate(&self) -> Result<(), ApiError> {
///         validate_required!("name", self.name, "Name is required");
///         validate_length!("name", self.name, 1, 200, "Name must be between 1 and 200 characters");
///         Ok(())
///     }
/// }
/// ```
pub trait RequestValidation {
    /// Validates the request and returns a field-keyed error if it fails
    fn validate(&self) -> Result<(), ApiError>;
}

/// Macro for validating fields with custom predicates
///
/// # Usage
///
/// ```ignore
/// validate_field!("email", self.email.contains('@'), "Invalid email format");
/// ```
#[macro_export]
macro_rules! validate_field {
    ($field:literal, $predicate:expr, $message:expr) => {
        if !$predicate {
            return Err($crate::error::ApiError::field_validation($field, $message));
        }
    };
}

/// Macro for validating required fields (non-empty strings)
///
/// # Usage
///
/// ```ignore
/// validate_required!("name", self.name, "Name is required");
/// ```
#[macro_export]
macro_rules! validate_required {
    ($field:literal, $value:expr, $message:expr) => {
        validate_field!($field, !$value.trim().is_empty(), $message);
    };
}

/// Macro for validating string length
///
/// # Usage
///
/// ```ignore
/// validate_length!("name", self.name, 2, 100, "Name must be between 2 and 100 characters");
/// ```
#[macro_export]
macro_rules! validate_length {
    ($field:literal, $value:expr, $min:expr, $max:expr, $message:expr) => {
        let len = $value.len();
        validate_field!($field, len >= $min && len <= $max, $message);
    };
}

/// Macro for validating optional email fields (basic check)
///
/// # Usage
///
/// ```ignore
/// validate_email!("email", self.email, "Invalid email format");
/// ```
#[macro_export]
macro_rules! validate_email {
    ($field:literal, $value:expr, $message:expr) => {
        if let Some(ref email) = $value {
            validate_field!($field, email.contains('@') && email.contains('.'), $message);
        }
    };
}

/// Macro for validating non-negative monetary values
///
/// # Usage
///
/// ```ignore
/// validate_non_negative!("value", self.value, "Value must not be negative");
/// ```
#[macro_export]
macro_rules! validate_non_negative {
    ($field:literal, $value:expr, $message:expr) => {
        validate_field!($field, $value >= 0.0, $message);
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestRequest {
        name: String,
        email: Option<String>,
        value: f64,
    }

    impl RequestValidation for TestRequest {
        fn validate(&self) -> Result<(), ApiError> {
            validate_required!("name", self.name, "Name is required");
            validate_length!("name", self.name, 2, 100, "Name must be between 2 and 100 characters");
            validate_email!("email", self.email, "Invalid email format");
            validate_non_negative!("value", self.value, "Value must not be negative");
            Ok(())
        }
    }

    fn request() -> TestRequest {
        TestRequest {
            name: "Acme Trading".to_string(),
            email: Some("sales@acme.example".to_string()),
            value: 1000.0,
        }
    }

    #[test]
    fn test_validation_success() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn test_validation_empty_name() {
        let mut req = request();
        req.name = "".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_validation_invalid_email() {
        let mut req = request();
        req.email = Some("invalid-email".to_string());
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_validation_absent_email_is_fine() {
        let mut req = request();
        req.email = None;
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_validation_negative_value() {
        let mut req = request();
        req.value = -1.0;
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_error_is_keyed_by_field() {
        let mut req = request();
        req.name = " ".to_string();
        let err = req.validate().expect_err("validation must fail");
        match err {
            ApiError::Validation { field_errors, .. } => {
                let fields = field_errors.expect("field errors expected");
                assert!(fields.contains_key("name"));
            }
            other => panic!("unexpected error variant: {other:?}"),
        }
    }
}

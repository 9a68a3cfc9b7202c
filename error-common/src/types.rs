use thiserror::Error;

/// Simplified error enum for common use cases
#[derive(Error, Debug)]
pub enum ArgoError {
    /// Server configuration errors
    #[error("Server error: {0}")]
    ServerError(String),

    /// Database operation errors
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Object storage errors
    #[error("Storage error: {0}")]
    StorageError(String),

    /// CSV export errors
    #[error("Export error: {0}")]
    ExportError(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal system errors
    #[error("Internal error: {0}")]
    InternalError(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic error with context
    #[error("Error: {message}")]
    Generic { message: String },

    /// Wrapped external errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for Argo operations
pub type Result<T> = std::result::Result<T, ArgoError>;

/// Async logging function for errors
pub async fn log_error(context: &str, error: &ArgoError) {
    tracing::error!(
        context = context,
        error = %error,
        "Argo error occurred"
    );
}

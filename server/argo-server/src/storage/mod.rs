//! MinIO S3 storage access for uploaded files
//!
//! Quotes and registrations reference uploaded documents by opaque object
//! keys; this module resolves those keys against the configured bucket so
//! the file endpoint can stream them back.

use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// S3 storage service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct S3Config {
    pub endpoint: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    pub use_path_style: bool,
}

impl S3Config {
    /// Load S3 configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            endpoint: std::env::var("S3_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:9000".to_string()),
            region: std::env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            access_key: std::env::var("S3_ACCESS_KEY")
                .unwrap_or_else(|_| "minioadmin".to_string()),
            secret_key: std::env::var("S3_SECRET_KEY")
                .unwrap_or_else(|_| "minioadmin".to_string()),
            bucket: std::env::var("S3_BUCKET").unwrap_or_else(|_| "argo-files".to_string()),
            use_path_style: std::env::var("S3_USE_PATH_STYLE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Object not found: {key}")]
    NotFound { key: String },

    #[error("Storage request failed: {0}")]
    RequestFailed(String),
}

/// S3 storage service for the application file bucket
pub struct S3StorageService {
    client: Client,
    bucket: String,
}

impl S3StorageService {
    /// Create a new S3 storage service
    pub async fn new(config: S3Config) -> Self {
        info!(
            endpoint = %config.endpoint,
            region = %config.region,
            bucket = %config.bucket,
            "Initializing S3 storage service"
        );

        let credentials = aws_sdk_s3::config::Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "argo-s3",
        );

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(aws_config::Region::new(config.region.clone()))
            .load()
            .await;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .endpoint_url(&config.endpoint)
            .force_path_style(config.use_path_style)
            .build();

        let client = Client::from_conf(s3_config);

        info!("✅ S3 storage service initialized");

        Self {
            client,
            bucket: config.bucket,
        }
    }

    /// Download an object from the application bucket
    pub async fn download_file(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        debug!(bucket = %self.bucket, key = %key, "Downloading file from S3");

        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let service_error = e.into_service_error();
                if service_error.is_no_such_key() {
                    StorageError::NotFound {
                        key: key.to_string(),
                    }
                } else {
                    StorageError::RequestFailed(service_error.to_string())
                }
            })?;

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::RequestFailed(e.to_string()))?
            .into_bytes()
            .to_vec();

        info!(bucket = %self.bucket, key = %key, size = data.len(), "File downloaded");

        Ok(data)
    }
}

/// Validate an object key before any storage call.
///
/// Rejects traversal attempts (`..`), collapsed separators (`//`),
/// absolute keys, and empty keys.
pub fn validate_object_key(key: &str) -> bool {
    !key.is_empty()
        && !key.contains("..")
        && !key.contains("//")
        && !key.starts_with('/')
        && !key.contains('\\')
}

/// Infer a response content type from the key's extension
pub fn content_type_for_key(key: &str) -> &'static str {
    let extension = key.rsplit('.').next().unwrap_or_default().to_ascii_lowercase();
    match extension.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "csv" => "text/csv",
        "txt" => "text/plain",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "zip" => "application/zip",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_keys_pass() {
        assert!(validate_object_key("quotes/2024/offer.pdf"));
        assert!(validate_object_key("registrations/doc.docx"));
        assert!(validate_object_key("a"));
    }

    #[test]
    fn test_traversal_keys_are_rejected() {
        assert!(!validate_object_key("../etc/passwd"));
        assert!(!validate_object_key("quotes/../../secret"));
        assert!(!validate_object_key("quotes//offer.pdf"));
        assert!(!validate_object_key("/absolute/key"));
        assert!(!validate_object_key("windows\\style"));
        assert!(!validate_object_key(""));
    }

    #[test]
    fn test_content_type_inference() {
        assert_eq!(content_type_for_key("a/b/offer.pdf"), "application/pdf");
        assert_eq!(content_type_for_key("scan.JPG"), "image/jpeg");
        assert_eq!(content_type_for_key("export.csv"), "text/csv");
        assert_eq!(content_type_for_key("unknown.bin"), "application/octet-stream");
        assert_eq!(content_type_for_key("no-extension"), "application/octet-stream");
    }
}

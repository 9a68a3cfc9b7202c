use axum::{extract::State, Json};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::OnceLock;
use std::time::Instant;
use utoipa::ToSchema;

use crate::error::{api_success, ApiError, ApiResponse};
use crate::server::ArgoServer;

static STARTED_AT: OnceLock<Instant> = OnceLock::new();

fn uptime_seconds() -> u64 {
    STARTED_AT.get_or_init(Instant::now).elapsed().as_secs()
}

/// Health check response
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Overall system health status
    #[schema(example = "healthy")]
    pub status: String,
    /// Current timestamp in RFC3339 format
    pub timestamp: String,
    /// API version
    #[schema(example = "0.1.0")]
    pub version: String,
    /// Individual service health checks
    pub checks: HashMap<String, String>,
}

/// Version information response
#[derive(Debug, Serialize, ToSchema)]
pub struct VersionResponse {
    /// Application name
    #[schema(example = "Argo CRM Engine")]
    pub name: String,
    /// Application version
    pub version: String,
}

/// System status response
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    /// Server name
    pub server_name: String,
    /// Uptime in seconds
    pub uptime_seconds: u64,
    /// Whether the database answers a probe query
    pub database_healthy: bool,
    /// Number of entries currently held by the query cache
    pub cache_entries: usize,
}

/// Basic liveness probe
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(
    State(server): State<ArgoServer>,
) -> Result<Json<ApiResponse<HealthResponse>>, ApiError> {
    let database = if server.db.is_healthy().await {
        "up"
    } else {
        "down"
    };

    let mut checks = HashMap::new();
    checks.insert("database".to_string(), database.to_string());

    let status = if database == "up" { "healthy" } else { "degraded" };

    Ok(Json(api_success(HealthResponse {
        status: status.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks,
    })))
}

/// Version information
#[utoipa::path(
    get,
    path = "/version",
    responses(
        (status = 200, description = "Version information", body = VersionResponse)
    ),
    tag = "health"
)]
pub async fn version_info() -> Json<ApiResponse<VersionResponse>> {
    Json(api_success(VersionResponse {
        name: "Argo CRM Engine".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

/// Runtime status: uptime, database probe, cache size
#[utoipa::path(
    get,
    path = "/status",
    responses(
        (status = 200, description = "System status", body = StatusResponse)
    ),
    tag = "health"
)]
pub async fn system_status(
    State(server): State<ArgoServer>,
) -> Result<Json<ApiResponse<StatusResponse>>, ApiError> {
    Ok(Json(api_success(StatusResponse {
        server_name: server.config.name.clone(),
        uptime_seconds: uptime_seconds(),
        database_healthy: server.db.is_healthy().await,
        cache_entries: server.cache.len(),
    })))
}

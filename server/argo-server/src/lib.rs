//! Argo CRM Engine - HTTP server
//!
//! This library provides the core functionality of the Argo HTTP server:
//! list endpoints with URL-driven filter/sort/pagination state, validated
//! mutations with structured constraint errors, query-cache
//! synchronization, CSV export, and stored-file retrieval.

pub mod cache;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod server;
pub mod storage;
pub mod types;
pub mod utils;
pub mod validation;

// Re-export commonly used types
pub use error::*;
pub use server::ArgoServer;

use axum::{middleware::from_fn, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Create the main application router with all routes and middleware
pub fn create_app(server: ArgoServer) -> Router {
    routes::create_routes()
        .merge(openapi::swagger_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::create_cors_layer())
                .layer(from_fn(middleware::request_timing_middleware)),
        )
        .with_state(server)
}

//! HTTP route assembly.
//!
//! One API surface: the lookup endpoint, cache statistics, and the two
//! liveness probes.

use axum::http::Method;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tower_http::cors::{Any, CorsLayer};

use crate::state::AppState;

pub mod lookup;
pub mod stats;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/api/v1/lookup-vid", post(lookup::lookup_handler))
        .route("/api/v1/cache-stats", get(stats::stats_handler))
        .layer(cors_layer())
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

async fn root_handler() -> Json<Value> {
    Json(json!({
        "service": "vid-lookup",
        "status": "operational",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

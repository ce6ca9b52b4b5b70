use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::AppState;

/// Health check endpoint
///
/// Reports server status and database connectivity. Used by load balancers
/// and monitoring systems.
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let db_status = match &state.db {
        None => "not_configured",
        Some(db) => match db.ping().await {
            Ok(()) => "connected",
            Err(e) => {
                tracing::error!("Database health check failed: {:?}", e);
                "disconnected"
            }
        },
    };

    Json(json!({
        "status": if db_status == "disconnected" { "unhealthy" } else { "healthy" },
        "database": db_status,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

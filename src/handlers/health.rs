use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};

use crate::database;
use crate::state::AppState;

/// GET /health - liveness plus a database ping. Reports degraded with a 503
/// instead of failing the request when the pool cannot reach Postgres.
pub async fn check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match database::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "status": "ok",
                "database": "connected",
                "timestamp": chrono::Utc::now().to_rfc3339(),
            })),
        ),
        Err(e) => {
            tracing::warn!("health check failed to reach database: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "status": "degraded",
                    "database": "unreachable",
                    "timestamp": chrono::Utc::now().to_rfc3339(),
                })),
            )
        }
    }
}

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::warn;

use crate::api::{state::AppState, types::HealthResponse};

/// GET / -- service description and resource map
pub async fn root(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "message": format!("Welcome to the {}", state.config.app.name),
        "description": "NBA player, team and game statistics with analytics and predictions",
        "version": state.config.app.version,
        "endpoints": {
            "players": "/api/players",
            "teams": "/api/teams",
            "games": "/api/games",
            "analytics": "/api/analytics",
            "ml": "/api/ml",
            "health": "/health",
        },
    }))
}

/// GET /health -- liveness plus a database round trip
pub async fn health_handler(
    State(state): State<AppState>,
) -> std::result::Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let db_status = match state.repo.ping().await {
        Ok(()) => "connected",
        Err(e) => {
            warn!("Health check database ping failed: {}", e);
            "disconnected"
        }
    };

    let ok = db_status == "connected";
    let resp = HealthResponse {
        status: if ok { "healthy" } else { "degraded" }.to_string(),
        timestamp: Utc::now().timestamp_micros() as f64 / 1_000_000.0,
        version: state.config.app.version.clone(),
        database: db_status.to_string(),
        uptime_seconds: state.uptime_seconds(),
    };

    if ok {
        Ok(Json(resp))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(resp)))
    }
}

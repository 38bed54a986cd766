use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::api::{handlers, state::AppState, types::ErrorBody};
use crate::config::CorsConfig;

pub const PROCESS_TIME_HEADER: &str = "x-process-time";

pub fn create_router(state: AppState, cors: &CorsConfig) -> Router {
    let players = Router::new()
        .route(
            "/",
            get(handlers::list_players).post(handlers::create_player),
        )
        .route("/search", get(handlers::search_players))
        .route(
            "/:id",
            get(handlers::get_player)
                .put(handlers::update_player)
                .delete(handlers::delete_player),
        )
        .route("/:id/stats", get(handlers::get_player_stats))
        .route("/:id/analytics", get(handlers::get_player_analytics))
        .route("/:id/similar", get(handlers::get_similar_players));

    let teams = Router::new()
        .route("/", get(handlers::list_teams).post(handlers::create_team))
        .route("/:id", get(handlers::get_team).put(handlers::update_team))
        .route("/:id/players", get(handlers::get_team_players))
        .route("/:id/analytics", get(handlers::get_team_analytics));

    let games = Router::new()
        .route("/", get(handlers::list_games).post(handlers::create_game))
        .route("/:id", get(handlers::get_game).put(handlers::update_game))
        .route("/:id/stats", post(handlers::add_player_stats));

    let analytics = Router::new()
        .route("/", get(handlers::analytics_overview))
        .route("/league-leaders", get(handlers::get_league_leaders))
        .route("/team-comparisons", get(handlers::get_team_comparison))
        .route("/player-efficiency", get(handlers::get_player_efficiency))
        .route("/advanced-metrics", get(handlers::get_advanced_metrics))
        .route("/trends", get(handlers::get_trends));

    let ml = Router::new()
        .route("/", get(handlers::ml_overview))
        .route(
            "/predict/game-outcome",
            post(handlers::predict_game_outcome),
        )
        .route(
            "/predict/player-performance",
            post(handlers::predict_player_performance),
        )
        .route("/models/status", get(handlers::get_model_status))
        .route("/models/retrain", post(handlers::retrain_model))
        .route("/features/importance", get(handlers::get_feature_importance))
        .route("/experiments", get(handlers::get_experiments));

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_handler))
        .nest("/api/players", players)
        .nest("/api/teams", teams)
        .nest("/api/games", games)
        .nest("/api/analytics", analytics)
        .nest("/api/ml", ml)
        .fallback(not_found)
        .with_state(state)
        .layer(middleware::from_fn(process_time))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors))
}

/// Origins come from config; `*` anywhere in the list opens the API to every origin.
/// Credentials are never allowed since they cannot be combined with a wildcard.
fn cors_layer(cors: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if cors.allows_any() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = cors
        .allowed_origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o.trim()) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", o);
                None
            }
        })
        .collect();
    layer.allow_origin(origins)
}

/// Adds the handling time in seconds to every response
async fn process_time(req: Request, next: Next) -> Response {
    let started = Instant::now();
    let mut response = next.run(req).await;
    let elapsed = format!("{:.6}", started.elapsed().as_secs_f64());
    if let Ok(value) = HeaderValue::from_str(&elapsed) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(PROCESS_TIME_HEADER), value);
    }
    response
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            detail: "Not Found".to_string(),
        }),
    )
}

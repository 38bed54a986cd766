use axum::{
    extract::State,
    Json,
};

use crate::api::{error::{ApiJson, ApiPath, ApiQuery, ApiResult}, state::AppState, types::GameListQuery};
use crate::domain::{Game, GameCreate, GameUpdate, PaginatedResponse, PlayerStats, PlayerStatsCreate};

/// GET /api/games -- paginated, newest first
pub async fn list_games(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<GameListQuery>,
) -> ApiResult<PaginatedResponse<Game>> {
    let filter = query.into_filter()?;
    Ok(Json(state.games().list(&filter).await?))
}

pub async fn get_game(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<Game> {
    Ok(Json(state.games().get(id).await?))
}

pub async fn create_game(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<GameCreate>,
) -> ApiResult<Game> {
    Ok(Json(state.games().create(&body).await?))
}

pub async fn update_game(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(body): ApiJson<GameUpdate>,
) -> ApiResult<Game> {
    Ok(Json(state.games().update(id, &body).await?))
}

/// POST /api/games/:id/stats -- one player's box score
pub async fn add_player_stats(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(body): ApiJson<PlayerStatsCreate>,
) -> ApiResult<PlayerStats> {
    Ok(Json(state.games().record_stats(id, &body).await?))
}

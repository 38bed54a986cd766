use axum::{
    extract::State,
    Json,
};

use crate::api::{
    error::{ApiJson, ApiPath, ApiQuery, ApiResult},
    state::AppState,
    types::{season, PlayerListQuery, PlayerSearchQuery, PlayerStatsQuery, SeasonQuery, SimilarPlayersQuery},
};
use crate::domain::{Player, PlayerAnalytics, PlayerCreate, PlayerUpdate};
use crate::services::players::{DeactivatedPlayer, PlayerStatsResponse, SimilarPlayersResponse};

/// GET /api/players
pub async fn list_players(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PlayerListQuery>,
) -> ApiResult<Vec<Player>> {
    let filter = query.into_filter()?;
    Ok(Json(state.players().list(&filter).await?))
}

/// GET /api/players/search
pub async fn search_players(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PlayerSearchQuery>,
) -> ApiResult<Vec<Player>> {
    let search = query.into_search()?;
    Ok(Json(state.players().search(&search).await?))
}

pub async fn get_player(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<Player> {
    Ok(Json(state.players().get(id).await?))
}

pub async fn get_player_stats(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<PlayerStatsQuery>,
) -> ApiResult<PlayerStatsResponse> {
    query.validate()?;
    let season = season(query.season)?;
    Ok(Json(
        state.players().stats(id, season, query.last_n_games).await?,
    ))
}

pub async fn get_player_analytics(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<SeasonQuery>,
) -> ApiResult<PlayerAnalytics> {
    let season = season(query.season)?;
    Ok(Json(state.players().analytics(id, season).await?))
}

pub async fn get_similar_players(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<SimilarPlayersQuery>,
) -> ApiResult<SimilarPlayersResponse> {
    let limit = query.limit()?;
    let season = season(query.season)?;
    Ok(Json(state.players().similar(id, season, limit).await?))
}

/// POST /api/players
pub async fn create_player(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<PlayerCreate>,
) -> ApiResult<Player> {
    Ok(Json(state.players().create(&body).await?))
}

pub async fn update_player(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(body): ApiJson<PlayerUpdate>,
) -> ApiResult<Player> {
    Ok(Json(state.players().update(id, &body).await?))
}

/// DELETE /api/players/:id -- soft delete
pub async fn delete_player(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<DeactivatedPlayer> {
    Ok(Json(state.players().deactivate(id).await?))
}

use axum::{
    extract::State,
    Json,
};
use serde_json::{json, Value};

use crate::analysis::{LeaderStat, TeamComparison, TimePeriod, TrendType};
use crate::api::{
    error::{ApiQuery, ApiResult},
    state::AppState,
    types::{
        min_games, season, AdvancedMetricsQuery, LeagueLeadersQuery, PlayerEfficiencyQuery,
        TeamComparisonQuery, TrendsQuery,
    },
};
use crate::services::analytics::{
    AdvancedMetricsResponse, LeagueLeadersResponse, MetricType, PlayerEfficiencyResponse,
    TrendResponse,
};
use crate::validation::validate_range;

/// GET /api/analytics
pub async fn analytics_overview() -> Json<Value> {
    let stats: Vec<&str> = LeaderStat::ALL.iter().map(|s| s.as_str()).collect();
    Json(json!({
        "message": "NBA analytics",
        "endpoints": {
            "league_leaders": "/api/analytics/league-leaders",
            "team_comparisons": "/api/analytics/team-comparisons",
            "player_efficiency": "/api/analytics/player-efficiency",
            "advanced_metrics": "/api/analytics/advanced-metrics",
            "trends": "/api/analytics/trends",
        },
        "leader_stats": stats,
    }))
}

pub async fn get_league_leaders(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<LeagueLeadersQuery>,
) -> ApiResult<LeagueLeadersResponse> {
    let stat = LeaderStat::try_from(query.stat.as_deref().unwrap_or("points"))?;
    let limit = query.limit.unwrap_or(10);
    validate_range(limit, "limit", 1, 50)?;
    let min_games = min_games(query.min_games, 1)?;
    let season = season(query.season)?;

    Ok(Json(
        state
            .analytics()
            .league_leaders(stat, season, limit as usize, min_games)
            .await?,
    ))
}

pub async fn get_team_comparison(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<TeamComparisonQuery>,
) -> ApiResult<TeamComparison> {
    let season = season(query.season)?;
    Ok(Json(
        state
            .analytics()
            .team_comparison(query.team1_id, query.team2_id, season)
            .await?,
    ))
}

pub async fn get_player_efficiency(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PlayerEfficiencyQuery>,
) -> ApiResult<PlayerEfficiencyResponse> {
    let position = query.position()?;
    let min_games = min_games(query.min_games, 10)?;
    Ok(Json(
        state
            .analytics()
            .player_efficiency(query.player_id, position, min_games)
            .await?,
    ))
}

pub async fn get_advanced_metrics(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<AdvancedMetricsQuery>,
) -> ApiResult<AdvancedMetricsResponse> {
    let metric_type = MetricType::try_from(query.metric_type.as_deref().unwrap_or("team"))?;
    let season = season(query.season)?;
    Ok(Json(
        state.analytics().advanced_metrics(metric_type, season).await?,
    ))
}

pub async fn get_trends(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<TrendsQuery>,
) -> ApiResult<TrendResponse> {
    let trend_type = TrendType::try_from(query.trend_type.as_deref().unwrap_or("scoring"))?;
    let time_period = TimePeriod::try_from(query.time_period.as_deref().unwrap_or("season"))?;
    let season = season(query.season)?;
    Ok(Json(
        state
            .analytics()
            .trends(trend_type, time_period, season)
            .await?,
    ))
}

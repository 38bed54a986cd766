use axum::{
    extract::State,
    Json,
};

use crate::api::{
    error::{ApiJson, ApiPath, ApiQuery, ApiResult},
    state::AppState,
    types::{season, SeasonQuery, TeamListQuery},
};
use crate::domain::{Player, Team, TeamAnalytics, TeamCreate, TeamUpdate};

/// GET /api/teams
pub async fn list_teams(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<TeamListQuery>,
) -> ApiResult<Vec<Team>> {
    let filter = query.into_filter()?;
    Ok(Json(state.teams().list(&filter).await?))
}

pub async fn get_team(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<Team> {
    Ok(Json(state.teams().get(id).await?))
}

/// GET /api/teams/:id/players -- active roster
pub async fn get_team_players(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Vec<Player>> {
    Ok(Json(state.teams().roster(id).await?))
}

pub async fn get_team_analytics(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<SeasonQuery>,
) -> ApiResult<TeamAnalytics> {
    let season = season(query.season)?;
    Ok(Json(state.teams().analytics(id, season).await?))
}

pub async fn create_team(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<TeamCreate>,
) -> ApiResult<Team> {
    Ok(Json(state.teams().create(&body).await?))
}

pub async fn update_team(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(body): ApiJson<TeamUpdate>,
) -> ApiResult<Team> {
    Ok(Json(state.teams().update(id, &body).await?))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{app, get_json, send_json};
    use crate::persistence::MockNbaRepository;
    use crate::services::test_support::{player, team};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_list_teams_default_limit() {
        let mut repo = MockNbaRepository::new();
        repo.expect_list_teams()
            .withf(|f| f.limit == 30 && f.is_active == Some(true))
            .returning(|_| Ok(vec![team(1, "BOS"), team(2, "LAL")]));

        let (status, body) = get_json(app(repo), "/api/teams").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_roster_of_missing_team() {
        let mut repo = MockNbaRepository::new();
        repo.expect_get_team().returning(|_| Ok(None));
        repo.expect_list_players().never();

        let (status, body) = get_json(app(repo), "/api/teams/42/players").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Team not found");
    }

    #[tokio::test]
    async fn test_roster_only_active_players() {
        let mut repo = MockNbaRepository::new();
        repo.expect_get_team()
            .returning(|id| Ok(Some(team(id, "DEN"))));
        repo.expect_list_players()
            .withf(|f| f.team_id == Some(7) && f.is_active == Some(true))
            .returning(|_| Ok(vec![player(15, "Nikola Jokic")]));

        let (status, body) = get_json(app(repo), "/api/teams/7/players").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["name"], "Nikola Jokic");
    }

    #[tokio::test]
    async fn test_analytics_without_games() {
        let mut repo = MockNbaRepository::new();
        repo.expect_get_team()
            .returning(|id| Ok(Some(team(id, "DEN"))));
        repo.expect_completed_games().returning(|_| Ok(vec![]));
        repo.expect_stat_lines().returning(|_| Ok(vec![]));

        let (status, _) = get_json(app(repo), "/api/teams/7/analytics?season=2023-24").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_abbreviation() {
        let mut repo = MockNbaRepository::new();
        repo.expect_find_team_by_abbreviation()
            .returning(|abbr| Ok(Some(team(1, abbr))));
        repo.expect_find_team_by_external_id().returning(|_| Ok(None));
        repo.expect_insert_team().never();

        let (status, _) = send_json(
            app(repo),
            "POST",
            "/api/teams",
            json!({"name": "Celtics", "city": "Boston", "abbreviation": "BOS"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

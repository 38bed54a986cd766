use axum::{
    extract::State,
    Json,
};
use serde_json::{json, Value};

use crate::api::{
    error::{ApiJson, ApiQuery, ApiResult},
    state::AppState,
    types::{FeatureImportanceQuery, PlayerPerformanceQuery, RetrainQuery},
};
use crate::ml::registry::RegistrySnapshot;
use crate::ml::{ExperimentRun, ModelKind, PlayerPerformanceResponse, PredictionResponse};
use crate::services::ml::{FeatureImportanceResponse, GamePredictionRequest, RetrainResponse};

/// GET /api/ml
pub async fn ml_overview() -> Json<Value> {
    let models: serde_json::Map<String, Value> = ModelKind::ALL
        .iter()
        .map(|k| (k.as_str().to_string(), Value::from(k.description())))
        .collect();
    Json(json!({
        "message": "NBA machine learning models",
        "models_available": models,
        "endpoints": {
            "predict_game_outcome": "/api/ml/predict/game-outcome",
            "predict_player_performance": "/api/ml/predict/player-performance",
            "model_status": "/api/ml/models/status",
            "retrain": "/api/ml/models/retrain",
            "feature_importance": "/api/ml/features/importance",
            "experiments": "/api/ml/experiments",
        },
    }))
}

pub async fn predict_game_outcome(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<GamePredictionRequest>,
) -> ApiResult<PredictionResponse> {
    Ok(Json(state.ml().predict_game_outcome(&body).await?))
}

pub async fn predict_player_performance(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PlayerPerformanceQuery>,
) -> ApiResult<PlayerPerformanceResponse> {
    Ok(Json(
        state
            .ml()
            .predict_player_performance(query.player_id, query.game_id, query.opponent_team_id)
            .await?,
    ))
}

pub async fn get_model_status(State(state): State<AppState>) -> Json<RegistrySnapshot> {
    Json(state.ml().status().await)
}

/// POST /api/ml/models/retrain -- background by default
pub async fn retrain_model(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<RetrainQuery>,
) -> ApiResult<RetrainResponse> {
    let kind = ModelKind::try_from(query.model_name.as_str())?;
    let background = query.background.unwrap_or(true);
    Ok(Json(state.ml().retrain(kind, background).await?))
}

pub async fn get_feature_importance(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<FeatureImportanceQuery>,
) -> ApiResult<FeatureImportanceResponse> {
    let kind = ModelKind::try_from(query.model_name.as_deref().unwrap_or("game_predictor"))?;
    let top_n = query.top_n()?;
    Ok(Json(state.ml().feature_importance(kind, top_n).await?))
}

pub async fn get_experiments(State(state): State<AppState>) -> Json<Vec<ExperimentRun>> {
    Json(state.ml().experiments().await)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{app, get_json, send_json};
    use crate::ml::features::test_support::season;
    use crate::persistence::MockNbaRepository;
    use crate::services::test_support::team;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_overview_lists_models() {
        let (status, body) = get_json(app(MockNbaRepository::new()), "/api/ml").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["models_available"]["game_predictor"].is_string());
        assert!(body["models_available"]["player_performance"].is_string());
    }

    #[tokio::test]
    async fn test_predict_game_outcome() {
        let mut repo = MockNbaRepository::new();
        repo.expect_get_team()
            .returning(|id| Ok(Some(team(id, "TM"))));
        repo.expect_completed_games().returning(|_| Ok(season()));

        let (status, body) = send_json(
            app(repo),
            "POST",
            "/api/ml/predict/game-outcome",
            json!({"home_team_id": 1, "away_team_id": 3}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let home = body["home_win_probability"].as_f64().unwrap();
        let away = body["away_win_probability"].as_f64().unwrap();
        assert!((home + away - 1.0).abs() <= 0.01);
    }

    #[tokio::test]
    async fn test_predict_missing_team() {
        let mut repo = MockNbaRepository::new();
        repo.expect_get_team().returning(|_| Ok(None));

        let (status, body) = send_json(
            app(repo),
            "POST",
            "/api/ml/predict/game-outcome",
            json!({"home_team_id": 1, "away_team_id": 3}),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Team not found");
    }

    #[tokio::test]
    async fn test_retrain_unknown_model() {
        let (status, body) = send_json(
            app(MockNbaRepository::new()),
            "POST",
            "/api/ml/models/retrain?model_name=neural_net",
            json!({}),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["detail"].as_str().unwrap().contains("neural_net"));
    }

    #[tokio::test]
    async fn test_feature_importance_bounds() {
        let app = app(MockNbaRepository::new());
        let (status, _) = get_json(app.clone(), "/api/ml/features/importance?top_n=3").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = get_json(app, "/api/ml/features/importance").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["model_name"], "game_predictor");
        assert_eq!(body["features"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_status_and_experiments_start_empty() {
        let app = app(MockNbaRepository::new());
        let (status, body) = get_json(app.clone(), "/api/ml/models/status").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_predictions"], 0);

        let (_, runs) = get_json(app, "/api/ml/experiments").await;
        assert_eq!(runs.as_array().unwrap().len(), 0);
    }
}

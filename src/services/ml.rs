//! Predictions, retraining and model introspection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::domain::{BoxScore, StatLineFilter, Team};
use crate::error::{NbaError, Result};
use crate::ml::features::{league_points_per_team, team_form, training_samples};
use crate::ml::player_performance::{backtest, opponent_factor, WINDOWS};
use crate::ml::registry::{ExperimentRun, ModelKind, ModelStatus, RegistrySnapshot};
use crate::ml::{
    predict_game, project_player, FeatureImportance, GamePredictor, ModelRegistry,
    PlayerPerformanceResponse, PredictionResponse,
};
use crate::persistence::NbaRepository;
use crate::services::players::PLAYER_NOT_FOUND;
use crate::services::teams::TEAM_NOT_FOUND;

/// Stat lines fed into a player projection
const PROJECTION_HISTORY: i64 = 20;

#[derive(Debug, Clone, Deserialize)]
pub struct GamePredictionRequest {
    pub home_team_id: i64,
    pub away_team_id: i64,
    #[serde(default)]
    pub game_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RetrainResponse {
    pub model_name: ModelKind,
    pub run_id: u64,
    pub status: ModelStatus,
    pub message: String,
    pub metrics: Option<BTreeMap<String, f64>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeatureImportanceResponse {
    pub model_name: ModelKind,
    pub model_version: String,
    pub features: Vec<FeatureImportance>,
}

#[derive(Clone)]
pub struct MlService {
    repo: Arc<dyn NbaRepository>,
    models: Arc<RwLock<ModelRegistry>>,
}

impl MlService {
    pub fn new(repo: Arc<dyn NbaRepository>, models: Arc<RwLock<ModelRegistry>>) -> Self {
        Self { repo, models }
    }

    async fn team(&self, id: i64) -> Result<Team> {
        self.repo
            .get_team(id)
            .await?
            .ok_or_else(|| NbaError::not_found(TEAM_NOT_FOUND))
    }

    pub async fn predict_game_outcome(
        &self,
        request: &GamePredictionRequest,
    ) -> Result<PredictionResponse> {
        if request.home_team_id == request.away_team_id {
            return Err(NbaError::validation(
                "home_team_id and away_team_id must differ",
            ));
        }
        let home = self.team(request.home_team_id).await?;
        let away = self.team(request.away_team_id).await?;

        let mut games = self.repo.completed_games(None).await?;
        if let Some(date) = request.game_date {
            games.retain(|g| g.game_date < date);
        }
        let home_form = team_form(home.id, &games);
        let away_form = team_form(away.id, &games);
        let league = league_points_per_team(&games);

        let (prediction, version) = {
            let models = self.models.read().await;
            let model = models.game_predictor();
            (
                predict_game(model, &home_form, &away_form, league),
                model.metadata.version.clone(),
            )
        };
        let response =
            PredictionResponse::new(&home, &away, prediction, version, request.game_date)?;

        self.models
            .write()
            .await
            .record_prediction(ModelKind::GamePredictor);
        Ok(response)
    }

    pub async fn predict_player_performance(
        &self,
        player_id: i64,
        game_id: Option<i64>,
        opponent_team_id: Option<i64>,
    ) -> Result<PlayerPerformanceResponse> {
        let player = self
            .repo
            .get_player(player_id)
            .await?
            .ok_or_else(|| NbaError::not_found(PLAYER_NOT_FOUND))?;

        let mut opponent = opponent_team_id;
        if let Some(game_id) = game_id {
            let game = self
                .repo
                .get_game(game_id)
                .await?
                .ok_or_else(|| NbaError::not_found("Game not found"))?;
            if opponent.is_none() {
                opponent = match player.team_id {
                    Some(t) if t == game.home_team_id => Some(game.away_team_id),
                    Some(t) if t == game.away_team_id => Some(game.home_team_id),
                    _ => None,
                };
            }
        }
        if let Some(id) = opponent {
            self.team(id).await?;
        }

        let recent: Vec<BoxScore> = self
            .repo
            .player_stats(&StatLineFilter {
                player_id: Some(player_id),
                last_n_games: Some(PROJECTION_HISTORY),
                ..Default::default()
            })
            .await?
            .into_iter()
            .map(|s| s.line)
            .collect();

        let adjustment = match opponent {
            Some(id) => opponent_factor(id, &self.repo.completed_games(None).await?),
            None => 1.0,
        };
        let projection = project_player(&recent, adjustment)
            .ok_or_else(|| NbaError::not_found("No statistics found for player"))?;

        let version = self
            .models
            .read()
            .await
            .entry(ModelKind::PlayerPerformance)
            .version
            .clone();
        let response = PlayerPerformanceResponse::new(
            player.id,
            player.name,
            game_id,
            opponent,
            projection,
            version,
        )?;

        self.models
            .write()
            .await
            .record_prediction(ModelKind::PlayerPerformance);
        Ok(response)
    }

    pub async fn status(&self) -> RegistrySnapshot {
        self.models.read().await.snapshot()
    }

    pub async fn experiments(&self) -> Vec<ExperimentRun> {
        self.models.read().await.experiments()
    }

    /// Start a training run. In the background the call returns as soon as
    /// the run is registered; otherwise it waits for the metrics.
    pub async fn retrain(&self, kind: ModelKind, background: bool) -> Result<RetrainResponse> {
        let run_id = self.models.write().await.begin_training(kind)?;
        info!("Retraining {} (run {}, background={})", kind.as_str(), run_id, background);

        if background {
            let service = self.clone();
            tokio::spawn(async move {
                if let Err(e) = service.train(kind, run_id).await {
                    error!("Background training of {} failed: {}", kind.as_str(), e);
                }
            });
            return Ok(RetrainResponse {
                model_name: kind,
                run_id,
                status: ModelStatus::Training,
                message: format!("Retraining {} started in background", kind.as_str()),
                metrics: None,
            });
        }

        let metrics = self.train(kind, run_id).await?;
        Ok(RetrainResponse {
            model_name: kind,
            run_id,
            status: ModelStatus::Ready,
            message: format!("{} retrained", kind.as_str()),
            metrics: Some(metrics),
        })
    }

    /// Run one training job and settle the registry either way
    async fn train(&self, kind: ModelKind, run_id: u64) -> Result<BTreeMap<String, f64>> {
        let outcome = match kind {
            ModelKind::GamePredictor => self.train_game_model(run_id).await,
            ModelKind::PlayerPerformance => self.train_player_model(run_id).await,
        };
        if let Err(e) = &outcome {
            self.models
                .write()
                .await
                .fail_training(run_id, kind, e.to_string());
        }
        outcome
    }

    async fn train_game_model(&self, run_id: u64) -> Result<BTreeMap<String, f64>> {
        let games = self.repo.completed_games(None).await?;
        let samples = training_samples(&games);
        let version = format!("v{}", Utc::now().format("%Y%m%d%H%M%S"));

        let path = self.models.read().await.game_model_path();

        // Fitting and the file write both block, so neither runs under the registry lock
        let model = tokio::task::spawn_blocking(move || -> Result<GamePredictor> {
            let model = GamePredictor::fit(&samples, version)?;
            if let Err(e) = model.to_file(&path) {
                warn!("Could not save game model to {}: {}", path.display(), e);
            }
            Ok(model)
        })
        .await
        .map_err(|e| NbaError::Internal(format!("training task panicked: {}", e)))??;

        let mut models = self.models.write().await;
        info!(
            "Game model {} trained on {} rows (accuracy {:?})",
            model.metadata.version, model.metadata.n_samples, model.metadata.accuracy
        );
        models.complete_game_training(run_id, model);
        Ok(models.entry(ModelKind::GamePredictor).metrics.clone())
    }

    async fn train_player_model(&self, run_id: u64) -> Result<BTreeMap<String, f64>> {
        let lines = self.repo.stat_lines(&StatLineFilter::default()).await?;

        // stat_lines is oldest first, so each history stays chronological
        let mut histories: HashMap<i64, Vec<BoxScore>> = HashMap::new();
        for line in &lines {
            histories.entry(line.player_id).or_default().push(line.line);
        }
        let metrics = backtest(histories.values().map(|h| h.as_slice())).ok_or_else(|| {
            NbaError::Model("no player has enough games to backtest projections".to_string())
        })?;

        let version = format!("rolling-{}", Utc::now().format("%Y%m%d%H%M%S"));
        info!(
            "Player model {} backtested over {} predictions (MAE {:.2})",
            version, metrics.n_predictions, metrics.mae_points
        );
        let mut models = self.models.write().await;
        models.complete_player_training(run_id, version, metrics);
        Ok(models.entry(ModelKind::PlayerPerformance).metrics.clone())
    }

    pub async fn feature_importance(
        &self,
        kind: ModelKind,
        top_n: usize,
    ) -> Result<FeatureImportanceResponse> {
        let models = self.models.read().await;
        let mut features = match kind {
            ModelKind::GamePredictor => models.game_predictor().feature_importance(),
            ModelKind::PlayerPerformance => WINDOWS
                .iter()
                .map(|(size, weight)| FeatureImportance {
                    feature: format!("last_{}_games_average", size),
                    coefficient: *weight,
                    importance: *weight,
                })
                .collect(),
        };
        features.truncate(top_n);

        Ok(FeatureImportanceResponse {
            model_name: kind,
            model_version: models.entry(kind).version.clone(),
            features,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PlayerStats, StatLine};
    use crate::ml::features::test_support::{completed, season};
    use crate::persistence::MockNbaRepository;
    use crate::services::test_support::{player, team};
    use chrono::TimeZone;

    fn service(repo: MockNbaRepository) -> MlService {
        MlService::new(
            Arc::new(repo),
            Arc::new(RwLock::new(ModelRegistry::default())),
        )
    }

    #[tokio::test]
    async fn test_game_prediction_is_valid_and_counted() {
        let mut repo = MockNbaRepository::new();
        repo.expect_get_team()
            .returning(|id| Ok(Some(team(id, "TM"))));
        repo.expect_completed_games().returning(|_| Ok(season()));

        let ml = service(repo);
        let request = GamePredictionRequest {
            home_team_id: 1,
            away_team_id: 3,
            game_date: None,
        };
        let prediction = ml.predict_game_outcome(&request).await.unwrap();
        assert!(prediction.home_win_probability > 0.5);
        assert!(
            (prediction.home_win_probability + prediction.away_win_probability - 1.0).abs()
                <= 0.01
        );
        assert!(prediction.predicted_home_score.is_some());
        assert_eq!(prediction.model_version, "prior");
        assert_eq!(ml.status().await.total_predictions, 1);
    }

    #[tokio::test]
    async fn test_same_team_prediction_rejected() {
        let ml = service(MockNbaRepository::new());
        let request = GamePredictionRequest {
            home_team_id: 2,
            away_team_id: 2,
            game_date: None,
        };
        assert!(matches!(
            ml.predict_game_outcome(&request).await,
            Err(NbaError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_player_projection_derives_opponent_from_game() {
        let mut repo = MockNbaRepository::new();
        repo.expect_get_player().returning(|id| {
            let mut p = player(id, "Guard");
            p.team_id = Some(1);
            Ok(Some(p))
        });
        repo.expect_get_game()
            .returning(|id| Ok(Some(completed(id, 1, 2, 0, 0))));
        repo.expect_get_team()
            .withf(|id| *id == 2)
            .returning(|id| Ok(Some(team(id, "OPP"))));
        repo.expect_player_stats().returning(|f| {
            assert_eq!(f.last_n_games, Some(20));
            Ok((0..6)
                .map(|i| {
                    let line = BoxScore {
                        points: 20,
                        rebounds: 5,
                        ..Default::default()
                    };
                    PlayerStats::new(i, 9, i, Some(1), line, Utc::now())
                })
                .collect())
        });
        repo.expect_completed_games().returning(|_| Ok(vec![]));

        let ml = service(repo);
        let out = ml
            .predict_player_performance(9, Some(50), None)
            .await
            .unwrap();
        assert_eq!(out.opponent_team_id, Some(2));
        assert_eq!(out.projection.projected["points"], 20.0);
        assert_eq!(out.projection.opponent_adjustment, 1.0);
    }

    #[tokio::test]
    async fn test_foreground_retrain_updates_registry() {
        let mut repo = MockNbaRepository::new();
        repo.expect_completed_games().returning(|_| Ok(season()));

        let dir = tempfile::tempdir().unwrap();
        let ml = MlService::new(
            Arc::new(repo),
            Arc::new(RwLock::new(ModelRegistry::new(
                dir.path(),
                GamePredictor::default(),
            ))),
        );
        let out = ml.retrain(ModelKind::GamePredictor, false).await.unwrap();
        assert_eq!(out.status, ModelStatus::Ready);
        assert!(out.metrics.unwrap().contains_key("accuracy"));
        assert!(dir.path().join("game_predictor.json").exists());

        let runs = ml.experiments().await;
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].status, ModelStatus::Ready);
    }

    #[tokio::test]
    async fn test_retrain_survives_unwritable_model_dir() {
        let mut repo = MockNbaRepository::new();
        repo.expect_completed_games().returning(|_| Ok(season()));

        let dir = tempfile::tempdir().unwrap();
        let not_a_dir = dir.path().join("models");
        std::fs::write(&not_a_dir, b"occupied").unwrap();

        let ml = MlService::new(
            Arc::new(repo),
            Arc::new(RwLock::new(ModelRegistry::new(
                &not_a_dir,
                GamePredictor::default(),
            ))),
        );
        let out = ml.retrain(ModelKind::GamePredictor, false).await.unwrap();
        assert_eq!(out.status, ModelStatus::Ready);
        assert!(!not_a_dir.join("game_predictor.json").exists());
    }

    #[tokio::test]
    async fn test_player_retrain_without_history_fails() {
        let mut repo = MockNbaRepository::new();
        repo.expect_stat_lines().returning(|_| {
            Ok(vec![StatLine {
                player_id: 1,
                player_name: "Rookie".into(),
                position: None,
                team_id: None,
                game_id: 1,
                season: "2023-24".into(),
                game_date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                line: BoxScore::default(),
            }])
        });

        let ml = service(repo);
        assert!(ml
            .retrain(ModelKind::PlayerPerformance, false)
            .await
            .is_err());
        let status = ml.status().await;
        let entry = status
            .models
            .iter()
            .find(|m| m.name == ModelKind::PlayerPerformance)
            .unwrap();
        assert_eq!(entry.status, ModelStatus::Failed);
    }

    #[tokio::test]
    async fn test_feature_importance_top_n() {
        let ml = service(MockNbaRepository::new());
        let out = ml
            .feature_importance(ModelKind::GamePredictor, 2)
            .await
            .unwrap();
        assert_eq!(out.features.len(), 2);
        assert_eq!(out.model_version, "prior");
    }
}

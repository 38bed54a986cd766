//! In-process model registry: current game model, per-model status and the
//! history of training runs.
//!
//! Shared behind `tokio::sync::RwLock` in `AppState`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::game_predictor::GamePredictor;
use super::player_performance::BacktestMetrics;
use crate::error::{NbaError, Result};

/// Training runs kept in memory
const MAX_EXPERIMENTS: usize = 100;

pub const GAME_MODEL_FILE: &str = "game_predictor.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    GamePredictor,
    PlayerPerformance,
}

impl ModelKind {
    pub const ALL: [ModelKind; 2] = [ModelKind::GamePredictor, ModelKind::PlayerPerformance];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::GamePredictor => "game_predictor",
            ModelKind::PlayerPerformance => "player_performance",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ModelKind::GamePredictor => {
                "Logistic win probability from win% difference, net rating difference and home court"
            }
            ModelKind::PlayerPerformance => {
                "Weighted 5/10/20 game rolling averages adjusted for opponent defence"
            }
        }
    }
}

impl TryFrom<&str> for ModelKind {
    type Error = NbaError;

    fn try_from(s: &str) -> Result<Self> {
        match s.trim() {
            "game_predictor" => Ok(ModelKind::GamePredictor),
            "player_performance" => Ok(ModelKind::PlayerPerformance),
            other => Err(NbaError::NotFound(format!("Model '{}' not found", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelStatus {
    Ready,
    Training,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelEntry {
    pub name: ModelKind,
    pub description: &'static str,
    pub version: String,
    pub status: ModelStatus,
    pub last_trained: Option<DateTime<Utc>>,
    pub metrics: BTreeMap<String, f64>,
    pub predictions_served: u64,
    pub last_error: Option<String>,
}

impl ModelEntry {
    fn new(name: ModelKind, version: impl Into<String>) -> Self {
        Self {
            name,
            description: name.description(),
            version: version.into(),
            status: ModelStatus::Ready,
            last_trained: None,
            metrics: BTreeMap::new(),
            predictions_served: 0,
            last_error: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentRun {
    pub id: u64,
    pub model_name: ModelKind,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub status: ModelStatus,
    pub n_samples: usize,
    pub metrics: BTreeMap<String, f64>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegistrySnapshot {
    pub models: Vec<ModelEntry>,
    pub total_predictions: u64,
    pub model_dir: String,
}

#[derive(Debug)]
pub struct ModelRegistry {
    model_dir: PathBuf,
    game_predictor: GamePredictor,
    game: ModelEntry,
    player: ModelEntry,
    experiments: VecDeque<ExperimentRun>,
    next_run_id: u64,
}

fn game_metrics(model: &GamePredictor) -> BTreeMap<String, f64> {
    let meta = &model.metadata;
    [
        ("accuracy", meta.accuracy),
        ("log_loss", meta.log_loss),
        ("brier_score", meta.brier_score),
    ]
    .into_iter()
    .filter_map(|(k, v)| v.map(|v| (k.to_string(), v)))
    .collect()
}

fn backtest_metrics(m: &BacktestMetrics) -> BTreeMap<String, f64> {
    BTreeMap::from([
        ("mae_points".to_string(), m.mae_points),
        ("rmse_points".to_string(), m.rmse_points),
    ])
}

impl ModelRegistry {
    pub fn new(model_dir: impl Into<PathBuf>, game_predictor: GamePredictor) -> Self {
        let mut game = ModelEntry::new(
            ModelKind::GamePredictor,
            game_predictor.metadata.version.clone(),
        );
        game.last_trained = game_predictor.metadata.trained_at;
        game.metrics = game_metrics(&game_predictor);

        Self {
            model_dir: model_dir.into(),
            game_predictor,
            game,
            player: ModelEntry::new(ModelKind::PlayerPerformance, "rolling-v1"),
            experiments: VecDeque::new(),
            next_run_id: 1,
        }
    }

    /// Load the saved game model from `model_dir`, falling back to the prior
    pub fn load(model_dir: impl AsRef<Path>) -> Self {
        let dir = model_dir.as_ref();
        let path = dir.join(GAME_MODEL_FILE);
        let predictor = if path.exists() {
            match GamePredictor::from_file(&path) {
                Ok(model) => {
                    info!(
                        "Loaded game model {} from {}",
                        model.metadata.version,
                        path.display()
                    );
                    model
                }
                Err(e) => {
                    warn!("Ignoring unreadable game model {}: {}", path.display(), e);
                    GamePredictor::default()
                }
            }
        } else {
            GamePredictor::default()
        };
        Self::new(dir, predictor)
    }

    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    pub fn game_model_path(&self) -> PathBuf {
        self.model_dir.join(GAME_MODEL_FILE)
    }

    pub fn game_predictor(&self) -> &GamePredictor {
        &self.game_predictor
    }

    pub fn entry(&self, kind: ModelKind) -> &ModelEntry {
        match kind {
            ModelKind::GamePredictor => &self.game,
            ModelKind::PlayerPerformance => &self.player,
        }
    }

    fn entry_mut(&mut self, kind: ModelKind) -> &mut ModelEntry {
        match kind {
            ModelKind::GamePredictor => &mut self.game,
            ModelKind::PlayerPerformance => &mut self.player,
        }
    }

    fn run_mut(&mut self, run_id: u64) -> Option<&mut ExperimentRun> {
        self.experiments.iter_mut().find(|r| r.id == run_id)
    }

    /// Mark `kind` as training and open an experiment run.
    ///
    /// Conflict when a run for the same model is already in progress.
    pub fn begin_training(&mut self, kind: ModelKind) -> Result<u64> {
        if self.entry(kind).status == ModelStatus::Training {
            return Err(NbaError::Conflict(format!(
                "{} is already training",
                kind.as_str()
            )));
        }
        let id = self.next_run_id;
        self.next_run_id += 1;
        self.entry_mut(kind).status = ModelStatus::Training;

        if self.experiments.len() == MAX_EXPERIMENTS {
            self.experiments.pop_front();
        }
        self.experiments.push_back(ExperimentRun {
            id,
            model_name: kind,
            started_at: Utc::now(),
            finished_at: None,
            status: ModelStatus::Training,
            n_samples: 0,
            metrics: BTreeMap::new(),
            error: None,
        });
        Ok(id)
    }

    pub fn complete_game_training(&mut self, run_id: u64, model: GamePredictor) {
        let metrics = game_metrics(&model);
        let n_samples = model.metadata.n_samples;

        let entry = &mut self.game;
        entry.status = ModelStatus::Ready;
        entry.version = model.metadata.version.clone();
        entry.last_trained = model.metadata.trained_at;
        entry.metrics = metrics.clone();
        entry.last_error = None;

        if let Some(run) = self.run_mut(run_id) {
            run.finished_at = Some(Utc::now());
            run.status = ModelStatus::Ready;
            run.n_samples = n_samples;
            run.metrics = metrics;
        }
        self.game_predictor = model;
    }

    pub fn complete_player_training(
        &mut self,
        run_id: u64,
        version: String,
        metrics: BacktestMetrics,
    ) {
        let now = Utc::now();
        let values = backtest_metrics(&metrics);

        let entry = &mut self.player;
        entry.status = ModelStatus::Ready;
        entry.version = version;
        entry.last_trained = Some(now);
        entry.metrics = values.clone();
        entry.last_error = None;

        if let Some(run) = self.run_mut(run_id) {
            run.finished_at = Some(now);
            run.status = ModelStatus::Ready;
            run.n_samples = metrics.n_predictions;
            run.metrics = values;
        }
    }

    /// Close a run as failed; the previous model keeps serving
    pub fn fail_training(&mut self, run_id: u64, kind: ModelKind, error: String) {
        let entry = self.entry_mut(kind);
        entry.status = ModelStatus::Failed;
        entry.last_error = Some(error.clone());

        if let Some(run) = self.run_mut(run_id) {
            run.finished_at = Some(Utc::now());
            run.status = ModelStatus::Failed;
            run.error = Some(error);
        }
    }

    pub fn record_prediction(&mut self, kind: ModelKind) {
        self.entry_mut(kind).predictions_served += 1;
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        let models: Vec<ModelEntry> = ModelKind::ALL
            .iter()
            .map(|k| self.entry(*k).clone())
            .collect();
        RegistrySnapshot {
            total_predictions: models.iter().map(|m| m.predictions_served).sum(),
            models,
            model_dir: self.model_dir.display().to_string(),
        }
    }

    /// Training runs, most recent first
    pub fn experiments(&self) -> Vec<ExperimentRun> {
        self.experiments.iter().rev().cloned().collect()
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new("models", GamePredictor::default())
    }
}

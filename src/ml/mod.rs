//! Prediction models.
//!
//! Both models are small enough to train in-process from the stored games
//! and stat lines; no external runtime is involved.

pub mod features;
pub mod game_predictor;
pub mod player_performance;
pub mod prediction;
pub mod registry;

pub use features::{MatchupFeatures, TeamForm};
pub use game_predictor::{FeatureImportance, GamePredictor, ModelMetadata};
pub use player_performance::{project_player, BacktestMetrics, PlayerProjection};
pub use prediction::{predict_game, GamePrediction, PlayerPerformanceResponse, PredictionResponse};
pub use registry::{ExperimentRun, ModelEntry, ModelKind, ModelRegistry, ModelStatus};

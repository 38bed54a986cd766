use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::AppConfig;
use crate::ml::ModelRegistry;
use crate::persistence::NbaRepository;
use crate::services::{AnalyticsService, GameService, MlService, PlayerService, TeamService};

/// Shared application state for API handlers
#[derive(Clone)]
pub struct AppState {
    /// Storage backend (Postgres in production, mocks in tests)
    pub repo: Arc<dyn NbaRepository>,

    pub config: Arc<AppConfig>,

    /// Loaded models plus training history
    pub models: Arc<RwLock<ModelRegistry>>,

    /// Application start time
    pub start_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(repo: Arc<dyn NbaRepository>, config: AppConfig, models: ModelRegistry) -> Self {
        Self {
            repo,
            config: Arc::new(config),
            models: Arc::new(RwLock::new(models)),
            start_time: Utc::now(),
        }
    }

    pub fn players(&self) -> PlayerService {
        PlayerService::new(self.repo.clone())
    }

    pub fn teams(&self) -> TeamService {
        TeamService::new(self.repo.clone())
    }

    pub fn games(&self) -> GameService {
        GameService::new(self.repo.clone())
    }

    pub fn analytics(&self) -> AnalyticsService {
        AnalyticsService::new(self.repo.clone())
    }

    pub fn ml(&self) -> MlService {
        MlService::new(self.repo.clone(), self.models.clone())
    }

    /// Get uptime in seconds
    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.start_time).num_seconds()
    }
}

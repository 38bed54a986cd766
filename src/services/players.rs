//! Player queries, profile statistics and roster maintenance.

use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::analysis::{find_similar, group_by_player, player_analytics, similarity, SimilarPlayer};
use crate::domain::{
    BoxScore, Player, PlayerAnalytics, PlayerCreate, PlayerFilter, PlayerSearch, PlayerStats,
    PlayerUpdate, StatLineFilter,
};
use crate::error::{NbaError, Result};
use crate::persistence::NbaRepository;

pub const PLAYER_NOT_FOUND: &str = "Player not found";

#[derive(Debug, Clone, Serialize)]
pub struct PlayerStatsResponse {
    pub player_id: i64,
    pub player_name: String,
    pub season: Option<String>,
    pub total_games: usize,
    pub statistics: Vec<PlayerStats>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimilarPlayersResponse {
    pub player_id: i64,
    pub player_name: String,
    pub season: Option<String>,
    pub similar_players: Vec<SimilarPlayer>,
    pub algorithm: &'static str,
    pub features: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeactivatedPlayer {
    pub message: String,
    pub player_id: i64,
}

#[derive(Clone)]
pub struct PlayerService {
    repo: Arc<dyn NbaRepository>,
}

impl PlayerService {
    pub fn new(repo: Arc<dyn NbaRepository>) -> Self {
        Self { repo }
    }

    pub async fn list(&self, filter: &PlayerFilter) -> Result<Vec<Player>> {
        self.repo.list_players(filter).await
    }

    pub async fn search(&self, search: &PlayerSearch) -> Result<Vec<Player>> {
        self.repo.search_players(search).await
    }

    pub async fn get(&self, id: i64) -> Result<Player> {
        self.repo
            .get_player(id)
            .await?
            .ok_or_else(|| NbaError::not_found(PLAYER_NOT_FOUND))
    }

    /// Stat lines most recent first, optionally limited to a season or the last N games
    pub async fn stats(
        &self,
        id: i64,
        season: Option<String>,
        last_n_games: Option<i64>,
    ) -> Result<PlayerStatsResponse> {
        let player = self.get(id).await?;
        let statistics = self
            .repo
            .player_stats(&StatLineFilter {
                player_id: Some(id),
                team_id: None,
                season: season.clone(),
                last_n_games,
            })
            .await?;

        Ok(PlayerStatsResponse {
            player_id: player.id,
            player_name: player.name,
            season,
            total_games: statistics.len(),
            statistics,
        })
    }

    pub async fn analytics(&self, id: i64, season: Option<String>) -> Result<PlayerAnalytics> {
        let player = self.get(id).await?;
        let lines: Vec<BoxScore> = self
            .repo
            .player_stats(&StatLineFilter {
                player_id: Some(id),
                season,
                ..Default::default()
            })
            .await?
            .into_iter()
            .map(|s| s.line)
            .collect();

        player_analytics(&player, &lines)
            .ok_or_else(|| NbaError::not_found("No statistics found for player"))
    }

    pub async fn similar(
        &self,
        id: i64,
        season: Option<String>,
        limit: usize,
    ) -> Result<SimilarPlayersResponse> {
        let player = self.get(id).await?;
        let lines = self
            .repo
            .stat_lines(&StatLineFilter {
                season: season.clone(),
                ..Default::default()
            })
            .await?;
        let pool = group_by_player(&lines);
        debug!("Similarity pool for player {}: {} players", id, pool.len());

        let similar_players = find_similar(id, &pool, limit)
            .ok_or_else(|| NbaError::not_found("No statistics found for player"))?;

        Ok(SimilarPlayersResponse {
            player_id: player.id,
            player_name: player.name,
            season,
            similar_players,
            algorithm: similarity::ALGORITHM,
            features: similarity::PROFILE_FEATURES.to_vec(),
        })
    }

    async fn ensure_team_exists(&self, team_id: Option<i64>) -> Result<()> {
        if let Some(team_id) = team_id {
            if self.repo.get_team(team_id).await?.is_none() {
                return Err(NbaError::Validation(format!(
                    "Team {} does not exist",
                    team_id
                )));
            }
        }
        Ok(())
    }

    pub async fn create(&self, create: &PlayerCreate) -> Result<Player> {
        create.validate()?;
        if let Some(external_id) = create.external_id.as_deref() {
            if self
                .repo
                .find_player_by_external_id(external_id)
                .await?
                .is_some()
            {
                return Err(NbaError::Conflict(
                    "Player with this external ID already exists".to_string(),
                ));
            }
        }
        self.ensure_team_exists(create.team_id).await?;

        let player = self.repo.insert_player(create).await?;
        info!("Created player {} ({})", player.name, player.id);
        Ok(player)
    }

    pub async fn update(&self, id: i64, update: &PlayerUpdate) -> Result<Player> {
        update.validate()?;
        let mut player = self.get(id).await?;
        self.ensure_team_exists(update.team_id).await?;

        update.apply(&mut player);
        player.updated_at = Some(Utc::now());
        self.repo.save_player(&player).await
    }

    /// Soft delete: the row stays, `is_active` becomes false
    pub async fn deactivate(&self, id: i64) -> Result<DeactivatedPlayer> {
        let mut player = self.get(id).await?;
        player.is_active = false;
        player.updated_at = Some(Utc::now());
        self.repo.save_player(&player).await?;
        info!("Deactivated player {}", id);

        Ok(DeactivatedPlayer {
            message: "Player deactivated successfully".to_string(),
            player_id: id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MockNbaRepository;
    use crate::services::test_support::player;

    #[tokio::test]
    async fn test_duplicate_external_id_is_conflict() {
        let mut repo = MockNbaRepository::new();
        repo.expect_find_player_by_external_id()
            .returning(|_| Ok(Some(player(1, "Existing"))));
        repo.expect_insert_player().never();

        let service = PlayerService::new(Arc::new(repo));
        let create = PlayerCreate {
            name: "New".into(),
            external_id: Some("237".into()),
            ..Default::default()
        };
        let err = service.create(&create).await.unwrap_err();
        assert!(matches!(err, NbaError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_deactivate_saves_inactive_player() {
        let mut repo = MockNbaRepository::new();
        repo.expect_get_player()
            .returning(|id| Ok(Some(player(id, "Retiring"))));
        repo.expect_save_player()
            .withf(|p| !p.is_active && p.updated_at.is_some())
            .times(1)
            .returning(|p| Ok(p.clone()));

        let service = PlayerService::new(Arc::new(repo));
        let out = service.deactivate(7).await.unwrap();
        assert_eq!(out.player_id, 7);
    }

    #[tokio::test]
    async fn test_analytics_without_stats_is_not_found() {
        let mut repo = MockNbaRepository::new();
        repo.expect_get_player()
            .returning(|id| Ok(Some(player(id, "Bench"))));
        repo.expect_player_stats().returning(|_| Ok(vec![]));

        let service = PlayerService::new(Arc::new(repo));
        let err = service.analytics(3, None).await.unwrap_err();
        assert!(matches!(err, NbaError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_rejects_unknown_team() {
        let mut repo = MockNbaRepository::new();
        repo.expect_get_player()
            .returning(|id| Ok(Some(player(id, "Mover"))));
        repo.expect_get_team().returning(|_| Ok(None));
        repo.expect_save_player().never();

        let service = PlayerService::new(Arc::new(repo));
        let update = PlayerUpdate {
            team_id: Some(99),
            ..Default::default()
        };
        let err = service.update(1, &update).await.unwrap_err();
        assert!(matches!(err, NbaError::Validation(_)));
    }
}

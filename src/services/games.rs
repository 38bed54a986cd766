//! Game schedule, results and box-score entry.

use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use crate::domain::{
    Game, GameCreate, GameFilter, GameUpdate, PaginatedResponse, PlayerStats, PlayerStatsCreate,
};
use crate::error::{NbaError, Result};
use crate::persistence::NbaRepository;
use crate::services::players::PLAYER_NOT_FOUND;

pub const GAME_NOT_FOUND: &str = "Game not found";

#[derive(Clone)]
pub struct GameService {
    repo: Arc<dyn NbaRepository>,
}

impl GameService {
    pub fn new(repo: Arc<dyn NbaRepository>) -> Self {
        Self { repo }
    }

    pub async fn list(&self, filter: &GameFilter) -> Result<PaginatedResponse<Game>> {
        if let (Some(from), Some(to)) = (filter.date_from, filter.date_to) {
            if from > to {
                return Err(NbaError::validation("date_from must not be after date_to"));
            }
        }
        let (items, total) = self.repo.list_games(filter).await?;
        Ok(PaginatedResponse::new(
            items,
            total,
            filter.limit,
            filter.offset,
        ))
    }

    pub async fn get(&self, id: i64) -> Result<Game> {
        self.repo
            .get_game(id)
            .await?
            .ok_or_else(|| NbaError::not_found(GAME_NOT_FOUND))
    }

    pub async fn create(&self, create: &GameCreate) -> Result<Game> {
        create.validate()?;
        for (side, team_id) in [("Home", create.home_team_id), ("Away", create.away_team_id)] {
            if self.repo.get_team(team_id).await?.is_none() {
                return Err(NbaError::Validation(format!(
                    "{} team {} does not exist",
                    side, team_id
                )));
            }
        }
        let game = self.repo.insert_game(create).await?;
        info!(
            "Created game {} ({} vs {}, {})",
            game.id, game.home_team_id, game.away_team_id, game.season
        );
        Ok(game)
    }

    pub async fn update(&self, id: i64, update: &GameUpdate) -> Result<Game> {
        update.validate()?;
        let mut game = self.get(id).await?;
        update.apply(&mut game)?;
        game.updated_at = Some(Utc::now());
        self.repo.save_game(&game).await
    }

    /// Record one player's box score for a game.
    ///
    /// The line is attributed to the player's current team, which must be
    /// one of the two sides.
    pub async fn record_stats(&self, game_id: i64, stats: &PlayerStatsCreate) -> Result<PlayerStats> {
        if let Some(body_game) = stats.game_id {
            if body_game != game_id {
                return Err(NbaError::Validation(format!(
                    "game_id {} in body does not match game {} in path",
                    body_game, game_id
                )));
            }
        }
        stats.line.validate()?;

        let game = self.get(game_id).await?;
        let player = self
            .repo
            .get_player(stats.player_id)
            .await?
            .ok_or_else(|| NbaError::not_found(PLAYER_NOT_FOUND))?;

        if let Some(team_id) = player.team_id {
            if !game.involves(team_id) {
                return Err(NbaError::Validation(format!(
                    "Player {} plays for team {}, which is not in game {}",
                    player.id, team_id, game.id
                )));
            }
        }

        let recorded = self
            .repo
            .insert_player_stats(game.id, player.team_id, stats)
            .await?;
        info!(
            "Recorded stats for player {} in game {}",
            player.id, game.id
        );
        Ok(recorded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BoxScore;
    use crate::ml::features::test_support::completed;
    use crate::persistence::MockNbaRepository;
    use crate::services::test_support::{player, team};

    fn stats_for(player_id: i64) -> PlayerStatsCreate {
        PlayerStatsCreate {
            player_id,
            game_id: None,
            line: BoxScore {
                points: 5,
                field_goals_made: 2,
                field_goals_attempted: 4,
                free_throws_made: 1,
                free_throws_attempted: 2,
                ..Default::default()
            },
        }
    }

    #[tokio::test]
    async fn test_create_requires_existing_teams() {
        let mut repo = MockNbaRepository::new();
        repo.expect_get_team()
            .returning(|id| Ok((id == 1).then(|| team(1, "LAL"))));
        repo.expect_insert_game().never();

        let service = GameService::new(Arc::new(repo));
        let create: GameCreate = serde_json::from_str(
            r#"{"season": "2023-24", "game_date": "2024-01-10T00:00:00Z",
                "home_team_id": 1, "away_team_id": 2}"#,
        )
        .unwrap();
        let err = service.create(&create).await.unwrap_err();
        assert!(err.to_string().contains("Away team 2"));
    }

    #[tokio::test]
    async fn test_record_stats_uses_player_team() {
        let mut repo = MockNbaRepository::new();
        repo.expect_get_game()
            .returning(|id| Ok(Some(completed(id, 1, 2, 100, 90))));
        repo.expect_get_player().returning(|id| {
            let mut p = player(id, "Starter");
            p.team_id = Some(2);
            Ok(Some(p))
        });
        repo.expect_insert_player_stats()
            .withf(|game_id, team_id, _| *game_id == 10 && *team_id == Some(2))
            .times(1)
            .returning(|game_id, team_id, s| {
                Ok(PlayerStats::new(1, s.player_id, game_id, team_id, s.line, Utc::now()))
            });

        let service = GameService::new(Arc::new(repo));
        let recorded = service.record_stats(10, &stats_for(4)).await.unwrap();
        assert_eq!(recorded.team_id, Some(2));
        assert_eq!(recorded.free_throw_percentage, Some(0.5));
    }

    #[tokio::test]
    async fn test_record_stats_rejects_mismatched_game() {
        let repo = MockNbaRepository::new();
        let service = GameService::new(Arc::new(repo));
        let mut stats = stats_for(4);
        stats.game_id = Some(11);
        assert!(matches!(
            service.record_stats(10, &stats).await,
            Err(NbaError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_list_rejects_inverted_dates() {
        let repo = MockNbaRepository::new();
        let service = GameService::new(Arc::new(repo));
        let filter = GameFilter {
            date_from: Some(Utc::now()),
            date_to: Some(Utc::now() - chrono::Duration::days(1)),
            limit: 50,
            ..Default::default()
        };
        assert!(service.list(&filter).await.is_err());
    }
}

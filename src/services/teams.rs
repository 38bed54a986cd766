//! Team queries, rosters and season analytics.

use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use crate::analysis::team_analytics;
use crate::domain::{
    Player, PlayerFilter, StatLineFilter, Team, TeamAnalytics, TeamCreate, TeamFilter, TeamUpdate,
};
use crate::error::{NbaError, Result};
use crate::persistence::NbaRepository;

pub const TEAM_NOT_FOUND: &str = "Team not found";

/// Upper bound on a roster listing
const ROSTER_LIMIT: i64 = 100;

#[derive(Clone)]
pub struct TeamService {
    repo: Arc<dyn NbaRepository>,
}

impl TeamService {
    pub fn new(repo: Arc<dyn NbaRepository>) -> Self {
        Self { repo }
    }

    pub async fn list(&self, filter: &TeamFilter) -> Result<Vec<Team>> {
        self.repo.list_teams(filter).await
    }

    pub async fn get(&self, id: i64) -> Result<Team> {
        self.repo
            .get_team(id)
            .await?
            .ok_or_else(|| NbaError::not_found(TEAM_NOT_FOUND))
    }

    /// Active players on the team
    pub async fn roster(&self, id: i64) -> Result<Vec<Player>> {
        self.get(id).await?;
        self.repo
            .list_players(&PlayerFilter {
                skip: 0,
                limit: ROSTER_LIMIT,
                team_id: Some(id),
                position: None,
                is_active: Some(true),
            })
            .await
    }

    pub async fn analytics(&self, id: i64, season: Option<String>) -> Result<TeamAnalytics> {
        let team = self.get(id).await?;
        let games = self.repo.completed_games(season.clone()).await?;
        let lines = self
            .repo
            .stat_lines(&StatLineFilter {
                team_id: Some(id),
                season,
                ..Default::default()
            })
            .await?;

        team_analytics(&team, &games, &lines)
            .ok_or_else(|| NbaError::not_found("No completed games found for team"))
    }

    pub async fn create(&self, create: &TeamCreate) -> Result<Team> {
        create.validate()?;
        if self
            .repo
            .find_team_by_abbreviation(&create.abbreviation)
            .await?
            .is_some()
        {
            return Err(NbaError::Conflict(format!(
                "Team with abbreviation {} already exists",
                create.abbreviation
            )));
        }
        if let Some(external_id) = create.external_id.as_deref() {
            if self
                .repo
                .find_team_by_external_id(external_id)
                .await?
                .is_some()
            {
                return Err(NbaError::Conflict(
                    "Team with this external ID already exists".to_string(),
                ));
            }
        }

        let team = self.repo.insert_team(create).await?;
        info!("Created team {} ({})", team.full_name(), team.id);
        Ok(team)
    }

    pub async fn update(&self, id: i64, update: &TeamUpdate) -> Result<Team> {
        update.validate()?;
        let mut team = self.get(id).await?;
        update.apply(&mut team);
        team.updated_at = Some(Utc::now());
        self.repo.save_team(&team).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::features::test_support::completed;
    use crate::persistence::MockNbaRepository;
    use crate::services::test_support::team;

    #[tokio::test]
    async fn test_duplicate_abbreviation_is_conflict() {
        let mut repo = MockNbaRepository::new();
        repo.expect_find_team_by_abbreviation()
            .returning(|abbr| Ok(Some(team(1, abbr))));
        repo.expect_insert_team().never();

        let service = TeamService::new(Arc::new(repo));
        let create = TeamCreate {
            name: "Celtics".into(),
            city: "Boston".into(),
            abbreviation: "BOS".into(),
            conference: None,
            division: None,
            founded_year: None,
            external_id: None,
        };
        assert!(matches!(
            service.create(&create).await,
            Err(NbaError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_analytics_from_completed_games() {
        let mut repo = MockNbaRepository::new();
        repo.expect_get_team()
            .returning(|id| Ok(Some(team(id, "DEN"))));
        repo.expect_completed_games().returning(|_| {
            Ok(vec![
                completed(1, 1, 2, 110, 100),
                completed(2, 3, 1, 101, 99),
            ])
        });
        repo.expect_stat_lines().returning(|_| Ok(vec![]));

        let service = TeamService::new(Arc::new(repo));
        let analytics = service.analytics(1, None).await.unwrap();
        assert_eq!(analytics.games_played, 2);
        assert_eq!(analytics.wins, 1);
        assert!((analytics.avg_points_scored - 104.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_roster_of_missing_team() {
        let mut repo = MockNbaRepository::new();
        repo.expect_get_team().returning(|_| Ok(None));
        repo.expect_list_players().never();

        let service = TeamService::new(Arc::new(repo));
        assert!(matches!(
            service.roster(42).await,
            Err(NbaError::NotFound(_))
        ));
    }
}

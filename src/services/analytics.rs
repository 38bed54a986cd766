//! League-wide analytics assembled from completed games and stat lines.

use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::analysis::{
    compare_teams, compute_trend, group_by_player, league_leaders, player_advanced,
    player_efficiency, team_advanced, LeaderEntry, LeaderStat, PlayerAdvanced, PlayerEfficiency,
    TeamAdvanced, TeamComparison, TimePeriod, TrendPoint, TrendType,
};
use crate::domain::{Position, StatLineFilter, TeamFilter};
use crate::error::{NbaError, Result};
use crate::persistence::NbaRepository;
use crate::services::teams::TEAM_NOT_FOUND;

/// Enough to cover every franchise in one page
const ALL_TEAMS_LIMIT: i64 = 1000;

#[derive(Debug, Clone, Serialize)]
pub struct LeagueLeadersResponse {
    pub stat: LeaderStat,
    pub season: Option<String>,
    pub min_games: u32,
    pub leaders: Vec<LeaderEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerEfficiencyResponse {
    pub min_games: u32,
    pub players: Vec<PlayerEfficiency>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricType {
    Team,
    Player,
}

impl TryFrom<&str> for MetricType {
    type Error = NbaError;

    fn try_from(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "team" => Ok(MetricType::Team),
            "player" => Ok(MetricType::Player),
            other => Err(NbaError::Validation(format!(
                "metric_type must be 'team' or 'player', got '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AdvancedRows {
    Team(Vec<TeamAdvanced>),
    Player(Vec<PlayerAdvanced>),
}

#[derive(Debug, Clone, Serialize)]
pub struct AdvancedMetricsResponse {
    pub metric_type: MetricType,
    pub season: Option<String>,
    pub metrics: AdvancedRows,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendResponse {
    pub trend_type: TrendType,
    pub time_period: TimePeriod,
    pub season: Option<String>,
    pub series: Vec<TrendPoint>,
}

#[derive(Clone)]
pub struct AnalyticsService {
    repo: Arc<dyn NbaRepository>,
}

impl AnalyticsService {
    pub fn new(repo: Arc<dyn NbaRepository>) -> Self {
        Self { repo }
    }

    pub async fn league_leaders(
        &self,
        stat: LeaderStat,
        season: Option<String>,
        limit: usize,
        min_games: u32,
    ) -> Result<LeagueLeadersResponse> {
        let lines = self
            .repo
            .stat_lines(&StatLineFilter {
                season: season.clone(),
                ..Default::default()
            })
            .await?;
        let players = group_by_player(&lines);
        debug!(
            "League leaders for {}: {} stat lines, {} players",
            stat.as_str(),
            lines.len(),
            players.len()
        );

        Ok(LeagueLeadersResponse {
            stat,
            season,
            min_games,
            leaders: league_leaders(&players, stat, min_games, limit),
        })
    }

    pub async fn team_comparison(
        &self,
        team1_id: i64,
        team2_id: i64,
        season: Option<String>,
    ) -> Result<TeamComparison> {
        if team1_id == team2_id {
            return Err(NbaError::validation("team1_id and team2_id must differ"));
        }
        let mut teams = Vec::with_capacity(2);
        for id in [team1_id, team2_id] {
            let team = self
                .repo
                .get_team(id)
                .await?
                .ok_or_else(|| NbaError::not_found(TEAM_NOT_FOUND))?;
            teams.push(team);
        }

        let games = self.repo.completed_games(season.clone()).await?;
        let lines = self
            .repo
            .stat_lines(&StatLineFilter {
                season,
                ..Default::default()
            })
            .await?;

        compare_teams(&teams[0], &teams[1], &games, &lines)
            .ok_or_else(|| NbaError::not_found("Both teams need completed games to compare"))
    }

    pub async fn player_efficiency(
        &self,
        player_id: Option<i64>,
        position: Option<Position>,
        min_games: u32,
    ) -> Result<PlayerEfficiencyResponse> {
        let lines = self
            .repo
            .stat_lines(&StatLineFilter {
                player_id,
                ..Default::default()
            })
            .await?;
        let players: Vec<_> = group_by_player(&lines)
            .into_iter()
            .filter(|p| position.is_none() || p.position == position)
            .collect();

        Ok(PlayerEfficiencyResponse {
            min_games,
            players: player_efficiency(&players, min_games),
        })
    }

    pub async fn advanced_metrics(
        &self,
        metric_type: MetricType,
        season: Option<String>,
    ) -> Result<AdvancedMetricsResponse> {
        let lines = self
            .repo
            .stat_lines(&StatLineFilter {
                season: season.clone(),
                ..Default::default()
            })
            .await?;

        let metrics = match metric_type {
            MetricType::Player => AdvancedRows::Player(player_advanced(&lines)),
            MetricType::Team => {
                let games = self.repo.completed_games(season.clone()).await?;
                let teams = self
                    .repo
                    .list_teams(&TeamFilter {
                        skip: 0,
                        limit: ALL_TEAMS_LIMIT,
                        conference: None,
                        is_active: Some(true),
                    })
                    .await?;
                AdvancedRows::Team(
                    teams
                        .iter()
                        .filter_map(|t| team_advanced(t, &games, &lines))
                        .collect(),
                )
            }
        };

        Ok(AdvancedMetricsResponse {
            metric_type,
            season,
            metrics,
        })
    }

    pub async fn trends(
        &self,
        trend_type: TrendType,
        time_period: TimePeriod,
        season: Option<String>,
    ) -> Result<TrendResponse> {
        let games = match trend_type {
            TrendType::Scoring => self.repo.completed_games(season.clone()).await?,
            _ => Vec::new(),
        };
        let lines = match trend_type {
            TrendType::Scoring => Vec::new(),
            _ => {
                self.repo
                    .stat_lines(&StatLineFilter {
                        season: season.clone(),
                        ..Default::default()
                    })
                    .await?
            }
        };

        Ok(TrendResponse {
            trend_type,
            time_period,
            season,
            series: compute_trend(trend_type, time_period, &games, &lines),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BoxScore, StatLine};
    use crate::persistence::MockNbaRepository;
    use chrono::{TimeZone, Utc};

    fn line(player_id: i64, game_id: i64, points: i32) -> StatLine {
        StatLine {
            player_id,
            player_name: format!("Player {}", player_id),
            position: Some(Position::Center),
            team_id: Some(1),
            game_id,
            season: "2023-24".into(),
            game_date: Utc.with_ymd_and_hms(2024, 1, game_id as u32, 0, 0, 0).unwrap(),
            line: BoxScore {
                points,
                field_goals_made: points / 2,
                field_goals_attempted: points,
                ..Default::default()
            },
        }
    }

    #[tokio::test]
    async fn test_league_leaders_respect_min_games() {
        let mut repo = MockNbaRepository::new();
        repo.expect_stat_lines().returning(|_| {
            Ok(vec![
                line(1, 1, 20),
                line(1, 2, 30),
                line(2, 1, 40),
                line(3, 1, 10),
                line(3, 2, 10),
            ])
        });

        let service = AnalyticsService::new(Arc::new(repo));
        let out = service
            .league_leaders(LeaderStat::Points, None, 10, 2)
            .await
            .unwrap();
        let ids: Vec<i64> = out.leaders.iter().map(|l| l.player_id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(out.leaders[0].value, 25.0);
    }

    #[tokio::test]
    async fn test_comparison_needs_distinct_teams() {
        let repo = MockNbaRepository::new();
        let service = AnalyticsService::new(Arc::new(repo));
        assert!(matches!(
            service.team_comparison(3, 3, None).await,
            Err(NbaError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_efficiency_filters_position() {
        let mut repo = MockNbaRepository::new();
        repo.expect_stat_lines()
            .returning(|_| Ok(vec![line(1, 1, 20), line(1, 2, 22)]));

        let service = AnalyticsService::new(Arc::new(repo));
        let centers = service
            .player_efficiency(None, Some(Position::Center), 1)
            .await
            .unwrap();
        assert_eq!(centers.players.len(), 1);

        let guards = service
            .player_efficiency(None, Some(Position::PointGuard), 1)
            .await
            .unwrap();
        assert!(guards.players.is_empty());
    }

    #[test]
    fn test_metric_type_parse() {
        assert_eq!(MetricType::try_from("Team").unwrap(), MetricType::Team);
        assert!(MetricType::try_from("league").is_err());
    }
}

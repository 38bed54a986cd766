use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Conference, GameFilter, GameStatus, PlayerFilter, PlayerSearch, Position, TeamFilter};
use crate::error::{NbaError, Result};
use crate::validation::{validate_optional_range, validate_range, validate_season};

/// Blank seasons are ignored; anything else must look like `2023-24`
pub fn season(raw: Option<String>) -> Result<Option<String>> {
    match raw.filter(|s| !s.trim().is_empty()) {
        Some(s) => {
            validate_season(s.trim())?;
            Ok(Some(s.trim().to_string()))
        }
        None => Ok(None),
    }
}

fn parse_position(raw: Option<&str>) -> Result<Option<Position>> {
    raw.map(|p| Position::try_from(p).map_err(NbaError::Validation))
        .transpose()
}

// ============================================================================
// System Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    /// Seconds since the Unix epoch
    pub timestamp: f64,
    pub version: String,
    pub database: String,
    pub uptime_seconds: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

// ============================================================================
// Player Queries
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct PlayerListQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub team_id: Option<i64>,
    pub position: Option<String>,
    pub is_active: Option<bool>,
}

impl PlayerListQuery {
    pub fn into_filter(self) -> Result<PlayerFilter> {
        let skip = self.skip.unwrap_or(0);
        let limit = self.limit.unwrap_or(100);
        validate_range(skip, "skip", 0, i64::MAX)?;
        validate_range(limit, "limit", 1, 1000)?;
        Ok(PlayerFilter {
            skip,
            limit,
            team_id: self.team_id,
            position: parse_position(self.position.as_deref())?,
            is_active: Some(self.is_active.unwrap_or(true)),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PlayerSearchQuery {
    pub name: Option<String>,
    pub team_name: Option<String>,
    pub limit: Option<i64>,
}

impl PlayerSearchQuery {
    pub fn into_search(self) -> Result<PlayerSearch> {
        let limit = self.limit.unwrap_or(50);
        validate_range(limit, "limit", 1, 100)?;
        let non_blank = |s: Option<String>| s.filter(|v| !v.trim().is_empty());
        Ok(PlayerSearch {
            name: non_blank(self.name),
            team_name: non_blank(self.team_name),
            limit,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PlayerStatsQuery {
    pub season: Option<String>,
    pub last_n_games: Option<i64>,
}

impl PlayerStatsQuery {
    pub fn validate(&self) -> Result<()> {
        validate_optional_range(self.last_n_games, "last_n_games", 1, 82)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SeasonQuery {
    pub season: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SimilarPlayersQuery {
    pub limit: Option<i64>,
    pub season: Option<String>,
}

impl SimilarPlayersQuery {
    pub fn limit(&self) -> Result<usize> {
        let limit = self.limit.unwrap_or(5);
        validate_range(limit, "limit", 1, 20)?;
        Ok(limit as usize)
    }
}

// ============================================================================
// Team Queries
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct TeamListQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub conference: Option<String>,
    pub is_active: Option<bool>,
}

impl TeamListQuery {
    pub fn into_filter(self) -> Result<TeamFilter> {
        let skip = self.skip.unwrap_or(0);
        let limit = self.limit.unwrap_or(30);
        validate_range(skip, "skip", 0, i64::MAX)?;
        validate_range(limit, "limit", 1, 50)?;
        let conference = self
            .conference
            .as_deref()
            .map(|c| Conference::try_from(c).map_err(NbaError::Validation))
            .transpose()?;
        Ok(TeamFilter {
            skip,
            limit,
            conference,
            is_active: Some(self.is_active.unwrap_or(true)),
        })
    }
}

// ============================================================================
// Game Queries
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct GameListQuery {
    pub season: Option<String>,
    pub team_id: Option<i64>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl GameListQuery {
    pub fn into_filter(self) -> Result<GameFilter> {
        let limit = self.limit.unwrap_or(50);
        let offset = self.offset.unwrap_or(0);
        validate_range(limit, "limit", 1, 100)?;
        validate_range(offset, "offset", 0, i64::MAX)?;
        let status = self
            .status
            .as_deref()
            .map(|s| GameStatus::try_from(s).map_err(NbaError::Validation))
            .transpose()?;
        Ok(GameFilter {
            season: season(self.season)?,
            team_id: self.team_id,
            date_from: self.date_from,
            date_to: self.date_to,
            status,
            limit,
            offset,
        })
    }
}

// ============================================================================
// Analytics Queries
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct LeagueLeadersQuery {
    pub stat: Option<String>,
    pub season: Option<String>,
    pub limit: Option<i64>,
    pub min_games: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct TeamComparisonQuery {
    pub team1_id: i64,
    pub team2_id: i64,
    pub season: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PlayerEfficiencyQuery {
    pub player_id: Option<i64>,
    pub position: Option<String>,
    pub min_games: Option<i64>,
}

impl PlayerEfficiencyQuery {
    pub fn position(&self) -> Result<Option<Position>> {
        parse_position(self.position.as_deref())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AdvancedMetricsQuery {
    pub metric_type: Option<String>,
    pub season: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TrendsQuery {
    pub trend_type: Option<String>,
    pub time_period: Option<String>,
    pub season: Option<String>,
}

/// `min_games` defaults differ per endpoint; both require at least one game
pub fn min_games(raw: Option<i64>, default: i64) -> Result<u32> {
    let value = raw.unwrap_or(default);
    validate_range(value, "min_games", 1, u32::MAX as i64)?;
    Ok(value as u32)
}

// ============================================================================
// ML Queries
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PlayerPerformanceQuery {
    pub player_id: i64,
    pub game_id: Option<i64>,
    pub opponent_team_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct RetrainQuery {
    pub model_name: String,
    pub background: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FeatureImportanceQuery {
    pub model_name: Option<String>,
    pub top_n: Option<i64>,
}

impl FeatureImportanceQuery {
    pub fn top_n(&self) -> Result<usize> {
        let top_n = self.top_n.unwrap_or(20);
        validate_range(top_n, "top_n", 5, 50)?;
        Ok(top_n as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_list_defaults() {
        let filter = PlayerListQuery::default().into_filter().unwrap();
        assert_eq!(filter.skip, 0);
        assert_eq!(filter.limit, 100);
        assert_eq!(filter.is_active, Some(true));
    }

    #[test]
    fn test_out_of_range_limits() {
        let players = PlayerListQuery {
            limit: Some(1001),
            ..Default::default()
        };
        assert!(players.into_filter().is_err());

        let teams = TeamListQuery {
            limit: Some(51),
            ..Default::default()
        };
        assert!(teams.into_filter().is_err());

        let importance = FeatureImportanceQuery {
            top_n: Some(4),
            ..Default::default()
        };
        assert!(importance.top_n().is_err());
        assert!(min_games(Some(0), 10).is_err());
        assert_eq!(min_games(None, 10).unwrap(), 10);
    }

    #[test]
    fn test_season_param() {
        assert_eq!(season(Some("2023-24".into())).unwrap().as_deref(), Some("2023-24"));
        assert_eq!(season(Some("".into())).unwrap(), None);
        assert!(season(Some("2023".into())).is_err());
    }

    #[test]
    fn test_enum_filters_are_validated() {
        let bad_position = PlayerListQuery {
            position: Some("G".into()),
            ..Default::default()
        };
        assert!(matches!(
            bad_position.into_filter(),
            Err(NbaError::Validation(_))
        ));

        let games = GameListQuery {
            status: Some("finished".into()),
            ..Default::default()
        };
        assert!(games.into_filter().is_err());
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{GameStatus, Team};
use crate::error::{NbaError, Result};
use crate::validation::{validate_optional_range, validate_season};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: i64,
    pub external_id: Option<String>,
    pub season: String,
    pub game_date: DateTime<Utc>,
    pub home_team_id: i64,
    pub away_team_id: i64,
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
    pub status: GameStatus,
    pub quarter: Option<i32>,
    pub time_remaining: Option<String>,
    pub game_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub home_team: Option<Team>,
    #[serde(default)]
    pub away_team: Option<Team>,
}

/// One team's view of a finished game
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TeamResult {
    pub game_id: i64,
    pub opponent_id: i64,
    pub points_for: i32,
    pub points_against: i32,
    pub is_home: bool,
}

impl TeamResult {
    pub fn won(&self) -> bool {
        self.points_for > self.points_against
    }

    pub fn margin(&self) -> i32 {
        self.points_for - self.points_against
    }
}

impl Game {
    pub fn involves(&self, team_id: i64) -> bool {
        self.home_team_id == team_id || self.away_team_id == team_id
    }

    /// Final scores, present only once the game is completed
    pub fn final_score(&self) -> Option<(i32, i32)> {
        if self.status != GameStatus::Completed {
            return None;
        }
        Some((self.home_score?, self.away_score?))
    }

    /// The result from `team_id`'s perspective, if it played and the game is final
    pub fn result_for(&self, team_id: i64) -> Option<TeamResult> {
        let (home, away) = self.final_score()?;
        if self.home_team_id == team_id {
            Some(TeamResult {
                game_id: self.id,
                opponent_id: self.away_team_id,
                points_for: home,
                points_against: away,
                is_home: true,
            })
        } else if self.away_team_id == team_id {
            Some(TeamResult {
                game_id: self.id,
                opponent_id: self.home_team_id,
                points_for: away,
                points_against: home,
                is_home: false,
            })
        } else {
            None
        }
    }
}

fn default_game_type() -> String {
    "regular".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameCreate {
    pub season: String,
    pub game_date: DateTime<Utc>,
    pub home_team_id: i64,
    pub away_team_id: i64,
    #[serde(default)]
    pub home_score: Option<i32>,
    #[serde(default)]
    pub away_score: Option<i32>,
    #[serde(default)]
    pub status: GameStatus,
    #[serde(default)]
    pub quarter: Option<i32>,
    #[serde(default)]
    pub time_remaining: Option<String>,
    #[serde(default = "default_game_type")]
    pub game_type: String,
    #[serde(default)]
    pub external_id: Option<String>,
}

impl GameCreate {
    pub fn validate(&self) -> Result<()> {
        validate_season(&self.season)?;
        if self.home_team_id == self.away_team_id {
            return Err(NbaError::validation(
                "home_team_id and away_team_id must differ",
            ));
        }
        validate_optional_range(self.home_score, "home_score", 0, i32::MAX)?;
        validate_optional_range(self.away_score, "away_score", 0, i32::MAX)?;
        validate_optional_range(self.quarter, "quarter", 1, 4)?;
        if self.status == GameStatus::Completed
            && (self.home_score.is_none() || self.away_score.is_none())
        {
            return Err(NbaError::validation(
                "completed games require both home_score and away_score",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameUpdate {
    #[serde(default)]
    pub home_score: Option<i32>,
    #[serde(default)]
    pub away_score: Option<i32>,
    #[serde(default)]
    pub status: Option<GameStatus>,
    #[serde(default)]
    pub quarter: Option<i32>,
    #[serde(default)]
    pub time_remaining: Option<String>,
}

impl GameUpdate {
    pub fn validate(&self) -> Result<()> {
        validate_optional_range(self.home_score, "home_score", 0, i32::MAX)?;
        validate_optional_range(self.away_score, "away_score", 0, i32::MAX)?;
        validate_optional_range(self.quarter, "quarter", 1, 4)?;
        Ok(())
    }

    /// Apply to `game`, rejecting a completed game without both scores
    pub fn apply(&self, game: &mut Game) -> Result<()> {
        if self.home_score.is_some() {
            game.home_score = self.home_score;
        }
        if self.away_score.is_some() {
            game.away_score = self.away_score;
        }
        if let Some(status) = self.status {
            game.status = status;
        }
        if self.quarter.is_some() {
            game.quarter = self.quarter;
        }
        if self.time_remaining.is_some() {
            game.time_remaining = self.time_remaining.clone();
        }
        if game.status == GameStatus::Completed
            && (game.home_score.is_none() || game.away_score.is_none())
        {
            return Err(NbaError::validation(
                "completed games require both home_score and away_score",
            ));
        }
        Ok(())
    }
}

/// Filters for the game listing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameFilter {
    pub season: Option<String>,
    pub team_id: Option<i64>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub status: Option<GameStatus>,
    pub limit: i64,
    pub offset: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn game(status: GameStatus, home: Option<i32>, away: Option<i32>) -> Game {
        Game {
            id: 7,
            external_id: None,
            season: "2023-24".into(),
            game_date: Utc.with_ymd_and_hms(2024, 1, 15, 0, 30, 0).unwrap(),
            home_team_id: 1,
            away_team_id: 2,
            home_score: home,
            away_score: away,
            status,
            quarter: None,
            time_remaining: None,
            game_type: "regular".into(),
            created_at: Utc::now(),
            updated_at: None,
            home_team: None,
            away_team: None,
        }
    }

    #[test]
    fn result_for_each_side() {
        let g = game(GameStatus::Completed, Some(110), Some(102));
        let home = g.result_for(1).unwrap();
        assert!(home.won());
        assert!(home.is_home);
        assert_eq!(home.margin(), 8);

        let away = g.result_for(2).unwrap();
        assert!(!away.won());
        assert_eq!(away.points_for, 102);
        assert_eq!(away.opponent_id, 1);

        assert!(g.result_for(3).is_none());
    }

    #[test]
    fn unfinished_games_have_no_result() {
        let live = game(GameStatus::Live, Some(50), Some(48));
        assert!(live.result_for(1).is_none());
    }

    #[test]
    fn create_rejects_same_teams_and_bad_quarter() {
        let mut create = GameCreate {
            season: "2023-24".into(),
            game_date: Utc::now(),
            home_team_id: 1,
            away_team_id: 1,
            home_score: None,
            away_score: None,
            status: GameStatus::Scheduled,
            quarter: None,
            time_remaining: None,
            game_type: default_game_type(),
            external_id: None,
        };
        assert!(create.validate().is_err());

        create.away_team_id = 2;
        assert!(create.validate().is_ok());

        create.quarter = Some(5);
        assert!(create.validate().is_err());
    }

    #[test]
    fn completing_without_scores_fails() {
        let mut g = game(GameStatus::Live, None, None);
        let update = GameUpdate {
            status: Some(GameStatus::Completed),
            ..Default::default()
        };
        assert!(update.apply(&mut g).is_err());

        let update = GameUpdate {
            status: Some(GameStatus::Completed),
            home_score: Some(99),
            away_score: Some(101),
            ..Default::default()
        };
        assert!(update.apply(&mut g).is_ok());
        assert_eq!(g.final_score(), Some((99, 101)));
    }
}

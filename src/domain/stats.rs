use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Position;
use crate::error::{NbaError, Result};
use crate::validation::{validate_made_attempted, validate_non_negative, validate_optional_range};

/// Box-score counters for one player in one game
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoxScore {
    #[serde(default)]
    pub minutes_played: Option<f64>,
    #[serde(default)]
    pub points: i32,
    #[serde(default)]
    pub rebounds: i32,
    #[serde(default)]
    pub assists: i32,
    #[serde(default)]
    pub steals: i32,
    #[serde(default)]
    pub blocks: i32,
    #[serde(default)]
    pub turnovers: i32,
    #[serde(default)]
    pub fouls: i32,
    #[serde(default)]
    pub field_goals_made: i32,
    #[serde(default)]
    pub field_goals_attempted: i32,
    #[serde(default)]
    pub three_pointers_made: i32,
    #[serde(default)]
    pub three_pointers_attempted: i32,
    #[serde(default)]
    pub free_throws_made: i32,
    #[serde(default)]
    pub free_throws_attempted: i32,
    #[serde(default)]
    pub plus_minus: Option<i32>,
}

/// `made / attempted`, or None when nothing was attempted
pub fn shooting_pct(made: i32, attempted: i32) -> Option<f64> {
    if attempted <= 0 {
        None
    } else {
        Some(made as f64 / attempted as f64)
    }
}

impl BoxScore {
    pub fn validate(&self) -> Result<()> {
        validate_optional_range(self.minutes_played, "minutes_played", 0.0, 48.0)?;
        for (value, name) in [
            (self.points, "points"),
            (self.rebounds, "rebounds"),
            (self.assists, "assists"),
            (self.steals, "steals"),
            (self.blocks, "blocks"),
            (self.turnovers, "turnovers"),
            (self.fouls, "fouls"),
        ] {
            validate_non_negative(value, name)?;
        }
        validate_made_attempted(
            self.field_goals_made,
            self.field_goals_attempted,
            "field_goals",
        )?;
        validate_made_attempted(
            self.three_pointers_made,
            self.three_pointers_attempted,
            "three_pointers",
        )?;
        validate_made_attempted(
            self.free_throws_made,
            self.free_throws_attempted,
            "free_throws",
        )?;
        if self.three_pointers_made > self.field_goals_made
            || self.three_pointers_attempted > self.field_goals_attempted
        {
            return Err(NbaError::validation(
                "three pointers are a subset of field goals",
            ));
        }
        let min_points = self
            .field_goals_made
            .checked_mul(2)
            .and_then(|p| p.checked_add(self.three_pointers_made))
            .and_then(|p| p.checked_add(self.free_throws_made))
            .ok_or_else(|| NbaError::validation("made shot counts are out of range"))?;
        if self.points != min_points {
            return Err(NbaError::Validation(format!(
                "points ({}) do not match made shots ({})",
                self.points, min_points
            )));
        }
        Ok(())
    }

    pub fn field_goal_percentage(&self) -> Option<f64> {
        shooting_pct(self.field_goals_made, self.field_goals_attempted)
    }

    pub fn three_point_percentage(&self) -> Option<f64> {
        shooting_pct(self.three_pointers_made, self.three_pointers_attempted)
    }

    pub fn free_throw_percentage(&self) -> Option<f64> {
        shooting_pct(self.free_throws_made, self.free_throws_attempted)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerStatsCreate {
    pub player_id: i64,
    /// Optional; must match the game in the request path when given
    #[serde(default)]
    pub game_id: Option<i64>,
    #[serde(flatten)]
    pub line: BoxScore,
}

/// A stored stat line with derived shooting percentages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub id: i64,
    pub player_id: i64,
    pub game_id: i64,
    /// Team the player represented in this game
    pub team_id: Option<i64>,
    #[serde(flatten)]
    pub line: BoxScore,
    pub field_goal_percentage: Option<f64>,
    pub three_point_percentage: Option<f64>,
    pub free_throw_percentage: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl PlayerStats {
    pub fn new(
        id: i64,
        player_id: i64,
        game_id: i64,
        team_id: Option<i64>,
        line: BoxScore,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            player_id,
            game_id,
            team_id,
            field_goal_percentage: line.field_goal_percentage(),
            three_point_percentage: line.three_point_percentage(),
            free_throw_percentage: line.free_throw_percentage(),
            line,
            created_at,
        }
    }
}

/// A stat line joined with the game and player context analytics need
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatLine {
    pub player_id: i64,
    pub player_name: String,
    pub position: Option<Position>,
    pub team_id: Option<i64>,
    pub game_id: i64,
    pub season: String,
    pub game_date: DateTime<Utc>,
    #[serde(flatten)]
    pub line: BoxScore,
}

/// Which stat lines to load
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatLineFilter {
    pub player_id: Option<i64>,
    pub team_id: Option<i64>,
    pub season: Option<String>,
    /// Most recent N games for the player (requires `player_id`)
    pub last_n_games: Option<i64>,
}

impl StatLineFilter {
    /// One line per game only holds for a single player, so a game window needs one
    pub fn validate(&self) -> Result<()> {
        if self.last_n_games.is_some() && self.player_id.is_none() {
            return Err(NbaError::validation("last_n_games requires player_id"));
        }
        Ok(())
    }
}

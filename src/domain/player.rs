use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Position, Team};
use crate::error::Result;
use crate::validation::{validate_optional_range, validate_optional_text, validate_text};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: i64,
    pub external_id: Option<String>,
    pub name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub position: Option<Position>,
    pub height: Option<String>,
    pub weight: Option<String>,
    pub birth_date: Option<DateTime<Utc>>,
    pub birth_place: Option<String>,
    pub jersey_number: Option<i32>,
    pub years_pro: Option<i32>,
    pub college: Option<String>,
    pub team_id: Option<i64>,
    pub is_active: bool,
    pub is_rookie: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Populated on reads that join the team row
    #[serde(default)]
    pub team: Option<Team>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerCreate {
    pub name: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default)]
    pub height: Option<String>,
    #[serde(default)]
    pub weight: Option<String>,
    #[serde(default)]
    pub birth_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub birth_place: Option<String>,
    #[serde(default)]
    pub jersey_number: Option<i32>,
    #[serde(default)]
    pub years_pro: Option<i32>,
    #[serde(default)]
    pub college: Option<String>,
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub team_id: Option<i64>,
}

impl PlayerCreate {
    pub fn validate(&self) -> Result<()> {
        validate_text(&self.name, "name", 1, 100)?;
        validate_optional_text(self.first_name.as_deref(), "first_name", 50)?;
        validate_optional_text(self.last_name.as_deref(), "last_name", 50)?;
        validate_optional_text(self.height.as_deref(), "height", 10)?;
        validate_optional_text(self.weight.as_deref(), "weight", 10)?;
        validate_optional_text(self.birth_place.as_deref(), "birth_place", 100)?;
        validate_optional_text(self.college.as_deref(), "college", 100)?;
        validate_optional_range(self.jersey_number, "jersey_number", 0, 99)?;
        validate_optional_range(self.years_pro, "years_pro", 0, 30)?;
        Ok(())
    }
}

/// Partial update; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default)]
    pub team_id: Option<i64>,
    #[serde(default)]
    pub jersey_number: Option<i32>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub is_rookie: Option<bool>,
}

impl PlayerUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            validate_text(name, "name", 1, 100)?;
        }
        validate_optional_range(self.jersey_number, "jersey_number", 0, 99)?;
        Ok(())
    }

    pub fn apply(&self, player: &mut Player) {
        if let Some(name) = &self.name {
            player.name = name.clone();
        }
        if self.position.is_some() {
            player.position = self.position;
        }
        if self.team_id.is_some() {
            player.team_id = self.team_id;
            // The embedded team belongs to the previous affiliation
            player.team = None;
        }
        if self.jersey_number.is_some() {
            player.jersey_number = self.jersey_number;
        }
        if let Some(active) = self.is_active {
            player.is_active = active;
        }
        if let Some(rookie) = self.is_rookie {
            player.is_rookie = rookie;
        }
    }
}

/// Filters for the player listing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerFilter {
    pub skip: i64,
    pub limit: i64,
    pub team_id: Option<i64>,
    pub position: Option<Position>,
    pub is_active: Option<bool>,
}

/// Free-text player search
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerSearch {
    pub name: Option<String>,
    pub team_name: Option<String>,
    pub limit: i64,
}

/// Per-player season aggregates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerAnalytics {
    pub player_id: i64,
    pub player_name: String,
    pub games_played: i64,
    pub avg_points: f64,
    pub avg_rebounds: f64,
    pub avg_assists: f64,
    pub avg_minutes: f64,
    pub field_goal_percentage: f64,
    pub three_point_percentage: f64,
    pub free_throw_percentage: f64,
    pub efficiency_rating: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jersey_number_bounds() {
        let mut create = PlayerCreate {
            name: "Stephen Curry".into(),
            jersey_number: Some(30),
            ..Default::default()
        };
        assert!(create.validate().is_ok());

        create.jersey_number = Some(100);
        assert!(create.validate().is_err());

        create.jersey_number = Some(-1);
        assert!(create.validate().is_err());
    }

    #[test]
    fn update_rejects_empty_name() {
        let update = PlayerUpdate {
            name: Some(String::new()),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn create_deserializes_with_only_name() {
        let create: PlayerCreate = serde_json::from_str(r#"{"name": "Nikola Jokic"}"#).unwrap();
        assert_eq!(create.name, "Nikola Jokic");
        assert!(create.team_id.is_none());
        assert!(create.validate().is_ok());
    }
}

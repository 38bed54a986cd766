use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Conference;
use crate::error::Result;
use crate::validation::{validate_optional_range, validate_optional_text, validate_text};

/// An NBA franchise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: i64,
    pub external_id: Option<String>,
    pub name: String,
    pub city: String,
    pub abbreviation: String,
    pub conference: Option<Conference>,
    pub division: Option<String>,
    pub founded_year: Option<i32>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Team {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.city, self.name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamCreate {
    pub name: String,
    pub city: String,
    pub abbreviation: String,
    #[serde(default)]
    pub conference: Option<Conference>,
    #[serde(default)]
    pub division: Option<String>,
    #[serde(default)]
    pub founded_year: Option<i32>,
    #[serde(default)]
    pub external_id: Option<String>,
}

impl TeamCreate {
    pub fn validate(&self) -> Result<()> {
        validate_text(&self.name, "name", 1, 100)?;
        validate_text(&self.city, "city", 1, 50)?;
        validate_text(&self.abbreviation, "abbreviation", 2, 3)?;
        validate_optional_text(self.division.as_deref(), "division", 50)?;
        validate_optional_range(self.founded_year, "founded_year", 1946, 2025)?;
        Ok(())
    }
}

/// Partial update; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub conference: Option<Conference>,
    #[serde(default)]
    pub division: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl TeamUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            validate_text(name, "name", 1, 100)?;
        }
        if let Some(city) = &self.city {
            validate_text(city, "city", 1, 50)?;
        }
        validate_optional_text(self.division.as_deref(), "division", 50)?;
        Ok(())
    }

    pub fn apply(&self, team: &mut Team) {
        if let Some(name) = &self.name {
            team.name = name.clone();
        }
        if let Some(city) = &self.city {
            team.city = city.clone();
        }
        if self.conference.is_some() {
            team.conference = self.conference;
        }
        if self.division.is_some() {
            team.division = self.division.clone();
        }
        if let Some(active) = self.is_active {
            team.is_active = active;
        }
    }
}

/// Filters for the team listing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamFilter {
    pub skip: i64,
    pub limit: i64,
    pub conference: Option<Conference>,
    pub is_active: Option<bool>,
}

/// Aggregate team performance over completed games
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamAnalytics {
    pub team_id: i64,
    pub team_name: String,
    pub games_played: i64,
    pub wins: i64,
    pub losses: i64,
    pub win_percentage: f64,
    pub avg_points_scored: f64,
    pub avg_points_allowed: f64,
    pub avg_rebounds: f64,
    pub avg_assists: f64,
}

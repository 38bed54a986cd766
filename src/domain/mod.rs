pub mod game;
pub mod player;
pub mod stats;
pub mod team;

pub use game::*;
pub use player::*;
pub use stats::*;
pub use team::*;

use serde::{Deserialize, Serialize};

/// Playing position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "PG")]
    PointGuard,
    #[serde(rename = "SG")]
    ShootingGuard,
    #[serde(rename = "SF")]
    SmallForward,
    #[serde(rename = "PF")]
    PowerForward,
    #[serde(rename = "C")]
    Center,
}

impl Position {
    pub const ALL: [Position; 5] = [
        Position::PointGuard,
        Position::ShootingGuard,
        Position::SmallForward,
        Position::PowerForward,
        Position::Center,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Position::PointGuard => "PG",
            Position::ShootingGuard => "SG",
            Position::SmallForward => "SF",
            Position::PowerForward => "PF",
            Position::Center => "C",
        }
    }
}

impl TryFrom<&str> for Position {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PG" => Ok(Position::PointGuard),
            "SG" => Ok(Position::ShootingGuard),
            "SF" => Ok(Position::SmallForward),
            "PF" => Ok(Position::PowerForward),
            "C" => Ok(Position::Center),
            other => Err(format!(
                "invalid position '{}', expected one of PG, SG, SF, PF, C",
                other
            )),
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Conference {
    Eastern,
    Western,
}

impl Conference {
    pub fn as_str(&self) -> &'static str {
        match self {
            Conference::Eastern => "Eastern",
            Conference::Western => "Western",
        }
    }
}

impl TryFrom<&str> for Conference {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.trim().to_ascii_lowercase().as_str() {
            "eastern" | "east" => Ok(Conference::Eastern),
            "western" | "west" => Ok(Conference::Western),
            other => Err(format!(
                "invalid conference '{}', expected Eastern or Western",
                other
            )),
        }
    }
}

impl std::fmt::Display for Conference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    #[default]
    Scheduled,
    Live,
    Completed,
}

impl GameStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Scheduled => "scheduled",
            GameStatus::Live => "live",
            GameStatus::Completed => "completed",
        }
    }
}

impl TryFrom<&str> for GameStatus {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scheduled" => Ok(GameStatus::Scheduled),
            "live" => Ok(GameStatus::Live),
            "completed" => Ok(GameStatus::Completed),
            other => Err(format!(
                "invalid game status '{}', expected scheduled, live or completed",
                other
            )),
        }
    }
}

impl std::fmt::Display for GameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Generic paginated list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, total: i64, limit: i64, offset: i64) -> Self {
        Self {
            has_next: offset + (items.len() as i64) < total,
            has_previous: offset > 0,
            items,
            total,
            limit,
            offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_parses_case_insensitively() {
        assert_eq!(Position::try_from("pg").unwrap(), Position::PointGuard);
        assert_eq!(Position::try_from(" C ").unwrap(), Position::Center);
        assert!(Position::try_from("G").is_err());
        assert_eq!(
            serde_json::to_string(&Position::PowerForward).unwrap(),
            "\"PF\""
        );
    }

    #[test]
    fn conference_accepts_short_names() {
        assert_eq!(Conference::try_from("west").unwrap(), Conference::Western);
        assert_eq!(Conference::try_from("Eastern").unwrap(), Conference::Eastern);
        assert!(Conference::try_from("Central").is_err());
    }

    #[test]
    fn game_status_defaults_to_scheduled() {
        assert_eq!(GameStatus::default(), GameStatus::Scheduled);
        assert_eq!(
            serde_json::to_string(&GameStatus::Completed).unwrap(),
            "\"completed\""
        );
    }

    #[test]
    fn pagination_flags() {
        let page = PaginatedResponse::new(vec![1, 2, 3], 10, 3, 0);
        assert!(page.has_next);
        assert!(!page.has_previous);

        let last = PaginatedResponse::new(vec![10], 10, 3, 9);
        assert!(!last.has_next);
        assert!(last.has_previous);
    }
}

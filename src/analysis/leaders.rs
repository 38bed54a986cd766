//! League leaderboards and per-player efficiency tables.

use serde::Serialize;
use std::cmp::Ordering;

use super::aggregates::{PlayerTotals, Totals};
use super::stats::round_to;
use crate::domain::{shooting_pct, Position};
use crate::error::{NbaError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaderStat {
    Points,
    Rebounds,
    Assists,
    Steals,
    Blocks,
    Turnovers,
    Minutes,
    FieldGoalPercentage,
    ThreePointPercentage,
    FreeThrowPercentage,
    Efficiency,
}

impl LeaderStat {
    pub const ALL: [LeaderStat; 11] = [
        LeaderStat::Points,
        LeaderStat::Rebounds,
        LeaderStat::Assists,
        LeaderStat::Steals,
        LeaderStat::Blocks,
        LeaderStat::Turnovers,
        LeaderStat::Minutes,
        LeaderStat::FieldGoalPercentage,
        LeaderStat::ThreePointPercentage,
        LeaderStat::FreeThrowPercentage,
        LeaderStat::Efficiency,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LeaderStat::Points => "points",
            LeaderStat::Rebounds => "rebounds",
            LeaderStat::Assists => "assists",
            LeaderStat::Steals => "steals",
            LeaderStat::Blocks => "blocks",
            LeaderStat::Turnovers => "turnovers",
            LeaderStat::Minutes => "minutes",
            LeaderStat::FieldGoalPercentage => "field_goal_percentage",
            LeaderStat::ThreePointPercentage => "three_point_percentage",
            LeaderStat::FreeThrowPercentage => "free_throw_percentage",
            LeaderStat::Efficiency => "efficiency",
        }
    }

    /// Per-game value, or the split for percentages; None with no attempts
    pub fn value(&self, t: &Totals) -> Option<f64> {
        let b = &t.box_score;
        match self {
            LeaderStat::Points => Some(t.per_game(b.points)),
            LeaderStat::Rebounds => Some(t.per_game(b.rebounds)),
            LeaderStat::Assists => Some(t.per_game(b.assists)),
            LeaderStat::Steals => Some(t.per_game(b.steals)),
            LeaderStat::Blocks => Some(t.per_game(b.blocks)),
            LeaderStat::Turnovers => Some(t.per_game(b.turnovers)),
            LeaderStat::Minutes => (t.games_with_minutes > 0).then(|| t.minutes_per_game()),
            LeaderStat::FieldGoalPercentage => {
                shooting_pct(b.field_goals_made, b.field_goals_attempted)
            }
            LeaderStat::ThreePointPercentage => {
                shooting_pct(b.three_pointers_made, b.three_pointers_attempted)
            }
            LeaderStat::FreeThrowPercentage => {
                shooting_pct(b.free_throws_made, b.free_throws_attempted)
            }
            LeaderStat::Efficiency => Some(t.efficiency()),
        }
    }
}

impl TryFrom<&str> for LeaderStat {
    type Error = NbaError;

    fn try_from(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        LeaderStat::ALL
            .into_iter()
            .find(|stat| stat.as_str() == wanted)
            .ok_or_else(|| {
                let valid: Vec<&str> = LeaderStat::ALL.iter().map(|s| s.as_str()).collect();
                NbaError::Validation(format!(
                    "Invalid stat '{}'. Must be one of: {}",
                    s,
                    valid.join(", ")
                ))
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderEntry {
    pub rank: usize,
    pub player_id: i64,
    pub player_name: String,
    pub position: Option<Position>,
    pub team_id: Option<i64>,
    pub games_played: u32,
    pub value: f64,
}

/// Highest first; equal values rank by ascending player id
fn by_value_desc(a: (f64, i64), b: (f64, i64)) -> Ordering {
    b.0.total_cmp(&a.0).then(a.1.cmp(&b.1))
}

/// Top `limit` players by `stat` among those with at least `min_games`
pub fn league_leaders(
    players: &[PlayerTotals],
    stat: LeaderStat,
    min_games: u32,
    limit: usize,
) -> Vec<LeaderEntry> {
    let mut ranked: Vec<(&PlayerTotals, f64)> = players
        .iter()
        .filter(|p| p.totals.games >= min_games)
        .filter_map(|p| stat.value(&p.totals).map(|v| (p, v)))
        .collect();
    ranked.sort_by(|(pa, va), (pb, vb)| by_value_desc((*va, pa.player_id), (*vb, pb.player_id)));

    ranked
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, (p, value))| LeaderEntry {
            rank: i + 1,
            player_id: p.player_id,
            player_name: p.player_name.clone(),
            position: p.position,
            team_id: p.team_id,
            games_played: p.totals.games,
            value: round_to(value, 4),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerEfficiency {
    pub player_id: i64,
    pub player_name: String,
    pub position: Option<Position>,
    pub games_played: u32,
    pub points_per_game: f64,
    pub efficiency: f64,
    pub true_shooting_pct: Option<f64>,
    pub effective_fg_pct: Option<f64>,
    pub assist_to_turnover: Option<f64>,
    pub points_per_shot: Option<f64>,
}

/// Efficiency table for players with at least `min_games`, best EFF first
pub fn player_efficiency(players: &[PlayerTotals], min_games: u32) -> Vec<PlayerEfficiency> {
    let round = |v: Option<f64>| v.map(|x| round_to(x, 4));
    let mut rows: Vec<PlayerEfficiency> = players
        .iter()
        .filter(|p| p.totals.games >= min_games)
        .map(|p| {
            let t = &p.totals;
            PlayerEfficiency {
                player_id: p.player_id,
                player_name: p.player_name.clone(),
                position: p.position,
                games_played: t.games,
                points_per_game: round_to(t.points_per_game(), 2),
                efficiency: round_to(t.efficiency(), 2),
                true_shooting_pct: round(t.true_shooting()),
                effective_fg_pct: round(t.effective_fg()),
                assist_to_turnover: round(t.assist_to_turnover()),
                points_per_shot: round(t.points_per_shot()),
            }
        })
        .collect();
    rows.sort_by(|a, b| by_value_desc((a.efficiency, a.player_id), (b.efficiency, b.player_id)));
    rows
}

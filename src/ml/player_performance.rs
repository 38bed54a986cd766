//! Player stat-line projection from weighted rolling averages.
//!
//! The projection blends the last 5, 10 and 20 games (weights 0.5, 0.3,
//! 0.2) and scales the scoring categories by how many points the opponent
//! concedes relative to the league.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::analysis::stats::{mean, pool_stats, round_to};
use crate::domain::{BoxScore, Game};
use crate::ml::features::{league_points_per_team, team_form};

/// (window size, weight), most recent window first
pub const WINDOWS: [(usize, f64); 3] = [(5, 0.5), (10, 0.3), (20, 0.2)];

/// Games needed before a projection is backtested against the next game
const BACKTEST_MIN_HISTORY: usize = 5;

/// Opponent adjustment never moves a projection by more than this fraction
const MAX_OPPONENT_SWING: f64 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectedStat {
    Points,
    Rebounds,
    Assists,
    Steals,
    Blocks,
    Turnovers,
    ThreePointersMade,
    Minutes,
}

impl ProjectedStat {
    pub const ALL: [ProjectedStat; 8] = [
        ProjectedStat::Points,
        ProjectedStat::Rebounds,
        ProjectedStat::Assists,
        ProjectedStat::Steals,
        ProjectedStat::Blocks,
        ProjectedStat::Turnovers,
        ProjectedStat::ThreePointersMade,
        ProjectedStat::Minutes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectedStat::Points => "points",
            ProjectedStat::Rebounds => "rebounds",
            ProjectedStat::Assists => "assists",
            ProjectedStat::Steals => "steals",
            ProjectedStat::Blocks => "blocks",
            ProjectedStat::Turnovers => "turnovers",
            ProjectedStat::ThreePointersMade => "three_pointers_made",
            ProjectedStat::Minutes => "minutes",
        }
    }

    /// Whether the opponent's defence scales this stat
    fn opponent_sensitive(&self) -> bool {
        matches!(
            self,
            ProjectedStat::Points | ProjectedStat::Assists | ProjectedStat::ThreePointersMade
        )
    }

    fn value(&self, b: &BoxScore) -> Option<f64> {
        let v = match self {
            ProjectedStat::Points => b.points,
            ProjectedStat::Rebounds => b.rebounds,
            ProjectedStat::Assists => b.assists,
            ProjectedStat::Steals => b.steals,
            ProjectedStat::Blocks => b.blocks,
            ProjectedStat::Turnovers => b.turnovers,
            ProjectedStat::ThreePointersMade => b.three_pointers_made,
            ProjectedStat::Minutes => return b.minutes_played,
        };
        Some(v as f64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerProjection {
    /// Stat name -> projected value
    pub projected: BTreeMap<String, f64>,
    /// Multiplier applied to the scoring categories
    pub opponent_adjustment: f64,
    pub games_used: usize,
    pub confidence: f64,
}

/// Points the opponent concedes per game relative to the league average.
///
/// 1.0 when either side of the ratio is unknown; clamped to ±15%.
pub fn opponent_factor(opponent_id: i64, games: &[Game]) -> f64 {
    let conceded = team_form(opponent_id, games).avg_points_against();
    match (conceded, league_points_per_team(games)) {
        (Some(c), Some(league)) if league > 0.0 => {
            (c / league).clamp(1.0 - MAX_OPPONENT_SWING, 1.0 + MAX_OPPONENT_SWING)
        }
        _ => 1.0,
    }
}

fn weighted_average(recent: &[BoxScore], stat: ProjectedStat) -> Option<f64> {
    let mut total = 0.0;
    let mut weight_sum = 0.0;
    for (size, weight) in WINDOWS {
        let values: Vec<f64> = recent
            .iter()
            .take(size)
            .filter_map(|b| stat.value(b))
            .collect();
        if values.is_empty() {
            continue;
        }
        total += weight * mean(&values);
        weight_sum += weight;
    }
    (weight_sum > 0.0).then(|| total / weight_sum)
}

/// Project the next stat line from `recent` lines, most recent first.
///
/// None without any history.
pub fn project_player(recent: &[BoxScore], opponent_adjustment: f64) -> Option<PlayerProjection> {
    if recent.is_empty() {
        return None;
    }
    let longest = WINDOWS[WINDOWS.len() - 1].0;
    let used = &recent[..recent.len().min(longest)];

    let mut projected = BTreeMap::new();
    for stat in ProjectedStat::ALL {
        if let Some(mut value) = weighted_average(used, stat) {
            if stat.opponent_sensitive() {
                value *= opponent_adjustment;
            }
            projected.insert(stat.as_str().to_string(), round_to(value, 1));
        }
    }

    // More games and steadier scoring both raise confidence
    let points: Vec<f64> = used.iter().map(|b| b.points as f64).collect();
    let spread = pool_stats(&points);
    let cv = if spread.mean > 0.0 {
        spread.stdev / spread.mean
    } else {
        0.0
    };
    let sample = used.len() as f64 / longest as f64;
    let confidence = round_to(sample / (1.0 + cv), 3);

    Some(PlayerProjection {
        projected,
        opponent_adjustment: round_to(opponent_adjustment, 4),
        games_used: used.len(),
        confidence,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BacktestMetrics {
    pub mae_points: f64,
    pub rmse_points: f64,
    pub n_predictions: usize,
}

/// Replay each player's history (oldest first) and score every projection
/// against the game that followed it. None when no player has enough games.
pub fn backtest<'a>(histories: impl IntoIterator<Item = &'a [BoxScore]>) -> Option<BacktestMetrics> {
    let mut errors = Vec::new();
    for history in histories {
        for i in BACKTEST_MIN_HISTORY..history.len() {
            let recent: Vec<BoxScore> = history[..i].iter().rev().copied().collect();
            let Some(projection) = project_player(&recent, 1.0) else {
                continue;
            };
            if let Some(p) = projection.projected.get(ProjectedStat::Points.as_str()) {
                errors.push(p - history[i].points as f64);
            }
        }
    }
    if errors.is_empty() {
        return None;
    }
    let n = errors.len() as f64;
    Some(BacktestMetrics {
        mae_points: round_to(errors.iter().map(|e| e.abs()).sum::<f64>() / n, 3),
        rmse_points: round_to((errors.iter().map(|e| e * e).sum::<f64>() / n).sqrt(), 3),
        n_predictions: errors.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::features::test_support::completed;

    fn scoring(points: i32) -> BoxScore {
        BoxScore {
            minutes_played: Some(30.0),
            points,
            rebounds: 6,
            assists: 4,
            ..Default::default()
        }
    }

    #[test]
    fn test_recent_games_weigh_more() {
        // five hot games followed by fifteen cold ones
        let mut recent: Vec<BoxScore> = (0..5).map(|_| scoring(30)).collect();
        recent.extend((0..15).map(|_| scoring(10)));

        let projection = project_player(&recent, 1.0).unwrap();
        let points = projection.projected["points"];
        // 0.5 * 30 + 0.3 * 20 + 0.2 * 15
        assert!((points - 24.0).abs() < 1e-9);
        assert_eq!(projection.projected["rebounds"], 6.0);
        assert_eq!(projection.games_used, 20);
    }

    #[test]
    fn test_opponent_adjustment_scales_scoring_only() {
        let recent: Vec<BoxScore> = (0..10).map(|_| scoring(20)).collect();
        let projection = project_player(&recent, 1.1).unwrap();
        assert!((projection.projected["points"] - 22.0).abs() < 1e-9);
        assert_eq!(projection.projected["rebounds"], 6.0);
    }

    #[test]
    fn test_confidence_grows_with_history() {
        let short: Vec<BoxScore> = (0..4).map(|_| scoring(20)).collect();
        let long: Vec<BoxScore> = (0..20).map(|_| scoring(20)).collect();
        let a = project_player(&short, 1.0).unwrap().confidence;
        let b = project_player(&long, 1.0).unwrap().confidence;
        assert!(a < b);
        assert_eq!(b, 1.0);
        assert!(project_player(&[], 1.0).is_none());
    }

    #[test]
    fn test_opponent_factor_against_league() {
        // team 2 concedes 120, team 3 concedes 100; league average 110
        let games = vec![completed(1, 1, 2, 120, 100), completed(2, 3, 4, 120, 100)];
        let leaky = opponent_factor(2, &games);
        assert!((leaky - 120.0 / 110.0).abs() < 1e-9);
        assert_eq!(opponent_factor(99, &games), 1.0);
    }

    #[test]
    fn test_backtest_counts_predictions() {
        let history: Vec<BoxScore> = (0..8).map(|i| scoring(20 + i % 2)).collect();
        let metrics = backtest([history.as_slice()]).unwrap();
        assert_eq!(metrics.n_predictions, 3);
        assert!(metrics.mae_points < 1.0);

        let short: Vec<BoxScore> = (0..3).map(|_| scoring(20)).collect();
        assert!(backtest([short.as_slice()]).is_none());
    }
}

//! Player similarity by distance between z-scored per-game profiles.

use serde::Serialize;

use super::aggregates::PlayerTotals;
use super::stats::{pool_stats, zscore, PoolStats};
use crate::domain::Position;

pub const ALGORITHM: &str = "euclidean distance over z-scored per-game averages";

/// Profile dimensions, in vector order
pub const PROFILE_FEATURES: [&str; 6] = [
    "points_per_game",
    "rebounds_per_game",
    "assists_per_game",
    "steals_per_game",
    "blocks_per_game",
    "field_goal_percentage",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarPlayer {
    pub player_id: i64,
    pub player_name: String,
    pub position: Option<Position>,
    pub games_played: u32,
    /// 1 / (1 + distance); 1.0 means an identical profile
    pub similarity_score: f64,
    pub distance: f64,
    pub points_per_game: f64,
    pub rebounds_per_game: f64,
    pub assists_per_game: f64,
}

fn profile(p: &PlayerTotals) -> [f64; 6] {
    let t = &p.totals;
    let b = &t.box_score;
    [
        t.points_per_game(),
        t.rebounds_per_game(),
        t.assists_per_game(),
        t.per_game(b.steals),
        t.per_game(b.blocks),
        b.field_goal_percentage().unwrap_or(0.0),
    ]
}

/// Players closest to `target_id`, nearest first (ties by player id).
///
/// Each dimension is standardised across every candidate so that points
/// do not dominate blocks. None when the target has no stat lines.
pub fn find_similar(
    target_id: i64,
    candidates: &[PlayerTotals],
    limit: usize,
) -> Option<Vec<SimilarPlayer>> {
    let target = candidates.iter().find(|p| p.player_id == target_id)?;
    let profiles: Vec<[f64; 6]> = candidates.iter().map(profile).collect();

    let pools: Vec<PoolStats> = (0..PROFILE_FEATURES.len())
        .map(|i| pool_stats(&profiles.iter().map(|v| v[i]).collect::<Vec<_>>()))
        .collect();
    let standardise = |v: &[f64; 6]| -> Vec<f64> {
        v.iter()
            .zip(&pools)
            .map(|(x, pool)| zscore(*x, pool))
            .collect()
    };

    let target_z = standardise(&profile(target));
    let mut similar: Vec<SimilarPlayer> = candidates
        .iter()
        .zip(&profiles)
        .filter(|(p, _)| p.player_id != target_id)
        .map(|(p, v)| {
            let distance = standardise(v)
                .iter()
                .zip(&target_z)
                .map(|(a, b)| (a - b).powi(2))
                .sum::<f64>()
                .sqrt();
            SimilarPlayer {
                player_id: p.player_id,
                player_name: p.player_name.clone(),
                position: p.position,
                games_played: p.totals.games,
                similarity_score: 1.0 / (1.0 + distance),
                distance,
                points_per_game: v[0],
                rebounds_per_game: v[1],
                assists_per_game: v[2],
            }
        })
        .collect();

    similar.sort_by(|a, b| {
        a.distance
            .total_cmp(&b.distance)
            .then(a.player_id.cmp(&b.player_id))
    });
    similar.truncate(limit);
    Some(similar)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::aggregates::Totals;
    use crate::domain::BoxScore;

    fn player(id: i64, points: i32, rebounds: i32, assists: i32) -> PlayerTotals {
        let line = BoxScore {
            points,
            rebounds,
            assists,
            field_goals_made: points / 2,
            field_goals_attempted: points,
            ..Default::default()
        };
        PlayerTotals {
            player_id: id,
            player_name: format!("Player {}", id),
            position: None,
            team_id: None,
            totals: Totals::from_lines(&[line, line]),
        }
    }

    #[test]
    fn test_nearest_profile_ranks_first() {
        let pool = vec![
            player(1, 30, 8, 8),
            player(2, 30, 8, 7),
            player(3, 8, 12, 1),
            player(4, 12, 3, 10),
        ];
        let similar = find_similar(1, &pool, 5).unwrap();
        assert_eq!(similar.len(), 3);
        assert_eq!(similar[0].player_id, 2);
        assert!(similar.iter().all(|s| s.player_id != 1));
        assert!(similar[0].similarity_score > similar[1].similarity_score);
        assert!(similar.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    #[test]
    fn test_limit_and_missing_target() {
        let pool = vec![player(1, 20, 5, 5), player(2, 10, 5, 5), player(3, 15, 5, 5)];
        assert_eq!(find_similar(1, &pool, 1).unwrap().len(), 1);
        assert!(find_similar(99, &pool, 5).is_none());
    }

    #[test]
    fn test_identical_profiles_tie_by_id() {
        let pool = vec![player(5, 20, 5, 5), player(3, 10, 5, 5), player(2, 10, 5, 5)];
        let similar = find_similar(5, &pool, 5).unwrap();
        assert_eq!(similar[0].player_id, 2);
        assert_eq!(similar[1].player_id, 3);
    }
}

//! Head-to-head team comparison with a significance check on scoring.

use serde::Serialize;
use std::collections::BTreeMap;

use super::advanced::{team_advanced, TeamAdvanced};
use super::aggregates::team_analytics;
use super::stats::{cohens_d, effect_size_label, round_to, welch_t};
use crate::domain::{Game, StatLine, Team, TeamAnalytics};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamSide {
    pub analytics: TeamAnalytics,
    pub advanced: Option<TeamAdvanced>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeadToHead {
    pub games: usize,
    pub team1_wins: usize,
    pub team2_wins: usize,
}

/// Welch's t and Cohen's d on per-game points scored
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoringSignificance {
    pub metric: &'static str,
    pub t_statistic: Option<f64>,
    pub cohens_d: Option<f64>,
    pub effect_size: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamComparison {
    pub team1: TeamSide,
    pub team2: TeamSide,
    /// team1 minus team2 for each shared metric
    pub differences: BTreeMap<String, f64>,
    pub head_to_head: HeadToHead,
    pub scoring_significance: ScoringSignificance,
}

fn points_per_game(team_id: i64, games: &[Game]) -> Vec<f64> {
    games
        .iter()
        .filter_map(|g| g.result_for(team_id))
        .map(|r| r.points_for as f64)
        .collect()
}

/// Compare two teams over the same games; None when either has not
/// completed a game.
pub fn compare_teams(
    team1: &Team,
    team2: &Team,
    games: &[Game],
    lines: &[StatLine],
) -> Option<TeamComparison> {
    let a = team_analytics(team1, games, lines)?;
    let b = team_analytics(team2, games, lines)?;
    let adv_a = team_advanced(team1, games, lines);
    let adv_b = team_advanced(team2, games, lines);

    let mut differences = BTreeMap::new();
    for (name, x, y) in [
        ("win_percentage", a.win_percentage, b.win_percentage),
        ("avg_points_scored", a.avg_points_scored, b.avg_points_scored),
        ("avg_points_allowed", a.avg_points_allowed, b.avg_points_allowed),
        ("avg_rebounds", a.avg_rebounds, b.avg_rebounds),
        ("avg_assists", a.avg_assists, b.avg_assists),
    ] {
        differences.insert(name.to_string(), round_to(x - y, 4));
    }
    let rating = |adv: &Option<TeamAdvanced>| adv.as_ref().and_then(|t| t.net_rating);
    if let (Some(x), Some(y)) = (rating(&adv_a), rating(&adv_b)) {
        differences.insert("net_rating".to_string(), round_to(x - y, 4));
    }

    let mut head_to_head = HeadToHead {
        games: 0,
        team1_wins: 0,
        team2_wins: 0,
    };
    for r in games.iter().filter_map(|g| g.result_for(team1.id)) {
        if r.opponent_id != team2.id {
            continue;
        }
        head_to_head.games += 1;
        if r.won() {
            head_to_head.team1_wins += 1;
        } else {
            head_to_head.team2_wins += 1;
        }
    }

    let ppg_a = points_per_game(team1.id, games);
    let ppg_b = points_per_game(team2.id, games);
    let d = cohens_d(&ppg_a, &ppg_b);

    Some(TeamComparison {
        team1: TeamSide {
            analytics: a,
            advanced: adv_a,
        },
        team2: TeamSide {
            analytics: b,
            advanced: adv_b,
        },
        differences,
        head_to_head,
        scoring_significance: ScoringSignificance {
            metric: "points_per_game",
            t_statistic: welch_t(&ppg_a, &ppg_b).map(|t| round_to(t, 4)),
            cohens_d: d.map(|v| round_to(v, 4)),
            effect_size: d.map(effect_size_label),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::features::test_support::completed;
    use chrono::Utc;

    fn team(id: i64, name: &str) -> Team {
        Team {
            id,
            external_id: None,
            name: name.into(),
            city: "City".into(),
            abbreviation: format!("T{}", id),
            conference: None,
            division: None,
            founded_year: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn test_compare_teams() {
        let games = vec![
            completed(1, 1, 2, 110, 100),
            completed(2, 2, 1, 99, 120),
            completed(3, 1, 3, 105, 101),
            completed(4, 3, 2, 90, 104),
        ];
        let cmp = compare_teams(&team(1, "One"), &team(2, "Two"), &games, &[]).unwrap();
        assert_eq!(cmp.head_to_head.games, 2);
        assert_eq!(cmp.head_to_head.team1_wins, 2);
        assert_eq!(cmp.team1.analytics.wins, 3);
        assert!(cmp.differences["avg_points_scored"] > 0.0);
        assert!(cmp.scoring_significance.t_statistic.unwrap() > 0.0);
        assert!(cmp.scoring_significance.effect_size.is_some());
        // no box scores recorded, so no ratings to compare
        assert!(!cmp.differences.contains_key("net_rating"));
    }

    #[test]
    fn test_team_without_games() {
        let games = vec![completed(1, 1, 2, 110, 100)];
        assert!(compare_teams(&team(1, "One"), &team(5, "Five"), &games, &[]).is_none());
    }
}

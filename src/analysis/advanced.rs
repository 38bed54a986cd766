//! Possession-based team ratings, four factors and player usage shares.
//!
//! Offensive rebounds are not recorded, so possessions use the box-score
//! estimate `FGA + 0.44 * FTA + TOV`.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use super::aggregates::{group_by_player, Totals};
use super::stats::ratio;
use crate::domain::{BoxScore, Game, StatLine, Team};

/// Estimated possessions for one side's box score
pub fn possessions(b: &BoxScore) -> f64 {
    b.field_goals_attempted as f64 + 0.44 * b.free_throws_attempted as f64 + b.turnovers as f64
}

/// Sum every team's lines per game: (game_id, team_id) -> totals
pub fn team_game_totals(lines: &[StatLine]) -> HashMap<(i64, i64), Totals> {
    let mut out: HashMap<(i64, i64), Totals> = HashMap::new();
    for line in lines {
        if let Some(team_id) = line.team_id {
            out.entry((line.game_id, team_id))
                .or_default()
                .add(&line.line);
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FourFactors {
    pub effective_fg_pct: Option<f64>,
    pub turnover_pct: Option<f64>,
    pub free_throw_rate: Option<f64>,
    pub rebound_share: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamAdvanced {
    pub team_id: i64,
    pub team_name: String,
    pub games: usize,
    /// Games that had box scores for both sides
    pub games_with_box_scores: usize,
    pub pace: Option<f64>,
    pub offensive_rating: Option<f64>,
    pub defensive_rating: Option<f64>,
    pub net_rating: Option<f64>,
    pub four_factors: FourFactors,
}

/// Team ratings over completed games; None when the team has played none
pub fn team_advanced(team: &Team, games: &[Game], lines: &[StatLine]) -> Option<TeamAdvanced> {
    let results: Vec<_> = games.iter().filter_map(|g| g.result_for(team.id)).collect();
    if results.is_empty() {
        return None;
    }
    let boxes = team_game_totals(lines);

    let mut own = Totals::default();
    let mut opp = Totals::default();
    let (mut own_poss, mut opp_poss) = (0.0, 0.0);
    let (mut points_for, mut points_against) = (0i64, 0i64);
    let mut with_boxes = 0usize;

    for r in &results {
        let (Some(mine), Some(theirs)) = (
            boxes.get(&(r.game_id, team.id)),
            boxes.get(&(r.game_id, r.opponent_id)),
        ) else {
            continue;
        };
        with_boxes += 1;
        own.add(&mine.box_score);
        opp.add(&theirs.box_score);
        own_poss += possessions(&mine.box_score);
        opp_poss += possessions(&theirs.box_score);
        points_for += r.points_for as i64;
        points_against += r.points_against as i64;
    }

    let offensive_rating = ratio(100.0 * points_for as f64, own_poss);
    let defensive_rating = ratio(100.0 * points_against as f64, opp_poss);
    let net_rating = match (offensive_rating, defensive_rating) {
        (Some(o), Some(d)) => Some(o - d),
        _ => None,
    };
    let pace = if with_boxes > 0 {
        Some((own_poss + opp_poss) / 2.0 / with_boxes as f64)
    } else {
        None
    };

    let b = &own.box_score;
    let four_factors = FourFactors {
        effective_fg_pct: own.effective_fg(),
        turnover_pct: ratio(b.turnovers as f64, own_poss),
        free_throw_rate: ratio(b.free_throws_made as f64, b.field_goals_attempted as f64),
        rebound_share: ratio(
            b.rebounds as f64,
            (b.rebounds + opp.box_score.rebounds) as f64,
        ),
    };

    Some(TeamAdvanced {
        team_id: team.id,
        team_name: team.full_name(),
        games: results.len(),
        games_with_box_scores: with_boxes,
        pace,
        offensive_rating,
        defensive_rating,
        net_rating,
        four_factors,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerAdvanced {
    pub player_id: i64,
    pub player_name: String,
    pub team_id: Option<i64>,
    pub games: u32,
    pub true_shooting_pct: Option<f64>,
    pub effective_fg_pct: Option<f64>,
    /// Share of the team's possessions used while the player logged a line
    pub usage_share: Option<f64>,
    /// Share of team field goals the player assisted
    pub assist_rate: Option<f64>,
    pub rebound_share: Option<f64>,
    /// Steals + blocks per game
    pub stocks_per_game: f64,
}

/// Player usage and efficiency relative to their team's totals in the same games
pub fn player_advanced(lines: &[StatLine]) -> Vec<PlayerAdvanced> {
    let boxes = team_game_totals(lines);

    // Team totals restricted to the games each player appeared in
    let mut team_in_games: BTreeMap<i64, Totals> = BTreeMap::new();
    for line in lines {
        if let Some(team_id) = line.team_id {
            if let Some(t) = boxes.get(&(line.game_id, team_id)) {
                team_in_games
                    .entry(line.player_id)
                    .or_default()
                    .add(&t.box_score);
            }
        }
    }

    group_by_player(lines)
        .into_iter()
        .map(|p| {
            let t = &p.totals;
            let team = team_in_games.get(&p.player_id).copied().unwrap_or_default();
            PlayerAdvanced {
                player_id: p.player_id,
                player_name: p.player_name,
                team_id: p.team_id,
                games: t.games,
                true_shooting_pct: t.true_shooting(),
                effective_fg_pct: t.effective_fg(),
                usage_share: ratio(possessions(&t.box_score), possessions(&team.box_score)),
                assist_rate: ratio(
                    t.box_score.assists as f64,
                    team.box_score.field_goals_made as f64,
                ),
                rebound_share: ratio(
                    t.box_score.rebounds as f64,
                    team.box_score.rebounds as f64,
                ),
                stocks_per_game: t.per_game(t.box_score.steals + t.box_score.blocks),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Conference, GameStatus};
    use chrono::{TimeZone, Utc};

    fn stat_line(player_id: i64, team_id: i64, game_id: i64, b: BoxScore) -> StatLine {
        StatLine {
            player_id,
            player_name: format!("Player {}", player_id),
            position: None,
            team_id: Some(team_id),
            game_id,
            season: "2023-24".into(),
            game_date: Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap(),
            line: b,
        }
    }

    fn shots(points: i32, fgm: i32, fga: i32, fta: i32, tov: i32, reb: i32, ast: i32) -> BoxScore {
        BoxScore {
            points,
            field_goals_made: fgm,
            field_goals_attempted: fga,
            free_throws_made: fta,
            free_throws_attempted: fta,
            turnovers: tov,
            rebounds: reb,
            assists: ast,
            steals: 1,
            blocks: 1,
            ..Default::default()
        }
    }

    fn setup() -> (Team, Vec<Game>, Vec<StatLine>) {
        let team = Team {
            id: 1,
            external_id: None,
            name: "Nuggets".into(),
            city: "Denver".into(),
            abbreviation: "DEN".into(),
            conference: Some(Conference::Western),
            division: None,
            founded_year: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: None,
        };
        let game = Game {
            id: 10,
            external_id: None,
            season: "2023-24".into(),
            game_date: Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap(),
            home_team_id: 1,
            away_team_id: 2,
            home_score: Some(110),
            away_score: Some(100),
            status: GameStatus::Completed,
            quarter: None,
            time_remaining: None,
            game_type: "regular".into(),
            created_at: Utc::now(),
            updated_at: None,
            home_team: None,
            away_team: None,
        };
        let lines = vec![
            // team 1: 40 + 60 = 100 FGA, 25 FTA, 10 TOV -> 121 possessions
            stat_line(100, 1, 10, shots(30, 12, 40, 5, 4, 10, 3)),
            stat_line(101, 1, 10, shots(20, 8, 60, 20, 6, 30, 7)),
            // team 2: 90 FGA, 0 FTA, 11 TOV -> 101 possessions
            stat_line(200, 2, 10, shots(100, 45, 90, 0, 11, 40, 20)),
        ];
        (team, vec![game], lines)
    }

    #[test]
    fn test_team_ratings() {
        let (team, games, lines) = setup();
        let adv = team_advanced(&team, &games, &lines).unwrap();
        assert_eq!(adv.games, 1);
        assert_eq!(adv.games_with_box_scores, 1);

        let own_poss = 100.0 + 0.44 * 25.0 + 10.0;
        let opp_poss = 90.0 + 11.0;
        assert!((adv.offensive_rating.unwrap() - 11000.0 / own_poss).abs() < 1e-9);
        assert!((adv.defensive_rating.unwrap() - 10000.0 / opp_poss).abs() < 1e-9);
        assert!((adv.pace.unwrap() - (own_poss + opp_poss) / 2.0).abs() < 1e-9);
        assert!((adv.four_factors.rebound_share.unwrap() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_games_without_box_scores_have_no_ratings() {
        let (team, games, _) = setup();
        let adv = team_advanced(&team, &games, &[]).unwrap();
        assert_eq!(adv.games_with_box_scores, 0);
        assert!(adv.offensive_rating.is_none());
        assert!(adv.pace.is_none());
    }

    #[test]
    fn test_player_shares_sum_to_one_within_team() {
        let (_, _, lines) = setup();
        let players = player_advanced(&lines);
        assert_eq!(players.len(), 3);

        let team_one: Vec<_> = players.iter().filter(|p| p.team_id == Some(1)).collect();
        let usage: f64 = team_one.iter().filter_map(|p| p.usage_share).sum();
        let rebounds: f64 = team_one.iter().filter_map(|p| p.rebound_share).sum();
        assert!((usage - 1.0).abs() < 1e-9);
        assert!((rebounds - 1.0).abs() < 1e-9);
        assert!((players[0].assist_rate.unwrap() - 3.0 / 20.0).abs() < 1e-9);
        assert_eq!(players[0].stocks_per_game, 2.0);
    }
}

//! Team form and matchup features for the game outcome model.

use serde::Serialize;
use std::collections::HashMap;

use crate::domain::Game;

/// Feature names, in vector order
pub const FEATURE_NAMES: [&str; 3] = ["win_pct_diff", "net_rating_diff", "home_court"];

pub const NUM_FEATURES: usize = FEATURE_NAMES.len();

/// A team's record and scoring margin over completed games
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TeamForm {
    pub games: u32,
    pub wins: u32,
    pub points_for: i64,
    pub points_against: i64,
}

impl TeamForm {
    pub fn record(&mut self, points_for: i32, points_against: i32) {
        self.games += 1;
        if points_for > points_against {
            self.wins += 1;
        }
        self.points_for += points_for as i64;
        self.points_against += points_against as i64;
    }

    /// Win percentage, 0.5 before the first game
    pub fn win_pct(&self) -> f64 {
        if self.games == 0 {
            return 0.5;
        }
        self.wins as f64 / self.games as f64
    }

    /// Average point margin per game
    pub fn net_rating(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        (self.points_for - self.points_against) as f64 / self.games as f64
    }

    pub fn avg_points_for(&self) -> Option<f64> {
        (self.games > 0).then(|| self.points_for as f64 / self.games as f64)
    }

    pub fn avg_points_against(&self) -> Option<f64> {
        (self.games > 0).then(|| self.points_against as f64 / self.games as f64)
    }
}

/// Form for `team_id` over the given games
pub fn team_form(team_id: i64, games: &[Game]) -> TeamForm {
    let mut form = TeamForm::default();
    for r in games.iter().filter_map(|g| g.result_for(team_id)) {
        form.record(r.points_for, r.points_against);
    }
    form
}

/// Average points scored per team per game across completed games
pub fn league_points_per_team(games: &[Game]) -> Option<f64> {
    let scores: Vec<(i32, i32)> = games.iter().filter_map(|g| g.final_score()).collect();
    if scores.is_empty() {
        return None;
    }
    let total: i64 = scores.iter().map(|(h, a)| (*h + *a) as i64).sum();
    Some(total as f64 / (2 * scores.len()) as f64)
}

/// Matchup features from `team`'s perspective against `opponent`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatchupFeatures {
    pub win_pct_diff: f64,
    pub net_rating_diff: f64,
    /// +1 at home, -1 away
    pub home_court: f64,
}

impl MatchupFeatures {
    pub fn new(team: &TeamForm, opponent: &TeamForm, at_home: bool) -> Self {
        Self {
            win_pct_diff: team.win_pct() - opponent.win_pct(),
            net_rating_diff: team.net_rating() - opponent.net_rating(),
            home_court: if at_home { 1.0 } else { -1.0 },
        }
    }

    /// The same matchup seen from the other bench
    pub fn mirrored(&self) -> Self {
        Self {
            win_pct_diff: -self.win_pct_diff,
            net_rating_diff: -self.net_rating_diff,
            home_court: -self.home_court,
        }
    }

    pub fn as_vector(&self) -> [f64; NUM_FEATURES] {
        [self.win_pct_diff, self.net_rating_diff, self.home_court]
    }
}

/// One labelled training row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub features: [f64; NUM_FEATURES],
    /// 1.0 when the perspective team won
    pub label: f64,
}

/// Walk completed games oldest first and emit one row per game from the
/// home side plus its mirror, using only form accumulated before that game.
///
/// Games where either side has no prior games are skipped.
pub fn training_samples(games: &[Game]) -> Vec<Sample> {
    let mut ordered: Vec<&Game> = games.iter().filter(|g| g.final_score().is_some()).collect();
    ordered.sort_by(|a, b| a.game_date.cmp(&b.game_date).then(a.id.cmp(&b.id)));

    let mut forms: HashMap<i64, TeamForm> = HashMap::new();
    let mut samples = Vec::new();

    for game in ordered {
        let Some((home_pts, away_pts)) = game.final_score() else {
            continue;
        };
        let home = forms.get(&game.home_team_id).copied().unwrap_or_default();
        let away = forms.get(&game.away_team_id).copied().unwrap_or_default();

        if home.games > 0 && away.games > 0 && home_pts != away_pts {
            let features = MatchupFeatures::new(&home, &away, true);
            let label = if home_pts > away_pts { 1.0 } else { 0.0 };
            samples.push(Sample {
                features: features.as_vector(),
                label,
            });
            samples.push(Sample {
                features: features.mirrored().as_vector(),
                label: 1.0 - label,
            });
        }

        forms
            .entry(game.home_team_id)
            .or_default()
            .record(home_pts, away_pts);
        forms
            .entry(game.away_team_id)
            .or_default()
            .record(away_pts, home_pts);
    }
    samples
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_team_form() {
        let games = vec![completed(1, 1, 2, 110, 100), completed(2, 2, 1, 105, 101)];
        let form = team_form(1, &games);
        assert_eq!(form.games, 2);
        assert_eq!(form.wins, 1);
        assert!((form.win_pct() - 0.5).abs() < 1e-9);
        assert!((form.net_rating() - 3.0).abs() < 1e-9);
        assert_eq!(team_form(9, &games).win_pct(), 0.5);
    }

    #[test]
    fn test_samples_use_only_prior_games() {
        let games = vec![
            completed(1, 1, 2, 110, 100),
            completed(2, 1, 2, 90, 100),
        ];
        let samples = training_samples(&games);
        // first game has no history, second yields the home row and its mirror
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].features, [1.0, 20.0, 1.0]);
        assert_eq!(samples[0].label, 0.0);
        assert_eq!(samples[1].features, [-1.0, -20.0, -1.0]);
        assert_eq!(samples[1].label, 1.0);
    }

    #[test]
    fn test_league_points() {
        let games = vec![completed(1, 1, 2, 110, 100), completed(2, 1, 2, 90, 100)];
        assert_eq!(league_points_per_team(&games), Some(100.0));
        assert!(league_points_per_team(&[]).is_none());
    }
}

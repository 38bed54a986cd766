//! Prediction payloads returned by the ML endpoints.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::features::{MatchupFeatures, TeamForm, FEATURE_NAMES};
use super::game_predictor::GamePredictor;
use super::player_performance::PlayerProjection;
use crate::analysis::stats::round_to;
use crate::domain::Team;
use crate::error::Result;
use crate::validation::{validate_probability, validate_win_probabilities};

/// Games of history at which a matchup prediction reaches full confidence
const CONFIDENT_SAMPLE: u32 = 10;

/// Raw model output for one matchup, before it becomes a response
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GamePrediction {
    pub home_win_probability: f64,
    pub away_win_probability: f64,
    pub predicted_home_score: Option<f64>,
    pub predicted_away_score: Option<f64>,
    pub confidence: f64,
    pub features: MatchupFeatures,
}

fn expected_score(attack: Option<f64>, defence: Option<f64>, league: Option<f64>) -> Option<f64> {
    let score = match (attack, defence) {
        (Some(a), Some(d)) => (a + d) / 2.0,
        (Some(v), None) | (None, Some(v)) => v,
        (None, None) => league?,
    };
    Some(round_to(score, 1))
}

/// Score a matchup with the current model.
///
/// Predicted scores average the attacking side's points scored with the
/// defending side's points allowed, falling back to `league_points`.
pub fn predict_game(
    model: &GamePredictor,
    home: &TeamForm,
    away: &TeamForm,
    league_points: Option<f64>,
) -> GamePrediction {
    let features = MatchupFeatures::new(home, away, true);
    let p_home = model.predict(&features);

    let home_win_probability = round_to(p_home, 4);
    let away_win_probability = round_to(1.0 - home_win_probability, 4);

    let sample = home.games.min(away.games).min(CONFIDENT_SAMPLE) as f64 / CONFIDENT_SAMPLE as f64;
    let decisiveness = 0.5 + (p_home - 0.5).abs();
    let confidence = round_to(decisiveness * (0.5 + 0.5 * sample), 3);

    GamePrediction {
        home_win_probability,
        away_win_probability,
        predicted_home_score: expected_score(
            home.avg_points_for(),
            away.avg_points_against(),
            league_points,
        ),
        predicted_away_score: expected_score(
            away.avg_points_for(),
            home.avg_points_against(),
            league_points,
        ),
        confidence,
        features,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResponse {
    pub home_team_id: i64,
    pub home_team: String,
    pub away_team_id: i64,
    pub away_team: String,
    pub home_win_probability: f64,
    pub away_win_probability: f64,
    pub predicted_home_score: Option<f64>,
    pub predicted_away_score: Option<f64>,
    pub confidence: f64,
    pub model_version: String,
    pub features_used: Vec<String>,
    pub features: MatchupFeatures,
    pub game_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl PredictionResponse {
    /// Build a response, rejecting probabilities outside [0, 1], win
    /// probabilities that do not sum to 1 within 0.01, and invalid confidence.
    pub fn new(
        home: &Team,
        away: &Team,
        prediction: GamePrediction,
        model_version: impl Into<String>,
        game_date: Option<DateTime<Utc>>,
    ) -> Result<Self> {
        validate_win_probabilities(
            prediction.home_win_probability,
            prediction.away_win_probability,
        )?;
        validate_probability(prediction.confidence, "confidence")?;

        Ok(Self {
            home_team_id: home.id,
            home_team: home.full_name(),
            away_team_id: away.id,
            away_team: away.full_name(),
            home_win_probability: prediction.home_win_probability,
            away_win_probability: prediction.away_win_probability,
            predicted_home_score: prediction.predicted_home_score,
            predicted_away_score: prediction.predicted_away_score,
            confidence: prediction.confidence,
            model_version: model_version.into(),
            features_used: FEATURE_NAMES.iter().map(|f| f.to_string()).collect(),
            features: prediction.features,
            game_date,
            created_at: Utc::now(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerPerformanceResponse {
    pub player_id: i64,
    pub player_name: String,
    pub game_id: Option<i64>,
    pub opponent_team_id: Option<i64>,
    #[serde(flatten)]
    pub projection: PlayerProjection,
    pub model_version: String,
    pub created_at: DateTime<Utc>,
}

impl PlayerPerformanceResponse {
    pub fn new(
        player_id: i64,
        player_name: String,
        game_id: Option<i64>,
        opponent_team_id: Option<i64>,
        projection: PlayerProjection,
        model_version: impl Into<String>,
    ) -> Result<Self> {
        validate_probability(projection.confidence, "confidence")?;
        Ok(Self {
            player_id,
            player_name,
            game_id,
            opponent_team_id,
            projection,
            model_version: model_version.into(),
            created_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(games: u32, wins: u32, scored: i64, allowed: i64) -> TeamForm {
        TeamForm {
            games,
            wins,
            points_for: scored * games as i64,
            points_against: allowed * games as i64,
        }
    }

    #[test]
    fn test_probabilities_are_complementary() {
        let model = GamePredictor::default();
        let p = predict_game(&model, &form(20, 15, 118, 108), &form(20, 6, 104, 112), None);
        assert!(p.home_win_probability > 0.5);
        assert!((p.home_win_probability + p.away_win_probability - 1.0).abs() < 1e-9);
        assert!((0.0..=1.0).contains(&p.confidence));
        // (118 + 112) / 2 and (104 + 108) / 2
        assert_eq!(p.predicted_home_score, Some(115.0));
        assert_eq!(p.predicted_away_score, Some(106.0));
    }

    #[test]
    fn test_scores_fall_back_to_league_average() {
        let model = GamePredictor::default();
        let empty = TeamForm::default();
        let p = predict_game(&model, &empty, &empty, Some(112.34));
        assert_eq!(p.predicted_home_score, Some(112.3));

        let none = predict_game(&model, &empty, &empty, None);
        assert!(none.predicted_home_score.is_none());
        // no history: only the home edge and half the sample weight remain
        assert!(none.confidence < 0.5);
    }
}

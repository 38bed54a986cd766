//! Game outcome model
//!
//! Logistic regression on three matchup features (win% difference, net
//! rating difference, home court). The model has no intercept: every game
//! is trained from both benches, so P(home) + P(away) = 1 exactly.
//!
//! Until the first successful training run the model uses hand-set prior
//! coefficients that give the home side roughly a 56% edge between equal
//! teams.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::features::{MatchupFeatures, Sample, FEATURE_NAMES, NUM_FEATURES};
use crate::error::{NbaError, Result};

/// Fewer completed games than this and training is refused
pub const MIN_TRAINING_GAMES: usize = 10;

const LEARNING_RATE: f64 = 0.05;
const EPOCHS: usize = 2_000;
const L2_PENALTY: f64 = 1e-3;

/// Model coefficients for logistic regression
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameCoefficients {
    pub win_pct_diff: f64,
    pub net_rating_diff: f64,
    pub home_court: f64,
}

impl GameCoefficients {
    fn as_vector(&self) -> [f64; NUM_FEATURES] {
        [self.win_pct_diff, self.net_rating_diff, self.home_court]
    }

    fn from_vector(w: [f64; NUM_FEATURES]) -> Self {
        Self {
            win_pct_diff: w[0],
            net_rating_diff: w[1],
            home_court: w[2],
        }
    }
}

impl Default for GameCoefficients {
    fn default() -> Self {
        Self {
            win_pct_diff: 2.0,
            net_rating_diff: 0.08,
            home_court: 0.24,
        }
    }
}

/// Model metadata for tracking and validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub version: String,
    pub trained_at: Option<DateTime<Utc>>,
    /// Training rows (two per usable game)
    pub n_samples: usize,
    pub accuracy: Option<f64>,
    pub log_loss: Option<f64>,
    pub brier_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GamePredictor {
    pub coefficients: GameCoefficients,
    /// Per-feature standard deviation of the training rows
    pub feature_std: [f64; NUM_FEATURES],
    pub metadata: ModelMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub coefficient: f64,
    /// Normalised |coefficient x feature std|; all importances sum to 1
    pub importance: f64,
}

impl Default for GamePredictor {
    fn default() -> Self {
        Self {
            coefficients: GameCoefficients::default(),
            // Typical league spread of each feature
            feature_std: [0.2, 6.0, 1.0],
            metadata: ModelMetadata {
                version: "prior".to_string(),
                trained_at: None,
                n_samples: 0,
                accuracy: None,
                log_loss: None,
                brier_score: None,
            },
        }
    }
}

/// Sigmoid function: 1 / (1 + exp(-x))
fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn dot(a: &[f64; NUM_FEATURES], b: &[f64; NUM_FEATURES]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

impl GamePredictor {
    /// Load model from JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save model to JSON file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn is_trained(&self) -> bool {
        self.metadata.trained_at.is_some()
    }

    /// Probability that the perspective team wins
    pub fn predict(&self, features: &MatchupFeatures) -> f64 {
        sigmoid(dot(&self.coefficients.as_vector(), &features.as_vector()))
    }

    /// Fit by batch gradient descent with a small L2 penalty
    pub fn fit(samples: &[Sample], version: impl Into<String>) -> Result<Self> {
        if samples.len() < MIN_TRAINING_GAMES * 2 {
            return Err(NbaError::Model(format!(
                "need at least {} completed games with prior history, got {}",
                MIN_TRAINING_GAMES,
                samples.len() / 2
            )));
        }

        let n = samples.len() as f64;
        let mut stdev = [0.0; NUM_FEATURES];
        for (i, s) in stdev.iter_mut().enumerate() {
            let mean = samples.iter().map(|r| r.features[i]).sum::<f64>() / n;
            let var = samples
                .iter()
                .map(|r| (r.features[i] - mean).powi(2))
                .sum::<f64>()
                / n;
            *s = var.sqrt();
        }

        // Gradient descent on standardised features, then unscale
        let scale = |i: usize| if stdev[i] > 1e-9 { stdev[i] } else { 1.0 };
        let mut w = [0.0; NUM_FEATURES];
        for _ in 0..EPOCHS {
            let mut grad = [0.0; NUM_FEATURES];
            for s in samples {
                let x: [f64; NUM_FEATURES] = std::array::from_fn(|i| s.features[i] / scale(i));
                let err = sigmoid(dot(&w, &x)) - s.label;
                for i in 0..NUM_FEATURES {
                    grad[i] += err * x[i];
                }
            }
            for i in 0..NUM_FEATURES {
                w[i] -= LEARNING_RATE * (grad[i] / n + L2_PENALTY * w[i]);
            }
        }
        let coefficients = GameCoefficients::from_vector(std::array::from_fn(|i| w[i] / scale(i)));

        let mut model = Self {
            coefficients,
            feature_std: stdev,
            metadata: ModelMetadata {
                version: version.into(),
                trained_at: Some(Utc::now()),
                n_samples: samples.len(),
                accuracy: None,
                log_loss: None,
                brier_score: None,
            },
        };
        let (accuracy, log_loss, brier) = model.evaluate(samples);
        model.metadata.accuracy = Some(accuracy);
        model.metadata.log_loss = Some(log_loss);
        model.metadata.brier_score = Some(brier);
        Ok(model)
    }

    /// (accuracy, log loss, Brier score) over labelled rows
    pub fn evaluate(&self, samples: &[Sample]) -> (f64, f64, f64) {
        if samples.is_empty() {
            return (0.0, 0.0, 0.0);
        }
        let w = self.coefficients.as_vector();
        let (mut correct, mut ll, mut brier) = (0usize, 0.0, 0.0);
        for s in samples {
            let p = sigmoid(dot(&w, &s.features)).clamp(1e-12, 1.0 - 1e-12);
            if (p >= 0.5) == (s.label >= 0.5) {
                correct += 1;
            }
            ll -= s.label * p.ln() + (1.0 - s.label) * (1.0 - p).ln();
            brier += (p - s.label).powi(2);
        }
        let n = samples.len() as f64;
        (correct as f64 / n, ll / n, brier / n)
    }

    /// |coefficient x std| per feature, normalised, largest first
    pub fn feature_importance(&self) -> Vec<FeatureImportance> {
        let w = self.coefficients.as_vector();
        let raw: Vec<f64> = (0..NUM_FEATURES)
            .map(|i| (w[i] * self.feature_std[i]).abs())
            .collect();
        let total: f64 = raw.iter().sum();

        let mut out: Vec<FeatureImportance> = FEATURE_NAMES
            .iter()
            .enumerate()
            .map(|(i, name)| FeatureImportance {
                feature: name.to_string(),
                coefficient: w[i],
                importance: if total > 0.0 {
                    raw[i] / total
                } else {
                    1.0 / NUM_FEATURES as f64
                },
            })
            .collect();
        out.sort_by(|a, b| b.importance.total_cmp(&a.importance));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::features::test_support::season;
    use crate::ml::features::{team_form, training_samples, TeamForm};

    fn form(games: u32, wins: u32, margin: i64) -> TeamForm {
        TeamForm {
            games,
            wins,
            points_for: 100 * games as i64 + margin,
            points_against: 100 * games as i64,
        }
    }

    #[test]
    fn test_prior_favours_home_between_equals() {
        let model = GamePredictor::default();
        let even = MatchupFeatures::new(&form(10, 5, 0), &form(10, 5, 0), true);
        let p_home = model.predict(&even);
        let p_away = model.predict(&even.mirrored());
        assert!(p_home > 0.5 && p_home < 0.6);
        assert!((p_home + p_away - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_stronger_team_is_favoured() {
        let model = GamePredictor::default();
        let strong = MatchupFeatures::new(&form(10, 8, 80), &form(10, 2, -80), false);
        assert!(model.predict(&strong) > 0.7);
    }

    #[test]
    fn test_fit_learns_from_season() {
        let samples = training_samples(&season());
        let model = GamePredictor::fit(&samples, "v1").unwrap();
        assert!(model.is_trained());
        assert_eq!(model.metadata.n_samples, samples.len());
        assert!(model.metadata.accuracy.unwrap() > 0.6);

        let games = season();
        let top = team_form(1, &games);
        let bottom = team_form(3, &games);
        assert!(model.predict(&MatchupFeatures::new(&top, &bottom, false)) > 0.5);

        let importance = model.feature_importance();
        let total: f64 = importance.iter().map(|f| f.importance).sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert!(importance.windows(2).all(|w| w[0].importance >= w[1].importance));
    }

    #[test]
    fn test_fit_requires_enough_games() {
        let samples = training_samples(&season()[..6]);
        assert!(matches!(
            GamePredictor::fit(&samples, "v1"),
            Err(NbaError::Model(_))
        ));
    }

    #[test]
    fn test_round_trip_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("models").join("game_predictor.json");
        let model = GamePredictor::default();
        model.to_file(&path).unwrap();
        assert_eq!(GamePredictor::from_file(&path).unwrap(), model);
    }
}

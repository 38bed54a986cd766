use chrono::Utc;
use nba_analytics::domain::Team;
use nba_analytics::ml::features::{MatchupFeatures, TeamForm};
use nba_analytics::ml::{predict_game, GamePrediction, GamePredictor, PredictionResponse};

fn team(id: i64, city: &str, name: &str) -> Team {
    Team {
        id,
        external_id: None,
        name: name.to_string(),
        city: city.to_string(),
        abbreviation: name.chars().take(3).collect::<String>().to_uppercase(),
        conference: None,
        division: None,
        founded_year: None,
        is_active: true,
        created_at: Utc::now(),
        updated_at: None,
    }
}

fn form(games: u32, wins: u32, points_for: i64, points_against: i64) -> TeamForm {
    TeamForm {
        games,
        wins,
        points_for,
        points_against,
    }
}

fn raw(home: f64, away: f64, confidence: f64) -> GamePrediction {
    let f = TeamForm::default();
    GamePrediction {
        home_win_probability: home,
        away_win_probability: away,
        predicted_home_score: None,
        predicted_away_score: None,
        confidence,
        features: MatchupFeatures::new(&f, &f, true),
    }
}

#[test]
fn model_output_always_builds_a_valid_response() {
    let model = GamePredictor::default();
    let lakers = team(1, "Los Angeles", "Lakers");
    let celtics = team(2, "Boston", "Celtics");

    let cases = [
        (form(0, 0, 0, 0), form(0, 0, 0, 0)),
        (form(10, 10, 1200, 950), form(10, 0, 950, 1200)),
        (form(40, 12, 4400, 4600), form(38, 30, 4500, 4200)),
    ];
    for (home, away) in cases {
        let prediction = predict_game(&model, &home, &away, Some(112.0));
        let response =
            PredictionResponse::new(&lakers, &celtics, prediction, "prior", None).unwrap();

        assert!((0.0..=1.0).contains(&response.home_win_probability));
        assert!((0.0..=1.0).contains(&response.away_win_probability));
        assert!(
            (response.home_win_probability + response.away_win_probability - 1.0).abs() <= 0.01
        );
        assert!((0.0..=1.0).contains(&response.confidence));
        assert_eq!(response.home_team, "Los Angeles Lakers");
        assert_eq!(response.features_used.len(), 3);
    }
}

#[test]
fn unseen_teams_fall_back_to_league_scoring() {
    let model = GamePredictor::default();
    let empty = TeamForm::default();
    let prediction = predict_game(&model, &empty, &empty, Some(110.0));

    assert_eq!(prediction.predicted_home_score, Some(110.0));
    assert_eq!(prediction.predicted_away_score, Some(110.0));
    assert!(prediction.home_win_probability > 0.5);
}

#[test]
fn probabilities_outside_unit_interval_are_rejected() {
    let a = team(1, "Denver", "Nuggets");
    let b = team(2, "Miami", "Heat");

    assert!(PredictionResponse::new(&a, &b, raw(1.2, -0.2, 0.5), "v", None).is_err());
    assert!(PredictionResponse::new(&a, &b, raw(-0.1, 1.1, 0.5), "v", None).is_err());
}

#[test]
fn probabilities_must_sum_to_one() {
    let a = team(1, "Denver", "Nuggets");
    let b = team(2, "Miami", "Heat");

    assert!(PredictionResponse::new(&a, &b, raw(0.6, 0.6, 0.5), "v", None).is_err());
    assert!(PredictionResponse::new(&a, &b, raw(0.6, 0.395, 0.5), "v", None).is_ok());
}

#[test]
fn confidence_must_be_a_probability() {
    let a = team(1, "Denver", "Nuggets");
    let b = team(2, "Miami", "Heat");

    assert!(PredictionResponse::new(&a, &b, raw(0.5, 0.5, 1.5), "v", None).is_err());
}

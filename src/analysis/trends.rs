//! League-wide time series bucketed by season, month or ISO week.

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use super::advanced::{possessions, team_game_totals};
use super::stats::round_to;
use crate::domain::{Game, StatLine};
use crate::error::{NbaError, Result};

/// Trailing window for the moving average
const MOVING_AVERAGE_WINDOW: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendType {
    /// Points per team per game
    Scoring,
    /// Share of field goal attempts taken from three
    ThreePoint,
    /// Possessions per team per game
    Pace,
    /// Minutes per player appearance
    Workload,
}

impl TryFrom<&str> for TrendType {
    type Error = NbaError;

    fn try_from(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scoring" => Ok(TrendType::Scoring),
            "three_point" => Ok(TrendType::ThreePoint),
            "pace" => Ok(TrendType::Pace),
            "workload" => Ok(TrendType::Workload),
            other => Err(NbaError::Validation(format!(
                "trend_type must be one of scoring, three_point, pace, workload; got '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimePeriod {
    Season,
    Month,
    Week,
}

impl TryFrom<&str> for TimePeriod {
    type Error = NbaError;

    fn try_from(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "season" => Ok(TimePeriod::Season),
            "month" => Ok(TimePeriod::Month),
            "week" => Ok(TimePeriod::Week),
            other => Err(NbaError::Validation(format!(
                "time_period must be one of season, month, week; got '{}'",
                other
            ))),
        }
    }
}

impl TimePeriod {
    /// Bucket label; labels sort chronologically as plain strings
    pub fn bucket(&self, season: &str, date: DateTime<Utc>) -> String {
        match self {
            TimePeriod::Season => season.to_string(),
            TimePeriod::Month => date.format("%Y-%m").to_string(),
            TimePeriod::Week => {
                let week = date.iso_week();
                format!("{}-W{:02}", week.year(), week.week())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub period: String,
    pub value: f64,
    pub samples: usize,
    pub moving_average: f64,
}

#[derive(Default)]
struct Bucket {
    numerator: f64,
    denominator: f64,
    samples: usize,
}

/// Build the requested series. `games` should be completed games and
/// `lines` the stat lines for the same window.
pub fn compute_trend(
    trend_type: TrendType,
    period: TimePeriod,
    games: &[Game],
    lines: &[StatLine],
) -> Vec<TrendPoint> {
    let mut buckets: BTreeMap<String, Bucket> = BTreeMap::new();

    match trend_type {
        TrendType::Scoring => {
            for game in games {
                if let Some((home, away)) = game.final_score() {
                    let b = buckets
                        .entry(period.bucket(&game.season, game.game_date))
                        .or_default();
                    b.numerator += (home + away) as f64;
                    b.denominator += 2.0;
                    b.samples += 1;
                }
            }
        }
        TrendType::ThreePoint => {
            for line in lines {
                let b = buckets
                    .entry(period.bucket(&line.season, line.game_date))
                    .or_default();
                b.numerator += line.line.three_pointers_attempted as f64;
                b.denominator += line.line.field_goals_attempted as f64;
                b.samples += 1;
            }
        }
        TrendType::Pace => {
            // One sample per team per game
            let mut when: BTreeMap<i64, (&str, DateTime<Utc>)> = BTreeMap::new();
            for line in lines {
                when.entry(line.game_id)
                    .or_insert((line.season.as_str(), line.game_date));
            }
            for ((game_id, _), totals) in team_game_totals(lines) {
                if let Some((season, date)) = when.get(&game_id) {
                    let b = buckets.entry(period.bucket(season, *date)).or_default();
                    b.numerator += possessions(&totals.box_score);
                    b.denominator += 1.0;
                    b.samples += 1;
                }
            }
        }
        TrendType::Workload => {
            for line in lines {
                if let Some(minutes) = line.line.minutes_played {
                    let b = buckets
                        .entry(period.bucket(&line.season, line.game_date))
                        .or_default();
                    b.numerator += minutes;
                    b.denominator += 1.0;
                    b.samples += 1;
                }
            }
        }
    }

    let mut points: Vec<TrendPoint> = Vec::with_capacity(buckets.len());
    for (label, bucket) in buckets {
        if bucket.denominator <= 0.0 {
            continue;
        }
        let value = bucket.numerator / bucket.denominator;
        let start = points.len().saturating_sub(MOVING_AVERAGE_WINDOW - 1);
        let window: Vec<f64> = points[start..]
            .iter()
            .map(|p| p.value)
            .chain(std::iter::once(value))
            .collect();
        let moving_average = window.iter().sum::<f64>() / window.len() as f64;
        points.push(TrendPoint {
            period: label,
            value: round_to(value, 4),
            samples: bucket.samples,
            moving_average: round_to(moving_average, 4),
        });
    }
    points
}

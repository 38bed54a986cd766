/// Field-level validation for API payloads and query parameters
///
/// These mirror the declared constraints of the data model (name lengths,
/// jersey numbers, season format, shooting splits, probabilities) so that
/// every create/update path and every ranged query parameter fails with the
/// same `Validation` error shape.
use crate::error::{NbaError, Result};
use std::fmt::Display;

/// Validate a required text field's length (in characters)
pub fn validate_text(value: &str, field_name: &str, min: usize, max: usize) -> Result<()> {
    let len = value.trim().chars().count();
    if len < min {
        return Err(NbaError::Validation(format!(
            "{} must be at least {} characters",
            field_name, min
        )));
    }
    if value.chars().count() > max {
        return Err(NbaError::Validation(format!(
            "{} must be at most {} characters",
            field_name, max
        )));
    }
    Ok(())
}

/// Validate an optional text field's maximum length
pub fn validate_optional_text(value: Option<&str>, field_name: &str, max: usize) -> Result<()> {
    match value {
        Some(v) if v.chars().count() > max => Err(NbaError::Validation(format!(
            "{} must be at most {} characters",
            field_name, max
        ))),
        _ => Ok(()),
    }
}

/// Validate that a value lies in `[min, max]`
pub fn validate_range<T>(value: T, field_name: &str, min: T, max: T) -> Result<()>
where
    T: PartialOrd + Display + Copy,
{
    if value < min || value > max {
        return Err(NbaError::Validation(format!(
            "{} must be between {} and {}, got {}",
            field_name, min, max, value
        )));
    }
    Ok(())
}

/// Validate an optional value against `[min, max]`
pub fn validate_optional_range<T>(value: Option<T>, field_name: &str, min: T, max: T) -> Result<()>
where
    T: PartialOrd + Display + Copy,
{
    match value {
        Some(v) => validate_range(v, field_name, min, max),
        None => Ok(()),
    }
}

/// Validate a non-negative counter
pub fn validate_non_negative(value: i32, field_name: &str) -> Result<()> {
    if value < 0 {
        return Err(NbaError::Validation(format!(
            "{} cannot be negative: {}",
            field_name, value
        )));
    }
    Ok(())
}

/// Validate a season label such as `2023-24`
///
/// The second half must be the year after the first, modulo 100.
pub fn validate_season(season: &str) -> Result<()> {
    let invalid = || {
        NbaError::Validation(format!(
            "season must look like '2023-24', got '{}'",
            season
        ))
    };

    if season.len() != 7 || !season.is_ascii() {
        return Err(invalid());
    }
    let (start, rest) = season.split_at(4);
    let end = rest.strip_prefix('-').ok_or_else(invalid)?;
    if !start.bytes().chain(end.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let start: u32 = start.parse().map_err(|_| invalid())?;
    let end: u32 = end.parse().map_err(|_| invalid())?;

    if (start + 1) % 100 != end {
        return Err(invalid());
    }
    Ok(())
}

/// Validate a made/attempted shooting split
pub fn validate_made_attempted(made: i32, attempted: i32, field_name: &str) -> Result<()> {
    validate_non_negative(made, &format!("{}_made", field_name))?;
    validate_non_negative(attempted, &format!("{}_attempted", field_name))?;
    if made > attempted {
        return Err(NbaError::Validation(format!(
            "{}: made ({}) cannot exceed attempted ({})",
            field_name, made, attempted
        )));
    }
    Ok(())
}

/// Validate a probability in `[0, 1]`
pub fn validate_probability(p: f64, field_name: &str) -> Result<()> {
    if !p.is_finite() || !(0.0..=1.0).contains(&p) {
        return Err(NbaError::Validation(format!(
            "{} must be between 0 and 1, got {}",
            field_name, p
        )));
    }
    Ok(())
}

/// Validate that two complementary win probabilities sum to 1.0
///
/// Allows ±0.01 for floating point error.
pub fn validate_win_probabilities(home: f64, away: f64) -> Result<()> {
    validate_probability(home, "home_team_win_probability")?;
    validate_probability(away, "away_team_win_probability")?;
    let total = home + away;
    if !(0.99..=1.01).contains(&total) {
        return Err(NbaError::Validation(format!(
            "Win probabilities must sum to 1.0, got {:.4}",
            total
        )));
    }
    Ok(())
}

use std::collections::HashSet;

use super::config::LeagueConfig;
use crate::error::{InputError, Result};
use crate::model::{Prediction, RaceKey, RaceResult, MAX_POSITION, MAX_WEEK};

const MAX_REQUIRED_POSITIONS: usize = 2;

/// Validate league rules at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_leagues(leagues: &[LeagueConfig]) -> std::result::Result<(), Vec<String>> {
    let mut errors = Vec::new();
    let mut seen_ids = HashSet::new();

    for (i, league) in leagues.iter().enumerate() {
        if league.id.trim().is_empty() {
            errors.push(format!("leagues[{}].id: must not be empty", i));
        } else if !seen_ids.insert(league.id.as_str()) {
            errors.push(format!("leagues[{}].id: duplicate league id '{}'", i, league.id));
        }

        let count = league.required_positions.len();
        if count == 0 || count > MAX_REQUIRED_POSITIONS {
            errors.push(format!(
                "leagues[{}].required_positions: expected 1 to {} positions, got {}",
                i, MAX_REQUIRED_POSITIONS, count
            ));
        }

        let mut seen_positions = HashSet::new();
        for (j, &position) in league.required_positions.iter().enumerate() {
            if !(1..=MAX_POSITION).contains(&position) {
                errors.push(format!(
                    "leagues[{}].required_positions[{}]: {} is not a grid position (1-{})",
                    i, j, position, MAX_POSITION
                ));
            } else if !seen_positions.insert(position) {
                errors.push(format!(
                    "leagues[{}].required_positions[{}]: duplicate position {}",
                    i, j, position
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Check that a result is well formed: positions on the grid, no position
/// or driver listed twice.
pub fn validate_result(result: &RaceResult) -> Vec<InputError> {
    let race = result.race();
    let mut errors = Vec::new();

    if let Err(e) = check_week(result.week_number) {
        errors.push(e);
    }

    let mut positions = HashSet::new();
    let mut drivers = HashSet::new();
    for entry in &result.finishing_order {
        if !(1..=MAX_POSITION).contains(&entry.position) {
            errors.push(InputError::InvalidResult {
                race,
                reason: format!("position {} is off the grid", entry.position),
            });
        }
        if !positions.insert(entry.position) {
            errors.push(InputError::InvalidResult {
                race,
                reason: format!("position {} listed more than once", entry.position),
            });
        }
        if !drivers.insert(entry.driver_id.as_str()) {
            errors.push(InputError::InvalidResult {
                race,
                reason: format!("driver '{}' classified more than once", entry.driver_id),
            });
        }
    }

    errors
}

/// The result must belong to the same event as the prediction.
pub fn check_result_matches(prediction: &Prediction, result: &RaceResult) -> Result<()> {
    if prediction.race() == result.race() {
        Ok(())
    } else {
        Err(InputError::ResultMismatch {
            expected: prediction.race(),
            actual: result.race(),
        })
    }
}

fn check_week(week: u8) -> Result<()> {
    if (1..=MAX_WEEK).contains(&week) {
        Ok(())
    } else {
        Err(InputError::OutOfRange {
            field: "week_number",
            value: week,
            min: 1,
            max: MAX_WEEK,
        })
    }
}

fn check_prediction(prediction: &Prediction, leagues: &[LeagueConfig]) -> Result<()> {
    check_week(prediction.week_number)?;
    if !(1..=MAX_POSITION).contains(&prediction.position) {
        return Err(InputError::OutOfRange {
            field: "position",
            value: prediction.position,
            min: 1,
            max: MAX_POSITION,
        });
    }

    let league = leagues
        .iter()
        .find(|l| l.id == prediction.league_id)
        .ok_or_else(|| InputError::UnknownLeague {
            user_id: prediction.user_id.clone(),
            league_id: prediction.league_id.clone(),
        })?;

    if !league.requires(prediction.position) {
        return Err(InputError::PositionNotRequired {
            user_id: prediction.user_id.clone(),
            league_id: prediction.league_id.clone(),
            position: prediction.position,
        });
    }
    Ok(())
}

/// Split predictions into those safe to score and every violation found.
///
/// Of two predictions sharing a (user, league, event, position) key the first
/// is kept and the second reported.
pub fn split_valid_predictions(
    predictions: Vec<Prediction>,
    leagues: &[LeagueConfig],
) -> (Vec<Prediction>, Vec<InputError>) {
    let mut valid = Vec::with_capacity(predictions.len());
    let mut errors = Vec::new();
    let mut seen: HashSet<(String, String, RaceKey, u8)> = HashSet::new();

    for prediction in predictions {
        if let Err(e) = check_prediction(&prediction, leagues) {
            errors.push(e);
            continue;
        }

        let key = (
            prediction.user_id.clone(),
            prediction.league_id.clone(),
            prediction.race(),
            prediction.position,
        );
        if !seen.insert(key) {
            let race = prediction.race();
            errors.push(InputError::DuplicatePrediction {
                user_id: prediction.user_id,
                league_id: prediction.league_id,
                race,
                position: prediction.position,
            });
            continue;
        }

        valid.push(prediction);
    }

    (valid, errors)
}

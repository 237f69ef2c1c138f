use anyhow::Result;
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::{BTreeMap, HashMap};

use crate::config::Config;
use crate::error::InputError;
use crate::model::{LeagueStanding, Prediction, RaceKey, RaceResult};
use crate::scoring::{
    compute_league_standings, score_race, split_valid_predictions, validate_result, LeagueConfig,
    RaceScore,
};

/// Which part of the season to score.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Only score this league
    pub league: Option<String>,
    /// Only score this event; standings then cover just that event
    pub race: Option<RaceKey>,
}

#[derive(Debug, Clone)]
pub struct LeagueRun {
    pub league: LeagueConfig,
    /// Per-event scores, in event order
    pub races: Vec<(RaceKey, Vec<RaceScore>)>,
    pub standings: Vec<LeagueStanding>,
}

#[derive(Debug, Clone, Default)]
pub struct SeasonRun {
    pub leagues: Vec<LeagueRun>,
    /// Records skipped because they broke the input contract
    pub rejected: Vec<InputError>,
    /// Predictions dropped for being changed after lock time
    pub locked_out: usize,
}

/// Checked inputs, ready to score.
struct Prepared {
    predictions: Vec<Prediction>,
    results: BTreeMap<RaceKey, RaceResult>,
    rejected: Vec<InputError>,
    locked_out: usize,
}

fn prepare(config: &Config, predictions: Vec<Prediction>, results: Vec<RaceResult>) -> Result<Prepared> {
    let offset = config.lock_offset()?;
    let (predictions, locked_out) = crate::lock::filter_locked(predictions, &config.calendar, offset);
    if locked_out > 0 {
        tracing::warn!(count = locked_out, "dropped predictions submitted after lock time");
    }

    let (predictions, mut rejected) = split_valid_predictions(predictions, &config.leagues);

    let mut by_race = BTreeMap::new();
    for result in results {
        let errors = validate_result(&result);
        if !errors.is_empty() {
            tracing::warn!(race = %result.race(), errors = errors.len(), "skipping malformed result");
            rejected.extend(errors);
            continue;
        }
        let race = result.race();
        if by_race.contains_key(&race) {
            rejected.push(InputError::InvalidResult {
                race,
                reason: "entered more than once".to_string(),
            });
            continue;
        }
        by_race.insert(race, result);
    }

    Ok(Prepared {
        predictions,
        results: by_race,
        rejected,
        locked_out,
    })
}

/// Report every input contract violation without scoring anything.
pub fn collect_input_errors(
    config: &Config,
    predictions: Vec<Prediction>,
    results: Vec<RaceResult>,
) -> Result<Vec<InputError>> {
    Ok(prepare(config, predictions, results)?.rejected)
}

fn score_league(
    league: LeagueConfig,
    predictions: Vec<Prediction>,
    results: &BTreeMap<RaceKey, RaceResult>,
    only: Option<RaceKey>,
) -> LeagueRun {
    let mut races = Vec::new();
    let mut picks = Vec::new();
    for (race, result) in results {
        if only.is_some_and(|r| r != *race) {
            continue;
        }
        let scores = score_race(&predictions, result);
        if scores.is_empty() {
            continue;
        }
        picks.extend(scores.iter().flat_map(|s| s.scored_picks()));
        races.push((*race, scores));
    }

    let unscored = predictions
        .iter()
        .filter(|p| !results.contains_key(&p.race()))
        .count();
    if unscored > 0 {
        tracing::debug!(league = %league.id, count = unscored, "predictions awaiting results");
    }

    let standings = compute_league_standings(&league.members, &picks);
    tracing::debug!(league = %league.id, races = races.len(), users = standings.len(), "scored league");

    LeagueRun {
        league,
        races,
        standings,
    }
}

/// Validate, lock-filter and score predictions, then build standings for
/// each league.
///
/// Leagues are independent and scored as separate futures. Output is ordered
/// as the leagues appear in the config regardless of completion order.
pub async fn score_season(
    config: &Config,
    predictions: Vec<Prediction>,
    results: Vec<RaceResult>,
    options: &RunOptions,
) -> Result<SeasonRun> {
    if let Some(ref id) = options.league {
        if config.league(id).is_none() {
            anyhow::bail!("League '{}' is not configured", id);
        }
    }

    let prepared = prepare(config, predictions, results)?;

    if let Some(race) = options.race {
        if !prepared.results.contains_key(&race) {
            return Err(InputError::MissingResult {
                week: race.week_number,
                event: race.event_type,
            }
            .into());
        }
    }

    let mut by_league: HashMap<String, Vec<Prediction>> = HashMap::new();
    for prediction in prepared.predictions {
        by_league
            .entry(prediction.league_id.clone())
            .or_default()
            .push(prediction);
    }

    let results = &prepared.results;
    let mut tasks = FuturesUnordered::new();
    for (index, league) in config.leagues.iter().enumerate() {
        if options.league.as_ref().is_some_and(|id| *id != league.id) {
            continue;
        }
        let league = league.clone();
        let predictions = by_league.remove(&league.id).unwrap_or_default();
        let only = options.race;
        tasks.push(async move { (index, score_league(league, predictions, results, only)) });
    }

    let mut runs = Vec::new();
    while let Some(run) = tasks.next().await {
        runs.push(run);
    }
    runs.sort_by_key(|(index, _)| *index);

    tracing::info!(
        leagues = runs.len(),
        rejected = prepared.rejected.len(),
        "scoring complete"
    );

    Ok(SeasonRun {
        leagues: runs.into_iter().map(|(_, run)| run).collect(),
        rejected: prepared.rejected,
        locked_out: prepared.locked_out,
    })
}

use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::model::{LeagueStanding, Prediction, RaceResult};

const SNAPSHOT_VERSION: u32 = 1;

/// Standings for one league as written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueTable {
    pub league_id: String,
    pub league_name: String,
    pub standings: Vec<LeagueStanding>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandingsSnapshot {
    pub version: u32,
    #[serde(default)]
    pub season: Option<u16>,
    pub generated_at: DateTime<Utc>,
    pub leagues: Vec<LeagueTable>,
}

impl StandingsSnapshot {
    pub fn new(season: Option<u16>, leagues: Vec<LeagueTable>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            season,
            generated_at: Utc::now(),
            leagues,
        }
    }
}

async fn load_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {} file at {}", what, path.display()))?;
    serde_json::from_slice(&bytes)
        .with_context(|| format!("Failed to parse {} JSON in {}", what, path.display()))
}

/// Load a JSON array of predictions.
pub async fn load_predictions(path: &Path) -> Result<Vec<Prediction>> {
    let predictions: Vec<Prediction> = load_json(path, "predictions").await?;
    tracing::debug!(path = %path.display(), count = predictions.len(), "loaded predictions");
    Ok(predictions)
}

/// Load a JSON array of race results.
pub async fn load_results(path: &Path) -> Result<Vec<RaceResult>> {
    let results: Vec<RaceResult> = load_json(path, "results").await?;
    tracing::debug!(path = %path.display(), count = results.len(), "loaded results");
    Ok(results)
}

/// Load both input files concurrently.
pub async fn load_inputs(
    predictions: &Path,
    results: &Path,
) -> Result<(Vec<Prediction>, Vec<RaceResult>)> {
    tokio::try_join!(load_predictions(predictions), load_results(results))
}

/// Save a standings snapshot to a JSON file atomically
///
/// Uses atomic-write-file so readers never see a half-written snapshot.
pub fn save_standings(path: &Path, snapshot: &StandingsSnapshot) -> Result<()> {
    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    serde_json::to_writer_pretty(&mut file, snapshot)
        .context("Failed to serialize standings snapshot")?;

    file.commit().context("Failed to save standings snapshot")?;

    tracing::info!(path = %path.display(), leagues = snapshot.leagues.len(), "saved standings");
    Ok(())
}

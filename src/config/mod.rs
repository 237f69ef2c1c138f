mod schema;
pub mod init;

pub use schema::{Config, DEFAULT_LOCK_OFFSET};

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use crate::model::MAX_WEEK;

/// Get the config directory path (~/.config/f1-picks/)
pub fn get_config_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".config").join("f1-picks"))
        .unwrap_or_else(|| PathBuf::from(".f1-picks"))
}

/// Get the default config file path (~/.config/f1-picks/config.yaml)
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.yaml")
}

/// Load configuration from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to config file. If None, uses default path (~/.config/f1-picks/config.yaml)
///
/// # Errors
///
/// Returns an error if:
/// - The config file does not exist
/// - The config file cannot be read
/// - The YAML cannot be parsed
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let config_path = path.unwrap_or_else(get_config_path);

    if !config_path.exists() {
        anyhow::bail!(
            "Config file not found at {}. Run `f1-picks init` to create one",
            config_path.display()
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    let config: Config = serde_saphyr::from_str(&config_content)
        .with_context(|| format!("Failed to parse config: invalid YAML in {}", config_path.display()))?;

    tracing::debug!(path = %config_path.display(), leagues = config.leagues.len(), "loaded config");

    Ok(config)
}

/// Validate the whole config at startup, reporting every problem at once.
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = match crate::scoring::validate_leagues(&config.leagues) {
        Ok(()) => Vec::new(),
        Err(errors) => errors,
    };

    if config.leagues.is_empty() {
        errors.push("leagues: at least one league is required".to_string());
    }

    if let Err(e) = config.lock_offset() {
        errors.push(format!("lock_offset: {:#}", e));
    }

    let mut weeks = HashSet::new();
    for (i, entry) in config.calendar.iter().enumerate() {
        if !(1..=MAX_WEEK).contains(&entry.week) {
            errors.push(format!(
                "calendar[{}].week: {} is outside 1-{}",
                i, entry.week, MAX_WEEK
            ));
        } else if !weeks.insert(entry.week) {
            errors.push(format!("calendar[{}].week: duplicate week {}", i, entry.week));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

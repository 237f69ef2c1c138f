use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::lock::CalendarEntry;
use crate::scoring::LeagueConfig;

pub const DEFAULT_LOCK_OFFSET: &str = "1h";

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Season year, only used for display
    #[serde(default)]
    pub season: Option<u16>,

    /// How long before qualifying predictions lock (e.g. "1h", "30m")
    #[serde(default)]
    pub lock_offset: Option<String>,

    pub leagues: Vec<LeagueConfig>,

    /// Qualifying times per week; without an entry a week is never locked
    #[serde(default)]
    pub calendar: Vec<CalendarEntry>,
}

impl Config {
    /// Parsed lock offset, falling back to the default when unset.
    pub fn lock_offset(&self) -> Result<Duration> {
        let raw = self.lock_offset.as_deref().unwrap_or(DEFAULT_LOCK_OFFSET);
        humantime::parse_duration(raw.trim())
            .with_context(|| format!("Invalid lock_offset '{}'", raw))
    }

    pub fn league(&self, id: &str) -> Option<&LeagueConfig> {
        self.leagues.iter().find(|l| l.id == id)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            season: None,
            lock_offset: Some(DEFAULT_LOCK_OFFSET.to_string()),
            leagues: vec![LeagueConfig::default()],
            calendar: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config_parse() {
        let yaml = r#"
season: 2025
lock_offset: "30m"
leagues:
  - id: friends
    name: Friends League
    required_positions: [1, 10]
    members: [alice, bob]
  - id: office
    required_positions: [3]
calendar:
  - week: 1
    qualifying_start: "2025-03-15T05:00:00Z"
  - week: 2
    qualifying_start: "2025-03-22T07:00:00Z"
    sprint_qualifying_start: "2025-03-21T07:30:00Z"
"#;
        let config: Config = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.season, Some(2025));
        assert_eq!(config.lock_offset().unwrap(), Duration::from_secs(1800));
        assert_eq!(config.leagues.len(), 2);
        assert_eq!(config.league("friends").unwrap().members.len(), 2);
        assert!(config.league("missing").is_none());
        assert_eq!(config.calendar.len(), 2);
        assert!(config.calendar[0].sprint_qualifying_start.is_none());
        assert!(config.calendar[1].sprint_qualifying_start.is_some());
    }

    #[test]
    fn test_lock_offset_default() {
        let yaml = r#"
leagues:
  - id: friends
    required_positions: [1]
"#;
        let config: Config = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.lock_offset().unwrap(), Duration::from_secs(3600));
        assert!(config.calendar.is_empty());
    }

    #[test]
    fn test_invalid_lock_offset() {
        let config = Config {
            lock_offset: Some("soon".to_string()),
            ..Config::default()
        };
        assert!(config.lock_offset().is_err());
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = Config::default();
        let yaml = serde_saphyr::to_string(&config).unwrap();
        let parsed: Config = serde_saphyr::from_str(&yaml).unwrap();
        assert_eq!(config, parsed);
    }
}

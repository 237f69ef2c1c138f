use serde::{Deserialize, Serialize};

/// Rules for one league.
///
/// Every member predicts each of `required_positions` for every event.
///
/// Example YAML:
/// ```yaml
/// leagues:
///   - id: friends
///     name: Friends League
///     required_positions: [1, 10]
///     members: [alice, bob]
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LeagueConfig {
    /// Identifier matching `league_id` on predictions
    pub id: String,

    /// Display name (defaults to the id)
    #[serde(default)]
    pub name: Option<String>,

    /// Positions every member must predict (one or two, each 1-20)
    pub required_positions: Vec<u8>,

    /// Members listed here appear in standings even before their first
    /// scored race
    #[serde(default)]
    pub members: Vec<String>,
}

impl LeagueConfig {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    pub fn requires(&self, position: u8) -> bool {
        self.required_positions.contains(&position)
    }

    /// Best possible total for one event.
    pub fn max_points_per_race(&self) -> u32 {
        super::table::PERFECT_POINTS * self.required_positions.len() as u32
    }
}

impl Default for LeagueConfig {
    fn default() -> Self {
        Self {
            id: "default".to_string(),
            name: Some("Default League".to_string()),
            required_positions: vec![1, 10],
            members: Vec::new(),
        }
    }
}

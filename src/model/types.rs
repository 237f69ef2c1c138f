use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Highest finishing position on the grid.
pub const MAX_POSITION: u8 = 20;

/// Number of race weekends in a season.
pub const MAX_WEEK: u8 = 24;

/// Which session of a race weekend a prediction targets.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Race,
    Sprint,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventType::Race => write!(f, "race"),
            EventType::Sprint => write!(f, "sprint"),
        }
    }
}

/// Identifies one scored event: a week of the season plus the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RaceKey {
    pub week_number: u8,
    pub event_type: EventType,
}

impl RaceKey {
    pub fn new(week_number: u8, event_type: EventType) -> Self {
        Self {
            week_number,
            event_type,
        }
    }
}

impl fmt::Display for RaceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "week {} {}", self.week_number, self.event_type)
    }
}

/// One user's pick of a driver for one required position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction {
    pub user_id: String,
    pub league_id: String,
    pub week_number: u8,
    pub event_type: EventType,
    pub position: u8,
    pub driver_id: String,
    /// When the pick was last changed; only consulted for lock filtering
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
}

impl Prediction {
    pub fn race(&self) -> RaceKey {
        RaceKey::new(self.week_number, self.event_type)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinishingEntry {
    pub position: u8,
    pub driver_id: String,
}

/// Official classified order for one event. Drivers that did not finish or
/// start are simply absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceResult {
    pub week_number: u8,
    pub event_type: EventType,
    pub finishing_order: Vec<FinishingEntry>,
}

impl RaceResult {
    pub fn race(&self) -> RaceKey {
        RaceKey::new(self.week_number, self.event_type)
    }

    /// Finishing position of a driver, if they were classified.
    pub fn position_of(&self, driver_id: &str) -> Option<u8> {
        self.finishing_order
            .iter()
            .find(|entry| entry.driver_id == driver_id)
            .map(|entry| entry.position)
    }
}

/// Outcome of scoring a single predicted position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionScore {
    /// `None` when the predicted driver is not in the result
    pub position_difference: Option<u8>,
    pub points: u32,
}

/// A scored pick, flattened for standings aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredPick {
    pub user_id: String,
    pub race: RaceKey,
    pub points: u32,
    pub position_difference: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueStanding {
    pub rank: usize,
    pub user_id: String,
    pub total_points: u32,
    pub perfect_picks: u32,
    pub near_picks: u32,
    pub races_participated: u32,
    pub average_points: f64,
}

use thiserror::Error;

use crate::model::{EventType, RaceKey};

/// Input contract violations caught before anything is scored.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("{user_id}: unknown league '{league_id}'")]
    UnknownLeague { user_id: String, league_id: String },

    #[error("{user_id}: position {position} is not required by league '{league_id}'")]
    PositionNotRequired {
        user_id: String,
        league_id: String,
        position: u8,
    },

    #[error("{user_id}: duplicate prediction for P{position} in league '{league_id}' ({race})")]
    DuplicatePrediction {
        user_id: String,
        league_id: String,
        race: RaceKey,
        position: u8,
    },

    #[error("result for {actual} used to score predictions for {expected}")]
    ResultMismatch { expected: RaceKey, actual: RaceKey },

    #[error("invalid result for {race}: {reason}")]
    InvalidResult { race: RaceKey, reason: String },

    #[error("{field} {value} out of range {min}-{max}")]
    OutOfRange {
        field: &'static str,
        value: u8,
        min: u8,
        max: u8,
    },

    #[error("no result entered for week {week} {event}")]
    MissingResult { week: u8, event: EventType },
}

pub type Result<T> = std::result::Result<T, InputError>;

pub mod config;
pub mod table;
pub mod engine;
pub mod standings;
pub mod validation;

pub use config::LeagueConfig;
pub use engine::{score_position, score_prediction, score_race, PickContribution, RaceScore};
pub use standings::{compute_league_standings, compute_standings};
pub use validation::{check_result_matches, split_valid_predictions, validate_leagues, validate_result};

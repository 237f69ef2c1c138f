use std::collections::BTreeMap;

use super::table::points_for;
use super::validation::check_result_matches;
use crate::model::{PositionScore, Prediction, RaceKey, RaceResult, ScoredPick};

#[derive(Debug, Clone, PartialEq)]
pub struct PickContribution {
    pub position: u8,        // Predicted position
    pub driver_id: String,
    pub actual: Option<u8>,  // Where the driver finished, None if unclassified
    pub score: PositionScore,
}

/// A user's picks for one event and what they earned.
#[derive(Debug, Clone, PartialEq)]
pub struct RaceScore {
    pub user_id: String,
    pub race: RaceKey,
    pub total_points: u32,
    pub picks: Vec<PickContribution>,
}

impl RaceScore {
    /// Flatten into standings input.
    pub fn scored_picks(&self) -> impl Iterator<Item = ScoredPick> + '_ {
        self.picks.iter().map(|pick| ScoredPick {
            user_id: self.user_id.clone(),
            race: self.race,
            points: pick.score.points,
            position_difference: pick.score.position_difference,
        })
    }
}

/// Score one predicted position against the official order.
///
/// A driver missing from the result (DNF, DNS, not entered) scores zero with
/// no difference. This never fails.
pub fn score_position(prediction: &Prediction, result: &RaceResult) -> PositionScore {
    let position_difference = result
        .position_of(&prediction.driver_id)
        .map(|actual| actual.abs_diff(prediction.position));

    PositionScore {
        position_difference,
        points: points_for(position_difference),
    }
}

/// Sum a user's picks for one event. Each position is scored on its own.
pub fn score_prediction<'a, I>(predictions: I, result: &RaceResult) -> u32
where
    I: IntoIterator<Item = &'a Prediction>,
{
    predictions
        .into_iter()
        .map(|p| score_position(p, result).points)
        .sum()
}

/// Score every user's picks for one event.
///
/// Only predictions whose event matches the result are scored, so a whole
/// league's picks can be passed in. Output is sorted by points descending,
/// then user id, so repeated runs print identically.
pub fn score_race(predictions: &[Prediction], result: &RaceResult) -> Vec<RaceScore> {
    let race = result.race();
    let mut by_user: BTreeMap<&str, Vec<&Prediction>> = BTreeMap::new();
    let matching = predictions
        .iter()
        .filter(|p| check_result_matches(p, result).is_ok());
    for prediction in matching {
        by_user
            .entry(prediction.user_id.as_str())
            .or_default()
            .push(prediction);
    }

    let mut scores: Vec<RaceScore> = by_user
        .into_iter()
        .map(|(user_id, mut picks)| {
            picks.sort_by_key(|p| p.position);
            let picks: Vec<PickContribution> = picks
                .into_iter()
                .map(|p| PickContribution {
                    position: p.position,
                    driver_id: p.driver_id.clone(),
                    actual: result.position_of(&p.driver_id),
                    score: score_position(p, result),
                })
                .collect();
            RaceScore {
                user_id: user_id.to_string(),
                race,
                total_points: picks.iter().map(|p| p.score.points).sum(),
                picks,
            }
        })
        .collect();

    scores.sort_by(|a, b| {
        b.total_points
            .cmp(&a.total_points)
            .then_with(|| a.user_id.cmp(&b.user_id))
    });
    scores
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EventType, FinishingEntry};

    fn pick(user: &str, position: u8, driver: &str) -> Prediction {
        Prediction {
            user_id: user.to_string(),
            league_id: "friends".to_string(),
            week_number: 1,
            event_type: EventType::Race,
            position,
            driver_id: driver.to_string(),
            submitted_at: None,
        }
    }

    fn result(order: &[(u8, &str)]) -> RaceResult {
        RaceResult {
            week_number: 1,
            event_type: EventType::Race,
            finishing_order: order
                .iter()
                .map(|(position, driver)| FinishingEntry {
                    position: *position,
                    driver_id: driver.to_string(),
                })
                .collect(),
        }
    }

    /// Twenty drivers, driver `dN` finishing in position N.
    fn full_grid() -> RaceResult {
        let drivers: Vec<(u8, String)> = (1..=20).map(|n| (n, format!("d{}", n))).collect();
        let order: Vec<(u8, &str)> = drivers.iter().map(|(n, d)| (*n, d.as_str())).collect();
        result(&order)
    }

    #[test]
    fn test_exact_pick_every_position() {
        let grid = full_grid();
        for n in 1..=20u8 {
            let score = score_position(&pick("alice", n, &format!("d{}", n)), &grid);
            assert_eq!(score.points, 10, "position {}", n);
            assert_eq!(score.position_difference, Some(0));
        }
    }

    #[test]
    fn test_absent_driver_any_position() {
        let grid = full_grid();
        for n in 1..=20u8 {
            let score = score_position(&pick("alice", n, "zhou"), &grid);
            assert_eq!(score.points, 0);
            assert_eq!(score.position_difference, None);
        }
    }

    #[test]
    fn test_difference_boundaries() {
        let grid = full_grid();
        let expected = [(1, 7), (2, 5), (3, 3), (4, 2), (5, 1), (6, 0)];
        for (diff, points) in expected {
            let driver = format!("d{}", 1 + diff);
            let score = score_position(&pick("alice", 1, &driver), &grid);
            assert_eq!(score.position_difference, Some(diff));
            assert_eq!(score.points, points, "difference {}", diff);
        }
    }

    #[test]
    fn test_symmetric_difference() {
        let grid = result(&[(1, "leclerc"), (3, "sainz")]);
        let early = score_position(&pick("alice", 1, "sainz"), &grid);
        let late = score_position(&pick("alice", 3, "leclerc"), &grid);
        assert_eq!(early, late);
        assert_eq!(early.points, 5);
    }

    #[test]
    fn test_predicted_position_beyond_classified_order() {
        // Only three finishers; predicting P20 for the winner is a 19-place miss
        let grid = result(&[(1, "russell"), (2, "antonelli"), (3, "hamilton")]);
        let score = score_position(&pick("alice", 20, "russell"), &grid);
        assert_eq!(score.position_difference, Some(19));
        assert_eq!(score.points, 0);
    }

    #[test]
    fn test_score_prediction_sums_positions() {
        let grid = full_grid();
        let picks = vec![pick("alice", 1, "d1"), pick("alice", 10, "d12")];
        assert_eq!(score_prediction(&picks, &grid), 15);
    }

    #[test]
    fn test_wrong_pick_does_not_reduce_other_position() {
        let grid = full_grid();
        let picks = vec![pick("alice", 1, "d1"), pick("alice", 10, "nobody")];
        assert_eq!(score_prediction(&picks, &grid), 10);
    }

    #[test]
    fn test_scoring_page_scenarios() {
        let grid = result(&[
            (1, "verstappen"),
            (2, "leclerc"),
            (8, "norris"),
            (10, "hamilton"),
            (11, "alonso"),
            (15, "zhou"),
        ]);
        let cases = [
            (("verstappen", "hamilton"), 20),
            // Norris two places off earns 5, not 2
            (("leclerc", "norris"), 12),
            (("leclerc", "alonso"), 14),
        ];
        for ((p1, p10), expected) in cases {
            let picks = vec![pick("alice", 1, p1), pick("alice", 10, p10)];
            assert_eq!(score_prediction(&picks, &grid), expected, "{} / {}", p1, p10);
        }

        // Separate result for the Piastri and Russell cases
        let grid = result(&[(1, "russell"), (2, "piastri"), (11, "alonso"), (15, "zhou")]);
        let piastri = vec![pick("bob", 1, "piastri"), pick("bob", 10, "alonso")];
        assert_eq!(score_prediction(&piastri, &grid), 14);
        // Five places off still earns the last step of the table
        let russell = vec![pick("carol", 1, "russell"), pick("carol", 10, "zhou")];
        assert_eq!(score_prediction(&russell, &grid), 11);

        // Zhou out of the points by six places scores nothing
        let grid = result(&[(1, "russell"), (16, "zhou")]);
        assert_eq!(score_prediction(&russell, &grid), 10);
    }

    #[test]
    fn test_score_race_groups_and_sorts() {
        let grid = full_grid();
        let predictions = vec![
            pick("bob", 1, "d2"),
            pick("alice", 10, "d10"),
            pick("alice", 1, "d1"),
            pick("bob", 10, "d10"),
        ];
        let scores = score_race(&predictions, &grid);
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[0].user_id, "alice");
        assert_eq!(scores[0].total_points, 20);
        assert_eq!(scores[0].picks[0].position, 1);
        assert_eq!(scores[1].user_id, "bob");
        assert_eq!(scores[1].total_points, 17);
        assert_eq!(scores[1].picks[0].actual, Some(2));
    }

    #[test]
    fn test_score_race_ignores_other_events() {
        let grid = full_grid();
        let mut sprint = pick("alice", 1, "d1");
        sprint.event_type = EventType::Sprint;
        let scores = score_race(&[sprint], &grid);
        assert!(scores.is_empty());
    }

    #[test]
    fn test_scoring_is_repeatable() {
        let grid = full_grid();
        let predictions = vec![pick("alice", 1, "d3"), pick("bob", 1, "d1")];
        assert_eq!(score_race(&predictions, &grid), score_race(&predictions, &grid));
    }

    #[test]
    fn test_scored_picks_flatten() {
        let grid = full_grid();
        let scores = score_race(&[pick("alice", 1, "d2")], &grid);
        let flat: Vec<ScoredPick> = scores[0].scored_picks().collect();
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0].points, 7);
        assert_eq!(flat[0].position_difference, Some(1));
        assert_eq!(flat[0].race, RaceKey::new(1, EventType::Race));
    }
}

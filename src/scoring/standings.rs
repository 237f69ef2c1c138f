use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use crate::model::{LeagueStanding, RaceKey, ScoredPick};

#[derive(Debug, Default)]
struct Tally {
    total_points: u32,
    perfect_picks: u32,
    near_picks: u32,
    races: BTreeSet<RaceKey>,
}

impl Tally {
    fn add(&mut self, pick: &ScoredPick) {
        self.total_points += pick.points;
        match pick.position_difference {
            Some(0) => self.perfect_picks += 1,
            Some(1) => self.near_picks += 1,
            _ => {}
        }
        self.races.insert(pick.race);
    }

    fn has_played(&self) -> bool {
        !self.races.is_empty()
    }

    fn races_participated(&self) -> u32 {
        self.races.len() as u32
    }

    fn average_points(&self) -> f64 {
        match self.races_participated() {
            0 => 0.0,
            n => self.total_points as f64 / n as f64,
        }
    }
}

/// Compare averages exactly by cross-multiplying instead of dividing.
fn cmp_average(a: &Tally, b: &Tally) -> Ordering {
    let lhs = a.total_points as u64 * b.races_participated() as u64;
    let rhs = b.total_points as u64 * a.races_participated() as u64;
    lhs.cmp(&rhs)
}

/// Rank users by total points across all scored picks.
///
/// Ties on points go to more perfect picks, then more one-off picks, then the
/// higher average per race participated. Users with no scored race come after
/// everyone they are still tied with; user id ascending settles the rest.
pub fn compute_standings(scores: &[ScoredPick]) -> Vec<LeagueStanding> {
    compute_league_standings(&[], scores)
}

/// Like [`compute_standings`], but every listed member gets a row even if they
/// have nothing scored yet.
pub fn compute_league_standings(members: &[String], scores: &[ScoredPick]) -> Vec<LeagueStanding> {
    let mut tallies: BTreeMap<&str, Tally> = members
        .iter()
        .map(|m| (m.as_str(), Tally::default()))
        .collect();

    for pick in scores {
        tallies.entry(pick.user_id.as_str()).or_default().add(pick);
    }

    let mut ranked: Vec<(&str, Tally)> = tallies.into_iter().collect();
    ranked.sort_by(|(a_user, a), (b_user, b)| {
        b.total_points
            .cmp(&a.total_points)
            .then_with(|| b.perfect_picks.cmp(&a.perfect_picks))
            .then_with(|| b.near_picks.cmp(&a.near_picks))
            .then_with(|| cmp_average(b, a))
            .then_with(|| b.has_played().cmp(&a.has_played()))
            .then_with(|| a_user.cmp(b_user))
    });

    ranked
        .into_iter()
        .enumerate()
        .map(|(idx, (user_id, tally))| LeagueStanding {
            rank: idx + 1,
            user_id: user_id.to_string(),
            total_points: tally.total_points,
            perfect_picks: tally.perfect_picks,
            near_picks: tally.near_picks,
            races_participated: tally.races_participated(),
            average_points: tally.average_points(),
        })
        .collect()
}

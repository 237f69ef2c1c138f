use std::io::IsTerminal;
use owo_colors::OwoColorize;
use terminal_size::{Width, terminal_size};

use crate::model::{LeagueStanding, RaceKey};
use crate::scoring::{PickContribution, RaceScore};
use crate::store::StandingsSnapshot;

/// Output format selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Tsv,
    Json,
}

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a name to fit available width, accounting for Unicode
fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Width available for the user column given the other fixed columns.
fn user_width(fixed_width: usize) -> Option<usize> {
    get_terminal_width().map(|width| {
        if width > fixed_width + 10 {
            width - fixed_width
        } else {
            // Very narrow terminal
            10
        }
    })
}

/// Format a single pick, e.g. "P1 verstappen -> P2 (+7)" or "P10 zhou -> DNF (+0)"
pub fn format_pick(pick: &PickContribution) -> String {
    let actual = match pick.actual {
        Some(p) => format!("P{}", p),
        None => "DNF".to_string(),
    };
    format!(
        "P{} {} -> {} (+{})",
        pick.position, pick.driver_id, actual, pick.score.points
    )
}

/// Heading line for a league section
pub fn format_heading(league_name: &str, detail: &str, use_colors: bool) -> String {
    if use_colors {
        format!("{} {}", league_name.bold(), detail.dimmed())
    } else {
        format!("{} {}", league_name, detail)
    }
}

/// Format one event's scores as a table: Index, Points, User, picks
/// No headers (minimal format)
pub fn format_race_table(scores: &[RaceScore], use_colors: bool) -> String {
    if scores.is_empty() {
        return "No predictions scored.".to_string();
    }

    let points_width = 3;
    let separator = "  ";
    let name_width = scores
        .iter()
        .map(|s| s.user_id.chars().count())
        .max()
        .unwrap_or(0);
    let name_width = match user_width(4 + points_width + separator.len() * 2 + 40) {
        Some(limit) => name_width.min(limit),
        None => name_width,
    };

    scores
        .iter()
        .enumerate()
        .map(|(idx, score)| {
            let index_str = format!("{:>2}.", idx + 1);
            let points = format!("{:>width$}", score.total_points, width = points_width);
            let user = format!(
                "{:<width$}",
                truncate_name(&score.user_id, name_width),
                width = name_width
            );
            let picks = score
                .picks
                .iter()
                .map(format_pick)
                .collect::<Vec<_>>()
                .join(", ");

            if use_colors {
                format!(
                    "{} {}{}{}{}{}",
                    index_str.dimmed(),
                    points.bold(),
                    separator,
                    user.cyan(),
                    separator,
                    picks
                )
            } else {
                format!("{} {}{}{}{}{}", index_str, points, separator, user, separator, picks)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format standings as a table: Rank, Points, User, perfect/near picks, races, average
pub fn format_standings_table(standings: &[LeagueStanding], use_colors: bool) -> String {
    if standings.is_empty() {
        return "No standings yet.".to_string();
    }

    let separator = "  ";
    let name_width = standings
        .iter()
        .map(|s| s.user_id.chars().count())
        .max()
        .unwrap_or(0);
    let name_width = match user_width(4 + 4 + separator.len() * 2 + 36) {
        Some(limit) => name_width.min(limit),
        None => name_width,
    };

    standings
        .iter()
        .map(|s| {
            let rank = format!("{:>2}.", s.rank);
            let points = format!("{:>4}", s.total_points);
            let user = format!(
                "{:<width$}",
                truncate_name(&s.user_id, name_width),
                width = name_width
            );
            let detail = format!(
                "{} exact  {} near  {} races  {:.1} avg",
                s.perfect_picks, s.near_picks, s.races_participated, s.average_points
            );

            if use_colors {
                let user = if s.rank == 1 {
                    user.yellow().bold().to_string()
                } else {
                    user.cyan().to_string()
                };
                format!(
                    "{} {}{}{}{}{}",
                    rank.dimmed(),
                    points.bold(),
                    separator,
                    user,
                    separator,
                    detail.dimmed()
                )
            } else {
                format!("{} {}{}{}{}{}", rank, points, separator, user, separator, detail)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format event scores as tab-separated values for scripting
/// Columns: league, week, event, user, points (no headers, no colors)
pub fn format_race_tsv(league_id: &str, race: RaceKey, scores: &[RaceScore]) -> String {
    scores
        .iter()
        .map(|s| {
            format!(
                "{}\t{}\t{}\t{}\t{}",
                league_id, race.week_number, race.event_type, s.user_id, s.total_points
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format standings as tab-separated values for scripting
/// Columns: league, rank, user, points, perfect, near, races, average
pub fn format_standings_tsv(league_id: &str, standings: &[LeagueStanding]) -> String {
    standings
        .iter()
        .map(|s| {
            format!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{:.2}",
                league_id,
                s.rank,
                s.user_id,
                s.total_points,
                s.perfect_picks,
                s.near_picks,
                s.races_participated,
                s.average_points
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Pretty JSON for a standings snapshot
pub fn format_json(snapshot: &StandingsSnapshot) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(snapshot)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EventType, PositionScore};
    use crate::store::LeagueTable;

    fn contribution(position: u8, driver: &str, actual: Option<u8>, points: u32) -> PickContribution {
        PickContribution {
            position,
            driver_id: driver.to_string(),
            actual,
            score: PositionScore {
                position_difference: actual.map(|a| a.abs_diff(position)),
                points,
            },
        }
    }

    fn race_score(user: &str, picks: Vec<PickContribution>) -> RaceScore {
        RaceScore {
            user_id: user.to_string(),
            race: RaceKey::new(3, EventType::Race),
            total_points: picks.iter().map(|p| p.score.points).sum(),
            picks,
        }
    }

    fn standing(rank: usize, user: &str, total: u32) -> LeagueStanding {
        LeagueStanding {
            rank,
            user_id: user.to_string(),
            total_points: total,
            perfect_picks: 1,
            near_picks: 2,
            races_participated: 3,
            average_points: total as f64 / 3.0,
        }
    }

    #[test]
    fn test_truncate_name_short() {
        assert_eq!(truncate_name("alice", 10), "alice");
    }

    #[test]
    fn test_truncate_name_long() {
        assert_eq!(truncate_name("alexandrina", 8), "alexa...");
    }

    #[test]
    fn test_truncate_name_unicode() {
        assert_eq!(truncate_name("Räikkönen", 9), "Räikkönen");
        assert_eq!(truncate_name("Räikkönen", 6), "Räi...");
    }

    #[test]
    fn test_format_pick_classified() {
        let pick = contribution(1, "leclerc", Some(2), 7);
        assert_eq!(format_pick(&pick), "P1 leclerc -> P2 (+7)");
    }

    #[test]
    fn test_format_pick_unclassified() {
        let pick = contribution(10, "zhou", None, 0);
        assert_eq!(format_pick(&pick), "P10 zhou -> DNF (+0)");
    }

    #[test]
    fn test_format_race_table_empty() {
        assert_eq!(format_race_table(&[], false), "No predictions scored.");
    }

    #[test]
    fn test_format_race_table_rows() {
        let scores = vec![
            race_score("alice", vec![contribution(1, "verstappen", Some(1), 10)]),
            race_score("bob", vec![contribution(1, "norris", Some(3), 5)]),
        ];
        let result = format_race_table(&scores, false);
        let lines: Vec<&str> = result.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with(" 1."));
        assert!(lines[0].contains(" 10"));
        assert!(lines[0].contains("alice"));
        assert!(lines[0].contains("P1 verstappen -> P1 (+10)"));
        assert!(lines[1].starts_with(" 2."));
        assert!(lines[1].contains("bob"));
    }

    #[test]
    fn test_format_standings_table() {
        let standings = vec![standing(1, "alice", 30), standing(2, "bob", 12)];
        let result = format_standings_table(&standings, false);
        let lines: Vec<&str> = result.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with(" 1."));
        assert!(lines[0].contains("  30"));
        assert!(lines[0].contains("1 exact  2 near  3 races  10.0 avg"));
        assert!(lines[1].contains("4.0 avg"));
    }

    #[test]
    fn test_format_standings_table_empty() {
        assert_eq!(format_standings_table(&[], false), "No standings yet.");
    }

    #[test]
    fn test_format_race_tsv() {
        let scores = vec![race_score("alice", vec![contribution(1, "verstappen", Some(1), 10)])];
        let result = format_race_tsv("friends", RaceKey::new(3, EventType::Race), &scores);
        assert_eq!(result, "friends\t3\trace\talice\t10");
    }

    #[test]
    fn test_format_standings_tsv() {
        let result = format_standings_tsv("friends", &[standing(1, "alice", 30)]);
        assert_eq!(result, "friends\t1\talice\t30\t1\t2\t3\t10.00");
        assert_eq!(result.split('\t').count(), 8);
    }

    #[test]
    fn test_format_json_contains_standings() {
        let snapshot = StandingsSnapshot::new(
            Some(2025),
            vec![LeagueTable {
                league_id: "friends".to_string(),
                league_name: "Friends".to_string(),
                standings: vec![standing(1, "alice", 30)],
            }],
        );
        let json = format_json(&snapshot).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["leagues"][0]["standings"][0]["user_id"], "alice");
        assert_eq!(value["season"], 2025);
    }
}

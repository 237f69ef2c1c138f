use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::model::{EventType, Prediction, RaceKey};

/// Qualifying times for one race weekend.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CalendarEntry {
    pub week: u8,
    /// Start of qualifying for the Grand Prix
    pub qualifying_start: DateTime<Utc>,
    /// Start of sprint qualifying, on sprint weekends only
    #[serde(default)]
    pub sprint_qualifying_start: Option<DateTime<Utc>>,
}

/// Moment predictions for an event stop being editable.
pub fn lock_time(qualifying_start: DateTime<Utc>, offset: Duration) -> DateTime<Utc> {
    // Offsets reaching past the representable range lock immediately
    chrono::Duration::from_std(offset)
        .ok()
        .and_then(|offset| qualifying_start.checked_sub_signed(offset))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Lock time for an event, if the calendar knows its qualifying session.
pub fn event_lock_time(
    calendar: &[CalendarEntry],
    race: RaceKey,
    offset: Duration,
) -> Option<DateTime<Utc>> {
    let entry = calendar.iter().find(|e| e.week == race.week_number)?;
    let start = match race.event_type {
        EventType::Race => entry.qualifying_start,
        EventType::Sprint => entry.sprint_qualifying_start?,
    };
    Some(lock_time(start, offset))
}

/// Drop predictions changed at or after their event's lock time.
///
/// Predictions without a timestamp, or for events missing from the calendar,
/// are kept. Returns the kept predictions and the number dropped.
pub fn filter_locked(
    predictions: Vec<Prediction>,
    calendar: &[CalendarEntry],
    offset: Duration,
) -> (Vec<Prediction>, usize) {
    let before = predictions.len();
    let kept: Vec<Prediction> = predictions
        .into_iter()
        .filter(|p| match (p.submitted_at, event_lock_time(calendar, p.race(), offset)) {
            (Some(submitted), Some(lock)) => submitted < lock,
            _ => true,
        })
        .collect();
    let dropped = before - kept.len();
    (kept, dropped)
}

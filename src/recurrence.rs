use chrono::{Datelike, Days, NaiveDateTime, NaiveTime, TimeDelta};
use thiserror::Error;

use crate::days::DaySet;

/// The forward scan found no future fire time despite a non-empty day set.
/// This cannot happen through the public constructors and indicates a logic
/// defect, not a user-facing condition.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("no selected weekday produced a future fire time within the scan window")]
pub struct NoValidDayError;

/// Computes the next absolute time an alarm fires, strictly after `now`.
///
/// An empty day set means a one-time alarm: today at `fire_at` if that is
/// still ahead, otherwise tomorrow. A non-empty set is scanned forward one
/// day at a time, accepting the first selected weekday whose fire time is
/// strictly after `now`; a same-day trigger that already passed is skipped,
/// never re-selected for today.
///
/// `fire_at` is assumed minute-granular and in range (see `AlarmTime`).
pub fn next_occurrence(
    days: DaySet,
    fire_at: NaiveTime,
    now: NaiveDateTime,
) -> Result<NaiveDateTime, NoValidDayError> {
    if days.is_empty() {
        let today = now.date().and_time(fire_at);
        if today > now {
            return Ok(today);
        }
        let tomorrow = now
            .date()
            .checked_add_days(Days::new(1))
            .expect("Not realistic to overflow");
        return Ok(tomorrow.and_time(fire_at));
    }

    // Offset 7 covers a set whose only day is today with the time already
    // passed; the match is then the same weekday next week.
    for offset in 0..=7 {
        let date = now
            .date()
            .checked_add_days(Days::new(offset))
            .expect("Not realistic to overflow");
        if !days.contains(date.weekday()) {
            continue;
        }
        let candidate = date.and_time(fire_at);
        if candidate > now {
            return Ok(candidate);
        }
    }

    Err(NoValidDayError)
}

/// Time remaining until the next occurrence. Always positive.
pub fn target_delay(
    days: DaySet,
    fire_at: NaiveTime,
    now: NaiveDateTime,
) -> Result<TimeDelta, NoValidDayError> {
    Ok(next_occurrence(days, fire_at, now)? - now)
}

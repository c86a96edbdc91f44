use chrono::NaiveDateTime;

use crate::alarm::Alarm;
use crate::days::StartOfWeek;
use crate::recurrence;

/// One-line card summary: the day list for alarms with selected days,
/// "Today" or "Tomorrow" for one-time alarms.
pub fn alarm_summary(alarm: &Alarm, now: NaiveDateTime, start_of_week: StartOfWeek) -> String {
    if !alarm.days.is_empty() {
        return alarm.days.display(start_of_week);
    }

    match recurrence::next_occurrence(alarm.days, alarm.fire_at.time(), now) {
        Ok(next) if next.date() == now.date() => "Today".to_string(),
        Ok(_) => "Tomorrow".to_string(),
        // Unreachable for an empty day set.
        Err(_) => String::new(),
    }
}

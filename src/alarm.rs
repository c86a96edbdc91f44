use chrono::{NaiveTime, Timelike};

use crate::days::DaySet;

pub type AlarmId = i64;

/// Wall-clock trigger time of an alarm, minute granularity. Seconds and
/// sub-second parts are normalized away on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlarmTime(NaiveTime);

impl AlarmTime {
    pub fn new(inner: NaiveTime) -> Self {
        let normalized = inner
            .with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .expect("Will never fail.");
        Self(normalized)
    }

    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    pub fn time(&self) -> NaiveTime {
        self.0
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }
}

/// How the user asked to dismiss a ringing alarm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dismissal {
    Button,
    Tag(String),
}

#[derive(Debug, Clone)]
pub struct Alarm {
    pub id: AlarmId,
    pub enabled: bool,
    pub fire_at: AlarmTime,
    pub days: DaySet,
    pub repeat: bool,
    pub vibrate: bool,
    /// Path or URI of the ringtone; empty means the frontend default.
    pub sound: String,
    pub name: String,
    /// When set, dismissal requires scanning a tag.
    pub use_nfc: bool,
    /// Specific tag the alarm is bound to; empty accepts any tag.
    pub nfc_tag_id: String,
}

impl Alarm {
    /// A repeating alarm re-arms itself after every dismissal. An alarm with
    /// selected days but `repeat` off fires once on the next matching day.
    pub fn is_repeating(&self) -> bool {
        self.repeat && !self.days.is_empty()
    }

    pub fn accepts_dismissal(&self, dismissal: &Dismissal) -> bool {
        if !self.use_nfc {
            return true;
        }
        match dismissal {
            Dismissal::Tag(tag_id) => self.nfc_tag_id.is_empty() || *tag_id == self.nfc_tag_id,
            Dismissal::Button => false,
        }
    }
}

use chrono::Weekday;
use serde::Deserialize;
use thiserror::Error;

/// All seven weekday bits set. Sunday is bit 0, Saturday is bit 6.
const FULL_MASK: u8 = 0b0111_1111;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("day mask {mask} is out of range (expected 0..=127)")]
pub struct InvalidMaskError {
    pub mask: u32,
}

/// Which day an alarm card week starts on. Affects display order only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartOfWeek {
    #[default]
    Sunday,
    Monday,
}

impl StartOfWeek {
    fn first_day(self) -> Weekday {
        match self {
            StartOfWeek::Sunday => Weekday::Sun,
            StartOfWeek::Monday => Weekday::Mon,
        }
    }
}

/// The set of weekdays an alarm repeats on. An empty set marks a one-time
/// alarm. Persisted as a 7-bit mask with Sunday at bit 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DaySet(u8);

impl DaySet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn full() -> Self {
        Self(FULL_MASK)
    }

    /// Decodes a persisted mask. Values outside 0..=127 are rejected rather
    /// than truncated so callers can treat them as data corruption.
    pub fn from_mask(mask: u32) -> Result<Self, InvalidMaskError> {
        if mask > u32::from(FULL_MASK) {
            return Err(InvalidMaskError { mask });
        }
        Ok(Self(mask as u8))
    }

    pub const fn to_mask(self) -> u8 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, day: Weekday) -> bool {
        self.0 & Self::bit(day) != 0
    }

    pub fn insert(&mut self, day: Weekday) {
        self.0 |= Self::bit(day);
    }

    pub fn remove(&mut self, day: Weekday) {
        self.0 &= !Self::bit(day);
    }

    /// Selected days in calendar order, starting from the configured start
    /// of week.
    pub fn iter(self, start_of_week: StartOfWeek) -> impl Iterator<Item = Weekday> {
        let mut day = start_of_week.first_day();
        std::iter::repeat_with(move || {
            let current = day;
            day = day.succ();
            current
        })
        .take(7)
        .filter(move |day| self.contains(*day))
    }

    /// Abbreviated comma-joined day list, e.g. "Mon, Wed, Fri". A full set
    /// renders as "Every day"; an empty set renders as an empty string and
    /// the caller substitutes its own placeholder.
    pub fn display(self, start_of_week: StartOfWeek) -> String {
        if self.is_empty() {
            return String::new();
        }
        if self == Self::full() {
            return "Every day".to_string();
        }
        self.iter(start_of_week)
            .map(|day| day.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn bit(day: Weekday) -> u8 {
        1 << day.num_days_from_sunday()
    }
}

impl FromIterator<Weekday> for DaySet {
    fn from_iter<T: IntoIterator<Item = Weekday>>(iter: T) -> Self {
        let mut days = Self::empty();
        for day in iter {
            days.insert(day);
        }
        days
    }
}

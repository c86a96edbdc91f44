use crate::alarm::{Alarm, AlarmId, AlarmTime};
use crate::days::DaySet;

pub struct NewAlarm {
    pub enabled: bool,
    pub fire_at: AlarmTime,
    pub days: DaySet,
    pub repeat: bool,
    pub vibrate: bool,
    pub sound: String,
    pub name: String,
    pub use_nfc: bool,
    pub nfc_tag_id: String,
}

pub struct UpdateAlarm {
    pub id: AlarmId,
    pub enabled: Option<bool>,
    pub fire_at: Option<AlarmTime>,
    pub days: Option<DaySet>,
    pub repeat: Option<bool>,
    pub vibrate: Option<bool>,
    pub sound: Option<String>,
    pub name: Option<String>,
    pub use_nfc: Option<bool>,
    pub nfc_tag_id: Option<String>,
}

impl UpdateAlarm {
    pub fn unchanged(id: AlarmId) -> Self {
        Self {
            id,
            enabled: None,
            fire_at: None,
            days: None,
            repeat: None,
            vibrate: None,
            sound: None,
            name: None,
            use_nfc: None,
            nfc_tag_id: None,
        }
    }
}

/// Row shape of a persisted alarm: `days` is kept as an integer mask, which
/// is where corruption can enter.
#[derive(Debug, Clone)]
pub struct AlarmRecord {
    pub id: AlarmId,
    pub enabled: bool,
    pub fire_at: AlarmTime,
    pub days_mask: i64,
    pub repeat: bool,
    pub vibrate: bool,
    pub sound: String,
    pub name: String,
    pub use_nfc: bool,
    pub nfc_tag_id: String,
}

impl AlarmRecord {
    pub fn into_alarm(self) -> Alarm {
        Alarm {
            id: self.id,
            enabled: self.enabled,
            fire_at: self.fire_at,
            days: decode_days(self.id, self.days_mask),
            repeat: self.repeat,
            vibrate: self.vibrate,
            sound: self.sound,
            name: self.name,
            use_nfc: self.use_nfc,
            nfc_tag_id: self.nfc_tag_id,
        }
    }
}

impl From<Alarm> for AlarmRecord {
    fn from(alarm: Alarm) -> Self {
        Self {
            id: alarm.id,
            enabled: alarm.enabled,
            fire_at: alarm.fire_at,
            days_mask: i64::from(alarm.days.to_mask()),
            repeat: alarm.repeat,
            vibrate: alarm.vibrate,
            sound: alarm.sound,
            name: alarm.name,
            use_nfc: alarm.use_nfc,
            nfc_tag_id: alarm.nfc_tag_id,
        }
    }
}

/// A mask outside 0..=127 is data corruption. It is reset to "no days
/// selected" and logged, never silently truncated.
pub fn decode_days(id: AlarmId, mask: i64) -> DaySet {
    let decoded = u32::try_from(mask).ok().map(DaySet::from_mask);
    match decoded {
        Some(Ok(days)) => days,
        _ => {
            log::warn!("alarm {id}: corrupt day mask {mask}, resetting to no days");
            DaySet::empty()
        }
    }
}

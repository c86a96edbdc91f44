use std::sync::OnceLock;

use anyhow::Context;
use chrono::Weekday;
use chrono_tz::Tz;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::alarm::AlarmTime;
use crate::days::{DaySet, StartOfWeek};
use crate::storage::NewAlarm;

#[derive(Deserialize, Debug, Clone)]
pub struct AlarmSettings {
    pub hour: u32,
    pub minute: u32,
    #[serde(default)]
    pub name: String,
    /// Weekday names, e.g. ["mon", "wed", "fri"]. Empty means a one-time
    /// alarm.
    #[serde(default)]
    pub days: Vec<String>,
    #[serde(default)]
    pub repeat: bool,
    #[serde(default)]
    pub vibrate: bool,
    #[serde(default)]
    pub sound: String,
    #[serde(default)]
    pub use_nfc: bool,
    #[serde(default)]
    pub nfc_tag_id: String,
}

impl AlarmSettings {
    pub fn to_new_alarm(&self) -> anyhow::Result<NewAlarm> {
        let fire_at = AlarmTime::from_hm(self.hour, self.minute)
            .with_context(|| format!("invalid alarm time {}:{:02}", self.hour, self.minute))?;

        let mut days = DaySet::empty();
        for name in &self.days {
            let day: Weekday = name
                .parse()
                .map_err(|_| anyhow::anyhow!("unknown weekday {name:?}"))?;
            days.insert(day);
        }

        Ok(NewAlarm {
            enabled: true,
            fire_at,
            days,
            repeat: self.repeat,
            vibrate: self.vibrate,
            sound: self.sound.clone(),
            name: self.name.clone(),
            use_nfc: self.use_nfc,
            nfc_tag_id: self.nfc_tag_id.clone(),
        })
    }
}

#[derive(Deserialize, Debug)]
pub struct SchedulerSettings {
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default)]
    pub start_of_week: StartOfWeek,
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer: usize,
}

impl SchedulerSettings {
    pub fn timezone(&self) -> anyhow::Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("unknown timezone {:?}", self.timezone))
    }
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            start_of_week: StartOfWeek::default(),
            channel_buffer: default_channel_buffer(),
        }
    }
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_channel_buffer() -> usize {
    64
}

#[derive(Deserialize, Debug)]
pub struct AppSettings {
    #[serde(default)]
    pub scheduler: SchedulerSettings,
    #[serde(default)]
    pub alarms: Vec<AlarmSettings>,
}

impl AppSettings {
    fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("tagwake").required(false))
            .add_source(File::with_name("tagwake.local").required(false))
            .add_source(Environment::with_prefix("TAGWAKE"))
            .build()?;

        settings.try_deserialize()
    }
}

pub fn get() -> &'static AppSettings {
    static APPSETTINGS: OnceLock<AppSettings> = OnceLock::new();
    APPSETTINGS.get_or_init(|| AppSettings::new().unwrap())
}

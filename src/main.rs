mod alarm;
mod appsettings;
mod common;
mod days;
mod manager;
mod recurrence;
mod scheduling;
mod storage;
mod summary;

use std::sync::Arc;

use chrono::Utc;

use crate::manager::AlarmManager;
use crate::scheduling::{LogDeliveryChannel, TokioAlarmScheduler};
use crate::storage::{AlarmStorage, InMemoryAlarmStorage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    pretty_env_logger::init();

    let settings = appsettings::get();
    let timezone = settings.scheduler.timezone()?;
    let start_of_week = settings.scheduler.start_of_week;

    let storage = InMemoryAlarmStorage::new();
    for alarm_settings in &settings.alarms {
        storage.insert(alarm_settings.to_new_alarm()?).await?;
    }

    let scheduler = Arc::new(TokioAlarmScheduler::new(
        Arc::new(LogDeliveryChannel),
        timezone,
    ));
    let manager = AlarmManager::start(scheduler, settings.scheduler.channel_buffer);
    let sender = manager.sender();

    let now = Utc::now().with_timezone(&timezone).naive_local();
    for alarm in storage.get_all().await {
        if !alarm.enabled {
            continue;
        }
        log::info!(
            "alarm {} ({}): {}",
            alarm.id,
            alarm.name,
            summary::alarm_summary(&alarm, now, start_of_week)
        );
        sender.upsert(alarm).await?;
    }

    log::info!("tagwake is running, press ctrl-c to stop");
    tokio::signal::ctrl_c().await?;
    manager.abort();

    Ok(())
}

mod delivery;
mod tokio_scheduler;

pub use delivery::{AlarmDeliveryChannel, AlarmMessageType, LogDeliveryChannel};
pub use tokio_scheduler::TokioAlarmScheduler;

use async_trait::async_trait;

use crate::alarm::{Alarm, AlarmId, Dismissal};

pub struct ScheduleRequest {
    pub alarm: Alarm,
}

impl ScheduleRequest {
    pub fn new(alarm: Alarm) -> Self {
        Self { alarm }
    }
}

/// Cancellation handle for exactly one pending alarm, keyed by its id.
pub struct ScheduledAlarm {
    pub id: AlarmId,
}

#[async_trait]
pub trait AlarmScheduler: Send + Sync + 'static {
    async fn schedule_alarm(
        &self,
        schedule_request: ScheduleRequest,
    ) -> anyhow::Result<ScheduledAlarm>;

    async fn cancel_alarm(&self, scheduled_alarm: &ScheduledAlarm) -> anyhow::Result<()>;

    async fn dismiss_alarm(
        &self,
        scheduled_alarm: &ScheduledAlarm,
        dismissal: Dismissal,
    ) -> anyhow::Result<()>;
}

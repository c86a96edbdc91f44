use async_trait::async_trait;

use crate::alarm::Alarm;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum AlarmMessageType {
    Scheduled,
    Fired,
    Dismissed,
    DismissRejected,
    Stopped,
}

/// Seam for whatever frontend presents the alarm: a notification surface,
/// a ringer, or just the log.
#[async_trait]
pub trait AlarmDeliveryChannel: Send + Sync + 'static {
    async fn send_alarm_notification(&self, alarm: &Alarm, message: AlarmMessageType);
}

pub struct LogDeliveryChannel;

#[async_trait]
impl AlarmDeliveryChannel for LogDeliveryChannel {
    async fn send_alarm_notification(&self, alarm: &Alarm, message: AlarmMessageType) {
        match message {
            AlarmMessageType::Fired if alarm.use_nfc => {
                log::info!(
                    "alarm {} ({}) is ringing, scan the tag to dismiss",
                    alarm.id,
                    alarm.name
                );
            }
            AlarmMessageType::Fired => {
                log::info!("alarm {} ({}) is ringing", alarm.id, alarm.name);
            }
            other => log::info!("alarm {}: {:?}", alarm.id, other),
        }
    }
}

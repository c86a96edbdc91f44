use std::{
    collections::{HashMap, hash_map::Entry},
    sync::Arc,
    time::Duration,
};

use async_trait::async_trait;
use chrono::Utc;
use chrono_tz::Tz;
use tokio::{
    sync::{RwLock, mpsc},
    task::{self, JoinHandle},
};
use tokio_util::sync::CancellationToken;

use crate::alarm::{Alarm, AlarmId, Dismissal};
use crate::recurrence;

use super::{
    AlarmDeliveryChannel, AlarmMessageType, AlarmScheduler, ScheduleRequest, ScheduledAlarm,
};

const CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

#[derive(Debug)]
enum AlarmEvent {
    Schedule,
    Trigger,
    Dismiss(Dismissal),
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AlarmTaskState {
    Pending,
    Armed,
    Ringing,
    Finished,
}

struct ScheduledAlarmHandle {
    task: JoinHandle<()>,
    tx: mpsc::Sender<AlarmEvent>,
}

type AlarmTaskStore = RwLock<HashMap<AlarmId, ScheduledAlarmHandle>>;

/// Keeps one tokio task per scheduled alarm. Each task sleeps until the
/// next occurrence, notifies the delivery channel, then either waits for a
/// dismissal or re-arms itself, depending on the alarm's repeat settings.
pub struct TokioAlarmScheduler {
    tasks: Arc<AlarmTaskStore>,
    delivery_channel: Arc<dyn AlarmDeliveryChannel>,
    timezone: Tz,
    cleanup_token: CancellationToken,
}

impl TokioAlarmScheduler {
    pub fn new(delivery_channel: Arc<dyn AlarmDeliveryChannel>, timezone: Tz) -> Self {
        let tasks = Arc::new(RwLock::new(HashMap::new()));
        let cleanup_token = Self::spawn_cleanup_task(Arc::clone(&tasks));

        Self {
            tasks,
            delivery_channel,
            timezone,
            cleanup_token,
        }
    }
}

impl Drop for TokioAlarmScheduler {
    fn drop(&mut self) {
        self.cleanup_token.cancel();
    }
}

impl TokioAlarmScheduler {
    fn create_alarm_task(&self, alarm: Alarm) -> ScheduledAlarmHandle {
        let alarm_id = alarm.id;
        log::info!("Starting task for alarm {alarm_id}");
        let (tx, rx) = mpsc::channel(10);

        let tx_clone = tx.clone();
        let delivery_channel = self.delivery_channel.clone();
        let timezone = self.timezone;
        let task = task::spawn(async move {
            let _ = tx_clone.send(AlarmEvent::Schedule).await;
            run_alarm(alarm, delivery_channel.as_ref(), rx, tx_clone, timezone).await;
        });

        ScheduledAlarmHandle { task, tx }
    }

    fn spawn_cleanup_task(tasks: Arc<AlarmTaskStore>) -> CancellationToken {
        let token = CancellationToken::new();
        let task_token = token.child_token();
        task::spawn(async move {
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(CLEANUP_INTERVAL) => {
                        Self::clean_finished_tasks(&tasks).await;
                    }
                    _ = task_token.cancelled() => {
                        log::info!("Cleanup task shutting down");
                        break;
                    }
                };
            }
        });

        token
    }

    async fn clean_finished_tasks(tasks: &AlarmTaskStore) {
        let mut tasks = tasks.write().await;
        let before = tasks.len();
        tasks.retain(|_, handle| !handle.task.is_finished());
        let after = tasks.len();

        if before != after {
            log::info!("Cleaned up {} completed alarm tasks", before - after);
        }
    }
}

#[async_trait]
impl AlarmScheduler for TokioAlarmScheduler {
    async fn schedule_alarm(
        &self,
        schedule_request: ScheduleRequest,
    ) -> anyhow::Result<ScheduledAlarm> {
        let alarm_id = schedule_request.alarm.id;
        if let Entry::Vacant(e) = self.tasks.write().await.entry(alarm_id) {
            let handle = self.create_alarm_task(schedule_request.alarm);
            e.insert(handle);

            Ok(ScheduledAlarm { id: alarm_id })
        } else {
            anyhow::bail!("Already scheduled")
        }
    }

    async fn cancel_alarm(&self, scheduled_alarm: &ScheduledAlarm) -> anyhow::Result<()> {
        if let Some((_, handle)) = self.tasks.write().await.remove_entry(&scheduled_alarm.id) {
            handle.tx.send(AlarmEvent::Stop).await?;

            Ok(())
        } else {
            anyhow::bail!("No such alarm")
        }
    }

    async fn dismiss_alarm(
        &self,
        scheduled_alarm: &ScheduledAlarm,
        dismissal: Dismissal,
    ) -> anyhow::Result<()> {
        if let Some(handle) = self.tasks.read().await.get(&scheduled_alarm.id) {
            handle.tx.send(AlarmEvent::Dismiss(dismissal)).await?;
        }
        Ok(())
    }
}

async fn run_alarm(
    alarm: Alarm,
    delivery: &dyn AlarmDeliveryChannel,
    mut rx: mpsc::Receiver<AlarmEvent>,
    tx: mpsc::Sender<AlarmEvent>,
    timezone: Tz,
) {
    let mut state = AlarmTaskState::Pending;
    while let Some(event) = rx.recv().await {
        state = handle_event(&alarm, state, &event, delivery, tx.clone(), timezone).await;
        if state == AlarmTaskState::Finished {
            break;
        }
    }
}

async fn handle_event(
    alarm: &Alarm,
    current_state: AlarmTaskState,
    event: &AlarmEvent,
    delivery: &dyn AlarmDeliveryChannel,
    tx: mpsc::Sender<AlarmEvent>,
    timezone: Tz,
) -> AlarmTaskState {
    let id = alarm.id;
    match (current_state, event) {
        (AlarmTaskState::Pending, AlarmEvent::Schedule) => {
            arm(alarm, delivery, tx, timezone).await
        }
        (AlarmTaskState::Armed, AlarmEvent::Trigger) => {
            delivery
                .send_alarm_notification(alarm, AlarmMessageType::Fired)
                .await;

            AlarmTaskState::Ringing
        }
        (AlarmTaskState::Ringing, AlarmEvent::Dismiss(dismissal)) => {
            if !alarm.accepts_dismissal(dismissal) {
                log::warn!("alarm {id}: dismissal rejected, wrong or missing tag");
                delivery
                    .send_alarm_notification(alarm, AlarmMessageType::DismissRejected)
                    .await;
                return AlarmTaskState::Ringing;
            }

            delivery
                .send_alarm_notification(alarm, AlarmMessageType::Dismissed)
                .await;

            if alarm.is_repeating() {
                arm(alarm, delivery, tx, timezone).await
            } else {
                AlarmTaskState::Finished
            }
        }
        (_, AlarmEvent::Stop) => {
            delivery
                .send_alarm_notification(alarm, AlarmMessageType::Stopped)
                .await;
            AlarmTaskState::Finished
        }
        (state, event) => {
            log::warn!(
                "Received unknown state and event combination for alarm. [state = {:?}, event = {:?}, alarm_id = {}]",
                state,
                event,
                id
            );

            state
        }
    }
}

async fn arm(
    alarm: &Alarm,
    delivery: &dyn AlarmDeliveryChannel,
    tx: mpsc::Sender<AlarmEvent>,
    timezone: Tz,
) -> AlarmTaskState {
    let now = Utc::now().with_timezone(&timezone).naive_local();
    let delay = match recurrence::target_delay(alarm.days, alarm.fire_at.time(), now) {
        Ok(delay) => delay
            .to_std()
            .expect("The target delay is always in the future."),
        Err(err) => {
            log::error!("alarm {}: {err}", alarm.id);
            return AlarmTaskState::Finished;
        }
    };

    delivery
        .send_alarm_notification(alarm, AlarmMessageType::Scheduled)
        .await;

    log::info!("[ARM] Sleeping for {:?} delay. AlarmId {}", delay, alarm.id);

    send_after_delay(AlarmEvent::Trigger, tx, delay);

    AlarmTaskState::Armed
}

fn send_after_delay(ev: AlarmEvent, tx: mpsc::Sender<AlarmEvent>, delay: Duration) {
    task::spawn(async move {
        tokio::time::sleep(delay).await;
        let _ = tx.send(ev).await;
    });
}

#[cfg(test)]
mod tests;

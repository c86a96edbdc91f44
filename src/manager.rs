use std::collections::HashMap;
use std::sync::Arc;

use tokio::{sync::mpsc, task::JoinHandle};

use crate::alarm::AlarmId;
use crate::common::{AlarmManagerMessage, AlarmManagerSender};
use crate::scheduling::{AlarmScheduler, ScheduleRequest, ScheduledAlarm};

/// Owns the mapping from alarm ids to their pending schedule handles. Every
/// edit message cancels and reschedules exactly the affected alarm.
pub struct AlarmManager {
    sender: AlarmManagerSender,
    manager_task_handle: JoinHandle<()>,
}

impl AlarmManager {
    pub fn start(scheduler: Arc<dyn AlarmScheduler>, buffer: usize) -> Self {
        let (sender, receiver) = mpsc::channel(buffer);
        let manager_task_handle = tokio::spawn(Self::handle_messages(receiver, scheduler));

        Self {
            sender: AlarmManagerSender::new(sender),
            manager_task_handle,
        }
    }

    pub fn sender(&self) -> AlarmManagerSender {
        self.sender.clone()
    }

    pub fn abort(&self) {
        self.manager_task_handle.abort();
    }

    async fn handle_messages(
        mut receiver: mpsc::Receiver<AlarmManagerMessage>,
        scheduler: Arc<dyn AlarmScheduler>,
    ) {
        let mut scheduled: HashMap<AlarmId, ScheduledAlarm> = HashMap::new();
        while let Some(msg) = receiver.recv().await {
            match msg {
                AlarmManagerMessage::Upsert(alarm) => {
                    let id = alarm.id;
                    Self::cancel_existing(&mut scheduled, id, scheduler.as_ref()).await;

                    if !alarm.enabled {
                        continue;
                    }

                    match scheduler.schedule_alarm(ScheduleRequest::new(alarm)).await {
                        Ok(handle) => {
                            scheduled.insert(id, handle);
                        }
                        Err(err) => log::error!("failed to schedule alarm {id}: {err:#}"),
                    }
                }
                AlarmManagerMessage::Cancel(id) => {
                    Self::cancel_existing(&mut scheduled, id, scheduler.as_ref()).await;
                }
                AlarmManagerMessage::Dismiss(id, dismissal) => {
                    if let Some(handle) = scheduled.get(&id) {
                        if let Err(err) = scheduler.dismiss_alarm(handle, dismissal).await {
                            log::warn!("failed to dismiss alarm {id}: {err:#}");
                        }
                    } else {
                        log::warn!("dismiss requested for unscheduled alarm {id}");
                    }
                }
            }
        }
    }

    async fn cancel_existing(
        scheduled: &mut HashMap<AlarmId, ScheduledAlarm>,
        id: AlarmId,
        scheduler: &dyn AlarmScheduler,
    ) {
        if let Some(existing) = scheduled.remove(&id) {
            if let Err(err) = scheduler.cancel_alarm(&existing).await {
                log::warn!("failed to cancel alarm {id}: {err:#}");
            }
        }
    }
}

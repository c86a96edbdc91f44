use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};

use crate::alarm::{Alarm, AlarmTime, Dismissal};
use crate::days::DaySet;

use super::*;

type ReceivedMessages = Arc<Mutex<Vec<AlarmMessageType>>>;

#[derive(Clone)]
struct TestDeliveryChannel {
    received_messages: ReceivedMessages,
}

#[async_trait]
impl AlarmDeliveryChannel for TestDeliveryChannel {
    async fn send_alarm_notification(&self, _alarm: &Alarm, message: AlarmMessageType) {
        self.received_messages.lock().unwrap().push(message);
    }
}

struct TestContext {
    received_messages: ReceivedMessages,
    scheduler: TokioAlarmScheduler,
}

impl TestContext {
    fn new() -> Self {
        let received_messages = Arc::new(Mutex::new(Vec::new()));
        let delivery_channel = TestDeliveryChannel {
            received_messages: received_messages.clone(),
        };
        let scheduler = TokioAlarmScheduler::new(Arc::new(delivery_channel), chrono_tz::UTC);

        Self {
            received_messages,
            scheduler,
        }
    }

    fn messages(&self) -> Vec<AlarmMessageType> {
        self.received_messages.lock().unwrap().clone()
    }
}

// Fires roughly an hour from the real wall clock; with paused tokio time a
// day of virtual sleep is guaranteed to get past it.
fn test_alarm(days: DaySet, repeat: bool, use_nfc: bool, nfc_tag_id: &str) -> Alarm {
    let fire_at = AlarmTime::new((Utc::now() + TimeDelta::hours(1)).time());
    Alarm {
        id: 1,
        enabled: true,
        fire_at,
        days,
        repeat,
        vibrate: false,
        sound: String::new(),
        name: "test".to_string(),
        use_nfc,
        nfc_tag_id: nfc_tag_id.to_string(),
    }
}

async fn wait_past_trigger() {
    tokio::time::sleep(Duration::from_secs(60 * 60 * 24)).await;
}

async fn let_tasks_run() {
    tokio::time::sleep(Duration::from_millis(100)).await;
}

#[tokio::test(start_paused = true)]
async fn one_time_alarm_is_scheduled_and_fires() {
    let ctx = TestContext::new();
    let alarm = test_alarm(DaySet::empty(), false, false, "");

    ctx.scheduler
        .schedule_alarm(ScheduleRequest::new(alarm))
        .await
        .unwrap();

    wait_past_trigger().await;

    assert_eq!(
        ctx.messages(),
        vec![AlarmMessageType::Scheduled, AlarmMessageType::Fired]
    );
}

#[tokio::test(start_paused = true)]
async fn cancelled_alarm_never_fires() {
    let ctx = TestContext::new();
    let alarm = test_alarm(DaySet::empty(), false, false, "");

    let scheduled = ctx
        .scheduler
        .schedule_alarm(ScheduleRequest::new(alarm))
        .await
        .unwrap();
    let_tasks_run().await;

    ctx.scheduler.cancel_alarm(&scheduled).await.unwrap();
    wait_past_trigger().await;

    assert_eq!(
        ctx.messages(),
        vec![AlarmMessageType::Scheduled, AlarmMessageType::Stopped]
    );
}

#[tokio::test(start_paused = true)]
async fn scheduling_the_same_alarm_twice_fails() {
    let ctx = TestContext::new();

    ctx.scheduler
        .schedule_alarm(ScheduleRequest::new(test_alarm(
            DaySet::empty(),
            false,
            false,
            "",
        )))
        .await
        .unwrap();

    let second = ctx
        .scheduler
        .schedule_alarm(ScheduleRequest::new(test_alarm(
            DaySet::empty(),
            false,
            false,
            "",
        )))
        .await;

    assert!(second.is_err());
}

#[tokio::test(start_paused = true)]
async fn plain_alarm_is_dismissed_by_the_button() {
    let ctx = TestContext::new();
    let alarm = test_alarm(DaySet::empty(), false, false, "");

    let scheduled = ctx
        .scheduler
        .schedule_alarm(ScheduleRequest::new(alarm))
        .await
        .unwrap();
    wait_past_trigger().await;

    ctx.scheduler
        .dismiss_alarm(&scheduled, Dismissal::Button)
        .await
        .unwrap();
    let_tasks_run().await;

    assert_eq!(
        ctx.messages(),
        vec![
            AlarmMessageType::Scheduled,
            AlarmMessageType::Fired,
            AlarmMessageType::Dismissed
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn nfc_alarm_keeps_ringing_until_the_right_tag() {
    let ctx = TestContext::new();
    let alarm = test_alarm(DaySet::empty(), false, true, "04:a2:5c:11");

    let scheduled = ctx
        .scheduler
        .schedule_alarm(ScheduleRequest::new(alarm))
        .await
        .unwrap();
    wait_past_trigger().await;

    ctx.scheduler
        .dismiss_alarm(&scheduled, Dismissal::Button)
        .await
        .unwrap();
    let_tasks_run().await;

    ctx.scheduler
        .dismiss_alarm(&scheduled, Dismissal::Tag("04:ff:ff:ff".to_string()))
        .await
        .unwrap();
    let_tasks_run().await;

    ctx.scheduler
        .dismiss_alarm(&scheduled, Dismissal::Tag("04:a2:5c:11".to_string()))
        .await
        .unwrap();
    let_tasks_run().await;

    assert_eq!(
        ctx.messages(),
        vec![
            AlarmMessageType::Scheduled,
            AlarmMessageType::Fired,
            AlarmMessageType::DismissRejected,
            AlarmMessageType::DismissRejected,
            AlarmMessageType::Dismissed
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn repeating_alarm_rearms_after_dismissal() {
    let ctx = TestContext::new();
    let alarm = test_alarm(DaySet::full(), true, false, "");

    let scheduled = ctx
        .scheduler
        .schedule_alarm(ScheduleRequest::new(alarm))
        .await
        .unwrap();
    wait_past_trigger().await;

    ctx.scheduler
        .dismiss_alarm(&scheduled, Dismissal::Button)
        .await
        .unwrap();
    let_tasks_run().await;

    wait_past_trigger().await;

    assert_eq!(
        ctx.messages(),
        vec![
            AlarmMessageType::Scheduled,
            AlarmMessageType::Fired,
            AlarmMessageType::Dismissed,
            AlarmMessageType::Scheduled,
            AlarmMessageType::Fired
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn cancelling_an_unknown_alarm_fails() {
    let ctx = TestContext::new();

    let result = ctx.scheduler.cancel_alarm(&ScheduledAlarm { id: 99 }).await;

    assert!(result.is_err());
}

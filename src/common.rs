use tokio::sync::mpsc;

use crate::alarm::{Alarm, AlarmId, Dismissal};

#[derive(Debug)]
pub enum AlarmManagerMessage {
    Upsert(Alarm),
    Cancel(AlarmId),
    Dismiss(AlarmId, Dismissal),
}

#[derive(Clone)]
pub struct AlarmManagerSender(mpsc::Sender<AlarmManagerMessage>);

impl AlarmManagerSender {
    pub fn new(inner: mpsc::Sender<AlarmManagerMessage>) -> Self {
        AlarmManagerSender(inner)
    }

    pub async fn upsert(&self, alarm: Alarm) -> anyhow::Result<()> {
        self.0.send(AlarmManagerMessage::Upsert(alarm)).await?;
        Ok(())
    }

    pub async fn cancel(&self, id: AlarmId) -> anyhow::Result<()> {
        self.0.send(AlarmManagerMessage::Cancel(id)).await?;
        Ok(())
    }

    pub async fn dismiss(&self, id: AlarmId, dismissal: Dismissal) -> anyhow::Result<()> {
        self.0
            .send(AlarmManagerMessage::Dismiss(id, dismissal))
            .await?;
        Ok(())
    }
}

mod model;

pub use model::{NewAlarm, UpdateAlarm};

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::alarm::{Alarm, AlarmId};
use model::AlarmRecord;

#[async_trait]
pub trait AlarmStorage: Send + Sync {
    async fn insert(&self, alarm: NewAlarm) -> anyhow::Result<Alarm>;
    async fn update(&self, alarm: UpdateAlarm) -> anyhow::Result<Alarm>;
    async fn get(&self, id: AlarmId) -> Option<Alarm>;
    async fn get_all(&self) -> Vec<Alarm>;
    async fn delete(&self, id: AlarmId) -> anyhow::Result<()>;
}

pub struct InMemoryAlarmStorage {
    store: RwLock<(AlarmId, HashMap<AlarmId, AlarmRecord>)>,
}

impl InMemoryAlarmStorage {
    pub fn new() -> Self {
        InMemoryAlarmStorage {
            store: RwLock::new((1, HashMap::new())),
        }
    }
}

impl Default for InMemoryAlarmStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AlarmStorage for InMemoryAlarmStorage {
    async fn insert(&self, alarm: NewAlarm) -> anyhow::Result<Alarm> {
        let mut store = self.store.write().await;
        let id = store.0;
        let record = AlarmRecord {
            id,
            enabled: alarm.enabled,
            fire_at: alarm.fire_at,
            days_mask: i64::from(alarm.days.to_mask()),
            repeat: alarm.repeat,
            vibrate: alarm.vibrate,
            sound: alarm.sound,
            name: alarm.name,
            use_nfc: alarm.use_nfc,
            nfc_tag_id: alarm.nfc_tag_id,
        };

        store.1.insert(id, record.clone());
        store.0 += 1;

        Ok(record.into_alarm())
    }

    async fn update(&self, update: UpdateAlarm) -> anyhow::Result<Alarm> {
        let mut store = self.store.write().await;
        let id = update.id;
        if let Some(record) = store.1.remove(&id) {
            let mut alarm = record.into_alarm();
            alarm.enabled = update.enabled.unwrap_or(alarm.enabled);
            alarm.fire_at = update.fire_at.unwrap_or(alarm.fire_at);
            alarm.days = update.days.unwrap_or(alarm.days);
            alarm.repeat = update.repeat.unwrap_or(alarm.repeat);
            alarm.vibrate = update.vibrate.unwrap_or(alarm.vibrate);
            alarm.sound = update.sound.unwrap_or(alarm.sound);
            alarm.name = update.name.unwrap_or(alarm.name);
            alarm.use_nfc = update.use_nfc.unwrap_or(alarm.use_nfc);
            alarm.nfc_tag_id = update.nfc_tag_id.unwrap_or(alarm.nfc_tag_id);

            store.1.insert(id, AlarmRecord::from(alarm.clone()));
            Ok(alarm)
        } else {
            anyhow::bail!("Does not exist")
        }
    }

    async fn get(&self, id: AlarmId) -> Option<Alarm> {
        let store = self.store.read().await;
        store.1.get(&id).cloned().map(AlarmRecord::into_alarm)
    }

    async fn get_all(&self) -> Vec<Alarm> {
        let store = self.store.read().await;
        store
            .1
            .values()
            .cloned()
            .map(AlarmRecord::into_alarm)
            .collect()
    }

    async fn delete(&self, id: AlarmId) -> anyhow::Result<()> {
        let mut store = self.store.write().await;
        if store.1.remove(&id).is_none() {
            anyhow::bail!("Does not exist");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    use crate::alarm::AlarmTime;
    use crate::days::DaySet;

    fn new_alarm(name: &str) -> NewAlarm {
        NewAlarm {
            enabled: true,
            fire_at: AlarmTime::from_hm(7, 0).unwrap(),
            days: [Weekday::Mon, Weekday::Fri].into_iter().collect(),
            repeat: true,
            vibrate: false,
            sound: String::new(),
            name: name.to_string(),
            use_nfc: false,
            nfc_tag_id: String::new(),
        }
    }

    #[tokio::test]
    async fn insert_assigns_unique_ids() {
        let storage = InMemoryAlarmStorage::new();

        let first = storage.insert(new_alarm("first")).await.unwrap();
        let second = storage.insert(new_alarm("second")).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(storage.get(first.id).await.unwrap().name, "first");
        assert_eq!(storage.get_all().await.len(), 2);
    }

    #[tokio::test]
    async fn update_changes_only_provided_fields() {
        let storage = InMemoryAlarmStorage::new();
        let alarm = storage.insert(new_alarm("morning")).await.unwrap();

        let updated = storage
            .update(UpdateAlarm {
                fire_at: Some(AlarmTime::from_hm(8, 15).unwrap()),
                days: Some(DaySet::empty()),
                ..UpdateAlarm::unchanged(alarm.id)
            })
            .await
            .unwrap();

        assert_eq!(updated.fire_at, AlarmTime::from_hm(8, 15).unwrap());
        assert!(updated.days.is_empty());
        assert_eq!(updated.name, "morning");
        assert!(updated.enabled);
    }

    #[tokio::test]
    async fn update_of_missing_alarm_fails() {
        let storage = InMemoryAlarmStorage::new();

        let result = storage.update(UpdateAlarm::unchanged(42)).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn delete_removes_the_alarm() {
        let storage = InMemoryAlarmStorage::new();
        let alarm = storage.insert(new_alarm("gone")).await.unwrap();

        storage.delete(alarm.id).await.unwrap();

        assert!(storage.get(alarm.id).await.is_none());
        assert!(storage.delete(alarm.id).await.is_err());
    }
}

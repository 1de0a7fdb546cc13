//! In-process session store.
//!
//! Used for development and tests. An expired record loads as `None`, and
//! every save sweeps out all expired records so abandoned sessions do not
//! pile up.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::record::{SessionId, SessionRecord};
use crate::store::{SessionError, SessionStore};

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    records: RwLock<HashMap<SessionId, (SessionRecord, Instant)>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, id: &SessionId) -> Result<Option<SessionRecord>, SessionError> {
        let now = Instant::now();
        {
            let records = self.records.read();
            match records.get(id) {
                Some((record, expires_at)) if *expires_at > now => {
                    return Ok(Some(record.clone()));
                }
                Some(_) => {}
                None => return Ok(None),
            }
        }

        self.records.write().remove(id);
        Ok(None)
    }

    async fn save(
        &self,
        id: &SessionId,
        record: &SessionRecord,
        ttl: Duration,
    ) -> Result<(), SessionError> {
        let now = Instant::now();
        let mut records = self.records.write();
        records.retain(|_, (_, expires_at)| *expires_at > now);
        records.insert(*id, (record.clone(), now + ttl));
        Ok(())
    }

    async fn delete(&self, id: &SessionId) -> Result<(), SessionError> {
        self.records.write().remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_then_load() {
        let store = MemorySessionStore::new();
        let id = SessionId::generate();
        let mut record = SessionRecord::default();
        record.values.insert("uid".into(), "u-1".into());

        store.save(&id, &record, Duration::from_secs(60)).await.unwrap();

        assert_eq!(store.load(&id).await.unwrap(), Some(record));
    }

    #[tokio::test]
    async fn expired_record_is_gone() {
        let store = MemorySessionStore::new();
        let id = SessionId::generate();

        store
            .save(&id, &SessionRecord::default(), Duration::ZERO)
            .await
            .unwrap();

        assert!(store.load(&id).await.unwrap().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn save_sweeps_abandoned_records() {
        let store = MemorySessionStore::new();
        for _ in 0..1000 {
            store
                .save(&SessionId::generate(), &SessionRecord::default(), Duration::ZERO)
                .await
                .unwrap();
        }

        let live = SessionId::generate();
        store
            .save(&live, &SessionRecord::default(), Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(store.len(), 1);
        assert!(store.load(&live).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn delete_removes_record() {
        let store = MemorySessionStore::new();
        let id = SessionId::generate();
        store
            .save(&id, &SessionRecord::default(), Duration::from_secs(60))
            .await
            .unwrap();

        store.delete(&id).await.unwrap();
        assert!(store.load(&id).await.unwrap().is_none());
    }
}

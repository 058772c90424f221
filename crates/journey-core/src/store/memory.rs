use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use journey_domain::{Journey, JourneyKey};
use log::{debug, warn};
use tokio::sync::RwLock;

use super::JourneyStore;
use crate::errors::StoreError;

/// Store en memoria (tests, demos y prototipos). Los clones comparten el mismo
/// mapa.
#[derive(Clone, Default)]
pub struct InMemoryJourneyStore {
    inner: Arc<RwLock<HashMap<JourneyKey, Journey>>>,
}

impl InMemoryJourneyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait]
impl JourneyStore for InMemoryJourneyStore {
    async fn find(&self, key: &JourneyKey) -> Result<Option<Journey>, StoreError> {
        let guard = self.inner.read().await;
        let found = guard.get(key).cloned();
        debug!("find key={key} found={}", found.is_some());
        Ok(found)
    }

    async fn save(&self, journey: &mut Journey) -> Result<(), StoreError> {
        let mut guard = self.inner.write().await;
        let stored_version = guard.get(journey.key()).map(Journey::version).unwrap_or(0);
        let exists = guard.contains_key(journey.key());
        if stored_version != journey.version() || (journey.version() == 0 && exists) {
            warn!("save:conflict key={} expected={} found={}",
                  journey.key(),
                  journey.version(),
                  stored_version);
            return Err(StoreError::VersionConflict { key: journey.key().to_string(),
                                                     expected: journey.version(),
                                                     found: stored_version });
        }
        journey.set_version(stored_version + 1);
        guard.insert(journey.key().clone(), journey.clone());
        debug!("save key={} version={}", journey.key(), journey.version());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use journey_domain::MemberRef;

    fn journey() -> Journey {
        let key = JourneyKey::new("transfer", &MemberRef::new("RBS", "1"));
        Journey::start(key, "Started", "1", "2", None, Utc::now()).expect("start")
    }

    #[tokio::test]
    async fn save_then_find_round_trips() {
        let store = InMemoryJourneyStore::new();
        let mut j = journey();
        store.save(&mut j).await.expect("save");
        assert_eq!(j.version(), 1);
        let found = store.find(j.key()).await.expect("find").expect("some");
        assert_eq!(found, j);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn stale_version_is_rejected() {
        let store = InMemoryJourneyStore::new();
        let mut j = journey();
        store.save(&mut j).await.expect("insert");
        let mut a = store.find(j.key()).await.unwrap().unwrap();
        let mut b = a.clone();
        store.save(&mut a).await.expect("first writer wins");
        let err = store.save(&mut b).await.unwrap_err();
        assert!(matches!(err, StoreError::VersionConflict { expected: 1, found: 2, .. }));
    }

    #[tokio::test]
    async fn duplicate_insert_is_a_conflict() {
        let store = InMemoryJourneyStore::new();
        store.save(&mut journey()).await.expect("insert");
        let err = store.save(&mut journey()).await.unwrap_err();
        assert!(matches!(err, StoreError::VersionConflict { expected: 0, found: 1, .. }));
    }

    #[tokio::test]
    async fn missing_journey_is_none() {
        let store = InMemoryJourneyStore::new();
        let key = JourneyKey::new("bereavement", &MemberRef::new("RBS", "2"));
        assert!(store.find(&key).await.expect("find").is_none());
        assert!(store.is_empty().await);
    }
}

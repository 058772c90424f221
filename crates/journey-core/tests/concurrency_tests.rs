use std::sync::Arc;

use async_trait::async_trait;
use journey_core::journey_domain::{Journey, JourneyKey, MemberRef};
use journey_core::{ErrorClass, InMemoryJourneyStore, JourneyError, JourneyService, JourneyStore, StoreError};
use tokio::sync::Barrier;

/// Store que retiene cada lectura hasta que los dos requests hayan leído, de
/// modo que ambos partan de la misma versión.
#[derive(Clone)]
struct LockstepStore {
    inner: InMemoryJourneyStore,
    barrier: Arc<Barrier>,
}

#[async_trait]
impl JourneyStore for LockstepStore {
    async fn find(&self, key: &JourneyKey) -> Result<Option<Journey>, StoreError> {
        let found = self.inner.find(key).await?;
        self.barrier.wait().await;
        Ok(found)
    }

    async fn save(&self, journey: &mut Journey) -> Result<(), StoreError> {
        self.inner.save(journey).await
    }
}

#[tokio::test]
async fn concurrent_writes_on_same_journey_conflict_instead_of_losing_data() {
    let member = MemberRef::new("RBS", "1234567");
    let shared = InMemoryJourneyStore::new();
    JourneyService::new(shared.clone()).start_journey(&member, "retirement", "p1", "p2", None)
                                       .await
                                       .expect("start");

    let store = LockstepStore { inner: shared.clone(),
                                barrier: Arc::new(Barrier::new(2)) };
    let service = Arc::new(JourneyService::new(store));

    let handles: Vec<_> = ["first", "second"].into_iter()
                                             .map(|form| {
                                                 let service = Arc::clone(&service);
                                                 let member = member.clone();
                                                 tokio::spawn(async move {
                                                     service.save_generic_data(&member,
                                                                               "retirement",
                                                                               "p1",
                                                                               form,
                                                                               "{\"v\":1}")
                                                            .await
                                                 })
                                             })
                                             .collect();
    let mut ok = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.expect("join") {
            Ok(()) => ok += 1,
            Err(err @ JourneyError::Store(StoreError::VersionConflict { .. })) => {
                assert_eq!(err.class(), ErrorClass::Conflict);
                conflicts += 1;
            }
            Err(other) => panic!("unexpected error {other:?}"),
        }
    }
    assert_eq!((ok, conflicts), (1, 1));

    let journey = JourneyService::new(shared).get_journey(&member, "retirement")
                                             .await
                                             .expect("get")
                                             .expect("journey");
    let step = journey.step("p1").expect("step");
    let written = ["first", "second"].iter().filter(|f| step.generic_data(f).is_some()).count();
    assert_eq!(written, 1);
    assert_eq!(journey.version(), 2);
}

#[tokio::test]
async fn writes_on_different_members_do_not_interfere() {
    let store = InMemoryJourneyStore::new();
    let service = Arc::new(JourneyService::new(store));
    let members: Vec<MemberRef> = (0..8).map(|i| MemberRef::new("RBS", format!("{i:07}"))).collect();
    for m in &members {
        service.start_journey(m, "transfer", "start", "details", None).await.expect("start");
    }
    let mut handles = Vec::new();
    for m in members.clone() {
        let service = Arc::clone(&service);
        handles.push(tokio::spawn(async move {
                         service.save_generic_data(&m, "transfer", "details", "form", "{}").await
                     }));
    }
    for handle in handles {
        handle.await.expect("join").expect("save");
    }
    for m in &members {
        let journey = service.get_journey(m, "transfer").await.unwrap().unwrap();
        assert_eq!(journey.current_page_key(), Some("details"));
    }
    assert_eq!(service.store().len().await, 8);
}

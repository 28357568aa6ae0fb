use chrono::{Duration, DurationRound, Utc};
use std::sync::Arc;

use netmon_core::models::*;
use netmon_core::traits::*;
use netmon_testing_utils::{interface_requests, seed_topology, DatabaseTestContainer, RequestGroupBuilder};

fn now() -> chrono::DateTime<Utc> {
    Utc::now().duration_trunc(Duration::milliseconds(1)).unwrap()
}

#[tokio::test]
#[ignore] // 需要Docker环境
async fn test_postgres_claim_is_exclusive() {
    let db = DatabaseTestContainer::new().await.unwrap();
    let store: Arc<dyn InventoryStore> = Arc::new(db.store.clone());
    let topology = seed_topology(
        store.as_ref(),
        &["10.0.0.1"],
        RequestGroupBuilder::interfaces().build(),
        interface_requests(),
        Recurrence::every_minutes(5),
    )
    .await
    .unwrap();

    let at = now();
    let mut handles = Vec::new();
    for owner in ["a", "b", "c", "d"] {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            let lease = LeaseGrant {
                owner: owner.to_string(),
                expires_at: at + Duration::hours(1),
            };
            store
                .claim_due_crontab_entries("poller", at, Duration::zero(), &lease)
                .await
                .unwrap()
                .len()
        }));
    }

    let mut total = 0;
    for handle in handles {
        total += handle.await.unwrap();
    }
    assert_eq!(total, 1, "同一条目只能被认领一次");

    let entry = store
        .get_crontab_entry(topology.entry.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entry.lastdt, Some(at));
}

#[tokio::test]
#[ignore] // 需要Docker环境
async fn test_postgres_journal_and_reconciliation() {
    let db = DatabaseTestContainer::new().await.unwrap();
    let store = db.store.clone();
    let topology = seed_topology(
        &store,
        &["10.0.0.2"],
        RequestGroupBuilder::interfaces().build(),
        interface_requests(),
        Recurrence::every_minutes(5),
    )
    .await
    .unwrap();
    let node = &topology.nodes[0];
    let t0 = now();

    let scan = InventorySnapshot::Interfaces(vec![
        InterfaceObservation::new(1),
        InterfaceObservation::new(2),
    ]);
    let outcome = store.reconcile_inventory(node.id, &scan, true, t0).await.unwrap();
    assert_eq!(outcome.inserted, 2);

    let partial = InventorySnapshot::Interfaces(vec![InterfaceObservation::new(1)]);
    let outcome = store
        .reconcile_inventory(node.id, &partial, true, t0 + Duration::minutes(5))
        .await
        .unwrap();
    assert_eq!(outcome.retired, 1);

    let journal = store
        .open_journal(topology.task.id, Some(topology.entry.id), t0)
        .await
        .unwrap();
    store
        .append_result(&NewPollResult {
            journal_id: journal.id,
            node_id: node.id,
            request_id: topology.requests[0].id,
            element_type: Some(ElementType::Interface),
            element_index: Some("1".to_string()),
            val: Some("1".to_string()),
            cval: None,
            duration_ms: 4,
            err: None,
            dt: t0,
        })
        .await
        .unwrap();
    store.close_journal(journal.id, t0).await.unwrap();

    let results = store.list_results(journal.id).await.unwrap();
    assert_eq!(results.len(), 1);
    assert!(results[0].element_id.is_some());

    let interfaces = store.list_interfaces(node.id).await.unwrap();
    assert_eq!(interfaces.iter().filter(|r| r.is_active()).count(), 1);
}

use async_trait::async_trait;
use mockall::{mock, Sequence};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

use netmon_core::config::ExecutorConfig;
use netmon_core::models::*;
use netmon_core::traits::*;
use netmon_infrastructure::MetricsCollector;
use netmon_testing_utils::{
    interface_requests, script_interface_table, seed_topology, sqlite_memory_store,
    MockCollector, RequestBuilder, RequestGroupBuilder, Topology, INTERFACE_COLUMNS,
};
use netmon_worker::{Reconciler, TaskExecutor};

mock! {
    SnmpAgent {}

    #[async_trait]
    impl Collector for SnmpAgent {
        async fn poll(&self, node: &Node, request: &Request, timeout: Duration) -> PollOutcome;
        fn name(&self) -> &str;
    }
}

const SYS_NAME: &str = "1.3.6.1.2.1.1.5.0";
const SYS_OBJECT_ID: &str = "1.3.6.1.2.1.1.2.0";
const SYS_UPTIME: &str = "1.3.6.1.2.1.1.3.0";

fn config() -> ExecutorConfig {
    ExecutorConfig {
        max_workers: 4,
        default_timeout_ms: 1000,
        reconcile: true,
    }
}

fn executor(store: &Arc<dyn InventoryStore>, collector: Arc<dyn Collector>) -> TaskExecutor {
    TaskExecutor::new(
        store.clone(),
        collector,
        config(),
        Arc::new(MetricsCollector::new()),
    )
}

async fn resolved(store: &dyn InventoryStore, topology: &Topology) -> ResolvedRun {
    ResolvedRun {
        entry: topology.entry.clone(),
        task: topology.task.clone(),
        nodes: store.list_group_nodes(topology.node_group.id).await.unwrap(),
        request_group: topology.request_group.clone(),
        requests: store
            .list_group_requests(topology.request_group.id)
            .await
            .unwrap(),
    }
}

async fn interface_setup(addresses: &[&str]) -> (Arc<dyn InventoryStore>, Topology) {
    let store: Arc<dyn InventoryStore> = Arc::new(sqlite_memory_store().await.unwrap());
    let topology = seed_topology(
        store.as_ref(),
        addresses,
        RequestGroupBuilder::interfaces().build(),
        interface_requests(),
        Recurrence::every_minutes(5),
    )
    .await
    .unwrap();
    (store, topology)
}

async fn system_setup(group: RequestGroup) -> (Arc<dyn InventoryStore>, Topology) {
    let store: Arc<dyn InventoryStore> = Arc::new(sqlite_memory_store().await.unwrap());
    let topology = seed_topology(
        store.as_ref(),
        &["10.0.0.1"],
        group,
        vec![
            RequestBuilder::get("sysName", SYS_NAME).build(),
            RequestBuilder::get("sysObjectID", SYS_OBJECT_ID).build(),
            RequestBuilder::get("sysUpTime", SYS_UPTIME).build(),
        ],
        Recurrence::every_minutes(5),
    )
    .await
    .unwrap();
    (store, topology)
}

fn active_indexes(interfaces: &[InterfaceRecord]) -> Vec<i32> {
    let mut indexes: Vec<i32> = interfaces
        .iter()
        .filter(|record| record.is_active())
        .map(|record| record.observation.if_index)
        .collect();
    indexes.sort_unstable();
    indexes
}

#[tokio::test]
async fn test_timeout_precedence_and_request_order() {
    let (store, topology) = system_setup(RequestGroupBuilder::new("system").build()).await;
    let mut run = resolved(store.as_ref(), &topology).await;
    run.requests[0].timeout_ms = Some(250);
    run.nodes[0].timeout_ms = Some(900);

    let mut agent = MockSnmpAgent::new();
    let mut seq = Sequence::new();
    for (oid, timeout_ms) in [(SYS_NAME, 250), (SYS_OBJECT_ID, 900), (SYS_UPTIME, 900)] {
        agent
            .expect_poll()
            .withf(move |_, request, timeout| {
                request.oid == oid && *timeout == Duration::from_millis(timeout_ms)
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, request, _| {
                PollOutcome::success(
                    PollValue::Scalar(format!("value-of-{}", request.name)),
                    Duration::from_millis(3),
                )
            });
    }
    // 节点未配置超时时使用全局默认值
    agent
        .expect_poll()
        .withf(|_, _, timeout| *timeout == Duration::from_millis(1000))
        .times(3)
        .returning(|_, _, _| PollOutcome::failure("Timeout", Duration::from_millis(1000)));

    let executor = executor(&store, Arc::new(agent));
    let summary = executor.run(run.clone()).await.unwrap();
    assert_eq!(summary.work_items, 3);
    assert_eq!(summary.failed_items, 0);

    let results = store.list_results(summary.journal_id).await.unwrap();
    assert_eq!(results.len(), 3);
    assert!(results
        .iter()
        .any(|r| r.val.as_deref() == Some("value-of-sysName") && r.duration_ms == 3));

    run.requests[0].timeout_ms = None;
    run.nodes[0].timeout_ms = None;
    let summary = executor.run(run).await.unwrap();
    assert_eq!(summary.failed_items, 3);
}

#[tokio::test]
async fn test_failing_node_does_not_affect_sibling() {
    let (store, topology) = interface_setup(&["10.0.0.1", "10.0.0.2"]).await;
    let collector = MockCollector::new();
    for (_, oid) in INTERFACE_COLUMNS {
        collector.fail("10.0.0.1", oid, "Timeout");
    }
    script_interface_table(&collector, "10.0.0.2", &[1, 2]);

    let executor = executor(&store, Arc::new(collector.clone()));
    let summary = executor
        .run(resolved(store.as_ref(), &topology).await)
        .await
        .unwrap();

    assert_eq!(summary.nodes, 2);
    assert_eq!(summary.work_items, 20);
    assert_eq!(summary.failed_items, 10);
    // 失败节点每个请求一条错误行，成功节点每个接口一行
    assert_eq!(summary.results_written, 10 + 20);

    let journal = store.get_journal(summary.journal_id).await.unwrap().unwrap();
    assert!(!journal.is_open());

    let (down, up) = (&topology.nodes[0], &topology.nodes[1]);
    let results = store.list_results(summary.journal_id).await.unwrap();
    let down_rows: Vec<_> = results.iter().filter(|r| r.node_id == down.id).collect();
    assert_eq!(down_rows.len(), 10);
    assert!(down_rows.iter().all(|r| r.err.as_deref() == Some("Timeout")));

    assert!(store.list_interfaces(down.id).await.unwrap().is_empty());
    assert_eq!(active_indexes(&store.list_interfaces(up.id).await.unwrap()), vec![1, 2]);
    assert_eq!(summary.reconciled.len(), 1);
    assert_eq!(summary.reconciled[0].0, up.id);
    assert_eq!(summary.reconciled[0].1.inserted, 2);

    let down = store.get_node(down.id).await.unwrap().unwrap();
    let up = store.get_node(up.id).await.unwrap().unwrap();
    assert!(down.snmp_last_dt.is_none());
    assert!(up.snmp_last_dt.is_some());
}

#[tokio::test]
async fn test_slow_request_times_out_without_stalling_run() {
    let (store, topology) = system_setup(RequestGroupBuilder::new("system").build()).await;
    let collector = MockCollector::new();
    collector
        .respond_get("10.0.0.1", SYS_NAME, "core-sw1")
        .delay("10.0.0.1", SYS_NAME, Duration::from_secs(5))
        .respond_get("10.0.0.1", SYS_UPTIME, "12345");

    let mut run = resolved(store.as_ref(), &topology).await;
    run.nodes[0].timeout_ms = Some(50);

    let started = Instant::now();
    let summary = executor(&store, Arc::new(collector.clone()))
        .run(run)
        .await
        .unwrap();
    assert!(started.elapsed() < Duration::from_secs(2));

    let results = store.list_results(summary.journal_id).await.unwrap();
    let by_request = |request: &Request| {
        results
            .iter()
            .find(|r| r.request_id == request.id)
            .cloned()
            .unwrap()
    };
    assert_eq!(by_request(&topology.requests[0]).err.as_deref(), Some("Timeout"));
    assert!(by_request(&topology.requests[1]).err.is_some());
    assert_eq!(by_request(&topology.requests[2]).val.as_deref(), Some("12345"));
    assert_eq!(collector.call_count(), 3);
}

#[tokio::test]
async fn test_walk_rows_shape_values_and_link_elements() {
    let store: Arc<dyn InventoryStore> = Arc::new(sqlite_memory_store().await.unwrap());
    let topology = seed_topology(
        store.as_ref(),
        &["10.0.0.1"],
        RequestGroupBuilder::interfaces().build(),
        vec![
            RequestBuilder::walk("ifDescr", "1.3.6.1.2.1.2.2.1.2").build(),
            RequestBuilder::walk("ifSpeed", "1.3.6.1.2.1.2.2.1.5")
                .with_postfix(" bps")
                .build(),
        ],
        Recurrence::every_minutes(5),
    )
    .await
    .unwrap();

    let collector = MockCollector::new();
    collector
        .respond_walk(
            "10.0.0.1",
            "1.3.6.1.2.1.2.2.1.2",
            vec![
                VarBind::new("1.3.6.1.2.1.2.2.1.2.1", "lo"),
                VarBind::new("1.3.6.1.2.1.2.2.1.2.3", "eth0"),
            ],
        )
        .respond_walk(
            "10.0.0.1",
            "1.3.6.1.2.1.2.2.1.5",
            vec![
                VarBind::new("1.3.6.1.2.1.2.2.1.5.1", "10000000"),
                VarBind::new("1.3.6.1.2.1.2.2.1.5.3", "1000000000"),
            ],
        );

    let executor = executor(&store, Arc::new(collector));
    let first = executor
        .run(resolved(store.as_ref(), &topology).await)
        .await
        .unwrap();
    let rows = store.list_results(first.journal_id).await.unwrap();
    assert_eq!(rows.len(), 4);
    let speed = rows
        .iter()
        .find(|r| r.element_index.as_deref() == Some("3") && r.request_id == topology.requests[1].id)
        .unwrap();
    assert_eq!(speed.val.as_deref(), Some("1000000000"));
    assert_eq!(speed.cval.as_deref(), Some("1000000000 bps"));

    // 第一次运行后对账才建立元素，第二次运行的结果行能关联到元素
    let elements = store.list_elements(topology.nodes[0].id).await.unwrap();
    assert_eq!(elements.len(), 2);
    let second = executor
        .run(resolved(store.as_ref(), &topology).await)
        .await
        .unwrap();
    let rows = store.list_results(second.journal_id).await.unwrap();
    assert!(rows.iter().all(|r| r.element_id.is_some()));
}

#[tokio::test]
async fn test_empty_walk_is_recorded_as_error() {
    let (store, topology) = interface_setup(&["10.0.0.1"]).await;
    let collector = MockCollector::new();
    script_interface_table(&collector, "10.0.0.1", &[1]);
    collector.respond_walk("10.0.0.1", INTERFACE_COLUMNS[9].1, Vec::new());

    let summary = executor(&store, Arc::new(collector))
        .run(resolved(store.as_ref(), &topology).await)
        .await
        .unwrap();

    assert_eq!(summary.failed_items, 1);
    let results = store.list_results(summary.journal_id).await.unwrap();
    assert!(results
        .iter()
        .any(|r| r.err.as_deref() == Some("walk returned no data")));
}

#[tokio::test]
async fn test_partial_scan_never_retires_interfaces() {
    let (store, topology) = interface_setup(&["10.0.0.1"]).await;
    let node_id = topology.nodes[0].id;
    let collector = MockCollector::new();
    let executor = executor(&store, Arc::new(collector.clone()));

    script_interface_table(&collector, "10.0.0.1", &[1, 2, 3]);
    executor
        .run(resolved(store.as_ref(), &topology).await)
        .await
        .unwrap();
    assert_eq!(active_indexes(&store.list_interfaces(node_id).await.unwrap()), vec![1, 2, 3]);

    // 一列失败：扫描不完整，接口3不在结果里但不能退役
    script_interface_table(&collector, "10.0.0.1", &[1, 2]);
    collector.fail("10.0.0.1", INTERFACE_COLUMNS[4].1, "Timeout");
    let summary = executor
        .run(resolved(store.as_ref(), &topology).await)
        .await
        .unwrap();
    assert_eq!(summary.reconciled[0].1.retired, 0);
    assert_eq!(active_indexes(&store.list_interfaces(node_id).await.unwrap()), vec![1, 2, 3]);

    script_interface_table(&collector, "10.0.0.1", &[1, 2]);
    let summary = executor
        .run(resolved(store.as_ref(), &topology).await)
        .await
        .unwrap();
    assert_eq!(summary.reconciled[0].1.retired, 1);
    assert_eq!(active_indexes(&store.list_interfaces(node_id).await.unwrap()), vec![1, 2]);

    let elements = store.list_elements(node_id).await.unwrap();
    let retired = elements.iter().find(|e| e.idx == "3").unwrap();
    assert!(retired.deleted);
}

#[tokio::test]
async fn test_empty_optional_column_still_completes_scan() {
    let (store, topology) = interface_setup(&["10.0.0.1"]).await;
    let node_id = topology.nodes[0].id;
    let collector = MockCollector::new();
    let executor = executor(&store, Arc::new(collector.clone()));

    script_interface_table(&collector, "10.0.0.1", &[1, 2, 3]);
    executor
        .run(resolved(store.as_ref(), &topology).await)
        .await
        .unwrap();

    // 设备不支持 ifName：该列为空表，但其余列完整，接口3照常退役
    script_interface_table(&collector, "10.0.0.1", &[1, 2]);
    collector.respond_walk("10.0.0.1", INTERFACE_COLUMNS[9].1, Vec::new());
    let summary = executor
        .run(resolved(store.as_ref(), &topology).await)
        .await
        .unwrap();

    assert_eq!(summary.failed_items, 1);
    assert_eq!(summary.reconciled[0].1.retired, 1);
    assert_eq!(active_indexes(&store.list_interfaces(node_id).await.unwrap()), vec![1, 2]);
}

#[tokio::test]
async fn test_outcomes_are_streamed_per_work_item() {
    let (store, topology) = interface_setup(&["10.0.0.1", "10.0.0.2"]).await;
    let collector = MockCollector::new();
    script_interface_table(&collector, "10.0.0.1", &[1]);
    script_interface_table(&collector, "10.0.0.2", &[1, 2]);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let executor = executor(&store, Arc::new(collector)).with_outcome_sink(tx);
    let summary = executor
        .run(resolved(store.as_ref(), &topology).await)
        .await
        .unwrap();
    drop(executor);

    let mut outcomes = Vec::new();
    while let Some(outcome) = rx.recv().await {
        outcomes.push(outcome);
    }
    assert_eq!(outcomes.len(), 20);
    assert!(outcomes.iter().all(|o| o.journal_id == summary.journal_id && o.is_success()));
    let rows: usize = outcomes.iter().map(|o| o.rows_written).sum();
    assert_eq!(rows, summary.results_written);
}

#[tokio::test]
async fn test_reconcile_can_be_disabled() {
    let (store, topology) = interface_setup(&["10.0.0.1"]).await;
    let collector = MockCollector::new();
    script_interface_table(&collector, "10.0.0.1", &[1, 2]);

    let executor = TaskExecutor::new(
        store.clone(),
        Arc::new(collector),
        ExecutorConfig {
            reconcile: false,
            ..config()
        },
        Arc::new(MetricsCollector::new()),
    );
    let summary = executor
        .run(resolved(store.as_ref(), &topology).await)
        .await
        .unwrap();

    assert!(summary.reconciled.is_empty());
    assert_eq!(summary.results_written, 20);
    assert!(store.list_interfaces(topology.nodes[0].id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_health_group_updates_node_identity() {
    let group = RequestGroupBuilder::new("system")
        .with_handler(HandlerKind::Health)
        .build();
    let (store, topology) = system_setup(group).await;
    let collector = MockCollector::new();
    collector
        .respond_get("10.0.0.1", SYS_NAME, "core-sw1")
        .respond_get("10.0.0.1", SYS_OBJECT_ID, ".1.3.6.1.4.1.9.1.1208")
        .respond_get("10.0.0.1", SYS_UPTIME, "8640000");

    let summary = executor(&store, Arc::new(collector))
        .run(resolved(store.as_ref(), &topology).await)
        .await
        .unwrap();
    assert!(summary.reconciled.is_empty());

    let node = store.get_node(topology.nodes[0].id).await.unwrap().unwrap();
    assert_eq!(node.sys_name.as_deref(), Some("core-sw1"));
    assert_eq!(node.sys_object_id.as_deref(), Some("1.3.6.1.4.1.9.1.1208"));
    assert!(node.snmp_last_dt.is_some());
}

#[tokio::test]
async fn test_concurrent_reconciliations_of_one_node_serialize() {
    let (store, topology) = interface_setup(&["10.0.0.1"]).await;
    let node_id = topology.nodes[0].id;
    let reconciler = Arc::new(Reconciler::new(
        store.clone(),
        Arc::new(MetricsCollector::new()),
    ));

    let snapshot = |indexes: &[i32]| {
        InventorySnapshot::Interfaces(
            indexes
                .iter()
                .map(|index| InterfaceObservation::new(*index))
                .collect(),
        )
    };
    let (a, b) = (snapshot(&[1, 2]), snapshot(&[2, 3]));
    let now = chrono::Utc::now();

    let (first, second) = tokio::join!(
        reconciler.reconcile(node_id, &a, true, now),
        reconciler.reconcile(node_id, &b, true, now),
    );
    let (first, second) = (first.unwrap(), second.unwrap());

    // 无论先后顺序，总计插入3条并退役1条
    assert_eq!(first.inserted + second.inserted, 3);
    assert_eq!(first.retired + second.retired, 1);
    assert_eq!(active_indexes(&store.list_interfaces(node_id).await.unwrap()).len(), 2);
}

#[tokio::test]
async fn test_reconciliations_of_different_nodes_proceed_independently() {
    let (store, topology) = interface_setup(&["10.0.0.1", "10.0.0.2"]).await;
    let reconciler = Reconciler::new(store.clone(), Arc::new(MetricsCollector::new()));
    let snapshot = InventorySnapshot::Interfaces(vec![InterfaceObservation::new(1)]);
    let now = chrono::Utc::now();

    let (a, b) = tokio::join!(
        reconciler.reconcile(topology.nodes[0].id, &snapshot, true, now),
        reconciler.reconcile(topology.nodes[1].id, &snapshot, true, now),
    );

    assert_eq!(a.unwrap().inserted, 1);
    assert_eq!(b.unwrap().inserted, 1);
}

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::debug;

use netmon_core::models::{InventorySnapshot, NodeScan, ReconcileOutcome, RequestGroup};
use netmon_core::traits::InventoryStore;
use netmon_core::MonitorResult;
use netmon_domain::{interpret, Interpretation};
use netmon_infrastructure::{MetricsCollector, StructuredLogger};

/// 清单对账器
///
/// 同一节点的对账在进程内串行执行，跨进程的互斥由存储层的节点行锁保证。
pub struct Reconciler {
    store: Arc<dyn InventoryStore>,
    metrics: Arc<MetricsCollector>,
    node_locks: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl Reconciler {
    pub fn new(store: Arc<dyn InventoryStore>, metrics: Arc<MetricsCollector>) -> Self {
        Self {
            store,
            metrics,
            node_locks: Mutex::new(HashMap::new()),
        }
    }

    async fn node_lock(&self, node_id: i64) -> Arc<Mutex<()>> {
        let mut locks = self.node_locks.lock().await;
        locks.entry(node_id).or_default().clone()
    }

    /// 没有其他持有者或等待者时移除节点锁
    async fn release_node_lock(&self, node_id: i64, lock: Arc<Mutex<()>>) {
        drop(lock);
        let mut locks = self.node_locks.lock().await;
        if locks.get(&node_id).is_some_and(|l| Arc::strong_count(l) == 1) {
            locks.remove(&node_id);
        }
    }

    /// 解释一个节点的扫描结果并落地
    ///
    /// 清单类结果执行对账，返回对账结果；健康类结果更新节点字段；
    /// 其余处理器只保留原始结果，返回 `None`。
    pub async fn process_scan(
        &self,
        group: &RequestGroup,
        scan: &NodeScan,
        now: DateTime<Utc>,
    ) -> MonitorResult<Option<ReconcileOutcome>> {
        if !scan.any_succeeded() {
            debug!("节点 {} 没有成功的请求，跳过对账", scan.node.id);
            return Ok(None);
        }

        match interpret(group, scan) {
            Interpretation::Inventory(snapshot) => {
                let complete = group.full_walk && scan.is_complete_enumeration();
                let outcome = self.reconcile(scan.node.id, &snapshot, complete, now).await?;
                Ok(Some(outcome))
            }
            Interpretation::Health(health) => {
                if !health.is_empty() {
                    self.store.update_node_health(scan.node.id, &health, now).await?;
                }
                Ok(None)
            }
            Interpretation::Raw => Ok(None),
        }
    }

    /// 把一份观测快照应用到节点清单
    ///
    /// `complete` 为 false 时不会退役任何记录。
    pub async fn reconcile(
        &self,
        node_id: i64,
        snapshot: &InventorySnapshot,
        complete: bool,
        now: DateTime<Utc>,
    ) -> MonitorResult<ReconcileOutcome> {
        let lock = self.node_lock(node_id).await;
        let result = {
            let _guard = lock.lock().await;
            self.store
                .reconcile_inventory(node_id, snapshot, complete, now)
                .await
        };
        self.release_node_lock(node_id, lock).await;
        let outcome = result?;

        StructuredLogger::log_reconciliation(node_id, snapshot.class(), complete, &outcome);
        self.metrics.record_reconciliation(&outcome);
        Ok(outcome)
    }
}

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, DurationRound, Utc};
use futures::stream::{self, StreamExt};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use netmon_core::config::ExecutorConfig;
use netmon_core::models::{
    GroupRequest, NewPollResult, Node, NodeScan, PollOutcome, PollValue, ReconcileOutcome, Request,
    RequestGroup, ResolvedRun, RunSummary, ScanItem, WorkItemOutcome,
};
use netmon_core::traits::{Collector, InventoryStore, TaskRunner};
use netmon_core::{MonitorError, MonitorResult};
use netmon_domain::value_objects::oid_suffix;
use netmon_infrastructure::{MetricsCollector, StructuredLogger};

use crate::reconciler::Reconciler;

fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    now.duration_trunc(chrono::Duration::milliseconds(1))
        .unwrap_or(now)
}

fn duration_ms(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}

/// 单个节点的扫描结果及写入统计
struct NodeReport {
    scan: NodeScan,
    results_written: usize,
    failed_items: usize,
}

/// 任务执行器
///
/// 每次运行先打开运行日志，再按节点并发采集（全局并发受 `max_workers` 限制），
/// 同一节点的请求按组内顺序依次执行。单个请求失败只产生一条错误结果，
/// 不影响同节点的其它请求或其它节点；结果写入失败则中止整次运行，运行日志保持打开。
#[derive(Clone)]
pub struct TaskExecutor {
    store: Arc<dyn InventoryStore>,
    collector: Arc<dyn Collector>,
    reconciler: Arc<Reconciler>,
    config: ExecutorConfig,
    permits: Arc<Semaphore>,
    metrics: Arc<MetricsCollector>,
    outcome_tx: Option<mpsc::UnboundedSender<WorkItemOutcome>>,
}

impl TaskExecutor {
    pub fn new(
        store: Arc<dyn InventoryStore>,
        collector: Arc<dyn Collector>,
        config: ExecutorConfig,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        let reconciler = Arc::new(Reconciler::new(store.clone(), metrics.clone()));
        Self::with_reconciler(store, collector, config, metrics, reconciler)
    }

    /// 多个执行器共享同一个对账器时使用
    pub fn with_reconciler(
        store: Arc<dyn InventoryStore>,
        collector: Arc<dyn Collector>,
        config: ExecutorConfig,
        metrics: Arc<MetricsCollector>,
        reconciler: Arc<Reconciler>,
    ) -> Self {
        let permits = Arc::new(Semaphore::new(config.max_workers.max(1)));
        Self {
            store,
            collector,
            reconciler,
            config,
            permits,
            metrics,
            outcome_tx: None,
        }
    }

    /// 每个工作项完成后把结果推送到该通道
    pub fn with_outcome_sink(mut self, tx: mpsc::UnboundedSender<WorkItemOutcome>) -> Self {
        self.outcome_tx = Some(tx);
        self
    }

    pub fn reconciler(&self) -> Arc<Reconciler> {
        self.reconciler.clone()
    }

    /// 组内引用的超时优先，其次节点超时，最后是全局默认值
    fn effective_timeout(&self, member: &GroupRequest, node: &Node) -> Duration {
        let ms = member
            .timeout_ms
            .filter(|ms| *ms > 0)
            .or(node.timeout_ms.filter(|ms| *ms > 0))
            .map(|ms| ms as u64)
            .unwrap_or(self.config.default_timeout_ms);
        Duration::from_millis(ms)
    }

    async fn poll(&self, node: &Node, request: &Request, timeout: Duration) -> PollOutcome {
        let started = Instant::now();
        let outcome =
            match tokio::time::timeout(timeout, self.collector.poll(node, request, timeout)).await
            {
                Ok(outcome) => outcome,
                Err(_) => PollOutcome::failure("Timeout", started.elapsed()),
            };

        let empty_walk = outcome.error.is_none()
            && matches!(&outcome.value, Some(PollValue::Table(rows)) if rows.is_empty());
        if empty_walk {
            return PollOutcome::empty_walk(outcome.duration);
        }
        outcome
    }

    async fn scan_node(
        &self,
        journal_id: i64,
        node: Node,
        group: &RequestGroup,
        requests: &[GroupRequest],
    ) -> MonitorResult<NodeReport> {
        let _permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| MonitorError::Internal(format!("执行器已关闭: {e}")))?;

        let mut items = Vec::with_capacity(requests.len());
        let mut results_written = 0;
        let mut failed_items = 0;

        for member in requests {
            let request = &member.request;
            let timeout = self.effective_timeout(member, &node);
            let outcome = self.poll(&node, request, timeout).await;

            let rows = result_rows(journal_id, &node, request, group, &outcome, now_millis());
            for row in &rows {
                self.store.append_result(row).await?;
            }
            results_written += rows.len();

            self.metrics
                .record_poll(outcome.is_success(), outcome.duration.as_secs_f64());
            if let Some(err) = &outcome.error {
                failed_items += 1;
                StructuredLogger::log_poll_failure(
                    node.id,
                    &node.ip_address,
                    request.id,
                    &request.oid,
                    err,
                );
            }

            if let Some(tx) = &self.outcome_tx {
                // 接收端已关闭时忽略
                let _ = tx.send(WorkItemOutcome {
                    journal_id,
                    node_id: node.id,
                    request_id: request.id,
                    error: outcome.error.clone(),
                    duration: outcome.duration,
                    rows_written: rows.len(),
                });
            }

            items.push(ScanItem {
                request: request.clone(),
                outcome,
            });
        }

        let scan = NodeScan { node, items };
        if scan.any_succeeded() {
            self.store.touch_node_contact(scan.node.id, now_millis()).await?;
        }

        Ok(NodeReport {
            scan,
            results_written,
            failed_items,
        })
    }

    async fn execute(&self, run: &ResolvedRun, journal_id: i64) -> MonitorResult<RunSummary> {
        let group = Arc::new(run.request_group.clone());
        let requests: Arc<[GroupRequest]> = run.requests.clone().into();

        let mut set = JoinSet::new();
        for node in run.nodes.iter().cloned() {
            let this = self.clone();
            let group = group.clone();
            let requests = requests.clone();
            set.spawn(async move { this.scan_node(journal_id, node, &group, &requests).await });
        }

        let mut reports = Vec::with_capacity(run.nodes.len());
        while let Some(joined) = set.join_next().await {
            let report = match joined {
                Ok(report) => report,
                Err(e) => Err(MonitorError::Internal(format!("节点扫描任务异常退出: {e}"))),
            };
            match report {
                Ok(report) => reports.push(report),
                Err(e) => {
                    set.abort_all();
                    return Err(e);
                }
            }
        }

        self.store.close_journal(journal_id, now_millis()).await?;

        let mut summary = RunSummary {
            journal_id,
            nodes: reports.len(),
            work_items: run.work_items(),
            ..Default::default()
        };
        for report in &reports {
            summary.failed_items += report.failed_items;
            summary.results_written += report.results_written;
        }

        if self.config.reconcile {
            summary.reconciled = self.reconcile_all(&group, reports).await;
        }

        Ok(summary)
    }

    /// 运行日志关闭后逐节点解释结果；单个节点对账失败只记日志
    async fn reconcile_all(
        &self,
        group: &RequestGroup,
        reports: Vec<NodeReport>,
    ) -> Vec<(i64, ReconcileOutcome)> {
        let now = now_millis();
        let mut reconciled: Vec<_> = stream::iter(reports)
            .map(|report| async move {
                let node_id = report.scan.node.id;
                match self.reconciler.process_scan(group, &report.scan, now).await {
                    Ok(outcome) => outcome.map(|outcome| (node_id, outcome)),
                    Err(e) => {
                        warn!("节点 {} 清单对账失败: {}", node_id, e);
                        None
                    }
                }
            })
            .buffer_unordered(self.config.max_workers.max(1))
            .filter_map(|entry| async move { entry })
            .collect()
            .await;
        reconciled.sort_by_key(|(node_id, _)| *node_id);
        reconciled
    }
}

#[async_trait]
impl TaskRunner for TaskExecutor {
    async fn run(&self, run: ResolvedRun) -> MonitorResult<RunSummary> {
        let started = Instant::now();
        let journal = self
            .store
            .open_journal(run.task.id, Some(run.entry.id), now_millis())
            .await?;

        StructuredLogger::log_run_start(journal.id, run.task.id, run.nodes.len(), run.requests.len());
        debug!(
            "运行 {} 使用请求组 {} ({})",
            journal.id, run.request_group.id, run.request_group.name
        );

        match self.execute(&run, journal.id).await {
            Ok(summary) => {
                StructuredLogger::log_run_complete(
                    journal.id,
                    run.task.id,
                    summary.work_items,
                    summary.failed_items,
                    started.elapsed().as_millis() as u64,
                );
                Ok(summary)
            }
            Err(e) => {
                error!("运行 {} 中止: {}", journal.id, e);
                StructuredLogger::log_run_failed(run.task.id, Some(journal.id), &e.to_string());
                Err(e)
            }
        }
    }
}

/// 一次请求产生的结果行：表遍历每行一条，标量一条，失败一条错误行
fn result_rows(
    journal_id: i64,
    node: &Node,
    request: &Request,
    group: &RequestGroup,
    outcome: &PollOutcome,
    dt: DateTime<Utc>,
) -> Vec<NewPollResult> {
    let base = NewPollResult {
        journal_id,
        node_id: node.id,
        request_id: request.id,
        element_type: None,
        element_index: None,
        val: None,
        cval: None,
        duration_ms: duration_ms(outcome.duration),
        err: None,
        dt,
    };

    if let Some(err) = &outcome.error {
        return vec![NewPollResult {
            err: Some(err.clone()),
            ..base
        }];
    }

    match &outcome.value {
        Some(PollValue::Scalar(value)) => vec![NewPollResult {
            val: Some(value.clone()),
            cval: request.shape_value(value),
            ..base
        }],
        Some(PollValue::Table(rows)) => {
            let element_type = Some(group.element_type).filter(|t| t.is_inventory());
            rows.iter()
                .map(|vb| NewPollResult {
                    element_type,
                    element_index: oid_suffix(&request.oid, &vb.oid).map(str::to_string),
                    val: Some(vb.value.clone()),
                    cval: request.shape_value(&vb.value),
                    ..base.clone()
                })
                .collect()
        }
        None => vec![NewPollResult {
            err: Some("采集器未返回数据".to_string()),
            ..base
        }],
    }
}

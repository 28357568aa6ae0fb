use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, DurationRound, Utc};
use futures::future::join_all;
use rand::Rng;
use tokio::sync::broadcast;
use tokio::task::JoinSet;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use netmon_core::config::SchedulerConfig;
use netmon_core::models::{ClaimedEntry, LeaseGrant, RunSummary};
use netmon_core::traits::{InventoryStore, TaskRunner};
use netmon_core::MonitorResult;
use netmon_infrastructure::{MetricsCollector, StructuredLogger};

use crate::lease::LeaseKeeper;
use crate::resolve::resolve_run;

/// 一次运行的最终结果
#[derive(Debug, Clone, PartialEq)]
pub enum RunReport {
    Completed { crontab_id: i64, summary: RunSummary },
    /// 解析失败：已记录日志，`lastdt` 已推进，租约已释放
    Unresolved { crontab_id: i64, reason: String },
    /// 持久化失败：租约保留到过期，由后续认领回收
    Failed { crontab_id: i64, error: String },
}

/// 毫秒精度的当前时间，两种数据库都能无损保存
fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    now.duration_trunc(chrono::Duration::milliseconds(1))
        .unwrap_or(now)
}

/// 周期性轮询调度器
///
/// 每个tick认领本执行器可运行的到期条目，并发地解析、执行它们。
/// 多个实例可以共享同一个存储，认领步骤保证同一条目同一时刻只有一个运行。
#[derive(Clone)]
pub struct PollScheduler {
    store: Arc<dyn InventoryStore>,
    runner: Arc<dyn TaskRunner>,
    config: SchedulerConfig,
    owner: String,
    metrics: Arc<MetricsCollector>,
}

impl PollScheduler {
    pub fn new(
        store: Arc<dyn InventoryStore>,
        runner: Arc<dyn TaskRunner>,
        config: SchedulerConfig,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        let owner = format!("{}:{}", config.agent, Uuid::new_v4());
        Self {
            store,
            runner,
            config,
            owner,
            metrics,
        }
    }

    /// 本实例写入租约时使用的持有者标识
    pub fn owner(&self) -> &str {
        &self.owner
    }

    fn lease_grant(&self, now: DateTime<Utc>) -> LeaseGrant {
        let lease = i64::try_from(self.config.run_lease_seconds).unwrap_or(i64::MAX / 1000);
        LeaseGrant {
            owner: self.owner.clone(),
            expires_at: now + chrono::Duration::seconds(lease),
        }
    }

    /// 半个tick：比下一次tick更接近到期时刻的条目在本次认领
    fn due_tolerance(&self) -> chrono::Duration {
        let tick_ms = self.config.tick_interval_seconds.saturating_mul(1000);
        chrono::Duration::milliseconds(i64::try_from(tick_ms / 2).unwrap_or(i64::MAX / 2))
    }

    /// 认领 `now` 时刻到期的条目
    pub async fn claim_due(&self, now: DateTime<Utc>) -> MonitorResult<Vec<ClaimedEntry>> {
        let claimed = self
            .store
            .claim_due_crontab_entries(
                &self.config.agent,
                now,
                self.due_tolerance(),
                &self.lease_grant(now),
            )
            .await?;
        self.metrics.record_claims(claimed.len());
        Ok(claimed)
    }

    /// 解析并执行一个已认领的条目，结束后处理租约
    pub async fn dispatch(&self, claimed: ClaimedEntry) -> RunReport {
        let crontab_id = claimed.entry.id;
        let task_id = claimed.task.id;

        if let Some(journal_id) = claimed.abandoned_journal {
            StructuredLogger::log_journal_abandoned(crontab_id, journal_id);
        }
        StructuredLogger::log_crontab_claimed(
            crontab_id,
            task_id,
            &self.config.agent,
            claimed.entry.lastdt,
        );

        let run = match resolve_run(self.store.as_ref(), &claimed).await {
            Ok(run) => run,
            Err(e) if e.is_resolution() => {
                let reason = e.to_string();
                StructuredLogger::log_resolve_failure(crontab_id, task_id, &reason);
                self.metrics.record_unresolved();
                self.release(crontab_id).await;
                return RunReport::Unresolved { crontab_id, reason };
            }
            Err(e) => {
                StructuredLogger::log_run_failed(task_id, None, &e.to_string());
                self.metrics.record_run(false);
                return RunReport::Failed {
                    crontab_id,
                    error: e.to_string(),
                };
            }
        };

        let keeper = LeaseKeeper::spawn(
            self.store.clone(),
            crontab_id,
            self.owner.clone(),
            Duration::from_secs(self.config.run_lease_seconds),
            Duration::from_secs(self.config.heartbeat_interval_seconds),
        );
        let result = self.runner.run(run).await;
        keeper.stop().await;

        match result {
            Ok(summary) => {
                self.metrics.record_run(true);
                self.release(crontab_id).await;
                RunReport::Completed {
                    crontab_id,
                    summary,
                }
            }
            Err(e) => {
                // 日志保持打开，租约过期后由下一次认领标记为放弃
                StructuredLogger::log_run_failed(task_id, None, &e.to_string());
                self.metrics.record_run(false);
                RunReport::Failed {
                    crontab_id,
                    error: e.to_string(),
                }
            }
        }
    }

    async fn release(&self, crontab_id: i64) {
        match self.store.release_lease(crontab_id, &self.owner).await {
            Ok(true) => {}
            Ok(false) => StructuredLogger::log_lease_lost(crontab_id, &self.owner),
            Err(e) => warn!(crontab_id, error = %e, "释放租约失败，等待租约过期"),
        }
    }

    /// 认领到期条目并放入 `in_flight` 执行，返回本次认领数量
    pub async fn tick(&self, in_flight: &mut JoinSet<RunReport>) -> MonitorResult<usize> {
        let started = Instant::now();
        let claimed = self.claim_due(now_millis()).await?;
        let count = claimed.len();

        for entry in claimed {
            let scheduler = self.clone();
            in_flight.spawn(async move { scheduler.dispatch(entry).await });
        }

        self.metrics.record_tick(started.elapsed().as_secs_f64());
        if count > 0 {
            debug!(claimed = count, in_flight = in_flight.len(), "本轮调度完成");
        }
        Ok(count)
    }

    /// 忽略调度周期运行所有可认领的条目一次，等待全部完成
    pub async fn run_once(&self) -> MonitorResult<Vec<RunReport>> {
        let now = now_millis();
        let claimed = self
            .store
            .claim_all_crontab_entries(&self.config.agent, now, &self.lease_grant(now))
            .await?;
        self.metrics.record_claims(claimed.len());
        info!(claimed = claimed.len(), agent = %self.config.agent, "单次运行模式");

        Ok(join_all(claimed.into_iter().map(|entry| self.dispatch(entry))).await)
    }

    /// 主循环：按固定间隔调度，收到关闭信号后等待进行中的运行结束
    pub async fn run(&self, mut shutdown_rx: broadcast::Receiver<()>) -> MonitorResult<()> {
        if self.config.startup_jitter_ms > 0 {
            let jitter = rand::rng().random_range(0..=self.config.startup_jitter_ms);
            debug!(jitter_ms = jitter, "启动前随机等待");
            tokio::select! {
                _ = shutdown_rx.recv() => return Ok(()),
                _ = tokio::time::sleep(Duration::from_millis(jitter)) => {}
            }
        }

        info!(
            agent = %self.config.agent,
            owner = %self.owner,
            tick_interval_seconds = self.config.tick_interval_seconds,
            "调度器已启动"
        );

        let mut ticker = interval(Duration::from_secs(self.config.tick_interval_seconds));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut in_flight = JoinSet::new();

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("调度器收到关闭信号");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.tick(&mut in_flight).await {
                        error!(error = %e, "认领计划条目失败");
                    }
                }
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    log_report(joined);
                }
            }
            self.metrics.set_runs_in_flight(in_flight.len());
        }

        if !in_flight.is_empty() {
            info!(in_flight = in_flight.len(), "等待进行中的运行结束");
        }
        while let Some(joined) = in_flight.join_next().await {
            log_report(joined);
        }
        self.metrics.set_runs_in_flight(0);
        info!("调度器已停止");
        Ok(())
    }
}

fn log_report(joined: Result<RunReport, tokio::task::JoinError>) {
    match joined {
        Ok(RunReport::Completed { crontab_id, summary }) => debug!(
            crontab_id,
            journal_id = summary.journal_id,
            failed_items = summary.failed_items,
            "运行结束"
        ),
        Ok(RunReport::Unresolved { crontab_id, .. }) => {
            debug!(crontab_id, "运行未能解析")
        }
        Ok(RunReport::Failed { crontab_id, error }) => {
            warn!(crontab_id, error = %error, "运行失败")
        }
        Err(e) => error!(error = %e, "运行任务异常退出"),
    }
}

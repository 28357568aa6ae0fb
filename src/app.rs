use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::broadcast;
use tracing::{info, warn};

use netmon_core::config::AppConfig;
use netmon_core::traits::{Collector, InventoryStore};
use netmon_dispatcher::{PollScheduler, RunReport};
use netmon_infrastructure::{
    install_prometheus_exporter, DatabaseManager, MetricsCollector, NetSnmpCollector,
};
use netmon_worker::TaskExecutor;

/// 应用运行模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// 按固定间隔持续调度
    Scheduler,
    /// 忽略调度周期，把所有可认领条目运行一次后退出
    Once,
}

/// 主应用程序
pub struct Application {
    config: AppConfig,
    mode: AppMode,
    database: DatabaseManager,
    scheduler: PollScheduler,
}

impl Application {
    /// 使用 net-snmp 命令行采集器创建应用
    pub async fn new(config: AppConfig, mode: AppMode) -> Result<Self> {
        let collector = Arc::new(NetSnmpCollector::new(config.collector.clone()));
        Self::with_collector(config, mode, collector).await
    }

    pub async fn with_collector(
        config: AppConfig,
        mode: AppMode,
        collector: Arc<dyn Collector>,
    ) -> Result<Self> {
        info!("初始化应用程序，模式: {:?}", mode);

        let database = DatabaseManager::connect(&config.database)
            .await
            .context("连接数据库失败")?;
        let store = database.store();

        // 指标句柄在创建时绑定记录器，导出器必须先安装
        if config.observability.metrics_enabled {
            install_prometheus_exporter(&config.observability.metrics_bind_address)?;
            info!(
                "Prometheus指标已在 {} 暴露",
                config.observability.metrics_bind_address
            );
        }
        let metrics = Arc::new(MetricsCollector::new());
        let executor = TaskExecutor::new(
            store.clone(),
            collector,
            config.executor.clone(),
            metrics.clone(),
        );
        let scheduler = PollScheduler::new(
            store,
            Arc::new(executor),
            config.scheduler.clone(),
            metrics,
        );

        Ok(Self {
            config,
            mode,
            database,
            scheduler,
        })
    }

    pub fn store(&self) -> Arc<dyn InventoryStore> {
        self.database.store()
    }

    /// 运行应用程序，直到收到关闭信号（单次模式下运行完即返回）
    pub async fn run(&self, shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
        self.database
            .health_check()
            .await
            .context("数据库健康检查失败")?;

        match self.mode {
            AppMode::Scheduler => self
                .scheduler
                .run(shutdown_rx)
                .await
                .context("调度器运行失败")?,
            AppMode::Once => {
                let reports = self.run_once().await?;
                info!("单次运行完成，共 {} 个条目", reports.len());
            }
        }

        self.database.close().await;
        Ok(())
    }

    /// 运行所有可认领条目一次并返回各条目的结果
    pub async fn run_once(&self) -> Result<Vec<RunReport>> {
        let reports = self
            .scheduler
            .run_once()
            .await
            .context("认领计划条目失败")?;

        for report in &reports {
            match report {
                RunReport::Completed { crontab_id, summary } => info!(
                    "条目 {} 完成: 运行日志 {}, {} 个工作项, {} 个失败",
                    crontab_id, summary.journal_id, summary.work_items, summary.failed_items
                ),
                RunReport::Unresolved { crontab_id, reason } => {
                    warn!("条目 {} 无法解析: {}", crontab_id, reason)
                }
                RunReport::Failed { crontab_id, error } => {
                    warn!("条目 {} 运行失败: {}", crontab_id, error)
                }
            }
        }

        Ok(reports)
    }
}

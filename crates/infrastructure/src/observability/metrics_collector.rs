//! Metrics for the polling scheduler

use anyhow::{Context, Result};
use metrics::{counter, gauge, histogram, Counter, Gauge, Histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::info;

use netmon_core::models::ReconcileOutcome;

/// 安装Prometheus抓取端点
pub fn install_prometheus_exporter(bind_address: &str) -> Result<()> {
    let addr: SocketAddr = bind_address
        .parse()
        .with_context(|| format!("无效的指标监听地址: {bind_address}"))?;
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .context("安装Prometheus导出器失败")?;
    info!(address = %addr, "Prometheus metrics exporter listening");
    Ok(())
}

/// Metrics collector for scheduling, polling and reconciliation
#[derive(Clone)]
pub struct MetricsCollector {
    // Scheduler metrics
    crontab_claims_total: Counter,
    crontab_unresolved_total: Counter,
    scheduler_tick_duration: Histogram,
    runs_in_flight: Gauge,

    // Executor metrics
    runs_total: Counter,
    runs_failed_total: Counter,
    polls_total: Counter,
    polls_failed_total: Counter,
    poll_duration: Histogram,

    // Reconciler metrics
    inventory_inserted_total: Counter,
    inventory_updated_total: Counter,
    inventory_retired_total: Counter,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            crontab_claims_total: counter!("netmon_crontab_claims_total"),
            crontab_unresolved_total: counter!("netmon_crontab_unresolved_total"),
            scheduler_tick_duration: histogram!("netmon_scheduler_tick_duration_seconds"),
            runs_in_flight: gauge!("netmon_runs_in_flight"),
            runs_total: counter!("netmon_runs_total"),
            runs_failed_total: counter!("netmon_runs_failed_total"),
            polls_total: counter!("netmon_polls_total"),
            polls_failed_total: counter!("netmon_polls_failed_total"),
            poll_duration: histogram!("netmon_poll_duration_seconds"),
            inventory_inserted_total: counter!("netmon_inventory_inserted_total"),
            inventory_updated_total: counter!("netmon_inventory_updated_total"),
            inventory_retired_total: counter!("netmon_inventory_retired_total"),
        }
    }

    pub fn record_claims(&self, count: usize) {
        self.crontab_claims_total.increment(count as u64);
    }

    pub fn record_unresolved(&self) {
        self.crontab_unresolved_total.increment(1);
    }

    pub fn record_tick(&self, duration_seconds: f64) {
        self.scheduler_tick_duration.record(duration_seconds);
    }

    pub fn set_runs_in_flight(&self, count: usize) {
        self.runs_in_flight.set(count as f64);
    }

    pub fn record_run(&self, success: bool) {
        self.runs_total.increment(1);
        if !success {
            self.runs_failed_total.increment(1);
        }
    }

    pub fn record_poll(&self, success: bool, duration_seconds: f64) {
        self.polls_total.increment(1);
        self.poll_duration.record(duration_seconds);
        if !success {
            self.polls_failed_total.increment(1);
        }
    }

    pub fn record_reconciliation(&self, outcome: &ReconcileOutcome) {
        self.inventory_inserted_total
            .increment(outcome.inserted as u64);
        self.inventory_updated_total.increment(outcome.updated as u64);
        self.inventory_retired_total.increment(outcome.retired as u64);
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

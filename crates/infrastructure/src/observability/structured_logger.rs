//! Structured event logging for the polling pipeline

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use netmon_core::models::{InventoryClass, ReconcileOutcome};

pub struct StructuredLogger;

impl StructuredLogger {
    pub fn log_crontab_claimed(
        crontab_id: i64,
        task_id: i64,
        agent: &str,
        lastdt: Option<DateTime<Utc>>,
    ) {
        info!(
            event = "crontab_claimed",
            crontab.id = crontab_id,
            task.id = task_id,
            agent = agent,
            crontab.lastdt = ?lastdt,
            "Crontab entry claimed"
        );
    }

    pub fn log_journal_abandoned(crontab_id: i64, journal_id: i64) {
        warn!(
            event = "journal_abandoned",
            crontab.id = crontab_id,
            journal.id = journal_id,
            "Run lease expired with open journal, journal marked abandoned"
        );
    }

    pub fn log_resolve_failure(crontab_id: i64, task_id: i64, reason: &str) {
        warn!(
            event = "run_resolve_failed",
            crontab.id = crontab_id,
            task.id = task_id,
            reason = reason,
            "Crontab entry skipped, task could not be resolved"
        );
    }

    pub fn log_run_start(journal_id: i64, task_id: i64, nodes: usize, requests: usize) {
        info!(
            event = "run_start",
            journal.id = journal_id,
            task.id = task_id,
            run.nodes = nodes,
            run.requests = requests,
            "Task run started"
        );
    }

    pub fn log_run_complete(
        journal_id: i64,
        task_id: i64,
        work_items: usize,
        failed_items: usize,
        duration_ms: u64,
    ) {
        info!(
            event = "run_complete",
            journal.id = journal_id,
            task.id = task_id,
            run.work_items = work_items,
            run.failed_items = failed_items,
            run.duration_ms = duration_ms,
            "Task run completed"
        );
    }

    pub fn log_run_failed(task_id: i64, journal_id: Option<i64>, error_message: &str) {
        error!(
            event = "run_failed",
            task.id = task_id,
            journal.id = ?journal_id,
            error = error_message,
            "Task run aborted, journal left open"
        );
    }

    pub fn log_poll_failure(node_id: i64, address: &str, request_id: i64, oid: &str, error_message: &str) {
        warn!(
            event = "poll_failed",
            node.id = node_id,
            node.address = address,
            request.id = request_id,
            request.oid = oid,
            error = error_message,
            "Poll request failed"
        );
    }

    pub fn log_reconciliation(node_id: i64, class: InventoryClass, complete: bool, outcome: &ReconcileOutcome) {
        info!(
            event = "inventory_reconciled",
            node.id = node_id,
            inventory.class = %class,
            scan.complete = complete,
            inventory.inserted = outcome.inserted,
            inventory.updated = outcome.updated,
            inventory.retired = outcome.retired,
            "Inventory reconciled"
        );
    }

    pub fn log_lease_lost(crontab_id: i64, owner: &str) {
        warn!(
            event = "lease_lost",
            crontab.id = crontab_id,
            lease.owner = owner,
            "Run lease no longer held by this scheduler"
        );
    }
}

/// 任务与计划条目仓储，包括认领和租约维护
macro_rules! impl_task_repository {
    ($store:ident) => {
        use async_trait::async_trait;
        use chrono::{DateTime, Duration, Utc};
        use tracing::debug;

        use netmon_core::models::{ClaimedEntry, CrontabEntry, LeaseGrant, Task};
        use netmon_core::traits::TaskRepository;
        use netmon_core::{MonitorError, MonitorResult};

        use super::rows::{row_to_crontab, row_to_task};
        use crate::database::claim;

        const TASK_COLUMNS: &str =
            "id, name, node_group_id, request_group_id, manage, created_at, updated_at";
        const CRONTAB_COLUMNS: &str = "id, task_id, minutes, hours, days, startdt, lastdt, status, \
             agent, j_id, lease_owner, lease_expires_at, claim_version";

        impl $store {
            async fn claim_entries(
                &self,
                agent: &str,
                now: DateTime<Utc>,
                lease: &LeaseGrant,
                due_tolerance: Option<Duration>,
            ) -> MonitorResult<Vec<ClaimedEntry>> {
                let rows = sqlx::query(
                    r#"
                    SELECT c.id, c.task_id, c.minutes, c.hours, c.days, c.startdt, c.lastdt, c.status,
                           c.agent, c.j_id, c.lease_owner, c.lease_expires_at, c.claim_version
                    FROM crontab c
                    JOIN tasks t ON t.id = c.task_id
                    WHERE c.status = 'ACTIVE'
                      AND t.manage = $1
                      AND (c.agent IS NULL OR c.agent = $2 OR UPPER(c.agent) = 'ANY')
                    ORDER BY c.id
                    "#,
                )
                .bind(true)
                .bind(agent)
                .fetch_all(&self.pool)
                .await?;
                let candidates = rows
                    .iter()
                    .map(row_to_crontab)
                    .collect::<MonitorResult<Vec<CrontabEntry>>>()?;

                let mut claimed = Vec::new();
                for entry in candidates {
                    if let Err(skip) = claim::evaluate(&entry, agent, now, due_tolerance) {
                        debug!(crontab_id = entry.id, reason = skip.as_str(), "跳过计划条目");
                        continue;
                    }

                    let mut tx = self.pool.begin().await?;
                    let result = sqlx::query(
                        r#"
                        UPDATE crontab
                        SET lastdt = $1, lease_owner = $2, lease_expires_at = $3,
                            claim_version = claim_version + 1
                        WHERE id = $4 AND claim_version = $5 AND status = 'ACTIVE'
                        "#,
                    )
                    .bind(now)
                    .bind(&lease.owner)
                    .bind(lease.expires_at)
                    .bind(entry.id)
                    .bind(entry.claim_version)
                    .execute(&mut *tx)
                    .await?;

                    if result.rows_affected() == 0 {
                        tx.rollback().await?;
                        debug!(crontab_id = entry.id, "计划条目已被其他调度器认领");
                        continue;
                    }

                    let abandoned_journal = match entry.j_id {
                        Some(journal_id) => {
                            let abandoned = sqlx::query(
                                "UPDATE journals SET enddt = $1, abandoned = $2 WHERE id = $3 AND enddt IS NULL",
                            )
                            .bind(now)
                            .bind(true)
                            .bind(journal_id)
                            .execute(&mut *tx)
                            .await?;
                            (abandoned.rows_affected() > 0).then_some(journal_id)
                        }
                        None => None,
                    };

                    let task_row = sqlx::query(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"))
                        .bind(entry.task_id)
                        .fetch_one(&mut *tx)
                        .await?;
                    let task = row_to_task(&task_row)?;
                    tx.commit().await?;

                    claimed.push(ClaimedEntry {
                        entry: claim::claimed_state(entry, now, &lease.owner, lease.expires_at),
                        task,
                        abandoned_journal,
                    });
                }

                Ok(claimed)
            }
        }

        #[async_trait]
        impl TaskRepository for $store {
            async fn create_task(&self, task: &Task) -> MonitorResult<Task> {
                let row = sqlx::query(&format!(
                    r#"
                    INSERT INTO tasks (name, node_group_id, request_group_id, manage, created_at, updated_at)
                    VALUES ($1, $2, $3, $4, $5, $6)
                    RETURNING {TASK_COLUMNS}
                    "#
                ))
                .bind(&task.name)
                .bind(task.node_group_id)
                .bind(task.request_group_id)
                .bind(task.manage)
                .bind(task.created_at)
                .bind(task.updated_at)
                .fetch_one(&self.pool)
                .await?;
                row_to_task(&row)
            }

            async fn get_task(&self, id: i64) -> MonitorResult<Option<Task>> {
                let row = sqlx::query(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"))
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await?;
                row.as_ref().map(row_to_task).transpose()
            }

            async fn delete_task(&self, id: i64) -> MonitorResult<()> {
                let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
                    .bind(id)
                    .execute(&self.pool)
                    .await?;
                if result.rows_affected() == 0 {
                    return Err(MonitorError::TaskNotFound { id });
                }
                Ok(())
            }

            async fn create_crontab_entry(&self, entry: &CrontabEntry) -> MonitorResult<CrontabEntry> {
                entry.recurrence().validate()?;
                let row = sqlx::query(&format!(
                    r#"
                    INSERT INTO crontab (task_id, minutes, hours, days, startdt, lastdt, status, agent,
                                         j_id, lease_owner, lease_expires_at, claim_version)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                    RETURNING {CRONTAB_COLUMNS}
                    "#
                ))
                .bind(entry.task_id)
                .bind(entry.minutes)
                .bind(entry.hours)
                .bind(entry.days)
                .bind(entry.startdt)
                .bind(entry.lastdt)
                .bind(entry.status.as_str())
                .bind(&entry.agent)
                .bind(entry.j_id)
                .bind(&entry.lease_owner)
                .bind(entry.lease_expires_at)
                .bind(entry.claim_version)
                .fetch_one(&self.pool)
                .await?;
                row_to_crontab(&row)
            }

            async fn get_crontab_entry(&self, id: i64) -> MonitorResult<Option<CrontabEntry>> {
                let row = sqlx::query(&format!(
                    "SELECT {CRONTAB_COLUMNS} FROM crontab WHERE id = $1"
                ))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
                row.as_ref().map(row_to_crontab).transpose()
            }

            async fn list_crontab_entries(&self) -> MonitorResult<Vec<CrontabEntry>> {
                let rows = sqlx::query(&format!("SELECT {CRONTAB_COLUMNS} FROM crontab ORDER BY id"))
                    .fetch_all(&self.pool)
                    .await?;
                rows.iter().map(row_to_crontab).collect()
            }

            async fn claim_due_crontab_entries(
                &self,
                agent: &str,
                now: DateTime<Utc>,
                due_tolerance: Duration,
                lease: &LeaseGrant,
            ) -> MonitorResult<Vec<ClaimedEntry>> {
                self.claim_entries(agent, now, lease, Some(due_tolerance)).await
            }

            async fn claim_all_crontab_entries(
                &self,
                agent: &str,
                now: DateTime<Utc>,
                lease: &LeaseGrant,
            ) -> MonitorResult<Vec<ClaimedEntry>> {
                self.claim_entries(agent, now, lease, None).await
            }

            async fn renew_lease(
                &self,
                entry_id: i64,
                owner: &str,
                expires_at: DateTime<Utc>,
            ) -> MonitorResult<bool> {
                let result = sqlx::query(
                    r#"
                    UPDATE crontab
                    SET lease_expires_at = $1, claim_version = claim_version + 1
                    WHERE id = $2 AND lease_owner = $3
                    "#,
                )
                .bind(expires_at)
                .bind(entry_id)
                .bind(owner)
                .execute(&self.pool)
                .await?;
                Ok(result.rows_affected() > 0)
            }

            async fn release_lease(&self, entry_id: i64, owner: &str) -> MonitorResult<bool> {
                let result = sqlx::query(
                    r#"
                    UPDATE crontab
                    SET lease_owner = NULL, lease_expires_at = NULL, claim_version = claim_version + 1
                    WHERE id = $1 AND lease_owner = $2
                    "#,
                )
                .bind(entry_id)
                .bind(owner)
                .execute(&self.pool)
                .await?;
                Ok(result.rows_affected() > 0)
            }
        }
    };
}

pub(crate) use impl_task_repository;

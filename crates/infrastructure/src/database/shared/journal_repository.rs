/// 运行日志与结果仓储，结果行只追加不修改
macro_rules! impl_journal_repository {
    ($store:ident) => {
        use async_trait::async_trait;
        use chrono::{DateTime, Utc};

        use netmon_core::models::{Journal, NewPollResult, PollResult};
        use netmon_core::traits::JournalRepository;
        use netmon_core::{MonitorError, MonitorResult};

        use super::rows::{row_to_journal, row_to_result};

        const JOURNAL_COLUMNS: &str = "id, task_id, crontab_id, startdt, enddt, abandoned";

        #[async_trait]
        impl JournalRepository for $store {
            async fn open_journal(
                &self,
                task_id: i64,
                crontab_id: Option<i64>,
                now: DateTime<Utc>,
            ) -> MonitorResult<Journal> {
                let mut tx = self.pool.begin().await?;
                let row = sqlx::query(&format!(
                    r#"
                    INSERT INTO journals (task_id, crontab_id, startdt, abandoned)
                    VALUES ($1, $2, $3, $4)
                    RETURNING {JOURNAL_COLUMNS}
                    "#
                ))
                .bind(task_id)
                .bind(crontab_id)
                .bind(now)
                .bind(false)
                .fetch_one(&mut *tx)
                .await?;
                let journal = row_to_journal(&row)?;

                if let Some(crontab_id) = crontab_id {
                    sqlx::query("UPDATE crontab SET j_id = $1 WHERE id = $2")
                        .bind(journal.id)
                        .bind(crontab_id)
                        .execute(&mut *tx)
                        .await?;
                }
                tx.commit().await?;
                Ok(journal)
            }

            async fn append_result(&self, result: &NewPollResult) -> MonitorResult<i64> {
                let id: i64 = sqlx::query_scalar(
                    r#"
                    INSERT INTO results (journal_id, node_id, request_id, element_id, element_index,
                                         val, cval, duration_ms, err, dt)
                    VALUES ($1, $2, $3,
                            (SELECT id FROM elements
                             WHERE node_id = $2 AND element_type = $4 AND idx = $5),
                            $5, $6, $7, $8, $9, $10)
                    RETURNING id
                    "#,
                )
                .bind(result.journal_id)
                .bind(result.node_id)
                .bind(result.request_id)
                .bind(result.element_type.map(|t| t.as_str()))
                .bind(&result.element_index)
                .bind(&result.val)
                .bind(&result.cval)
                .bind(result.duration_ms)
                .bind(&result.err)
                .bind(result.dt)
                .fetch_one(&self.pool)
                .await?;
                Ok(id)
            }

            async fn close_journal(&self, journal_id: i64, now: DateTime<Utc>) -> MonitorResult<()> {
                let result = sqlx::query("UPDATE journals SET enddt = $1 WHERE id = $2 AND enddt IS NULL")
                    .bind(now)
                    .bind(journal_id)
                    .execute(&self.pool)
                    .await?;
                if result.rows_affected() == 0 && self.get_journal(journal_id).await?.is_none() {
                    return Err(MonitorError::JournalNotFound { id: journal_id });
                }
                Ok(())
            }

            async fn get_journal(&self, id: i64) -> MonitorResult<Option<Journal>> {
                let row = sqlx::query(&format!(
                    "SELECT {JOURNAL_COLUMNS} FROM journals WHERE id = $1"
                ))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
                row.as_ref().map(row_to_journal).transpose()
            }

            async fn list_journals(&self, task_id: i64) -> MonitorResult<Vec<Journal>> {
                let rows = sqlx::query(&format!(
                    "SELECT {JOURNAL_COLUMNS} FROM journals WHERE task_id = $1 ORDER BY id"
                ))
                .bind(task_id)
                .fetch_all(&self.pool)
                .await?;
                rows.iter().map(row_to_journal).collect()
            }

            async fn list_results(&self, journal_id: i64) -> MonitorResult<Vec<PollResult>> {
                let rows = sqlx::query(
                    r#"
                    SELECT id, journal_id, node_id, request_id, element_id, element_index, val, cval,
                           duration_ms, err, dt
                    FROM results
                    WHERE journal_id = $1
                    ORDER BY id
                    "#,
                )
                .bind(journal_id)
                .fetch_all(&self.pool)
                .await?;
                rows.iter().map(row_to_result).collect()
            }
        }
    };
}

pub(crate) use impl_journal_repository;

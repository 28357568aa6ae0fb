macro_rules! impl_request_repository {
    ($store:ident) => {
        use async_trait::async_trait;

        use netmon_core::models::{GroupRequest, Request, RequestGroup};
        use netmon_core::traits::RequestRepository;
        use netmon_core::{MonitorError, MonitorResult};

        use super::rows::{row_to_group_request, row_to_request, row_to_request_group};

        const REQUEST_COLUMNS: &str = "id, name, oid, request_type, prefix, postfix, manage, created_at";
        const GROUP_COLUMNS: &str = "id, name, handler, element_type, full_walk, manage, created_at";

        #[async_trait]
        impl RequestRepository for $store {
            async fn create_request(&self, request: &Request) -> MonitorResult<Request> {
                let row = sqlx::query(&format!(
                    r#"
                    INSERT INTO requests (name, oid, request_type, prefix, postfix, manage, created_at)
                    VALUES ($1, $2, $3, $4, $5, $6, $7)
                    RETURNING {REQUEST_COLUMNS}
                    "#
                ))
                .bind(&request.name)
                .bind(&request.oid)
                .bind(request.request_type.as_str())
                .bind(&request.prefix)
                .bind(&request.postfix)
                .bind(request.manage)
                .bind(request.created_at)
                .fetch_one(&self.pool)
                .await?;
                row_to_request(&row)
            }

            async fn get_request(&self, id: i64) -> MonitorResult<Option<Request>> {
                let row = sqlx::query(&format!(
                    "SELECT {REQUEST_COLUMNS} FROM requests WHERE id = $1"
                ))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
                row.as_ref().map(row_to_request).transpose()
            }

            async fn create_request_group(&self, group: &RequestGroup) -> MonitorResult<RequestGroup> {
                let row = sqlx::query(&format!(
                    r#"
                    INSERT INTO request_groups (name, handler, element_type, full_walk, manage, created_at)
                    VALUES ($1, $2, $3, $4, $5, $6)
                    RETURNING {GROUP_COLUMNS}
                    "#
                ))
                .bind(&group.name)
                .bind(group.handler.as_str())
                .bind(group.element_type.as_str())
                .bind(group.full_walk)
                .bind(group.manage)
                .bind(group.created_at)
                .fetch_one(&self.pool)
                .await?;
                row_to_request_group(&row)
            }

            async fn get_request_group(&self, id: i64) -> MonitorResult<Option<RequestGroup>> {
                let row = sqlx::query(&format!(
                    "SELECT {GROUP_COLUMNS} FROM request_groups WHERE id = $1"
                ))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
                row.as_ref().map(row_to_request_group).transpose()
            }

            async fn set_request_group_managed(&self, id: i64, manage: bool) -> MonitorResult<()> {
                let result = sqlx::query("UPDATE request_groups SET manage = $1 WHERE id = $2")
                    .bind(manage)
                    .bind(id)
                    .execute(&self.pool)
                    .await?;
                if result.rows_affected() == 0 {
                    return Err(MonitorError::RequestGroupNotFound { id });
                }
                Ok(())
            }

            async fn delete_request_group(&self, id: i64) -> MonitorResult<()> {
                let result = sqlx::query("DELETE FROM request_groups WHERE id = $1")
                    .bind(id)
                    .execute(&self.pool)
                    .await?;
                if result.rows_affected() == 0 {
                    return Err(MonitorError::RequestGroupNotFound { id });
                }
                Ok(())
            }

            async fn add_request_to_group(
                &self,
                group_id: i64,
                request_id: i64,
                position: i32,
                timeout_ms: Option<i32>,
            ) -> MonitorResult<()> {
                sqlx::query(
                    r#"
                    INSERT INTO request_group_refs (group_id, request_id, position, timeout_ms)
                    VALUES ($1, $2, $3, $4)
                    ON CONFLICT (group_id, request_id)
                    DO UPDATE SET position = excluded.position, timeout_ms = excluded.timeout_ms
                    "#,
                )
                .bind(group_id)
                .bind(request_id)
                .bind(position)
                .bind(timeout_ms)
                .execute(&self.pool)
                .await?;
                Ok(())
            }

            async fn list_group_requests(&self, group_id: i64) -> MonitorResult<Vec<GroupRequest>> {
                let rows = sqlx::query(
                    r#"
                    SELECT r.id, r.name, r.oid, r.request_type, r.prefix, r.postfix, r.manage,
                           r.created_at, rr.position, rr.timeout_ms AS ref_timeout_ms
                    FROM request_group_refs rr
                    JOIN requests r ON r.id = rr.request_id
                    WHERE rr.group_id = $1
                    ORDER BY rr.position, rr.id
                    "#,
                )
                .bind(group_id)
                .fetch_all(&self.pool)
                .await?;
                rows.iter().map(row_to_group_request).collect()
            }
        }
    };
}

pub(crate) use impl_request_repository;

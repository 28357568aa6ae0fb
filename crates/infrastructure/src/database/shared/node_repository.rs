/// 节点与节点组仓储
macro_rules! impl_node_repository {
    ($store:ident) => {
        use async_trait::async_trait;
        use chrono::{DateTime, Utc};
        use tracing::debug;

        use netmon_core::models::{Node, NodeGroup, NodeHealth};
        use netmon_core::traits::NodeRepository;
        use netmon_core::{MonitorError, MonitorResult};

        use super::rows::{row_to_node, row_to_node_group};

        const NODE_COLUMNS: &str = "id, name, ip_address, community, manage, timeout_ms, sys_name, \
             sys_object_id, snmp_last_dt, created_at, updated_at";

        #[async_trait]
        impl NodeRepository for $store {
            async fn create_node(&self, node: &Node) -> MonitorResult<Node> {
                let row = sqlx::query(&format!(
                    r#"
                    INSERT INTO nodes (name, ip_address, community, manage, timeout_ms, sys_name,
                                       sys_object_id, snmp_last_dt, created_at, updated_at)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                    RETURNING {NODE_COLUMNS}
                    "#
                ))
                .bind(&node.name)
                .bind(&node.ip_address)
                .bind(&node.community)
                .bind(node.manage)
                .bind(node.timeout_ms)
                .bind(&node.sys_name)
                .bind(&node.sys_object_id)
                .bind(node.snmp_last_dt)
                .bind(node.created_at)
                .bind(node.updated_at)
                .fetch_one(&self.pool)
                .await?;

                let created = row_to_node(&row)?;
                debug!("创建{}", created.entity_description());
                Ok(created)
            }

            async fn get_node(&self, id: i64) -> MonitorResult<Option<Node>> {
                let row = sqlx::query(&format!("SELECT {NODE_COLUMNS} FROM nodes WHERE id = $1"))
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await?;
                row.as_ref().map(row_to_node).transpose()
            }

            async fn get_node_by_address(&self, ip_address: &str) -> MonitorResult<Option<Node>> {
                let row = sqlx::query(&format!(
                    "SELECT {NODE_COLUMNS} FROM nodes WHERE ip_address = $1"
                ))
                .bind(ip_address)
                .fetch_optional(&self.pool)
                .await?;
                row.as_ref().map(row_to_node).transpose()
            }

            async fn list_nodes(&self) -> MonitorResult<Vec<Node>> {
                let rows = sqlx::query(&format!("SELECT {NODE_COLUMNS} FROM nodes ORDER BY id"))
                    .fetch_all(&self.pool)
                    .await?;
                rows.iter().map(row_to_node).collect()
            }

            async fn set_node_managed(&self, id: i64, manage: bool) -> MonitorResult<()> {
                let result = sqlx::query("UPDATE nodes SET manage = $1, updated_at = $2 WHERE id = $3")
                    .bind(manage)
                    .bind(Utc::now())
                    .bind(id)
                    .execute(&self.pool)
                    .await?;
                if result.rows_affected() == 0 {
                    return Err(MonitorError::NodeNotFound { id });
                }
                Ok(())
            }

            async fn delete_node(&self, id: i64) -> MonitorResult<()> {
                let result = sqlx::query("DELETE FROM nodes WHERE id = $1")
                    .bind(id)
                    .execute(&self.pool)
                    .await?;
                if result.rows_affected() == 0 {
                    return Err(MonitorError::NodeNotFound { id });
                }
                debug!("删除节点 ID: {}", id);
                Ok(())
            }

            async fn create_node_group(&self, group: &NodeGroup) -> MonitorResult<NodeGroup> {
                let row = sqlx::query(
                    r#"
                    INSERT INTO node_groups (name, description, created_at)
                    VALUES ($1, $2, $3)
                    RETURNING id, name, description, created_at
                    "#,
                )
                .bind(&group.name)
                .bind(&group.description)
                .bind(group.created_at)
                .fetch_one(&self.pool)
                .await?;
                row_to_node_group(&row)
            }

            async fn get_node_group(&self, id: i64) -> MonitorResult<Option<NodeGroup>> {
                let row =
                    sqlx::query("SELECT id, name, description, created_at FROM node_groups WHERE id = $1")
                        .bind(id)
                        .fetch_optional(&self.pool)
                        .await?;
                row.as_ref().map(row_to_node_group).transpose()
            }

            async fn add_node_to_group(&self, group_id: i64, node_id: i64) -> MonitorResult<()> {
                sqlx::query(
                    r#"
                    INSERT INTO node_group_refs (group_id, node_id) VALUES ($1, $2)
                    ON CONFLICT (group_id, node_id) DO NOTHING
                    "#,
                )
                .bind(group_id)
                .bind(node_id)
                .execute(&self.pool)
                .await?;
                Ok(())
            }

            async fn list_group_nodes(&self, group_id: i64) -> MonitorResult<Vec<Node>> {
                let rows = sqlx::query(
                    r#"
                    SELECT n.id, n.name, n.ip_address, n.community, n.manage, n.timeout_ms, n.sys_name,
                           n.sys_object_id, n.snmp_last_dt, n.created_at, n.updated_at
                    FROM nodes n
                    JOIN node_group_refs r ON r.node_id = n.id
                    WHERE r.group_id = $1
                    ORDER BY n.id
                    "#,
                )
                .bind(group_id)
                .fetch_all(&self.pool)
                .await?;
                rows.iter().map(row_to_node).collect()
            }

            async fn touch_node_contact(&self, node_id: i64, at: DateTime<Utc>) -> MonitorResult<()> {
                let result =
                    sqlx::query("UPDATE nodes SET snmp_last_dt = $1, updated_at = $1 WHERE id = $2")
                        .bind(at)
                        .bind(node_id)
                        .execute(&self.pool)
                        .await?;
                if result.rows_affected() == 0 {
                    return Err(MonitorError::NodeNotFound { id: node_id });
                }
                Ok(())
            }

            async fn update_node_health(
                &self,
                node_id: i64,
                health: &NodeHealth,
                at: DateTime<Utc>,
            ) -> MonitorResult<()> {
                let result = sqlx::query(
                    r#"
                    UPDATE nodes
                    SET sys_name = COALESCE($1, sys_name),
                        sys_object_id = COALESCE($2, sys_object_id),
                        updated_at = $3
                    WHERE id = $4
                    "#,
                )
                .bind(&health.sys_name)
                .bind(&health.sys_object_id)
                .bind(at)
                .bind(node_id)
                .execute(&self.pool)
                .await?;
                if result.rows_affected() == 0 {
                    return Err(MonitorError::NodeNotFound { id: node_id });
                }
                Ok(())
            }
        }
    };
}

pub(crate) use impl_node_repository;

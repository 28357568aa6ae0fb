use sqlx::PgConnection;

use super::PostgresStore;

/// 行锁串行化同一节点的并发对账，不同节点互不阻塞
async fn lock_node(conn: &mut PgConnection, node_id: i64) -> netmon_core::MonitorResult<bool> {
    let locked = sqlx::query("SELECT id FROM nodes WHERE id = $1 FOR UPDATE")
        .bind(node_id)
        .fetch_optional(conn)
        .await?;
    Ok(locked.is_some())
}

crate::database::shared::impl_inventory_repository!(PostgresStore, PgConnection, lock_node);

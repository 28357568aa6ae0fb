use sqlx::SqliteConnection;

use super::SqliteStore;

/// SQLite 没有行锁：空更新节点行即取得数据库写锁，事务结束前其他写者等待
async fn lock_node(
    conn: &mut SqliteConnection,
    node_id: i64,
) -> netmon_core::MonitorResult<bool> {
    let locked = sqlx::query("UPDATE nodes SET updated_at = updated_at WHERE id = $1")
        .bind(node_id)
        .execute(conn)
        .await?;
    Ok(locked.rows_affected() > 0)
}

crate::database::shared::impl_inventory_repository!(SqliteStore, SqliteConnection, lock_node);

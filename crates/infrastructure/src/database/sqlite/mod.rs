//! SQLite 清单存储
//!
//! 内存数据库只能使用单连接，事务内的查询都经由事务连接执行。

mod sqlite_inventory_repository;
mod sqlite_journal_repository;
mod sqlite_node_repository;
mod sqlite_request_repository;
mod sqlite_task_repository;
mod rows;
pub mod schema;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::debug;

use netmon_core::MonitorResult;

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// 创建内存数据库并初始化表结构
    pub async fn in_memory() -> MonitorResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        let store = Self::new(pool);
        store.initialize_schema().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn initialize_schema(&self) -> MonitorResult<()> {
        sqlx::raw_sql(schema::SCHEMA).execute(&self.pool).await?;
        debug!("SQLite表结构已就绪");
        Ok(())
    }
}

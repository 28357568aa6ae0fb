//! PostgreSQL 清单存储

mod postgres_inventory_repository;
mod postgres_journal_repository;
mod postgres_node_repository;
mod postgres_request_repository;
mod postgres_task_repository;
mod rows;
pub mod schema;

use sqlx::postgres::PgPool;
use tracing::debug;

use netmon_core::MonitorResult;

#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn initialize_schema(&self) -> MonitorResult<()> {
        sqlx::raw_sql(schema::SCHEMA).execute(&self.pool).await?;
        debug!("PostgreSQL表结构已就绪");
        Ok(())
    }
}

//! 存储、采集和可观测性的基础设施实现

pub mod collector;
pub mod database;
pub mod observability;

pub use collector::NetSnmpCollector;
pub use database::{DatabaseManager, DatabasePool, DatabaseType, PostgresStore, SqliteStore};
pub use observability::*;

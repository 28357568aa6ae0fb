//! 两种后端共用的仓储实现
//!
//! SQL 只使用 `$N` 占位符、`RETURNING` 和 `ON CONFLICT`，PostgreSQL 与 SQLite 都能执行。
//! 每个宏在后端模块中展开一次，生成该后端的行映射或仓储实现；
//! 宏展开处需要有同级的 `rows` 模块。后端之间只有表结构和对账时的节点加锁不同。

mod inventory_repository;
mod journal_repository;
mod node_repository;
mod request_repository;
mod rows;
mod task_repository;

pub(crate) use inventory_repository::impl_inventory_repository;
pub(crate) use journal_repository::impl_journal_repository;
pub(crate) use node_repository::impl_node_repository;
pub(crate) use request_repository::impl_request_repository;
pub(crate) use rows::impl_row_mappers;
pub(crate) use task_repository::impl_task_repository;

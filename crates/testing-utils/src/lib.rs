//! # Netmon Testing Utils
//!
//! 各crate共用的测试工具：
//!
//! - **构建器**：带合理默认值的节点、请求、请求组、计划条目
//! - **模拟采集器**：按 (地址, OID) 脚本化响应并记录调用
//! - **数据装配**：内存SQLite存储和常用的任务拓扑
//! - **数据库容器**：基于 testcontainers 的PostgreSQL

pub mod builders;
pub mod containers;
pub mod helpers;
pub mod mocks;

pub use builders::*;
pub use containers::*;
pub use helpers::*;
pub use mocks::*;

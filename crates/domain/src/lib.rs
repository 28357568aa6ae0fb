//! 领域逻辑：扫描结果解释与清单对账规划
//!
//! 本crate不做任何I/O，存储层和执行器共用这里的规则。

pub mod handlers;
pub mod reconciliation;
pub mod value_objects;

pub use handlers::{interpret, Interpretation};
pub use reconciliation::{plan_reconciliation, Observation, PlannedUpdate, ReconcilePlan};

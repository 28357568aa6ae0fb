//! 任务执行器：对解析后的运行逐节点采集、写入结果并触发清单对账

pub mod executor;
pub mod reconciler;

pub use executor::TaskExecutor;
pub use reconciler::Reconciler;

use async_trait::async_trait;

use crate::errors::MonitorResult;
use crate::models::{ResolvedRun, RunSummary};

/// 调度器把已认领并解析的运行交给执行器
#[async_trait]
pub trait TaskRunner: Send + Sync {
    async fn run(&self, run: ResolvedRun) -> MonitorResult<RunSummary>;
}

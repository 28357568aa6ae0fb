use async_trait::async_trait;
use std::time::Duration;

use crate::models::{Node, PollOutcome, Request};

/// 采集网关：对一个节点发出一个请求
///
/// 超时、不可达、响应格式错误等预期内的失败通过 [`PollOutcome::error`] 返回，
/// 实现不得 panic。
#[async_trait]
pub trait Collector: Send + Sync {
    async fn poll(&self, node: &Node, request: &Request, timeout: Duration) -> PollOutcome;

    fn name(&self) -> &str;
}

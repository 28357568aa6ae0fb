use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{CrontabEntry, GroupRequest, Node, Request, RequestGroup, Task};
use super::inventory::ReconcileOutcome;

/// 表遍历返回的一行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarBind {
    pub oid: String,
    pub value: String,
}

impl VarBind {
    pub fn new(oid: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            oid: oid.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PollValue {
    Scalar(String),
    Table(Vec<VarBind>),
}

/// WALK 没有返回任何行时记录的错误
pub const EMPTY_WALK: &str = "walk returned no data";

/// 采集器对一次请求的回答：值或错误，以及耗时
#[derive(Debug, Clone, PartialEq)]
pub struct PollOutcome {
    pub value: Option<PollValue>,
    pub error: Option<String>,
    pub duration: Duration,
}

impl PollOutcome {
    pub fn success(value: PollValue, duration: Duration) -> Self {
        Self {
            value: Some(value),
            error: None,
            duration,
        }
    }

    pub fn failure(error: impl Into<String>, duration: Duration) -> Self {
        Self {
            value: None,
            error: Some(error.into()),
            duration,
        }
    }

    pub fn empty_walk(duration: Duration) -> Self {
        Self::failure(EMPTY_WALK, duration)
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.value.is_some()
    }

    /// 代理应答了，但表中没有数据
    pub fn is_empty_walk(&self) -> bool {
        self.error.as_deref() == Some(EMPTY_WALK)
    }
}

/// 已展开的一次运行：节点组展开为节点，请求组展开为有序请求
#[derive(Debug, Clone)]
pub struct ResolvedRun {
    pub entry: CrontabEntry,
    pub task: Task,
    pub nodes: Vec<Node>,
    pub request_group: RequestGroup,
    pub requests: Vec<GroupRequest>,
}

impl ResolvedRun {
    pub fn work_items(&self) -> usize {
        self.nodes.len() * self.requests.len()
    }
}

#[derive(Debug, Clone)]
pub struct ScanItem {
    pub request: Request,
    pub outcome: PollOutcome,
}

/// 单个节点在一次运行中的全部请求结果，按请求顺序排列
#[derive(Debug, Clone)]
pub struct NodeScan {
    pub node: Node,
    pub items: Vec<ScanItem>,
}

impl NodeScan {
    /// 扫描是否完整枚举了节点的表，只有完整枚举才能退役清单
    ///
    /// 空表（如设备不支持的可选表）算作已枚举；但至少要有一个请求返回数据，
    /// 视图受限、什么都不返回的代理不会让整份清单下线。
    pub fn is_complete_enumeration(&self) -> bool {
        self.any_succeeded()
            && self
                .items
                .iter()
                .all(|item| item.outcome.is_success() || item.outcome.is_empty_walk())
    }

    pub fn any_succeeded(&self) -> bool {
        self.items.iter().any(|item| item.outcome.is_success())
    }
}

/// 执行过程中逐条推送的工作项结果
#[derive(Debug, Clone, PartialEq)]
pub struct WorkItemOutcome {
    pub journal_id: i64,
    pub node_id: i64,
    pub request_id: i64,
    pub error: Option<String>,
    pub duration: Duration,
    pub rows_written: usize,
}

impl WorkItemOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub journal_id: i64,
    pub nodes: usize,
    pub work_items: usize,
    pub failed_items: usize,
    pub results_written: usize,
    pub reconciled: Vec<(i64, ReconcileOutcome)>,
}

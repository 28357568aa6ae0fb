use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ElementType;

/// 一次任务运行的审计记录
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Journal {
    pub id: i64,
    pub task_id: i64,
    pub crontab_id: Option<i64>,
    pub startdt: DateTime<Utc>,
    /// 运行中为空
    pub enddt: Option<DateTime<Utc>>,
    /// 租约过期后被回收的运行
    pub abandoned: bool,
}

impl Journal {
    pub fn is_open(&self) -> bool {
        self.enddt.is_none()
    }
}

/// 一次 (节点, 请求) 执行的结果，只追加不修改
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PollResult {
    pub id: i64,
    pub journal_id: i64,
    pub node_id: i64,
    pub request_id: i64,
    pub element_id: Option<i64>,
    /// 表遍历时的行索引（OID后缀）
    pub element_index: Option<String>,
    pub val: Option<String>,
    pub cval: Option<String>,
    pub duration_ms: i64,
    pub err: Option<String>,
    pub dt: DateTime<Utc>,
}

impl PollResult {
    pub fn is_error(&self) -> bool {
        self.err.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPollResult {
    pub journal_id: i64,
    pub node_id: i64,
    pub request_id: i64,
    /// 与 element_index 一起用于关联已发现的元素
    pub element_type: Option<ElementType>,
    pub element_index: Option<String>,
    pub val: Option<String>,
    pub cval: Option<String>,
    pub duration_ms: i64,
    pub err: Option<String>,
    pub dt: DateTime<Utc>,
}

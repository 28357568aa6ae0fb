use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{MonitorError, MonitorResult};

/// 任务：把一个节点组绑定到一个请求组
///
/// 组被删除后对应的外键会被置空，调度时作为解析失败处理。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: i64,
    pub name: String,
    pub node_group_id: Option<i64>,
    pub request_group_id: Option<i64>,
    pub manage: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn new(name: impl Into<String>, node_group_id: i64, request_group_id: i64) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            name: name.into(),
            node_group_id: Some(node_group_id),
            request_group_id: Some(request_group_id),
            manage: true,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CrontabStatus {
    Active,
    Inactive,
}

impl CrontabStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CrontabStatus::Active => "ACTIVE",
            CrontabStatus::Inactive => "INACTIVE",
        }
    }

    /// 数据库中除 `ACTIVE` 以外的任何状态都视为不可调度
    pub fn from_db(value: &str) -> Self {
        if value.eq_ignore_ascii_case("ACTIVE") {
            CrontabStatus::Active
        } else {
            CrontabStatus::Inactive
        }
    }
}

/// 调度间隔
///
/// 三个字段表示最小运行间隔，取最高位的非零字段（天 > 小时 > 分钟）。
/// 全部为零或为空时按1分钟处理。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recurrence {
    pub minutes: Option<i32>,
    pub hours: Option<i32>,
    pub days: Option<i32>,
}

impl Recurrence {
    pub fn every_minutes(minutes: i32) -> Self {
        Self {
            minutes: Some(minutes),
            ..Default::default()
        }
    }

    pub fn every_hours(hours: i32) -> Self {
        Self {
            hours: Some(hours),
            ..Default::default()
        }
    }

    pub fn every_days(days: i32) -> Self {
        Self {
            days: Some(days),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> MonitorResult<()> {
        for (field, value) in [
            ("minutes", self.minutes),
            ("hours", self.hours),
            ("days", self.days),
        ] {
            if let Some(v) = value {
                if v < 0 {
                    return Err(MonitorError::InvalidRecurrence(format!(
                        "{field} 不能为负数: {v}"
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn spacing(&self) -> Duration {
        let positive = |v: Option<i32>| v.filter(|v| *v > 0).map(i64::from);
        if let Some(days) = positive(self.days) {
            Duration::days(days)
        } else if let Some(hours) = positive(self.hours) {
            Duration::hours(hours)
        } else if let Some(minutes) = positive(self.minutes) {
            Duration::minutes(minutes)
        } else {
            Duration::minutes(1)
        }
    }
}

/// 任务的调度定义及其认领状态
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CrontabEntry {
    pub id: i64,
    pub task_id: i64,
    pub minutes: Option<i32>,
    pub hours: Option<i32>,
    pub days: Option<i32>,
    /// 最早运行时间，未来时间表示尚未生效
    pub startdt: Option<DateTime<Utc>>,
    /// 最近一次认领时间
    pub lastdt: Option<DateTime<Utc>>,
    pub status: CrontabStatus,
    /// 执行器亲和标签，为空或 `ANY` 表示任意执行器
    pub agent: Option<String>,
    /// 最近一次运行的日志ID
    pub j_id: Option<i64>,
    pub lease_owner: Option<String>,
    pub lease_expires_at: Option<DateTime<Utc>>,
    /// 每次认领递增，用于比较并交换
    pub claim_version: i64,
}

pub const ANY_AGENT: &str = "ANY";

impl CrontabEntry {
    pub fn new(task_id: i64, recurrence: Recurrence) -> Self {
        Self {
            id: 0,
            task_id,
            minutes: recurrence.minutes,
            hours: recurrence.hours,
            days: recurrence.days,
            startdt: None,
            lastdt: None,
            status: CrontabStatus::Active,
            agent: None,
            j_id: None,
            lease_owner: None,
            lease_expires_at: None,
            claim_version: 0,
        }
    }

    pub fn recurrence(&self) -> Recurrence {
        Recurrence {
            minutes: self.minutes,
            hours: self.hours,
            days: self.days,
        }
    }

    pub fn matches_agent(&self, agent: &str) -> bool {
        match self.agent.as_deref() {
            None => true,
            Some(tag) => tag.eq_ignore_ascii_case(ANY_AGENT) || tag == agent,
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.is_due_within(now, Duration::zero())
    }

    /// 允许提前 `tolerance` 到期
    ///
    /// 调度器按固定tick检查，`lastdt` 取自上一次tick醒来的时刻。
    /// 间隔与tick相同时，醒来稍早的tick不应让条目错过整整一个周期。
    pub fn is_due_within(&self, now: DateTime<Utc>, tolerance: Duration) -> bool {
        if self.status != CrontabStatus::Active {
            return false;
        }
        if matches!(self.startdt, Some(start) if start > now) {
            return false;
        }
        match self.lastdt {
            None => true,
            Some(last) => now - last + tolerance >= self.recurrence().spacing(),
        }
    }

    /// 租约仍有效时，上一次运行视为仍在进行
    pub fn lease_is_live(&self, now: DateTime<Utc>) -> bool {
        self.lease_owner.is_some() && matches!(self.lease_expires_at, Some(exp) if exp > now)
    }
}

/// 认领时写入的运行租约
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaseGrant {
    pub owner: String,
    pub expires_at: DateTime<Utc>,
}

/// 认领成功的计划条目
#[derive(Debug, Clone)]
pub struct ClaimedEntry {
    /// 认领后的条目状态（lastdt、租约已更新）
    pub entry: CrontabEntry,
    pub task: Task,
    /// 因租约过期而被标记为放弃的旧日志
    pub abandoned_journal: Option<i64>,
}

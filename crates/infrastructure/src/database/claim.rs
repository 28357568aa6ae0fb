//! 计划条目认领的判定规则，两种后端共用

use chrono::{DateTime, Duration, Utc};

use netmon_core::models::CrontabEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Skip {
    AgentMismatch,
    StillRunning,
    NotDue,
}

impl Skip {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Skip::AgentMismatch => "agent mismatch",
            Skip::StillRunning => "previous run still holds its lease",
            Skip::NotDue => "not due",
        }
    }
}

/// 判断一个条目是否可以尝试认领
///
/// `due_tolerance` 为 `None` 时忽略调度周期和开始时间（单次运行模式），
/// 但仍不会与持有有效租约的运行重叠。
pub(crate) fn evaluate(
    entry: &CrontabEntry,
    agent: &str,
    now: DateTime<Utc>,
    due_tolerance: Option<Duration>,
) -> Result<(), Skip> {
    if !entry.matches_agent(agent) {
        return Err(Skip::AgentMismatch);
    }
    if entry.lease_is_live(now) {
        return Err(Skip::StillRunning);
    }
    if let Some(tolerance) = due_tolerance {
        if !entry.is_due_within(now, tolerance) {
            return Err(Skip::NotDue);
        }
    }
    Ok(())
}

/// 认领成功后条目在内存中的状态
pub(crate) fn claimed_state(
    mut entry: CrontabEntry,
    now: DateTime<Utc>,
    owner: &str,
    expires_at: DateTime<Utc>,
) -> CrontabEntry {
    entry.lastdt = Some(now);
    entry.lease_owner = Some(owner.to_string());
    entry.lease_expires_at = Some(expires_at);
    entry.claim_version += 1;
    entry
}

#[cfg(test)]
mod tests {
    use super::*;
    use netmon_core::models::Recurrence;

    #[test]
    fn test_evaluate() {
        let now = Utc::now();
        let due = Some(Duration::zero());
        let mut entry = CrontabEntry::new(1, Recurrence::every_minutes(5));
        assert_eq!(evaluate(&entry, "a", now, due), Ok(()));

        entry.lastdt = Some(now - Duration::minutes(1));
        assert_eq!(evaluate(&entry, "a", now, due), Err(Skip::NotDue));
        assert_eq!(evaluate(&entry, "a", now, None), Ok(()));

        entry.lastdt = Some(now - Duration::minutes(5) + Duration::milliseconds(3));
        assert_eq!(evaluate(&entry, "a", now, due), Err(Skip::NotDue));
        assert_eq!(evaluate(&entry, "a", now, Some(Duration::seconds(1))), Ok(()));

        entry.lease_owner = Some("other".into());
        entry.lease_expires_at = Some(now + Duration::minutes(10));
        assert_eq!(evaluate(&entry, "a", now, None), Err(Skip::StillRunning));

        entry.agent = Some("b".into());
        assert_eq!(evaluate(&entry, "a", now, None), Err(Skip::AgentMismatch));
    }
}

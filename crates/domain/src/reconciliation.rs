//! 快照对账规划
//!
//! 一次完整扫描即为该节点该类别的全部事实：观测到的键插入或刷新，
//! 之前为 `ACTIVE` 但本次未观测到的键下线。部分扫描只插入和刷新。
//!
//! 规划是纯函数，存储层在一个事务内执行规划结果。

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;

use netmon_core::models::{
    ArpObservation, InterfaceIpObservation, InterfaceObservation, InventoryRecord,
    InventoryStatus, MacObservation, ReconcileOutcome,
};

/// 可对账的观测值
pub trait Observation: Clone + PartialEq + Debug {
    type Key: Eq + Hash + Clone + Debug;

    /// 下线的记录再次出现时，是否复用原记录
    ///
    /// 自然键无条件唯一的类别（接口、接口IP）必须复用；
    /// 唯一性只约束 `ACTIVE` 行的类别（MAC、ARP）插入新行，保留历史。
    const REVIVE_RETIRED: bool;

    fn key(&self) -> Self::Key;
}

impl Observation for InterfaceObservation {
    type Key = i32;
    const REVIVE_RETIRED: bool = true;

    fn key(&self) -> i32 {
        self.if_index
    }
}

impl Observation for InterfaceIpObservation {
    type Key = (i32, String);
    const REVIVE_RETIRED: bool = true;

    fn key(&self) -> (i32, String) {
        (self.if_index, self.ip_address.clone())
    }
}

impl Observation for MacObservation {
    type Key = String;
    const REVIVE_RETIRED: bool = false;

    fn key(&self) -> String {
        self.mac_address.clone()
    }
}

impl Observation for ArpObservation {
    type Key = (String, String);
    const REVIVE_RETIRED: bool = false;

    fn key(&self) -> (String, String) {
        (self.ip_address.clone(), self.mac_address.clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedUpdate<O> {
    pub id: i64,
    pub observation: O,
    /// 原记录为 `INACTIVE`，需要恢复为 `ACTIVE`
    pub reactivate: bool,
    /// 属性有变化；为 `false` 时只推进 `last_seen`
    pub changed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReconcilePlan<O> {
    pub inserts: Vec<O>,
    pub updates: Vec<PlannedUpdate<O>>,
    pub retirements: Vec<i64>,
}

impl<O> ReconcilePlan<O> {
    pub fn outcome(&self) -> ReconcileOutcome {
        ReconcileOutcome {
            inserted: self.inserts.len(),
            updated: self.updates.len(),
            retired: self.retirements.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.inserts.is_empty() && self.updates.is_empty() && self.retirements.is_empty()
    }
}

/// 计算一次扫描的对账动作
///
/// `existing` 是该节点该类别当前的记录，`observed` 是本次扫描结果。
/// 观测值按键去重，先出现者优先。
pub fn plan_reconciliation<O: Observation>(
    existing: &[InventoryRecord<O>],
    observed: &[O],
    complete: bool,
) -> ReconcilePlan<O> {
    let mut by_key: HashMap<O::Key, &InventoryRecord<O>> = HashMap::new();
    for record in existing {
        if !record.is_active() && !O::REVIVE_RETIRED {
            continue;
        }
        let key = record.observation.key();
        let replace = match by_key.get(&key) {
            None => true,
            Some(current) if current.is_active() => false,
            Some(current) => record.is_active() || record.last_seen > current.last_seen,
        };
        if replace {
            by_key.insert(key, record);
        }
    }

    let mut seen_keys = HashSet::new();
    let mut matched_ids = HashSet::new();
    let mut inserts = Vec::new();
    let mut updates = Vec::new();

    for observation in observed {
        let key = observation.key();
        if !seen_keys.insert(key.clone()) {
            continue;
        }
        match by_key.get(&key) {
            Some(record) => {
                matched_ids.insert(record.id);
                updates.push(PlannedUpdate {
                    id: record.id,
                    observation: observation.clone(),
                    reactivate: record.status == InventoryStatus::Inactive,
                    changed: record.observation != *observation,
                });
            }
            None => inserts.push(observation.clone()),
        }
    }

    let retirements = if complete {
        existing
            .iter()
            .filter(|record| record.is_active() && !matched_ids.contains(&record.id))
            .map(|record| record.id)
            .collect()
    } else {
        Vec::new()
    };

    ReconcilePlan {
        inserts,
        updates,
        retirements,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn record<O>(id: i64, observation: O, status: InventoryStatus) -> InventoryRecord<O> {
        let now = Utc::now();
        InventoryRecord {
            id,
            node_id: 1,
            observation,
            first_seen: now - Duration::hours(1),
            last_seen: now - Duration::minutes(id),
            status,
        }
    }

    fn mac(addr: &str, port: i32) -> MacObservation {
        MacObservation {
            mac_address: addr.to_string(),
            port_number: Some(port),
            ..Default::default()
        }
    }

    #[test]
    fn test_full_scan_retires_missing_keys() {
        let existing = vec![
            record(1, InterfaceObservation::new(1), InventoryStatus::Active),
            record(2, InterfaceObservation::new(2), InventoryStatus::Active),
        ];
        let plan = plan_reconciliation(&existing, &[InterfaceObservation::new(1)], true);

        assert!(plan.inserts.is_empty());
        assert_eq!(plan.updates.len(), 1);
        assert_eq!(plan.updates[0].id, 1);
        assert!(!plan.updates[0].changed);
        assert_eq!(plan.retirements, vec![2]);
    }

    #[test]
    fn test_partial_scan_never_retires() {
        let existing = vec![
            record(1, InterfaceObservation::new(1), InventoryStatus::Active),
            record(2, InterfaceObservation::new(2), InventoryStatus::Active),
        ];
        let plan = plan_reconciliation(&existing, &[InterfaceObservation::new(3)], false);

        assert_eq!(plan.inserts, vec![InterfaceObservation::new(3)]);
        assert!(plan.updates.is_empty());
        assert!(plan.retirements.is_empty());
    }

    #[test]
    fn test_attribute_change_is_flagged() {
        let mut observed = InterfaceObservation::new(1);
        observed.oper_status = Some(2);
        let existing = vec![record(
            1,
            InterfaceObservation {
                oper_status: Some(1),
                ..InterfaceObservation::new(1)
            },
            InventoryStatus::Active,
        )];

        let plan = plan_reconciliation(&existing, &[observed.clone()], true);
        assert_eq!(plan.updates.len(), 1);
        assert!(plan.updates[0].changed);
        assert_eq!(plan.updates[0].observation, observed);
    }

    #[test]
    fn test_interface_revived_in_place() {
        let existing = vec![record(
            5,
            InterfaceObservation::new(3),
            InventoryStatus::Inactive,
        )];
        let plan = plan_reconciliation(&existing, &[InterfaceObservation::new(3)], true);

        assert!(plan.inserts.is_empty());
        assert_eq!(plan.updates.len(), 1);
        assert!(plan.updates[0].reactivate);
        assert!(plan.retirements.is_empty());
    }

    #[test]
    fn test_mac_reappearance_inserts_fresh_row() {
        let existing = vec![record(
            7,
            mac("00:1a:2b:3c:4d:5e", 3),
            InventoryStatus::Inactive,
        )];
        let plan = plan_reconciliation(&existing, &[mac("00:1a:2b:3c:4d:5e", 3)], true);

        assert_eq!(plan.inserts.len(), 1);
        assert!(plan.updates.is_empty());
        assert!(plan.retirements.is_empty(), "历史行不应再次下线");
    }

    #[test]
    fn test_duplicate_observations_collapse() {
        let plan = plan_reconciliation::<MacObservation>(
            &[],
            &[mac("00:00:00:00:00:01", 1), mac("00:00:00:00:00:01", 2)],
            true,
        );
        assert_eq!(plan.inserts.len(), 1);
        assert_eq!(plan.inserts[0].port_number, Some(1));
    }

    #[test]
    fn test_active_row_preferred_over_history() {
        let existing = vec![
            record(1, InterfaceObservation::new(1), InventoryStatus::Inactive),
            record(2, InterfaceObservation::new(1), InventoryStatus::Active),
        ];
        let plan = plan_reconciliation(&existing, &[InterfaceObservation::new(1)], true);
        assert_eq!(plan.updates.len(), 1);
        assert_eq!(plan.updates[0].id, 2);
        assert!(!plan.updates[0].reactivate);
        assert!(plan.retirements.is_empty());
    }

    #[test]
    fn test_empty_complete_scan_retires_everything() {
        let existing = vec![
            record(
                1,
                ArpObservation {
                    ip_address: "10.0.0.1".into(),
                    mac_address: "00:00:00:00:00:01".into(),
                    if_index: Some(1),
                },
                InventoryStatus::Active,
            ),
            record(
                2,
                ArpObservation {
                    ip_address: "10.0.0.2".into(),
                    mac_address: "00:00:00:00:00:02".into(),
                    if_index: Some(1),
                },
                InventoryStatus::Inactive,
            ),
        ];
        let plan = plan_reconciliation::<ArpObservation>(&existing, &[], true);
        assert_eq!(plan.retirements, vec![1]);
        assert_eq!(plan.outcome().retired, 1);
    }

    #[test]
    fn test_second_application_is_stable() {
        let observed = vec![InterfaceObservation::new(1), InterfaceObservation::new(2)];
        let first = plan_reconciliation::<InterfaceObservation>(&[], &observed, true);
        assert_eq!(first.outcome().inserted, 2);

        let stored: Vec<_> = first
            .inserts
            .iter()
            .enumerate()
            .map(|(i, o)| record(i as i64 + 1, o.clone(), InventoryStatus::Active))
            .collect();
        let second = plan_reconciliation(&stored, &observed, true);
        assert_eq!(
            second.outcome(),
            ReconcileOutcome {
                inserted: 0,
                updated: 2,
                retired: 0
            }
        );
        assert!(second.updates.iter().all(|u| !u.changed && !u.reactivate));
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::AddAssign;
use std::str::FromStr;

use super::ElementType;
use crate::errors::MonitorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InventoryStatus {
    Active,
    Inactive,
}

impl InventoryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InventoryStatus::Active => "ACTIVE",
            InventoryStatus::Inactive => "INACTIVE",
        }
    }
}

impl FromStr for InventoryStatus {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(InventoryStatus::Active),
            "INACTIVE" => Ok(InventoryStatus::Inactive),
            other => Err(MonitorError::Serialization(format!(
                "未知的清单状态: {other}"
            ))),
        }
    }
}

/// 长期清单记录，`observation` 为最近一次观测到的属性
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRecord<O> {
    pub id: i64,
    pub node_id: i64,
    pub observation: O,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub status: InventoryStatus,
}

impl<O> InventoryRecord<O> {
    pub fn is_active(&self) -> bool {
        self.status == InventoryStatus::Active
    }
}

/// ifTable / ifXTable 中的一行
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceObservation {
    pub if_index: i32,
    pub name: Option<String>,
    pub descr: Option<String>,
    pub alias: Option<String>,
    pub if_type: Option<i32>,
    pub mtu: Option<i32>,
    /// bit/s
    pub speed: Option<i64>,
    pub phys_address: Option<String>,
    pub admin_status: Option<i32>,
    pub oper_status: Option<i32>,
    pub last_change: Option<i64>,
}

impl InterfaceObservation {
    pub fn new(if_index: i32) -> Self {
        Self {
            if_index,
            ..Default::default()
        }
    }
}

/// 转发表中学到的MAC地址
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacObservation {
    /// 规范化后的小写冒号格式
    pub mac_address: String,
    pub port_number: Option<i32>,
    pub vlan_id: Option<i32>,
    pub fdb_status: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArpObservation {
    pub ip_address: String,
    pub mac_address: String,
    pub if_index: Option<i32>,
}

/// 接口上配置的IP地址
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceIpObservation {
    pub if_index: i32,
    pub ip_address: String,
    pub netmask: Option<String>,
}

pub type InterfaceRecord = InventoryRecord<InterfaceObservation>;
pub type MacRecord = InventoryRecord<MacObservation>;
pub type ArpRecord = InventoryRecord<ArpObservation>;
pub type InterfaceIpRecord = InventoryRecord<InterfaceIpObservation>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InventoryClass {
    Interface,
    MacAddress,
    ArpEntry,
    InterfaceIp,
}

impl fmt::Display for InventoryClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InventoryClass::Interface => "interface",
            InventoryClass::MacAddress => "mac_address",
            InventoryClass::ArpEntry => "arp_entry",
            InventoryClass::InterfaceIp => "interface_ip",
        };
        f.write_str(name)
    }
}

/// 一个节点、一个清单类别的一次扫描结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InventorySnapshot {
    Interfaces(Vec<InterfaceObservation>),
    MacAddresses(Vec<MacObservation>),
    ArpEntries(Vec<ArpObservation>),
    InterfaceIps(Vec<InterfaceIpObservation>),
}

impl InventorySnapshot {
    pub fn class(&self) -> InventoryClass {
        match self {
            InventorySnapshot::Interfaces(_) => InventoryClass::Interface,
            InventorySnapshot::MacAddresses(_) => InventoryClass::MacAddress,
            InventorySnapshot::ArpEntries(_) => InventoryClass::ArpEntry,
            InventorySnapshot::InterfaceIps(_) => InventoryClass::InterfaceIp,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            InventorySnapshot::Interfaces(v) => v.len(),
            InventorySnapshot::MacAddresses(v) => v.len(),
            InventorySnapshot::ArpEntries(v) => v.len(),
            InventorySnapshot::InterfaceIps(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileOutcome {
    pub inserted: usize,
    pub updated: usize,
    pub retired: usize,
}

impl ReconcileOutcome {
    pub fn total(&self) -> usize {
        self.inserted + self.updated + self.retired
    }
}

impl AddAssign for ReconcileOutcome {
    fn add_assign(&mut self, rhs: Self) {
        self.inserted += rhs.inserted;
        self.updated += rhs.updated;
        self.retired += rhs.retired;
    }
}

/// 节点下发现的子对象（例如接口），只做软删除
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: i64,
    pub node_id: i64,
    pub element_type: ElementType,
    pub idx: String,
    pub name: Option<String>,
    pub deleted: bool,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 被监控的网络设备
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    pub id: i64,
    pub name: String,
    /// 设备地址，全局唯一
    pub ip_address: String,
    pub community: String,
    /// `false` 时该节点不参与调度
    pub manage: bool,
    /// SNMP请求超时（毫秒），为空时使用全局默认值
    pub timeout_ms: Option<i32>,
    pub sys_name: Option<String>,
    pub sys_object_id: Option<String>,
    /// 最近一次成功的SNMP通信时间
    pub snmp_last_dt: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Node {
    pub fn new(name: impl Into<String>, ip_address: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            name: name.into(),
            ip_address: ip_address.into(),
            community: "public".to_string(),
            manage: true,
            timeout_ms: None,
            sys_name: None,
            sys_object_id: None,
            snmp_last_dt: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn entity_description(&self) -> String {
        format!("节点 '{}' ({}, ID: {})", self.name, self.ip_address, self.id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeGroup {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NodeGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            description: None,
            created_at: Utc::now(),
        }
    }
}

/// health 处理器从 system 组解析出的节点信息
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeHealth {
    pub sys_name: Option<String>,
    pub sys_object_id: Option<String>,
    /// sysUpTime，单位为百分之一秒
    pub sys_uptime: Option<i64>,
}

impl NodeHealth {
    pub fn is_empty(&self) -> bool {
        self.sys_name.is_none() && self.sys_object_id.is_none() && self.sys_uptime.is_none()
    }
}

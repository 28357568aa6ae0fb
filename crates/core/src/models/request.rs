use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::MonitorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestType {
    /// 单值读取
    Get,
    /// 表遍历，结果按OID后缀展开为多行
    Walk,
}

impl RequestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestType::Get => "GET",
            RequestType::Walk => "WALK",
        }
    }
}

impl FromStr for RequestType {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(RequestType::Get),
            "WALK" => Ok(RequestType::Walk),
            other => Err(MonitorError::Serialization(format!(
                "未知的请求类型: {other}"
            ))),
        }
    }
}

/// 单个采集目标（一个OID）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Request {
    pub id: i64,
    pub name: String,
    pub oid: String,
    pub request_type: RequestType,
    pub prefix: Option<String>,
    pub postfix: Option<String>,
    pub manage: bool,
    pub created_at: DateTime<Utc>,
}

impl Request {
    pub fn new(name: impl Into<String>, oid: impl Into<String>, request_type: RequestType) -> Self {
        Self {
            id: 0,
            name: name.into(),
            oid: oid.into(),
            request_type,
            prefix: None,
            postfix: None,
            manage: true,
            created_at: Utc::now(),
        }
    }

    /// 按前缀/后缀拼出计算值；两者都未配置时返回 `None`
    pub fn shape_value(&self, value: &str) -> Option<String> {
        if self.prefix.is_none() && self.postfix.is_none() {
            return None;
        }
        Some(format!(
            "{}{}{}",
            self.prefix.as_deref().unwrap_or_default(),
            value,
            self.postfix.as_deref().unwrap_or_default()
        ))
    }
}

/// 结果解释策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandlerKind {
    Snmp,
    InterfaceDiscovery,
    MacTable,
    ArpTable,
    IpAddress,
    Health,
}

impl HandlerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HandlerKind::Snmp => "snmp",
            HandlerKind::InterfaceDiscovery => "interface_discovery",
            HandlerKind::MacTable => "mac_table",
            HandlerKind::ArpTable => "arp_table",
            HandlerKind::IpAddress => "ip_address",
            HandlerKind::Health => "health",
        }
    }
}

impl fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HandlerKind {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "snmp" => Ok(HandlerKind::Snmp),
            "interface_discovery" => Ok(HandlerKind::InterfaceDiscovery),
            "mac_table" => Ok(HandlerKind::MacTable),
            "arp_table" | "arp" => Ok(HandlerKind::ArpTable),
            "ip_address" => Ok(HandlerKind::IpAddress),
            "health" => Ok(HandlerKind::Health),
            other => Err(MonitorError::Serialization(format!(
                "未知的处理器类型: {other}"
            ))),
        }
    }
}

/// 请求组结果所描述的对象类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    Generic,
    Interface,
    MacAddress,
    ArpEntry,
    InterfaceIp,
}

impl ElementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::Generic => "generic",
            ElementType::Interface => "interface",
            ElementType::MacAddress => "mac_address",
            ElementType::ArpEntry => "arp_entry",
            ElementType::InterfaceIp => "interface_ip",
        }
    }

    pub fn is_inventory(&self) -> bool {
        !matches!(self, ElementType::Generic)
    }
}

impl FromStr for ElementType {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "generic" => Ok(ElementType::Generic),
            "interface" => Ok(ElementType::Interface),
            "mac_address" | "mac" => Ok(ElementType::MacAddress),
            "arp_entry" | "arp" => Ok(ElementType::ArpEntry),
            "interface_ip" => Ok(ElementType::InterfaceIp),
            other => Err(MonitorError::Serialization(format!(
                "未知的元素类型: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RequestGroup {
    pub id: i64,
    pub name: String,
    pub handler: HandlerKind,
    pub element_type: ElementType,
    /// 请求组是否完整遍历其范围；只有完整遍历才允许下线未观测到的记录
    pub full_walk: bool,
    pub manage: bool,
    pub created_at: DateTime<Utc>,
}

impl RequestGroup {
    pub fn new(name: impl Into<String>, handler: HandlerKind, element_type: ElementType) -> Self {
        Self {
            id: 0,
            name: name.into(),
            handler,
            element_type,
            full_walk: false,
            manage: true,
            created_at: Utc::now(),
        }
    }
}

/// 请求组中的一个成员，带有组内顺序和超时覆盖
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupRequest {
    pub request: Request,
    pub position: i32,
    pub timeout_ms: Option<i32>,
}

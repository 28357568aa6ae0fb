//! 结果处理器：把一个节点的原始扫描结果解释为清单观测值
//!
//! 列通过OID前缀识别，与请求在组内的顺序无关；无法识别的行被忽略，
//! 原始值仍然会作为结果行记录下来。

pub mod arp;
pub mod health;
pub mod interface;
pub mod ip_address;
pub mod mac_table;

use netmon_core::models::{
    ElementType, HandlerKind, InventorySnapshot, NodeHealth, NodeScan, PollValue, RequestGroup,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Interpretation {
    Inventory(InventorySnapshot),
    Health(NodeHealth),
    /// 只记录原始结果
    Raw,
}

/// `snmp` 处理器的请求组按元素类型选择解释方式
pub fn effective_handler(group: &RequestGroup) -> HandlerKind {
    match (group.handler, group.element_type) {
        (HandlerKind::Snmp, ElementType::Interface) => HandlerKind::InterfaceDiscovery,
        (HandlerKind::Snmp, ElementType::MacAddress) => HandlerKind::MacTable,
        (HandlerKind::Snmp, ElementType::ArpEntry) => HandlerKind::ArpTable,
        (HandlerKind::Snmp, ElementType::InterfaceIp) => HandlerKind::IpAddress,
        (handler, _) => handler,
    }
}

pub fn interpret(group: &RequestGroup, scan: &NodeScan) -> Interpretation {
    match effective_handler(group) {
        HandlerKind::InterfaceDiscovery => {
            Interpretation::Inventory(InventorySnapshot::Interfaces(interface::parse(scan)))
        }
        HandlerKind::MacTable => {
            Interpretation::Inventory(InventorySnapshot::MacAddresses(mac_table::parse(scan)))
        }
        HandlerKind::ArpTable => {
            Interpretation::Inventory(InventorySnapshot::ArpEntries(arp::parse(scan)))
        }
        HandlerKind::IpAddress => {
            Interpretation::Inventory(InventorySnapshot::InterfaceIps(ip_address::parse(scan)))
        }
        HandlerKind::Health => Interpretation::Health(health::parse(scan)),
        HandlerKind::Snmp => Interpretation::Raw,
    }
}

/// 成功请求返回的全部 (oid, value)，标量结果使用请求自身的OID
pub(crate) fn varbinds(scan: &NodeScan) -> impl Iterator<Item = (&str, &str)> {
    scan.items
        .iter()
        .filter(|item| item.outcome.error.is_none())
        .flat_map(|item| {
            let rows: Vec<(&str, &str)> = match &item.outcome.value {
                Some(PollValue::Scalar(value)) => vec![(item.request.oid.as_str(), value.as_str())],
                Some(PollValue::Table(rows)) => rows
                    .iter()
                    .map(|vb| (vb.oid.as_str(), vb.value.as_str()))
                    .collect(),
                None => Vec::new(),
            };
            rows
        })
}

#[cfg(test)]
pub(crate) mod test_support {
    use netmon_core::models::{
        Node, NodeScan, PollOutcome, PollValue, Request, RequestType, ScanItem, VarBind,
    };
    use std::time::Duration;

    pub fn walk(oid: &str, rows: &[(&str, &str)]) -> ScanItem {
        ScanItem {
            request: Request::new(oid, oid, RequestType::Walk),
            outcome: PollOutcome::success(
                PollValue::Table(rows.iter().map(|(o, v)| VarBind::new(*o, *v)).collect()),
                Duration::from_millis(5),
            ),
        }
    }

    pub fn get(oid: &str, value: &str) -> ScanItem {
        ScanItem {
            request: Request::new(oid, oid, RequestType::Get),
            outcome: PollOutcome::success(
                PollValue::Scalar(value.to_string()),
                Duration::from_millis(5),
            ),
        }
    }

    pub fn failed(oid: &str) -> ScanItem {
        ScanItem {
            request: Request::new(oid, oid, RequestType::Walk),
            outcome: PollOutcome::failure("Timeout", Duration::from_millis(500)),
        }
    }

    pub fn scan(items: Vec<ScanItem>) -> NodeScan {
        NodeScan {
            node: Node::new("sw1", "10.0.0.1"),
            items,
        }
    }
}

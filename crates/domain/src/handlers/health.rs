use netmon_core::models::{NodeHealth, NodeScan};

use super::varbinds;
use crate::value_objects::{clean_string, parse_snmp_int, trim_oid};

const SYS_OBJECT_ID: &str = "1.3.6.1.2.1.1.2";
const SYS_UPTIME: &str = "1.3.6.1.2.1.1.3";
const SYS_NAME: &str = "1.3.6.1.2.1.1.5";

/// 解析 system 组中的设备标识
pub fn parse(scan: &NodeScan) -> NodeHealth {
    let mut health = NodeHealth::default();

    for (oid, value) in varbinds(scan) {
        let oid = trim_oid(oid);
        let scalar = oid.strip_suffix(".0").unwrap_or(oid);
        let text = Some(clean_string(value)).filter(|s| !s.is_empty());
        match scalar {
            SYS_NAME => health.sys_name = text,
            SYS_OBJECT_ID => health.sys_object_id = text.map(|s| s.trim_start_matches('.').to_string()),
            SYS_UPTIME => health.sys_uptime = parse_snmp_int(value),
            _ => {}
        }
    }

    health
}

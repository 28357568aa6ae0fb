use std::collections::BTreeMap;

use netmon_core::models::{InterfaceObservation, NodeScan};

use super::varbinds;
use crate::value_objects::{clean_string, normalize_mac, oid_suffix, parse_snmp_int};

const IF_INDEX: &str = "1.3.6.1.2.1.2.2.1.1";
const IF_DESCR: &str = "1.3.6.1.2.1.2.2.1.2";
const IF_TYPE: &str = "1.3.6.1.2.1.2.2.1.3";
const IF_MTU: &str = "1.3.6.1.2.1.2.2.1.4";
const IF_SPEED: &str = "1.3.6.1.2.1.2.2.1.5";
const IF_PHYS_ADDRESS: &str = "1.3.6.1.2.1.2.2.1.6";
const IF_ADMIN_STATUS: &str = "1.3.6.1.2.1.2.2.1.7";
const IF_OPER_STATUS: &str = "1.3.6.1.2.1.2.2.1.8";
const IF_LAST_CHANGE: &str = "1.3.6.1.2.1.2.2.1.9";
const IF_NAME: &str = "1.3.6.1.2.1.31.1.1.1.1";
const IF_HIGH_SPEED: &str = "1.3.6.1.2.1.31.1.1.1.15";
const IF_ALIAS: &str = "1.3.6.1.2.1.31.1.1.1.18";

/// ifSpeed 饱和值，实际速率需要看 ifHighSpeed
const IF_SPEED_SATURATED: i64 = 4_294_967_295;

const COLUMNS: [&str; 12] = [
    IF_INDEX,
    IF_DESCR,
    IF_TYPE,
    IF_MTU,
    IF_SPEED,
    IF_PHYS_ADDRESS,
    IF_ADMIN_STATUS,
    IF_OPER_STATUS,
    IF_LAST_CHANGE,
    IF_NAME,
    IF_HIGH_SPEED,
    IF_ALIAS,
];

/// 按 ifIndex 汇总 ifTable / ifXTable 的各列
pub fn parse(scan: &NodeScan) -> Vec<InterfaceObservation> {
    let mut interfaces: BTreeMap<i32, InterfaceObservation> = BTreeMap::new();
    let mut high_speed: BTreeMap<i32, i64> = BTreeMap::new();

    for (oid, value) in varbinds(scan) {
        let Some((column, index)) = COLUMNS
            .iter()
            .find_map(|column| oid_suffix(column, oid).map(|suffix| (*column, suffix)))
        else {
            continue;
        };
        let Ok(if_index) = index.parse::<i32>() else {
            continue;
        };

        let entry = interfaces
            .entry(if_index)
            .or_insert_with(|| InterfaceObservation::new(if_index));
        let int = || parse_snmp_int(value);
        let text = || Some(clean_string(value)).filter(|s| !s.is_empty());

        match column {
            IF_DESCR => entry.descr = text(),
            IF_TYPE => entry.if_type = int().and_then(|v| i32::try_from(v).ok()),
            IF_MTU => entry.mtu = int().and_then(|v| i32::try_from(v).ok()),
            IF_SPEED => entry.speed = int(),
            IF_PHYS_ADDRESS => entry.phys_address = normalize_mac(value),
            IF_ADMIN_STATUS => entry.admin_status = int().and_then(|v| i32::try_from(v).ok()),
            IF_OPER_STATUS => entry.oper_status = int().and_then(|v| i32::try_from(v).ok()),
            IF_LAST_CHANGE => entry.last_change = int(),
            IF_NAME => entry.name = text(),
            IF_ALIAS => entry.alias = text(),
            IF_HIGH_SPEED => {
                if let Some(mbps) = int() {
                    high_speed.insert(if_index, mbps);
                }
            }
            _ => {}
        }
    }

    for (if_index, mbps) in high_speed {
        if let Some(entry) = interfaces.get_mut(&if_index) {
            if entry.speed.is_none() || entry.speed == Some(IF_SPEED_SATURATED) {
                entry.speed = Some(mbps * 1_000_000);
            }
        }
    }

    interfaces.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::*;

    #[test]
    fn test_columns_merge_by_index() {
        let s = scan(vec![
            walk(
                IF_DESCR,
                &[
                    (".1.3.6.1.2.1.2.2.1.2.1", "GigabitEthernet0/1"),
                    (".1.3.6.1.2.1.2.2.1.2.2", "GigabitEthernet0/2"),
                ],
            ),
            walk(
                IF_OPER_STATUS,
                &[
                    (".1.3.6.1.2.1.2.2.1.8.1", "up(1)"),
                    (".1.3.6.1.2.1.2.2.1.8.2", "2"),
                ],
            ),
            walk(
                IF_PHYS_ADDRESS,
                &[(".1.3.6.1.2.1.2.2.1.6.1", "0:1a:2b:3c:4d:5e")],
            ),
            walk(IF_ALIAS, &[(".1.3.6.1.2.1.31.1.1.1.18.2", "uplink")]),
        ]);

        let interfaces = parse(&s);
        assert_eq!(interfaces.len(), 2);
        assert_eq!(interfaces[0].if_index, 1);
        assert_eq!(interfaces[0].descr.as_deref(), Some("GigabitEthernet0/1"));
        assert_eq!(interfaces[0].oper_status, Some(1));
        assert_eq!(
            interfaces[0].phys_address.as_deref(),
            Some("00:1a:2b:3c:4d:5e")
        );
        assert_eq!(interfaces[1].oper_status, Some(2));
        assert_eq!(interfaces[1].alias.as_deref(), Some("uplink"));
    }

    #[test]
    fn test_high_speed_replaces_saturated_speed() {
        let s = scan(vec![
            walk(IF_SPEED, &[("1.3.6.1.2.1.2.2.1.5.10", "4294967295")]),
            walk(IF_HIGH_SPEED, &[("1.3.6.1.2.1.31.1.1.1.15.10", "10000")]),
        ]);
        let interfaces = parse(&s);
        assert_eq!(interfaces[0].speed, Some(10_000_000_000));
    }

    #[test]
    fn test_unrelated_columns_ignored() {
        let s = scan(vec![walk(
            "1.3.6.1.2.1.2.2.1.10",
            &[("1.3.6.1.2.1.2.2.1.10.1", "123456")],
        )]);
        assert!(parse(&s).is_empty());
    }

    #[test]
    fn test_get_request_uses_request_oid() {
        let s = scan(vec![get("1.3.6.1.2.1.2.2.1.2.4", "Vlan1")]);
        let interfaces = parse(&s);
        assert_eq!(interfaces.len(), 1);
        assert_eq!(interfaces[0].if_index, 4);
        assert_eq!(interfaces[0].descr.as_deref(), Some("Vlan1"));
    }
}

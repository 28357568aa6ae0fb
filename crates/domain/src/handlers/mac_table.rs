use std::collections::BTreeMap;

use netmon_core::models::{MacObservation, NodeScan};

use super::varbinds;
use crate::value_objects::{
    mac_from_decimal_octets, normalize_mac, oid_suffix, parse_oid_index, parse_snmp_int,
};

const DOT1D_FDB_ADDRESS: &str = "1.3.6.1.2.1.17.4.3.1.1";
const DOT1D_FDB_PORT: &str = "1.3.6.1.2.1.17.4.3.1.2";
const DOT1D_FDB_STATUS: &str = "1.3.6.1.2.1.17.4.3.1.3";
const DOT1Q_FDB_PORT: &str = "1.3.6.1.2.1.17.7.1.2.2.1.2";
const DOT1Q_FDB_STATUS: &str = "1.3.6.1.2.1.17.7.1.2.2.1.3";

/// dot1dTpFdbStatus / dot1qTpFdbStatus: invalid(2)
const FDB_STATUS_INVALID: i32 = 2;

enum Column {
    Address,
    Port,
    Status,
}

/// 解析 BRIDGE-MIB / Q-BRIDGE-MIB 转发表
///
/// dot1d 表的索引是6个十进制字节；dot1q 表在前面多一个 FDB ID，按VLAN记录。
/// 同一MAC出现在多个VLAN时只保留第一条。
pub fn parse(scan: &NodeScan) -> Vec<MacObservation> {
    let mut entries: BTreeMap<String, MacObservation> = BTreeMap::new();

    for (oid, value) in varbinds(scan) {
        let (column, index, vlan_aware) = if let Some(i) = oid_suffix(DOT1D_FDB_ADDRESS, oid) {
            (Column::Address, i, false)
        } else if let Some(i) = oid_suffix(DOT1D_FDB_PORT, oid) {
            (Column::Port, i, false)
        } else if let Some(i) = oid_suffix(DOT1D_FDB_STATUS, oid) {
            (Column::Status, i, false)
        } else if let Some(i) = oid_suffix(DOT1Q_FDB_PORT, oid) {
            (Column::Port, i, true)
        } else if let Some(i) = oid_suffix(DOT1Q_FDB_STATUS, oid) {
            (Column::Status, i, true)
        } else {
            continue;
        };

        let Some(octets) = parse_oid_index(index) else {
            continue;
        };
        let (vlan_id, mac_octets) = match (vlan_aware, octets.split_first()) {
            (true, Some((fdb_id, rest))) => (i32::try_from(*fdb_id).ok(), rest),
            (true, None) => continue,
            (false, _) => (None, octets.as_slice()),
        };

        let mac = match column {
            Column::Address => normalize_mac(value).or_else(|| mac_from_decimal_octets(mac_octets)),
            _ => mac_from_decimal_octets(mac_octets),
        };
        let Some(mac) = mac else {
            continue;
        };

        let entry = entries
            .entry(mac.clone())
            .or_insert_with(|| MacObservation {
                mac_address: mac,
                vlan_id,
                ..Default::default()
            });
        if entry.vlan_id != vlan_id && vlan_id.is_some() && entry.vlan_id.is_some() {
            continue;
        }
        if entry.vlan_id.is_none() {
            entry.vlan_id = vlan_id;
        }

        let number = parse_snmp_int(value).and_then(|v| i32::try_from(v).ok());
        match column {
            Column::Address => {}
            Column::Port => entry.port_number = number,
            Column::Status => entry.fdb_status = number,
        }
    }

    entries
        .into_values()
        .filter(|entry| entry.fdb_status != Some(FDB_STATUS_INVALID))
        .collect()
}

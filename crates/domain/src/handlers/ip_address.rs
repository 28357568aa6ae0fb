use std::collections::BTreeMap;

use netmon_core::models::{InterfaceIpObservation, NodeScan};

use super::varbinds;
use crate::value_objects::{clean_string, ipv4_from_octets, oid_suffix, parse_oid_index, parse_snmp_int};

const IP_AD_ENT_IF_INDEX: &str = "1.3.6.1.2.1.4.20.1.2";
const IP_AD_ENT_NET_MASK: &str = "1.3.6.1.2.1.4.20.1.3";

/// 解析 ipAddrTable，索引为IP地址本身
pub fn parse(scan: &NodeScan) -> Vec<InterfaceIpObservation> {
    let mut if_indexes: BTreeMap<String, i32> = BTreeMap::new();
    let mut masks: BTreeMap<String, String> = BTreeMap::new();

    for (oid, value) in varbinds(scan) {
        if let Some(ip) = oid_suffix(IP_AD_ENT_IF_INDEX, oid).and_then(address) {
            if let Some(if_index) = parse_snmp_int(value).and_then(|v| i32::try_from(v).ok()) {
                if_indexes.insert(ip, if_index);
            }
        } else if let Some(ip) = oid_suffix(IP_AD_ENT_NET_MASK, oid).and_then(address) {
            let mask = clean_string(value);
            if !mask.is_empty() {
                masks.insert(ip, mask);
            }
        }
    }

    if_indexes
        .into_iter()
        .map(|(ip, if_index)| InterfaceIpObservation {
            if_index,
            netmask: masks.get(&ip).cloned(),
            ip_address: ip,
        })
        .collect()
}

fn address(index: &str) -> Option<String> {
    ipv4_from_octets(&parse_oid_index(index)?)
}

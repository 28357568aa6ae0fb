use std::collections::BTreeMap;

use netmon_core::models::{ArpObservation, NodeScan};

use super::varbinds;
use crate::value_objects::{
    ipv4_from_octets, normalize_mac, oid_suffix, parse_oid_index, parse_snmp_int,
};

const IP_NET_TO_MEDIA_PHYS_ADDRESS: &str = "1.3.6.1.2.1.4.22.1.2";
const IP_NET_TO_MEDIA_TYPE: &str = "1.3.6.1.2.1.4.22.1.4";

/// ipNetToMediaType: invalid(2)
const MEDIA_TYPE_INVALID: i64 = 2;

/// 解析 ipNetToMediaTable，索引为 `<ifIndex>.<a.b.c.d>`
pub fn parse(scan: &NodeScan) -> Vec<ArpObservation> {
    let mut entries: BTreeMap<(String, String), ArpObservation> = BTreeMap::new();
    let mut invalid: Vec<(i32, String)> = Vec::new();

    for (oid, value) in varbinds(scan) {
        if let Some(index) = oid_suffix(IP_NET_TO_MEDIA_PHYS_ADDRESS, oid) {
            let Some((if_index, ip)) = split_index(index) else {
                continue;
            };
            let Some(mac) = normalize_mac(value) else {
                continue;
            };
            entries
                .entry((ip.clone(), mac.clone()))
                .or_insert(ArpObservation {
                    ip_address: ip,
                    mac_address: mac,
                    if_index: Some(if_index),
                });
        } else if let Some(index) = oid_suffix(IP_NET_TO_MEDIA_TYPE, oid) {
            if parse_snmp_int(value) == Some(MEDIA_TYPE_INVALID) {
                if let Some(key) = split_index(index) {
                    invalid.push(key);
                }
            }
        }
    }

    entries
        .into_values()
        .filter(|entry| {
            !invalid
                .iter()
                .any(|(idx, ip)| entry.if_index == Some(*idx) && entry.ip_address == *ip)
        })
        .collect()
}

fn split_index(index: &str) -> Option<(i32, String)> {
    let parts = parse_oid_index(index)?;
    let (if_index, address) = parts.split_first()?;
    Some((i32::try_from(*if_index).ok()?, ipv4_from_octets(address)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::*;

    #[test]
    fn test_arp_entries() {
        let s = scan(vec![
            walk(
                IP_NET_TO_MEDIA_PHYS_ADDRESS,
                &[
                    ("1.3.6.1.2.1.4.22.1.2.3.10.0.0.1", "0:1a:2b:3c:4d:5e"),
                    ("1.3.6.1.2.1.4.22.1.2.3.10.0.0.2", "00:1a:2b:3c:4d:5f"),
                    ("1.3.6.1.2.1.4.22.1.2.3.10.0.0.9", "not-a-mac"),
                ],
            ),
            walk(
                IP_NET_TO_MEDIA_TYPE,
                &[
                    ("1.3.6.1.2.1.4.22.1.4.3.10.0.0.1", "dynamic(3)"),
                    ("1.3.6.1.2.1.4.22.1.4.3.10.0.0.2", "invalid(2)"),
                ],
            ),
        ]);

        let entries = parse(&s);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].ip_address, "10.0.0.1");
        assert_eq!(entries[0].mac_address, "00:1a:2b:3c:4d:5e");
        assert_eq!(entries[0].if_index, Some(3));
    }
}

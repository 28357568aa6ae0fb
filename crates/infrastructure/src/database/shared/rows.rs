/// 为 `$row` 生成 `row_to_*` 映射函数
macro_rules! impl_row_mappers {
    ($row:ty) => {
        use sqlx::Row;

        use netmon_core::models::{
            ArpObservation, CrontabEntry, CrontabStatus, Element, GroupRequest, InterfaceIpObservation,
            InterfaceObservation, InventoryRecord, Journal, MacObservation, Node, NodeGroup, PollResult,
            Request, RequestGroup, Task,
        };
        use netmon_core::MonitorResult;

        pub(crate) fn row_to_node(row: &$row) -> MonitorResult<Node> {
            Ok(Node {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
                ip_address: row.try_get("ip_address")?,
                community: row.try_get("community")?,
                manage: row.try_get("manage")?,
                timeout_ms: row.try_get("timeout_ms")?,
                sys_name: row.try_get("sys_name")?,
                sys_object_id: row.try_get("sys_object_id")?,
                snmp_last_dt: row.try_get("snmp_last_dt")?,
                created_at: row.try_get("created_at")?,
                updated_at: row.try_get("updated_at")?,
            })
        }

        pub(crate) fn row_to_node_group(row: &$row) -> MonitorResult<NodeGroup> {
            Ok(NodeGroup {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
                description: row.try_get("description")?,
                created_at: row.try_get("created_at")?,
            })
        }

        pub(crate) fn row_to_request(row: &$row) -> MonitorResult<Request> {
            let request_type: String = row.try_get("request_type")?;
            Ok(Request {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
                oid: row.try_get("oid")?,
                request_type: request_type.parse()?,
                prefix: row.try_get("prefix")?,
                postfix: row.try_get("postfix")?,
                manage: row.try_get("manage")?,
                created_at: row.try_get("created_at")?,
            })
        }

        pub(crate) fn row_to_group_request(row: &$row) -> MonitorResult<GroupRequest> {
            Ok(GroupRequest {
                request: row_to_request(row)?,
                position: row.try_get("position")?,
                timeout_ms: row.try_get("ref_timeout_ms")?,
            })
        }

        pub(crate) fn row_to_request_group(row: &$row) -> MonitorResult<RequestGroup> {
            let handler: String = row.try_get("handler")?;
            let element_type: String = row.try_get("element_type")?;
            Ok(RequestGroup {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
                handler: handler.parse()?,
                element_type: element_type.parse()?,
                full_walk: row.try_get("full_walk")?,
                manage: row.try_get("manage")?,
                created_at: row.try_get("created_at")?,
            })
        }

        pub(crate) fn row_to_task(row: &$row) -> MonitorResult<Task> {
            Ok(Task {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
                node_group_id: row.try_get("node_group_id")?,
                request_group_id: row.try_get("request_group_id")?,
                manage: row.try_get("manage")?,
                created_at: row.try_get("created_at")?,
                updated_at: row.try_get("updated_at")?,
            })
        }

        pub(crate) fn row_to_crontab(row: &$row) -> MonitorResult<CrontabEntry> {
            let status: String = row.try_get("status")?;
            Ok(CrontabEntry {
                id: row.try_get("id")?,
                task_id: row.try_get("task_id")?,
                minutes: row.try_get("minutes")?,
                hours: row.try_get("hours")?,
                days: row.try_get("days")?,
                startdt: row.try_get("startdt")?,
                lastdt: row.try_get("lastdt")?,
                status: CrontabStatus::from_db(&status),
                agent: row.try_get("agent")?,
                j_id: row.try_get("j_id")?,
                lease_owner: row.try_get("lease_owner")?,
                lease_expires_at: row.try_get("lease_expires_at")?,
                claim_version: row.try_get("claim_version")?,
            })
        }

        pub(crate) fn row_to_journal(row: &$row) -> MonitorResult<Journal> {
            Ok(Journal {
                id: row.try_get("id")?,
                task_id: row.try_get("task_id")?,
                crontab_id: row.try_get("crontab_id")?,
                startdt: row.try_get("startdt")?,
                enddt: row.try_get("enddt")?,
                abandoned: row.try_get("abandoned")?,
            })
        }

        pub(crate) fn row_to_result(row: &$row) -> MonitorResult<PollResult> {
            Ok(PollResult {
                id: row.try_get("id")?,
                journal_id: row.try_get("journal_id")?,
                node_id: row.try_get("node_id")?,
                request_id: row.try_get("request_id")?,
                element_id: row.try_get("element_id")?,
                element_index: row.try_get("element_index")?,
                val: row.try_get("val")?,
                cval: row.try_get("cval")?,
                duration_ms: row.try_get("duration_ms")?,
                err: row.try_get("err")?,
                dt: row.try_get("dt")?,
            })
        }

        pub(crate) fn row_to_element(row: &$row) -> MonitorResult<Element> {
            let element_type: String = row.try_get("element_type")?;
            Ok(Element {
                id: row.try_get("id")?,
                node_id: row.try_get("node_id")?,
                element_type: element_type.parse()?,
                idx: row.try_get("idx")?,
                name: row.try_get("name")?,
                deleted: row.try_get("deleted")?,
                first_seen: row.try_get("first_seen")?,
                last_seen: row.try_get("last_seen")?,
            })
        }

        fn row_to_record<O>(row: &$row, observation: O) -> MonitorResult<InventoryRecord<O>> {
            let status: String = row.try_get("status")?;
            Ok(InventoryRecord {
                id: row.try_get("id")?,
                node_id: row.try_get("node_id")?,
                observation,
                first_seen: row.try_get("first_seen")?,
                last_seen: row.try_get("last_seen")?,
                status: status.parse()?,
            })
        }

        pub(crate) fn row_to_interface(
            row: &$row,
        ) -> MonitorResult<InventoryRecord<InterfaceObservation>> {
            let observation = InterfaceObservation {
                if_index: row.try_get("if_index")?,
                name: row.try_get("name")?,
                descr: row.try_get("descr")?,
                alias: row.try_get("alias")?,
                if_type: row.try_get("if_type")?,
                mtu: row.try_get("mtu")?,
                speed: row.try_get("speed")?,
                phys_address: row.try_get("phys_address")?,
                admin_status: row.try_get("admin_status")?,
                oper_status: row.try_get("oper_status")?,
                last_change: row.try_get("last_change")?,
            };
            row_to_record(row, observation)
        }

        pub(crate) fn row_to_mac(row: &$row) -> MonitorResult<InventoryRecord<MacObservation>> {
            let observation = MacObservation {
                mac_address: row.try_get("mac_address")?,
                port_number: row.try_get("port_number")?,
                vlan_id: row.try_get("vlan_id")?,
                fdb_status: row.try_get("fdb_status")?,
            };
            row_to_record(row, observation)
        }

        pub(crate) fn row_to_arp(row: &$row) -> MonitorResult<InventoryRecord<ArpObservation>> {
            let observation = ArpObservation {
                ip_address: row.try_get("ip_address")?,
                mac_address: row.try_get("mac_address")?,
                if_index: row.try_get("if_index")?,
            };
            row_to_record(row, observation)
        }

        pub(crate) fn row_to_interface_ip(
            row: &$row,
        ) -> MonitorResult<InventoryRecord<InterfaceIpObservation>> {
            let observation = InterfaceIpObservation {
                if_index: row.try_get("if_index")?,
                ip_address: row.try_get("ip_address")?,
                netmask: row.try_get("netmask")?,
            };
            row_to_record(row, observation)
        }
    };
}

pub(crate) use impl_row_mappers;

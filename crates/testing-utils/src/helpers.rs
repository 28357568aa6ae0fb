//! Fixtures and wait helpers shared by integration tests

use std::time::Duration;
use tokio::time::sleep;

use netmon_core::models::{
    CrontabEntry, Node, NodeGroup, Recurrence, Request, RequestGroup, RequestType, Task, VarBind,
};
use netmon_core::traits::InventoryStore;
use netmon_infrastructure::database::SqliteStore;

use crate::mocks::MockCollector;

pub struct TestEnv;

impl TestEnv {
    /// 轮询条件直到成立或超时
    pub async fn wait_for<F, Fut>(mut condition: F, timeout: Duration) -> bool
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = bool>,
    {
        let start = std::time::Instant::now();
        while start.elapsed() < timeout {
            if condition().await {
                return true;
            }
            sleep(Duration::from_millis(20)).await;
        }
        false
    }
}

/// 已初始化表结构的内存SQLite存储
pub async fn sqlite_memory_store() -> anyhow::Result<SqliteStore> {
    Ok(SqliteStore::in_memory().await?)
}

/// 一个任务及其展开后的全部对象
#[derive(Debug, Clone)]
pub struct Topology {
    pub nodes: Vec<Node>,
    pub node_group: NodeGroup,
    pub request_group: RequestGroup,
    pub requests: Vec<Request>,
    pub task: Task,
    pub entry: CrontabEntry,
}

/// 写入节点组、请求组、任务和计划条目
///
/// 请求按传入顺序编号为组内位置。
pub async fn seed_topology(
    store: &dyn InventoryStore,
    addresses: &[&str],
    request_group: RequestGroup,
    requests: Vec<Request>,
    recurrence: Recurrence,
) -> anyhow::Result<Topology> {
    let node_group = store
        .create_node_group(&NodeGroup::new(format!("group-{}", request_group.name)))
        .await?;

    let mut nodes = Vec::with_capacity(addresses.len());
    for address in addresses {
        let node = store
            .create_node(&Node::new(format!("node-{address}"), *address))
            .await?;
        store.add_node_to_group(node_group.id, node.id).await?;
        nodes.push(node);
    }

    let request_group = store.create_request_group(&request_group).await?;
    let mut created = Vec::with_capacity(requests.len());
    for (position, request) in requests.iter().enumerate() {
        let request = store.create_request(request).await?;
        store
            .add_request_to_group(request_group.id, request.id, position as i32 + 1, None)
            .await?;
        created.push(request);
    }

    let task = store
        .create_task(&Task::new(
            format!("poll-{}", request_group.name),
            node_group.id,
            request_group.id,
        ))
        .await?;
    let entry = store
        .create_crontab_entry(&CrontabEntry::new(task.id, recurrence))
        .await?;

    Ok(Topology {
        nodes,
        node_group,
        request_group,
        requests: created,
        task,
        entry,
    })
}

/// IF-MIB 接口发现常用的10个列
pub const INTERFACE_COLUMNS: [(&str, &str); 10] = [
    ("ifIndex", "1.3.6.1.2.1.2.2.1.1"),
    ("ifDescr", "1.3.6.1.2.1.2.2.1.2"),
    ("ifType", "1.3.6.1.2.1.2.2.1.3"),
    ("ifMtu", "1.3.6.1.2.1.2.2.1.4"),
    ("ifSpeed", "1.3.6.1.2.1.2.2.1.5"),
    ("ifPhysAddress", "1.3.6.1.2.1.2.2.1.6"),
    ("ifAdminStatus", "1.3.6.1.2.1.2.2.1.7"),
    ("ifOperStatus", "1.3.6.1.2.1.2.2.1.8"),
    ("ifLastChange", "1.3.6.1.2.1.2.2.1.9"),
    ("ifName", "1.3.6.1.2.1.31.1.1.1.1"),
];

pub fn interface_requests() -> Vec<Request> {
    INTERFACE_COLUMNS
        .iter()
        .map(|(name, oid)| Request::new(*name, *oid, RequestType::Walk))
        .collect()
}

/// 模拟一台设备的接口表，`if_indexes` 中的每个接口都有全部10列
pub fn script_interface_table(collector: &MockCollector, ip_address: &str, if_indexes: &[i32]) {
    for (name, oid) in INTERFACE_COLUMNS {
        let rows = if_indexes
            .iter()
            .map(|index| VarBind::new(format!("{oid}.{index}"), interface_value(name, *index)))
            .collect();
        collector.respond_walk(ip_address, oid, rows);
    }
}

fn interface_value(column: &str, if_index: i32) -> String {
    match column {
        "ifIndex" => if_index.to_string(),
        "ifDescr" => format!("GigabitEthernet0/{if_index}"),
        "ifType" => "6".to_string(),
        "ifMtu" => "1500".to_string(),
        "ifSpeed" => "1000000000".to_string(),
        "ifPhysAddress" => format!("0:1b:21:0:0:{if_index:x}"),
        "ifAdminStatus" => "1".to_string(),
        "ifOperStatus" => "1".to_string(),
        "ifLastChange" => "12345".to_string(),
        "ifName" => format!("Gi0/{if_index}"),
        _ => String::new(),
    }
}

//! 清单存储接口
//!
//! 存储层只提供类型化的数据访问，不包含调度或执行策略。
//! PostgreSQL 与 SQLite 两种后端实现同一组接口，组合为 [`InventoryStore`]。

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::errors::MonitorResult;
use crate::models::{
    ArpRecord, ClaimedEntry, CrontabEntry, Element, GroupRequest, InterfaceIpRecord,
    InterfaceRecord, InventorySnapshot, Journal, LeaseGrant, MacRecord, NewPollResult, Node,
    NodeGroup, NodeHealth, PollResult, ReconcileOutcome, Request, RequestGroup, Task,
};

#[async_trait]
pub trait NodeRepository: Send + Sync {
    async fn create_node(&self, node: &Node) -> MonitorResult<Node>;
    async fn get_node(&self, id: i64) -> MonitorResult<Option<Node>>;
    async fn get_node_by_address(&self, ip_address: &str) -> MonitorResult<Option<Node>>;
    async fn list_nodes(&self) -> MonitorResult<Vec<Node>>;
    async fn set_node_managed(&self, id: i64, manage: bool) -> MonitorResult<()>;
    /// 删除节点，级联删除其元素、结果、清单记录和组成员关系
    async fn delete_node(&self, id: i64) -> MonitorResult<()>;

    async fn create_node_group(&self, group: &NodeGroup) -> MonitorResult<NodeGroup>;
    async fn get_node_group(&self, id: i64) -> MonitorResult<Option<NodeGroup>>;
    async fn add_node_to_group(&self, group_id: i64, node_id: i64) -> MonitorResult<()>;
    /// 组内全部节点（含未管理的），按ID排序
    async fn list_group_nodes(&self, group_id: i64) -> MonitorResult<Vec<Node>>;

    /// 节点至少有一个请求成功时推进最近通信时间
    async fn touch_node_contact(&self, node_id: i64, at: DateTime<Utc>) -> MonitorResult<()>;
    async fn update_node_health(
        &self,
        node_id: i64,
        health: &NodeHealth,
        at: DateTime<Utc>,
    ) -> MonitorResult<()>;
}

#[async_trait]
pub trait RequestRepository: Send + Sync {
    async fn create_request(&self, request: &Request) -> MonitorResult<Request>;
    async fn get_request(&self, id: i64) -> MonitorResult<Option<Request>>;

    async fn create_request_group(&self, group: &RequestGroup) -> MonitorResult<RequestGroup>;
    async fn get_request_group(&self, id: i64) -> MonitorResult<Option<RequestGroup>>;
    async fn set_request_group_managed(&self, id: i64, manage: bool) -> MonitorResult<()>;
    async fn delete_request_group(&self, id: i64) -> MonitorResult<()>;
    async fn add_request_to_group(
        &self,
        group_id: i64,
        request_id: i64,
        position: i32,
        timeout_ms: Option<i32>,
    ) -> MonitorResult<()>;
    /// 组内请求，按组内顺序排列
    async fn list_group_requests(&self, group_id: i64) -> MonitorResult<Vec<GroupRequest>>;
}

#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn create_task(&self, task: &Task) -> MonitorResult<Task>;
    async fn get_task(&self, id: i64) -> MonitorResult<Option<Task>>;
    async fn delete_task(&self, id: i64) -> MonitorResult<()>;

    async fn create_crontab_entry(&self, entry: &CrontabEntry) -> MonitorResult<CrontabEntry>;
    async fn get_crontab_entry(&self, id: i64) -> MonitorResult<Option<CrontabEntry>>;
    async fn list_crontab_entries(&self) -> MonitorResult<Vec<CrontabEntry>>;

    /// 认领所有到期的计划条目
    ///
    /// 认领是对 `claim_version` 的比较并交换：同时推进 `lastdt` 并写入租约。
    /// 租约有效的条目视为仍在运行，直接跳过；租约已失效但日志未关闭的条目，
    /// 其旧日志被标记为放弃后允许重新认领。竞争失败的条目静默跳过。
    /// 距离到期不足 `due_tolerance` 的条目也视为到期。
    async fn claim_due_crontab_entries(
        &self,
        agent: &str,
        now: DateTime<Utc>,
        due_tolerance: Duration,
        lease: &LeaseGrant,
    ) -> MonitorResult<Vec<ClaimedEntry>>;

    /// 忽略调度周期，认领全部可运行的条目（单次运行模式）
    async fn claim_all_crontab_entries(
        &self,
        agent: &str,
        now: DateTime<Utc>,
        lease: &LeaseGrant,
    ) -> MonitorResult<Vec<ClaimedEntry>>;

    /// 续约；返回 `false` 表示租约已不属于该持有者
    async fn renew_lease(
        &self,
        entry_id: i64,
        owner: &str,
        expires_at: DateTime<Utc>,
    ) -> MonitorResult<bool>;
    async fn release_lease(&self, entry_id: i64, owner: &str) -> MonitorResult<bool>;
}

#[async_trait]
pub trait JournalRepository: Send + Sync {
    /// 打开运行日志，同时记录到计划条目的 `j_id`
    async fn open_journal(
        &self,
        task_id: i64,
        crontab_id: Option<i64>,
        now: DateTime<Utc>,
    ) -> MonitorResult<Journal>;
    async fn append_result(&self, result: &NewPollResult) -> MonitorResult<i64>;
    async fn close_journal(&self, journal_id: i64, now: DateTime<Utc>) -> MonitorResult<()>;
    async fn get_journal(&self, id: i64) -> MonitorResult<Option<Journal>>;
    async fn list_journals(&self, task_id: i64) -> MonitorResult<Vec<Journal>>;
    async fn list_results(&self, journal_id: i64) -> MonitorResult<Vec<PollResult>>;
}

#[async_trait]
pub trait InventoryRepository: Send + Sync {
    /// 将一个节点一个类别的扫描结果合并进清单，整体在一个事务内完成
    ///
    /// `complete` 为 `false` 时只插入和更新，不下线任何记录。
    async fn reconcile_inventory(
        &self,
        node_id: i64,
        snapshot: &InventorySnapshot,
        complete: bool,
        now: DateTime<Utc>,
    ) -> MonitorResult<ReconcileOutcome>;

    async fn list_interfaces(&self, node_id: i64) -> MonitorResult<Vec<InterfaceRecord>>;
    async fn list_mac_addresses(&self, node_id: i64) -> MonitorResult<Vec<MacRecord>>;
    async fn list_arp_entries(&self, node_id: i64) -> MonitorResult<Vec<ArpRecord>>;
    async fn list_interface_ips(&self, node_id: i64) -> MonitorResult<Vec<InterfaceIpRecord>>;
    async fn list_elements(&self, node_id: i64) -> MonitorResult<Vec<Element>>;
}

/// 完整的清单存储
pub trait InventoryStore:
    NodeRepository + RequestRepository + TaskRepository + JournalRepository + InventoryRepository
{
}

impl<T> InventoryStore for T where
    T: NodeRepository + RequestRepository + TaskRepository + JournalRepository + InventoryRepository
{
}

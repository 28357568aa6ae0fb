use netmon_core::models::{ClaimedEntry, ResolvedRun};
use netmon_core::traits::InventoryStore;
use netmon_core::{MonitorError, MonitorResult};

/// 把认领到的条目展开为可执行的运行
///
/// 节点组或请求组缺失、请求组被禁用、没有可管理的节点或请求时返回
/// [`MonitorError::Resolution`]；其他错误原样向上传递。
pub async fn resolve_run(
    store: &dyn InventoryStore,
    claimed: &ClaimedEntry,
) -> MonitorResult<ResolvedRun> {
    let task = &claimed.task;
    let fail = |message: &str| MonitorError::resolution(task.id, message);

    let node_group_id = task.node_group_id.ok_or_else(|| fail("节点组已删除"))?;
    let request_group_id = task.request_group_id.ok_or_else(|| fail("请求组已删除"))?;

    if store.get_node_group(node_group_id).await?.is_none() {
        return Err(fail(&format!("节点组 {node_group_id} 不存在")));
    }
    let request_group = store
        .get_request_group(request_group_id)
        .await?
        .ok_or_else(|| fail(&format!("请求组 {request_group_id} 不存在")))?;
    if !request_group.manage {
        return Err(fail(&format!("请求组 '{}' 已禁用", request_group.name)));
    }

    let nodes: Vec<_> = store
        .list_group_nodes(node_group_id)
        .await?
        .into_iter()
        .filter(|node| node.manage)
        .collect();
    if nodes.is_empty() {
        return Err(fail("节点组中没有受管理的节点"));
    }

    let requests: Vec<_> = store
        .list_group_requests(request_group_id)
        .await?
        .into_iter()
        .filter(|member| member.request.manage)
        .collect();
    if requests.is_empty() {
        return Err(fail(&format!("请求组 '{}' 中没有可用的请求", request_group.name)));
    }

    Ok(ResolvedRun {
        entry: claimed.entry.clone(),
        task: task.clone(),
        nodes,
        request_group,
        requests,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use netmon_core::models::{LeaseGrant, Recurrence};
    use netmon_core::traits::*;
    use netmon_testing_utils::{
        interface_requests, seed_topology, sqlite_memory_store, RequestGroupBuilder,
    };

    async fn claim_one(store: &dyn InventoryStore) -> ClaimedEntry {
        let now = Utc::now();
        let lease = LeaseGrant {
            owner: "test".to_string(),
            expires_at: now + Duration::minutes(5),
        };
        store
            .claim_due_crontab_entries("poller", now, Duration::zero(), &lease)
            .await
            .unwrap()
            .remove(0)
    }

    #[tokio::test]
    async fn test_resolve_expands_groups() {
        let store = sqlite_memory_store().await.unwrap();
        let topology = seed_topology(
            &store,
            &["10.0.0.1", "10.0.0.2"],
            RequestGroupBuilder::interfaces().build(),
            interface_requests(),
            Recurrence::every_minutes(5),
        )
        .await
        .unwrap();
        store.set_node_managed(topology.nodes[1].id, false).await.unwrap();

        let claimed = claim_one(&store).await;
        let run = resolve_run(&store, &claimed).await.unwrap();
        assert_eq!(run.nodes.len(), 1, "未管理的节点被排除");
        assert_eq!(run.requests.len(), 10);
        assert_eq!(run.requests[0].request.name, "ifIndex");
        assert_eq!(run.work_items(), 10);
    }

    #[tokio::test]
    async fn test_disabled_request_group_is_resolution_failure() {
        let store = sqlite_memory_store().await.unwrap();
        let topology = seed_topology(
            &store,
            &["10.0.0.1"],
            RequestGroupBuilder::interfaces().build(),
            interface_requests(),
            Recurrence::every_minutes(5),
        )
        .await
        .unwrap();
        store
            .set_request_group_managed(topology.request_group.id, false)
            .await
            .unwrap();

        let claimed = claim_one(&store).await;
        let err = resolve_run(&store, &claimed).await.unwrap_err();
        assert!(err.is_resolution());
    }
}

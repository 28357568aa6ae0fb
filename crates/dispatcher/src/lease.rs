//! 运行租约心跳
//!
//! 运行期间定期延长认领时写入的租约；续约失败说明租约已被他人接管，
//! 此时只记录日志，当前运行继续完成。

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use netmon_core::traits::InventoryStore;
use netmon_infrastructure::StructuredLogger;

pub struct LeaseKeeper {
    stop_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl LeaseKeeper {
    /// 启动心跳，每个 `heartbeat` 周期把租约延长到 `now + lease`
    pub fn spawn(
        store: Arc<dyn InventoryStore>,
        entry_id: i64,
        owner: String,
        lease: Duration,
        heartbeat: Duration,
    ) -> Self {
        let (stop_tx, mut stop_rx) = oneshot::channel();
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + heartbeat, heartbeat);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let lease = chrono::Duration::from_std(lease).unwrap_or(chrono::Duration::hours(1));

            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {
                        match store.renew_lease(entry_id, &owner, Utc::now() + lease).await {
                            Ok(true) => debug!(crontab_id = entry_id, "租约已续期"),
                            Ok(false) => {
                                StructuredLogger::log_lease_lost(entry_id, &owner);
                                break;
                            }
                            Err(e) => warn!(crontab_id = entry_id, error = %e, "租约续期失败"),
                        }
                    }
                }
            }
        });

        Self { stop_tx, handle }
    }

    pub async fn stop(self) {
        let _ = self.stop_tx.send(());
        if let Err(e) = self.handle.await {
            warn!(error = %e, "租约心跳任务异常退出");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netmon_core::models::{LeaseGrant, Recurrence};
    use netmon_testing_utils::{
        interface_requests, seed_topology, sqlite_memory_store, RequestGroupBuilder, TestEnv,
    };

    #[tokio::test]
    async fn test_heartbeat_extends_lease_until_lost() {
        let store: Arc<dyn InventoryStore> = Arc::new(sqlite_memory_store().await.unwrap());
        let topology = seed_topology(
            store.as_ref(),
            &["10.0.0.1"],
            RequestGroupBuilder::interfaces().build(),
            interface_requests(),
            Recurrence::every_minutes(5),
        )
        .await
        .unwrap();
        let entry_id = topology.entry.id;

        let now = Utc::now();
        let initial_expiry = now + chrono::Duration::seconds(2);
        let lease = LeaseGrant {
            owner: "keeper".to_string(),
            expires_at: initial_expiry,
        };
        store
            .claim_due_crontab_entries("poller", now, chrono::Duration::zero(), &lease)
            .await
            .unwrap();

        let keeper = LeaseKeeper::spawn(
            store.clone(),
            entry_id,
            "keeper".to_string(),
            Duration::from_secs(60),
            Duration::from_millis(30),
        );

        let renewed = TestEnv::wait_for(
            || {
                let store = store.clone();
                async move {
                    let entry = store.get_crontab_entry(entry_id).await.unwrap().unwrap();
                    entry.lease_expires_at > Some(initial_expiry)
                }
            },
            Duration::from_secs(2),
        )
        .await;
        assert!(renewed, "心跳应延长租约");

        // 租约被他人接管后心跳自行退出
        store.release_lease(entry_id, "keeper").await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(keeper.handle.is_finished());
        keeper.stop().await;
    }
}

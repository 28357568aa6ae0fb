/// 清单对账仓储
///
/// 每次对账是一个事务：先用 `$lock_node` 锁住节点行（节点不存在时返回 `false`），
/// 再按对账计划写入。任一语句失败时事务回滚，节点原有清单保持不变。
macro_rules! impl_inventory_repository {
    ($store:ident, $conn:ty, $lock_node:ident) => {
        use async_trait::async_trait;
        use chrono::{DateTime, Utc};
        use tracing::debug;

        use netmon_core::models::{
            ArpObservation, ArpRecord, Element, InterfaceIpObservation, InterfaceIpRecord,
            InterfaceObservation, InterfaceRecord, InventorySnapshot, MacObservation, MacRecord,
            ReconcileOutcome,
        };
        use netmon_core::traits::InventoryRepository;
        use netmon_core::{MonitorError, MonitorResult};
        use netmon_domain::reconciliation::{plan_reconciliation, ReconcilePlan};

        use super::rows::{row_to_arp, row_to_element, row_to_interface, row_to_interface_ip, row_to_mac};

        const INTERFACE_ELEMENT: &str = "interface";

        async fn fetch_interfaces(
            conn: &mut $conn,
            node_id: i64,
        ) -> MonitorResult<Vec<InterfaceRecord>> {
            let rows = sqlx::query(
                r#"
                SELECT id, node_id, if_index, name, descr, alias, if_type, mtu, speed, phys_address,
                       admin_status, oper_status, last_change, first_seen, last_seen, status
                FROM interfaces WHERE node_id = $1 ORDER BY if_index
                "#,
            )
            .bind(node_id)
            .fetch_all(&mut *conn)
            .await?;
            rows.iter().map(row_to_interface).collect()
        }

        async fn fetch_interface_ips(
            conn: &mut $conn,
            node_id: i64,
        ) -> MonitorResult<Vec<InterfaceIpRecord>> {
            let rows = sqlx::query(
                r#"
                SELECT id, node_id, if_index, ip_address, netmask, first_seen, last_seen, status
                FROM interface_ips WHERE node_id = $1 ORDER BY if_index, ip_address
                "#,
            )
            .bind(node_id)
            .fetch_all(&mut *conn)
            .await?;
            rows.iter().map(row_to_interface_ip).collect()
        }

        async fn fetch_mac_addresses(
            conn: &mut $conn,
            node_id: i64,
            active_only: bool,
        ) -> MonitorResult<Vec<MacRecord>> {
            let rows = sqlx::query(
                r#"
                SELECT id, node_id, mac_address, port_number, vlan_id, fdb_status,
                       first_seen, last_seen, status
                FROM mac_addresses
                WHERE node_id = $1 AND (NOT $2 OR status = 'ACTIVE')
                ORDER BY id
                "#,
            )
            .bind(node_id)
            .bind(active_only)
            .fetch_all(&mut *conn)
            .await?;
            rows.iter().map(row_to_mac).collect()
        }

        async fn fetch_arp_entries(
            conn: &mut $conn,
            node_id: i64,
            active_only: bool,
        ) -> MonitorResult<Vec<ArpRecord>> {
            let rows = sqlx::query(
                r#"
                SELECT id, node_id, ip_address, mac_address, if_index, first_seen, last_seen, status
                FROM arp_entries
                WHERE node_id = $1 AND (NOT $2 OR status = 'ACTIVE')
                ORDER BY id
                "#,
            )
            .bind(node_id)
            .bind(active_only)
            .fetch_all(&mut *conn)
            .await?;
            rows.iter().map(row_to_arp).collect()
        }

        async fn retire(
            conn: &mut $conn,
            table: &str,
            ids: &[i64],
        ) -> MonitorResult<()> {
            let sql = format!("UPDATE {table} SET status = 'INACTIVE' WHERE id = $1 AND status = 'ACTIVE'");
            for id in ids {
                sqlx::query(&sql).bind(id).execute(&mut *conn).await?;
            }
            Ok(())
        }

        async fn upsert_interface_element(
            conn: &mut $conn,
            node_id: i64,
            observation: &InterfaceObservation,
            now: DateTime<Utc>,
        ) -> MonitorResult<()> {
            sqlx::query(
                r#"
                INSERT INTO elements (node_id, element_type, idx, name, deleted, first_seen, last_seen)
                VALUES ($1, $2, $3, $4, $5, $6, $6)
                ON CONFLICT (node_id, element_type, idx)
                DO UPDATE SET name = excluded.name, deleted = excluded.deleted,
                              last_seen = excluded.last_seen
                "#,
            )
            .bind(node_id)
            .bind(INTERFACE_ELEMENT)
            .bind(observation.if_index.to_string())
            .bind(observation.name.as_deref().or(observation.descr.as_deref()))
            .bind(false)
            .bind(now)
            .execute(&mut *conn)
            .await?;
            Ok(())
        }

        async fn apply_interfaces(
            conn: &mut $conn,
            node_id: i64,
            observed: &[InterfaceObservation],
            complete: bool,
            now: DateTime<Utc>,
        ) -> MonitorResult<ReconcileOutcome> {
            let existing = fetch_interfaces(conn, node_id).await?;
            let plan = plan_reconciliation(&existing, observed, complete);

            for observation in &plan.inserts {
                sqlx::query(
                    r#"
                    INSERT INTO interfaces (node_id, if_index, name, descr, alias, if_type, mtu, speed,
                                            phys_address, admin_status, oper_status, last_change,
                                            first_seen, last_seen, status)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $13, 'ACTIVE')
                    "#,
                )
                .bind(node_id)
                .bind(observation.if_index)
                .bind(&observation.name)
                .bind(&observation.descr)
                .bind(&observation.alias)
                .bind(observation.if_type)
                .bind(observation.mtu)
                .bind(observation.speed)
                .bind(&observation.phys_address)
                .bind(observation.admin_status)
                .bind(observation.oper_status)
                .bind(observation.last_change)
                .bind(now)
                .execute(&mut *conn)
                .await?;
                upsert_interface_element(conn, node_id, observation, now).await?;
            }

            for update in &plan.updates {
                let observation = &update.observation;
                if update.changed || update.reactivate {
                    sqlx::query(
                        r#"
                        UPDATE interfaces
                        SET name = $1, descr = $2, alias = $3, if_type = $4, mtu = $5, speed = $6,
                            phys_address = $7, admin_status = $8, oper_status = $9, last_change = $10,
                            last_seen = $11, status = 'ACTIVE'
                        WHERE id = $12
                        "#,
                    )
                    .bind(&observation.name)
                    .bind(&observation.descr)
                    .bind(&observation.alias)
                    .bind(observation.if_type)
                    .bind(observation.mtu)
                    .bind(observation.speed)
                    .bind(&observation.phys_address)
                    .bind(observation.admin_status)
                    .bind(observation.oper_status)
                    .bind(observation.last_change)
                    .bind(now)
                    .bind(update.id)
                    .execute(&mut *conn)
                    .await?;
                } else {
                    sqlx::query("UPDATE interfaces SET last_seen = $1 WHERE id = $2")
                        .bind(now)
                        .bind(update.id)
                        .execute(&mut *conn)
                        .await?;
                }
                upsert_interface_element(conn, node_id, observation, now).await?;
            }

            retire(conn, "interfaces", &plan.retirements).await?;
            for record in existing
                .iter()
                .filter(|record| plan.retirements.contains(&record.id))
            {
                sqlx::query(
                    "UPDATE elements SET deleted = $1 WHERE node_id = $2 AND element_type = $3 AND idx = $4",
                )
                .bind(true)
                .bind(node_id)
                .bind(INTERFACE_ELEMENT)
                .bind(record.observation.if_index.to_string())
                .execute(&mut *conn)
                .await?;
            }

            Ok(plan.outcome())
        }

        async fn apply_interface_ips(
            conn: &mut $conn,
            node_id: i64,
            observed: &[InterfaceIpObservation],
            complete: bool,
            now: DateTime<Utc>,
        ) -> MonitorResult<ReconcileOutcome> {
            let existing = fetch_interface_ips(conn, node_id).await?;
            let plan = plan_reconciliation(&existing, observed, complete);

            for observation in &plan.inserts {
                sqlx::query(
                    r#"
                    INSERT INTO interface_ips (node_id, if_index, ip_address, netmask,
                                               first_seen, last_seen, status)
                    VALUES ($1, $2, $3, $4, $5, $5, 'ACTIVE')
                    "#,
                )
                .bind(node_id)
                .bind(observation.if_index)
                .bind(&observation.ip_address)
                .bind(&observation.netmask)
                .bind(now)
                .execute(&mut *conn)
                .await?;
            }

            for update in &plan.updates {
                sqlx::query(
                    "UPDATE interface_ips SET netmask = $1, last_seen = $2, status = 'ACTIVE' WHERE id = $3",
                )
                .bind(&update.observation.netmask)
                .bind(now)
                .bind(update.id)
                .execute(&mut *conn)
                .await?;
            }

            retire(conn, "interface_ips", &plan.retirements).await?;
            Ok(plan.outcome())
        }

        async fn apply_mac_addresses(
            conn: &mut $conn,
            node_id: i64,
            observed: &[MacObservation],
            complete: bool,
            now: DateTime<Utc>,
        ) -> MonitorResult<ReconcileOutcome> {
            let existing = fetch_mac_addresses(conn, node_id, true).await?;
            let plan = plan_reconciliation(&existing, observed, complete);

            for observation in &plan.inserts {
                sqlx::query(
                    r#"
                    INSERT INTO mac_addresses (node_id, mac_address, port_number, vlan_id, fdb_status,
                                               first_seen, last_seen, status)
                    VALUES ($1, $2, $3, $4, $5, $6, $6, 'ACTIVE')
                    "#,
                )
                .bind(node_id)
                .bind(&observation.mac_address)
                .bind(observation.port_number)
                .bind(observation.vlan_id)
                .bind(observation.fdb_status)
                .bind(now)
                .execute(&mut *conn)
                .await?;
            }

            for update in &plan.updates {
                sqlx::query(
                    r#"
                    UPDATE mac_addresses
                    SET port_number = $1, vlan_id = $2, fdb_status = $3, last_seen = $4
                    WHERE id = $5
                    "#,
                )
                .bind(update.observation.port_number)
                .bind(update.observation.vlan_id)
                .bind(update.observation.fdb_status)
                .bind(now)
                .bind(update.id)
                .execute(&mut *conn)
                .await?;
            }

            retire(conn, "mac_addresses", &plan.retirements).await?;
            Ok(plan.outcome())
        }

        async fn apply_arp_entries(
            conn: &mut $conn,
            node_id: i64,
            observed: &[ArpObservation],
            complete: bool,
            now: DateTime<Utc>,
        ) -> MonitorResult<ReconcileOutcome> {
            let existing = fetch_arp_entries(conn, node_id, true).await?;
            let plan: ReconcilePlan<ArpObservation> = plan_reconciliation(&existing, observed, complete);

            for observation in &plan.inserts {
                sqlx::query(
                    r#"
                    INSERT INTO arp_entries (node_id, ip_address, mac_address, if_index,
                                             first_seen, last_seen, status)
                    VALUES ($1, $2, $3, $4, $5, $5, 'ACTIVE')
                    "#,
                )
                .bind(node_id)
                .bind(&observation.ip_address)
                .bind(&observation.mac_address)
                .bind(observation.if_index)
                .bind(now)
                .execute(&mut *conn)
                .await?;
            }

            for update in &plan.updates {
                sqlx::query("UPDATE arp_entries SET if_index = $1, last_seen = $2 WHERE id = $3")
                    .bind(update.observation.if_index)
                    .bind(now)
                    .bind(update.id)
                    .execute(&mut *conn)
                    .await?;
            }

            retire(conn, "arp_entries", &plan.retirements).await?;
            Ok(plan.outcome())
        }

        #[async_trait]
        impl InventoryRepository for $store {
            async fn reconcile_inventory(
                &self,
                node_id: i64,
                snapshot: &InventorySnapshot,
                complete: bool,
                now: DateTime<Utc>,
            ) -> MonitorResult<ReconcileOutcome> {
                let mut tx = self.pool.begin().await?;

                if !$lock_node(&mut tx, node_id).await? {
                    return Err(MonitorError::NodeNotFound { id: node_id });
                }

                let outcome = match snapshot {
                    InventorySnapshot::Interfaces(observed) => {
                        apply_interfaces(&mut tx, node_id, observed, complete, now).await?
                    }
                    InventorySnapshot::InterfaceIps(observed) => {
                        apply_interface_ips(&mut tx, node_id, observed, complete, now).await?
                    }
                    InventorySnapshot::MacAddresses(observed) => {
                        apply_mac_addresses(&mut tx, node_id, observed, complete, now).await?
                    }
                    InventorySnapshot::ArpEntries(observed) => {
                        apply_arp_entries(&mut tx, node_id, observed, complete, now).await?
                    }
                };

                tx.commit().await?;
                debug!(
                    node_id,
                    class = %snapshot.class(),
                    inserted = outcome.inserted,
                    updated = outcome.updated,
                    retired = outcome.retired,
                    "清单对账完成"
                );
                Ok(outcome)
            }

            async fn list_interfaces(&self, node_id: i64) -> MonitorResult<Vec<InterfaceRecord>> {
                let mut conn = self.pool.acquire().await?;
                fetch_interfaces(&mut conn, node_id).await
            }

            async fn list_mac_addresses(&self, node_id: i64) -> MonitorResult<Vec<MacRecord>> {
                let mut conn = self.pool.acquire().await?;
                fetch_mac_addresses(&mut conn, node_id, false).await
            }

            async fn list_arp_entries(&self, node_id: i64) -> MonitorResult<Vec<ArpRecord>> {
                let mut conn = self.pool.acquire().await?;
                fetch_arp_entries(&mut conn, node_id, false).await
            }

            async fn list_interface_ips(&self, node_id: i64) -> MonitorResult<Vec<InterfaceIpRecord>> {
                let mut conn = self.pool.acquire().await?;
                fetch_interface_ips(&mut conn, node_id).await
            }

            async fn list_elements(&self, node_id: i64) -> MonitorResult<Vec<Element>> {
                let rows = sqlx::query(
                    r#"
                    SELECT id, node_id, element_type, idx, name, deleted, first_seen, last_seen
                    FROM elements WHERE node_id = $1 ORDER BY element_type, id
                    "#,
                )
                .bind(node_id)
                .fetch_all(&self.pool)
                .await?;
                rows.iter().map(row_to_element).collect()
            }
        }
    };
}

pub(crate) use impl_inventory_repository;

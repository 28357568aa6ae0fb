//! Scripted collector for executor and scheduler tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use netmon_core::models::{Node, PollOutcome, PollValue, Request, VarBind};
use netmon_core::traits::Collector;

#[derive(Debug, Clone)]
enum Scripted {
    Value(PollValue),
    Failure(String),
}

#[derive(Debug, Clone)]
struct Response {
    scripted: Scripted,
    delay: Duration,
}

/// 一次采集调用的记录
#[derive(Debug, Clone, PartialEq)]
pub struct CollectorCall {
    pub ip_address: String,
    pub oid: String,
    pub timeout: Duration,
}

/// 按 (节点地址, 请求OID) 返回预设结果的采集器
///
/// 未配置的组合返回 `No Such Object` 失败。
#[derive(Debug, Clone, Default)]
pub struct MockCollector {
    responses: Arc<Mutex<HashMap<(String, String), Response>>>,
    calls: Arc<Mutex<Vec<CollectorCall>>>,
}

impl MockCollector {
    pub fn new() -> Self {
        Self::default()
    }

    fn script(&self, ip_address: &str, oid: &str, scripted: Scripted) {
        self.responses.lock().unwrap().insert(
            (ip_address.to_string(), oid.to_string()),
            Response {
                scripted,
                delay: Duration::ZERO,
            },
        );
    }

    pub fn respond_get(&self, ip_address: &str, oid: &str, value: &str) -> &Self {
        self.script(ip_address, oid, Scripted::Value(PollValue::Scalar(value.to_string())));
        self
    }

    pub fn respond_walk(&self, ip_address: &str, oid: &str, varbinds: Vec<VarBind>) -> &Self {
        self.script(ip_address, oid, Scripted::Value(PollValue::Table(varbinds)));
        self
    }

    pub fn fail(&self, ip_address: &str, oid: &str, error: &str) -> &Self {
        self.script(ip_address, oid, Scripted::Failure(error.to_string()));
        self
    }

    /// 给已配置的响应加上延迟，用于触发执行器超时
    pub fn delay(&self, ip_address: &str, oid: &str, delay: Duration) -> &Self {
        let key = (ip_address.to_string(), oid.to_string());
        let mut responses = self.responses.lock().unwrap();
        let entry = responses.entry(key).or_insert_with(|| Response {
            scripted: Scripted::Value(PollValue::Scalar(String::new())),
            delay,
        });
        entry.delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<CollectorCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls_for(&self, ip_address: &str) -> Vec<CollectorCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.ip_address == ip_address)
            .collect()
    }
}

#[async_trait]
impl Collector for MockCollector {
    async fn poll(&self, node: &Node, request: &Request, timeout: Duration) -> PollOutcome {
        let started = Instant::now();
        self.calls.lock().unwrap().push(CollectorCall {
            ip_address: node.ip_address.clone(),
            oid: request.oid.clone(),
            timeout,
        });

        let response = self
            .responses
            .lock()
            .unwrap()
            .get(&(node.ip_address.clone(), request.oid.clone()))
            .cloned();

        match response {
            Some(response) => {
                if !response.delay.is_zero() {
                    tokio::time::sleep(response.delay).await;
                }
                match response.scripted {
                    Scripted::Value(value) => PollOutcome::success(value, started.elapsed()),
                    Scripted::Failure(error) => PollOutcome::failure(error, started.elapsed()),
                }
            }
            None => PollOutcome::failure(
                "No Such Object available on this agent at this OID",
                started.elapsed(),
            ),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

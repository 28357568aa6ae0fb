use serde::{Deserialize, Serialize};

fn default_agent() -> String {
    hostname::get()
        .ok()
        .and_then(|name| name.into_string().ok())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "netmon".to_string())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// 执行器标识，与计划条目的 agent 字段匹配
    pub agent: String,
    pub tick_interval_seconds: u64,
    pub run_lease_seconds: u64,
    pub heartbeat_interval_seconds: u64,
    pub startup_jitter_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            agent: default_agent(),
            tick_interval_seconds: 60,
            run_lease_seconds: 3600,
            heartbeat_interval_seconds: 60,
            startup_jitter_ms: 0,
        }
    }
}

impl SchedulerConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.agent.trim().is_empty() {
            return Err(anyhow::anyhow!("执行器标识不能为空"));
        }

        if self.tick_interval_seconds == 0 {
            return Err(anyhow::anyhow!("调度间隔必须大于0"));
        }

        if self.heartbeat_interval_seconds == 0 {
            return Err(anyhow::anyhow!("心跳间隔必须大于0"));
        }

        if self.run_lease_seconds <= self.heartbeat_interval_seconds {
            return Err(anyhow::anyhow!(
                "运行租约({}s)必须大于心跳间隔({}s)",
                self.run_lease_seconds,
                self.heartbeat_interval_seconds
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// 全局工作池大小，与节点数量无关
    pub max_workers: usize,
    /// 请求组和节点都未配置超时时使用
    pub default_timeout_ms: u64,
    pub reconcile: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_workers: 8,
            default_timeout_ms: 1000,
            reconcile: true,
        }
    }
}

impl ExecutorConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_workers == 0 {
            return Err(anyhow::anyhow!("工作池大小必须大于0"));
        }

        if self.default_timeout_ms == 0 {
            return Err(anyhow::anyhow!("默认超时时间必须大于0"));
        }

        Ok(())
    }
}

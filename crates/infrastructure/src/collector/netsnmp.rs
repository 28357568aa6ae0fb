//! 基于 net-snmp 命令行工具的采集器
//!
//! 每次请求启动一个 `snmpget`/`snmpwalk` 子进程，输出格式固定为
//! 数字OID加原始值（`-On -Oq -Oe -Ot`），再解析为 [`VarBind`]。

use async_trait::async_trait;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{debug, warn};

use netmon_core::config::CollectorConfig;
use netmon_core::models::{Node, PollOutcome, PollValue, Request, RequestType, VarBind};
use netmon_core::traits::Collector;

/// 代理返回的“值”其实是错误说明
const AGENT_ERRORS: [&str; 4] = [
    "No Such Object",
    "No Such Instance",
    "No more variables left",
    "End of MIB",
];

pub struct NetSnmpCollector {
    config: CollectorConfig,
}

impl NetSnmpCollector {
    pub fn new(config: CollectorConfig) -> Self {
        Self { config }
    }

    fn build_command(&self, node: &Node, request: &Request, timeout: Duration) -> Command {
        let program = match request.request_type {
            RequestType::Get => &self.config.snmpget_path,
            RequestType::Walk => &self.config.snmpwalk_path,
        };
        let mut command = Command::new(program);
        command
            .arg(format!("-v{}", self.config.version))
            .arg("-c")
            .arg(&node.community)
            .arg("-t")
            .arg(per_try_seconds(timeout, self.config.retries))
            .arg("-r")
            .arg(self.config.retries.to_string())
            .args(["-On", "-Oq", "-Oe", "-Ot"])
            .arg(format!("{}:{}", node.ip_address, self.config.port))
            .arg(&request.oid)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }

    async fn execute(
        &self,
        node: &Node,
        request: &Request,
        timeout: Duration,
    ) -> Result<PollValue, String> {
        let output = tokio::time::timeout(
            timeout,
            self.build_command(node, request, timeout).output(),
        )
        .await
        .map_err(|_| "Timeout".to_string())?
        .map_err(|e| format!("无法启动snmp命令: {e}"))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if let Some(message) = first_error(&stderr) {
            return Err(message);
        }
        if !output.status.success() {
            let detail = stderr.trim();
            return Err(if detail.is_empty() {
                format!("snmp命令退出码: {:?}", output.status.code())
            } else {
                detail.to_string()
            });
        }

        let varbinds = parse_output(&stdout)?;
        match request.request_type {
            RequestType::Get => varbinds
                .into_iter()
                .next()
                .map(|vb| PollValue::Scalar(vb.value))
                .ok_or_else(|| "空响应".to_string()),
            RequestType::Walk => Ok(PollValue::Table(varbinds)),
        }
    }
}

#[async_trait]
impl Collector for NetSnmpCollector {
    async fn poll(&self, node: &Node, request: &Request, timeout: Duration) -> PollOutcome {
        let started = Instant::now();
        match self.execute(node, request, timeout).await {
            Ok(value) => {
                debug!(
                    node = %node.ip_address,
                    oid = %request.oid,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "SNMP请求成功"
                );
                PollOutcome::success(value, started.elapsed())
            }
            Err(error) => {
                warn!(node = %node.ip_address, oid = %request.oid, error = %error, "SNMP请求失败");
                PollOutcome::failure(error, started.elapsed())
            }
        }
    }

    fn name(&self) -> &str {
        "net-snmp"
    }
}

/// 请求超时平均分给每次尝试，`-t` 接受小数秒
fn per_try_seconds(timeout: Duration, retries: u32) -> String {
    let per_try = timeout / retries.saturating_add(1);
    format!("{:.3}", per_try.as_secs_f64().max(0.001))
}

fn first_error(stderr: &str) -> Option<String> {
    stderr
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with("Timeout") || line.contains("No Response"))
        .map(|_| "Timeout".to_string())
}

fn agent_error(value: &str) -> Option<&'static str> {
    AGENT_ERRORS.iter().copied().find(|e| value.contains(e))
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// 解析 `-On -Oq` 输出，每行 `.1.3.6... 值`；不以OID开头的行是上一值的续行
pub(crate) fn parse_output(stdout: &str) -> Result<Vec<VarBind>, String> {
    let mut varbinds: Vec<VarBind> = Vec::new();

    for line in stdout.lines() {
        if line.trim().is_empty() {
            continue;
        }
        if line.starts_with('.') {
            let (oid, value) = match line.split_once(char::is_whitespace) {
                Some((oid, value)) => (oid, value.trim()),
                None => (line, ""),
            };
            if let Some(error) = agent_error(value) {
                // 遍历末尾的结束标记不算错误
                let end_marker = error.starts_with("No more") || error.starts_with("End");
                if varbinds.is_empty() || !end_marker {
                    return Err(format!("{error}: {oid}"));
                }
                continue;
            }
            varbinds.push(VarBind::new(oid.trim_start_matches('.'), value));
        } else if let Some(last) = varbinds.last_mut() {
            last.value.push('\n');
            last.value.push_str(line);
        } else if let Some(error) = agent_error(line) {
            return Err(error.to_string());
        }
    }

    for varbind in &mut varbinds {
        varbind.value = unquote(&varbind.value).to_string();
    }
    Ok(varbinds)
}

use serde::{Deserialize, Serialize};

/// net-snmp 命令行采集器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    pub snmpget_path: String,
    pub snmpwalk_path: String,
    pub version: String,
    pub retries: u32,
    pub port: u16,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            snmpget_path: "snmpget".to_string(),
            snmpwalk_path: "snmpwalk".to_string(),
            version: "2c".to_string(),
            retries: 1,
            port: 161,
        }
    }
}

impl CollectorConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.snmpget_path.is_empty() || self.snmpwalk_path.is_empty() {
            return Err(anyhow::anyhow!("snmp命令路径不能为空"));
        }

        let valid_versions = ["1", "2c"];
        if !valid_versions.contains(&self.version.as_str()) {
            return Err(anyhow::anyhow!(
                "无效的SNMP版本: {}，支持的版本: {:?}",
                self.version,
                valid_versions
            ));
        }

        if self.port == 0 {
            return Err(anyhow::anyhow!("SNMP端口必须大于0"));
        }

        Ok(())
    }
}

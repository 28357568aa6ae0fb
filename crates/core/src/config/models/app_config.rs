use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{
    collector::CollectorConfig,
    database::DatabaseConfig,
    observability::ObservabilityConfig,
    scheduler_executor::{ExecutorConfig, SchedulerConfig},
};

/// System configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub scheduler: SchedulerConfig,
    pub executor: ExecutorConfig,
    pub collector: CollectorConfig,
    pub observability: ObservabilityConfig,
}

const DEFAULT_CONFIG_PATHS: [&str; 3] = [
    "config/netmon.toml",
    "netmon.toml",
    "/etc/netmon/config.toml",
];

impl AppConfig {
    /// Load configuration from config file and environment variables
    ///
    /// Load order:
    /// 1. Built-in defaults
    /// 2. Config file (TOML format)
    /// 3. Environment variable overrides (`NETMON_SECTION__KEY`)
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = config_path {
            if Path::new(path).exists() {
                builder = builder.add_source(File::new(path, FileFormat::Toml));
            } else {
                return Err(anyhow::anyhow!("配置文件不存在: {}", path));
            }
        } else if let Some(path) = DEFAULT_CONFIG_PATHS
            .iter()
            .find(|path| Path::new(path).exists())
        {
            builder = builder.add_source(File::new(path, FileFormat::Toml));
        }

        builder = builder.add_source(
            Environment::with_prefix("NETMON")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder
            .build()
            .context("构建配置失败")?
            .try_deserialize()
            .context("反序列化配置失败")?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(toml_str).context("解析TOML配置失败")?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("序列化配置为TOML失败")
    }

    pub fn validate(&self) -> Result<()> {
        self.database.validate().context("数据库配置验证失败")?;
        self.scheduler.validate().context("调度器配置验证失败")?;
        self.executor.validate().context("执行器配置验证失败")?;
        self.collector.validate().context("采集器配置验证失败")?;
        self.observability
            .validate()
            .context("可观测性配置验证失败")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
[database]
url = "sqlite::memory:"
max_connections = 1
min_connections = 1

[scheduler]
agent = "poller-east"
tick_interval_seconds = 30
run_lease_seconds = 600
heartbeat_interval_seconds = 20

[executor]
max_workers = 3
default_timeout_ms = 500

[observability]
log_level = "debug"
log_format = "json"
"#;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.scheduler.tick_interval_seconds, 60);
        assert_eq!(config.executor.default_timeout_ms, 1000);
        assert!(!config.scheduler.agent.is_empty());
    }

    #[test]
    fn test_from_toml_partial_sections() {
        let config = AppConfig::from_toml(SAMPLE).unwrap();
        assert!(config.database.is_sqlite());
        assert_eq!(config.scheduler.agent, "poller-east");
        assert_eq!(config.executor.max_workers, 3);
        // 未出现的段落使用默认值
        assert_eq!(config.collector.snmpwalk_path, "snmpwalk");
        assert_eq!(config.collector.port, 161);
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = AppConfig::from_toml(SAMPLE).unwrap();
        let text = config.to_toml().unwrap();
        let reparsed = AppConfig::from_toml(&text).unwrap();
        assert_eq!(reparsed.scheduler.run_lease_seconds, 600);
        assert_eq!(reparsed.observability.log_format, "json");
    }

    #[test]
    fn test_validation_failures() {
        let mut config = AppConfig::default();
        config.database.url = "mysql://localhost/netmon".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.executor.max_workers = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.scheduler.run_lease_seconds = 10;
        config.scheduler.heartbeat_interval_seconds = 10;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.collector.version = "3".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.observability.log_format = "xml".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = AppConfig::load(file.path().to_str()).unwrap();
        assert_eq!(config.scheduler.tick_interval_seconds, 30);
        assert_eq!(config.executor.default_timeout_ms, 500);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(AppConfig::load(Some("/nonexistent/netmon.toml")).is_err());
    }
}

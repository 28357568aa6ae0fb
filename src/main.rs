use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use tracing::{error, info, warn};

use netmon::app::{AppMode, Application};
use netmon::shutdown::{wait_for_shutdown_signal, ShutdownManager};
use netmon_core::config::AppConfig;
use netmon_infrastructure::{init_logging, LogFormat};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("netmon")
        .version(env!("CARGO_PKG_VERSION"))
        .about("网络设备轮询调度与清单对账")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("配置文件路径（缺省时按默认路径查找）"),
        )
        .arg(
            Arg::new("once")
                .long("once")
                .help("忽略调度周期，运行所有可认领条目一次后退出")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("agent")
                .short('a')
                .long("agent")
                .value_name("NAME")
                .help("执行器标识，覆盖配置中的 scheduler.agent"),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("日志级别，覆盖配置")
                .value_parser(["trace", "debug", "info", "warn", "error"]),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .value_name("FORMAT")
                .help("日志格式，覆盖配置")
                .value_parser(["json", "pretty"]),
        )
        .get_matches();

    let config_path = matches.get_one::<String>("config");
    let mut config = AppConfig::load(config_path.map(String::as_str))
        .with_context(|| format!("加载配置失败: {config_path:?}"))?;

    if let Some(agent) = matches.get_one::<String>("agent") {
        config.scheduler.agent = agent.clone();
    }
    if let Some(level) = matches.get_one::<String>("log-level") {
        config.observability.log_level = level.clone();
    }
    if let Some(format) = matches.get_one::<String>("log-format") {
        config.observability.log_format = format.clone();
    }
    config.validate()?;

    let log_format: LogFormat = config.observability.log_format.parse()?;
    init_logging(&config.observability.log_level, log_format)?;

    let mode = if matches.get_flag("once") {
        AppMode::Once
    } else {
        AppMode::Scheduler
    };

    info!("启动 netmon，执行器: {}，模式: {:?}", config.scheduler.agent, mode);

    let app = Arc::new(Application::new(config, mode).await?);
    let shutdown_manager = ShutdownManager::new();
    let shutdown_rx = shutdown_manager.subscribe().await;

    let mut app_handle = {
        let app = Arc::clone(&app);
        tokio::spawn(async move { app.run(shutdown_rx).await })
    };

    tokio::select! {
        result = &mut app_handle => {
            return match result {
                Ok(Ok(())) => {
                    info!("netmon 已退出");
                    Ok(())
                }
                Ok(Err(e)) => {
                    error!("应用运行失败: {e:#}");
                    Err(e)
                }
                Err(e) => Err(anyhow::anyhow!("应用任务异常退出: {e}")),
            };
        }
        _ = wait_for_shutdown_signal() => {
            info!("收到关闭信号，开始优雅关闭...");
        }
    }

    shutdown_manager.shutdown().await;

    // 进行中的运行可能要等到最后一个请求超时
    match tokio::time::timeout(Duration::from_secs(30), app_handle).await {
        Ok(Ok(Ok(()))) => info!("应用已优雅关闭"),
        Ok(Ok(Err(e))) => error!("应用关闭时发生错误: {e:#}"),
        Ok(Err(e)) => error!("应用任务异常退出: {e}"),
        Err(_) => warn!("应用关闭超时，强制退出"),
    }

    Ok(())
}

use thiserror::Error;

/// 监控系统错误类型定义
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("数据库操作错误: {0}")]
    DatabaseOperation(String),

    #[error("节点未找到: {id}")]
    NodeNotFound { id: i64 },

    #[error("任务未找到: {id}")]
    TaskNotFound { id: i64 },

    #[error("计划条目未找到: {id}")]
    CrontabNotFound { id: i64 },

    #[error("运行日志未找到: {id}")]
    JournalNotFound { id: i64 },

    #[error("请求组未找到: {id}")]
    RequestGroupNotFound { id: i64 },

    #[error("任务解析失败 (task {task_id}): {message}")]
    Resolution { task_id: i64, message: String },

    #[error("无效的调度周期: {0}")]
    InvalidRecurrence(String),

    #[error("采集器错误: {0}")]
    Collector(String),

    #[error("配置错误: {0}")]
    Configuration(String),

    #[error("序列化错误: {0}")]
    Serialization(String),

    #[error("内部错误: {0}")]
    Internal(String),
}

impl MonitorError {
    pub fn resolution(task_id: i64, message: impl Into<String>) -> Self {
        Self::Resolution {
            task_id,
            message: message.into(),
        }
    }

    /// 解析失败属于计划条目自身的问题，不影响存储可用性
    pub fn is_resolution(&self) -> bool {
        matches!(
            self,
            Self::Resolution { .. } | Self::TaskNotFound { .. } | Self::RequestGroupNotFound { .. }
        )
    }
}

/// 统一的Result类型
pub type MonitorResult<T> = std::result::Result<T, MonitorError>;

pub mod app_config;
pub mod collector;
pub mod database;
pub mod observability;
pub mod scheduler_executor;

pub use app_config::AppConfig;
pub use collector::CollectorConfig;
pub use database::DatabaseConfig;
pub use observability::ObservabilityConfig;
pub use scheduler_executor::{ExecutorConfig, SchedulerConfig};

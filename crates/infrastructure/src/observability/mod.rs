//! Observability: logging setup, metrics and structured event logging

pub mod logging;
pub mod metrics_collector;
pub mod structured_logger;

pub use logging::{init_logging, LogFormat};
pub use metrics_collector::{install_prometheus_exporter, MetricsCollector};
pub use structured_logger::StructuredLogger;

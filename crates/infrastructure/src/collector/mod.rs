//! 采集网关实现

pub mod netsnmp;

pub use netsnmp::NetSnmpCollector;

//! 调度器：认领到期的计划条目，解析为运行并交给执行器

pub mod lease;
pub mod resolve;
pub mod scheduler;

pub use lease::LeaseKeeper;
pub use resolve::resolve_run;
pub use scheduler::{PollScheduler, RunReport};

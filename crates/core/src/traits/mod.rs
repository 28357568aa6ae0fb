pub mod collector;
pub mod repository;
pub mod runner;

pub use collector::*;
pub use repository::*;
pub use runner::*;

pub mod inventory;
pub mod journal;
pub mod node;
pub mod poll;
pub mod request;
pub mod task;

pub use inventory::*;
pub use journal::*;
pub use node::*;
pub use poll::*;
pub use request::*;
pub use task::*;

mod claim;
pub mod manager;
pub mod postgres;
mod shared;
pub mod sqlite;

pub use manager::{DatabaseManager, DatabasePool, DatabaseType};
pub use postgres::PostgresStore;
pub use sqlite::SqliteStore;

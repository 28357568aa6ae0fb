use super::SqliteStore;

crate::database::shared::impl_node_repository!(SqliteStore);

use super::PostgresStore;

crate::database::shared::impl_node_repository!(PostgresStore);

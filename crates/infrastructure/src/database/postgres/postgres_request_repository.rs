use super::PostgresStore;

crate::database::shared::impl_request_repository!(PostgresStore);

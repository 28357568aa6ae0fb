use super::SqliteStore;

crate::database::shared::impl_request_repository!(SqliteStore);

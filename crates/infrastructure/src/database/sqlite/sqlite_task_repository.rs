use super::SqliteStore;

crate::database::shared::impl_task_repository!(SqliteStore);

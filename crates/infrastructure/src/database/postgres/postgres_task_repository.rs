use super::PostgresStore;

crate::database::shared::impl_task_repository!(PostgresStore);

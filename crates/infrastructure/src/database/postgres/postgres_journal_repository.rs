use super::PostgresStore;

crate::database::shared::impl_journal_repository!(PostgresStore);

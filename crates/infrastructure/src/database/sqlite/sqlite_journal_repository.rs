use super::SqliteStore;

crate::database::shared::impl_journal_repository!(SqliteStore);

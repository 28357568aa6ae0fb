//! SqliteRow → 模型映射

crate::database::shared::impl_row_mappers!(sqlx::sqlite::SqliteRow);

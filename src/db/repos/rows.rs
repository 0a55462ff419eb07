use async_trait::async_trait;

use crate::{
    db::error::DbResult,
    models::{FakeColumnValue, FakeValue, InsertedKey},
};

/// Row-level statements used by the CRUD smoke test.
///
/// Every call runs in autocommit mode; there is no transaction spanning
/// several calls.
#[async_trait]
pub trait RowRepo: Send + Sync {
    /// Fetch at most one row and return how many came back.
    async fn select_sample(&self, schema: &str, table: &str) -> DbResult<u64>;

    /// Insert one row. Returns the key of the new row when the engine can
    /// report it (`primary_key` names the key column).
    async fn insert_row(
        &self,
        schema: &str,
        table: &str,
        primary_key: Option<&str>,
        values: &[FakeColumnValue],
    ) -> DbResult<Option<InsertedKey>>;

    /// Set one column on the row identified by `key`. Returns rows affected.
    async fn update_row(
        &self,
        schema: &str,
        table: &str,
        column: &str,
        value: &FakeValue,
        primary_key: &str,
        key: &InsertedKey,
    ) -> DbResult<u64>;

    /// Delete the row identified by `key`. Returns rows affected.
    async fn delete_row(
        &self,
        schema: &str,
        table: &str,
        primary_key: &str,
        key: &InsertedKey,
    ) -> DbResult<u64>;
}

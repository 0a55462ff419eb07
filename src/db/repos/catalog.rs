use async_trait::async_trait;

use crate::{
    db::error::DbResult,
    models::{ColumnDescriptor, ColumnMetadata, TemporalValue},
};

/// Read-only access to an engine's metadata catalog and to aggregate
/// probes over user data.
#[async_trait]
pub trait CatalogRepo: Send + Sync {
    /// List the base tables of a schema, ordered by name.
    async fn list_tables(&self, schema: &str) -> DbResult<Vec<String>>;

    /// List the date and datetime/timestamp columns of a table in ordinal order.
    ///
    /// Other column types are filtered out by the catalog query itself.
    /// An unknown schema or table yields an empty list.
    async fn date_time_columns(&self, schema: &str, table: &str)
    -> DbResult<Vec<ColumnDescriptor>>;

    /// Smallest non-null value stored in a column, or `None` if every row
    /// is null or the table is empty.
    async fn min_value(
        &self,
        schema: &str,
        table: &str,
        column: &str,
    ) -> DbResult<Option<TemporalValue>>;

    /// Full column metadata for a table in ordinal order.
    async fn table_columns(&self, schema: &str, table: &str) -> DbResult<Vec<ColumnMetadata>>;
}

use std::{future::Future, sync::Arc, time::Duration};

use crate::{
    db::{CatalogRepo, DbError, DbResult},
    models::{ColumnDescriptor, TemporalValue},
};

/// A catalog query for one table failed.
#[derive(Debug, thiserror::Error)]
#[error("Failed to read column metadata for {schema}.{table}: {source}")]
pub struct MetadataFetchError {
    pub schema: String,
    pub table: String,
    #[source]
    pub source: DbError,
}

/// Issues catalog and MIN queries with a per-query time limit.
#[derive(Clone)]
pub struct MetadataReader {
    catalog: Arc<dyn CatalogRepo>,
    query_timeout: Duration,
}

impl MetadataReader {
    pub fn new(catalog: Arc<dyn CatalogRepo>, query_timeout: Duration) -> Self {
        Self {
            catalog,
            query_timeout,
        }
    }

    /// Date and datetime columns of a table, in ordinal order.
    ///
    /// Never fails: a catalog error is logged and yields an empty list, the
    /// same as a table without such columns.
    pub async fn fetch_date_time_columns(&self, schema: &str, table: &str) -> Vec<ColumnDescriptor> {
        self.fetch_candidates(schema, table)
            .await
            .unwrap_or_default()
    }

    /// Like [`fetch_date_time_columns`](Self::fetch_date_time_columns) but
    /// keeps the failure so callers can tell it apart from "no columns".
    /// The failure is logged either way.
    pub async fn fetch_candidates(
        &self,
        schema: &str,
        table: &str,
    ) -> Result<Vec<ColumnDescriptor>, MetadataFetchError> {
        let result = self
            .bounded(self.catalog.date_time_columns(schema, table))
            .await;

        match result {
            Ok(columns) => {
                tracing::trace!(schema, table, count = columns.len(), "Fetched date/time columns");
                Ok(columns)
            }
            Err(source) => {
                let error = MetadataFetchError {
                    schema: schema.to_string(),
                    table: table.to_string(),
                    source,
                };
                tracing::warn!(
                    schema,
                    table,
                    connection_lost = error.source.is_connection_lost(),
                    error = %error,
                    "Metadata fetch failed"
                );
                Err(error)
            }
        }
    }

    /// Earliest non-null value of a column.
    pub async fn probe_min(
        &self,
        schema: &str,
        table: &str,
        column: &str,
    ) -> DbResult<Option<TemporalValue>> {
        self.bounded(self.catalog.min_value(schema, table, column))
            .await
    }

    /// Base tables of a schema, ordered by name.
    pub async fn list_tables(&self, schema: &str) -> DbResult<Vec<String>> {
        self.bounded(self.catalog.list_tables(schema)).await
    }

    async fn bounded<T>(&self, query: impl Future<Output = DbResult<T>>) -> DbResult<T> {
        match tokio::time::timeout(self.query_timeout, query).await {
            Ok(result) => result,
            Err(_) => Err(DbError::Timeout(self.query_timeout.as_secs())),
        }
    }
}

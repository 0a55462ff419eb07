use async_trait::async_trait;
use chrono::DateTime;
use sqlx::{Row, SqlitePool};

use crate::{
    db::{dialect::SqlDialect, error::DbResult, repos::CatalogRepo},
    models::{ColumnDescriptor, ColumnMetadata, TemporalValue},
};

/// Catalog over SQLite's `sqlite_master` and `pragma_table_info`.
///
/// A "schema" is an attached database name; the main file is `main`.
///
/// SQLite has no date type. Temporal columns hold ISO-8601 text (with a
/// space or `T` separator) or unix seconds as INTEGER or REAL, and the
/// earliest value is chosen after normalising all of them. Values SQLite
/// cannot read as a time are ignored.
pub struct SqliteCatalogRepo {
    pool: SqlitePool,
}

impl SqliteCatalogRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogRepo for SqliteCatalogRepo {
    async fn list_tables(&self, schema: &str) -> DbResult<Vec<String>> {
        let query = format!(
            r#"
            SELECT name
            FROM {}.sqlite_master
            WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
            ORDER BY name
            "#,
            SqlDialect::Sqlite.quote_ident(schema)
        );

        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(|row| row.get("name")).collect())
    }

    async fn date_time_columns(
        &self,
        schema: &str,
        table: &str,
    ) -> DbResult<Vec<ColumnDescriptor>> {
        let rows = sqlx::query(
            r#"
            SELECT name, type, "notnull"
            FROM pragma_table_info(?, ?)
            WHERE upper(type) LIKE '%DATE%' OR upper(type) LIKE '%TIMESTAMP%'
            ORDER BY cid
            "#,
        )
        .bind(table)
        .bind(schema)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| {
                let not_null: i64 = row.get("notnull");
                ColumnDescriptor::new(
                    row.get::<String, _>("name"),
                    row.get::<String, _>("type"),
                    not_null == 0,
                )
            })
            .collect())
    }

    async fn min_value(
        &self,
        schema: &str,
        table: &str,
        column: &str,
    ) -> DbResult<Option<TemporalValue>> {
        let dialect = SqlDialect::Sqlite;
        let column = dialect.quote_ident(column);
        // Order on a normalised timestamp: MIN over raw values would compare
        // text lexically and put numbers before all text.
        let key = format!(
            "CASE WHEN typeof({column}) IN ('integer', 'real') \
             THEN strftime('%Y-%m-%d %H:%M:%f', {column}, 'unixepoch') \
             ELSE strftime('%Y-%m-%d %H:%M:%f', {column}) END"
        );
        let query = format!(
            "SELECT {column} AS earliest, typeof({column}) AS kind FROM {} \
             WHERE {key} IS NOT NULL ORDER BY {key} LIMIT 1",
            dialect.qualified(schema, table)
        );

        let Some(row) = sqlx::query(&query).fetch_optional(&self.pool).await? else {
            return Ok(None);
        };

        let kind: String = row.get("kind");
        Ok(match kind.as_str() {
            "integer" => DateTime::from_timestamp(row.get::<i64, _>("earliest"), 0)
                .map(|dt| TemporalValue::DateTime(dt.naive_utc())),
            "real" => {
                let secs: f64 = row.get("earliest");
                DateTime::from_timestamp_micros((secs * 1_000_000.0).round() as i64)
                    .map(|dt| TemporalValue::DateTime(dt.naive_utc()))
            }
            "text" => TemporalValue::parse(&row.get::<String, _>("earliest")),
            _ => None,
        })
    }

    async fn table_columns(&self, schema: &str, table: &str) -> DbResult<Vec<ColumnMetadata>> {
        let rows = sqlx::query(
            r#"
            SELECT name, type, "notnull", dflt_value, pk
            FROM pragma_table_info(?, ?)
            ORDER BY cid
            "#,
        )
        .bind(table)
        .bind(schema)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| {
                let not_null: i64 = row.get("notnull");
                let pk: i64 = row.get("pk");
                ColumnMetadata {
                    name: row.get("name"),
                    data_type: row.get::<String, _>("type").to_ascii_lowercase(),
                    is_nullable: not_null == 0,
                    is_primary_key: pk > 0,
                    default: row.get("dflt_value"),
                }
            })
            .collect())
    }
}

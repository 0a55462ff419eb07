use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sqlx::{MySqlPool, Row};

use crate::{
    db::{dialect::SqlDialect, error::DbResult, repos::CatalogRepo},
    models::{ColumnDescriptor, ColumnMetadata, TemporalValue},
};

/// Catalog over MySQL's `information_schema`. A schema is a database.
///
/// information_schema columns are cast to CHAR because MySQL 8 reports some
/// of them with binary collations that do not decode as strings.
pub struct MySqlCatalogRepo {
    pool: MySqlPool,
}

impl MySqlCatalogRepo {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogRepo for MySqlCatalogRepo {
    async fn list_tables(&self, schema: &str) -> DbResult<Vec<String>> {
        let rows = sqlx::query(
            r#"
            SELECT CAST(TABLE_NAME AS CHAR) AS table_name
            FROM information_schema.TABLES
            WHERE TABLE_SCHEMA = ? AND TABLE_TYPE = 'BASE TABLE'
            ORDER BY TABLE_NAME
            "#,
        )
        .bind(schema)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(|row| row.get("table_name")).collect())
    }

    async fn date_time_columns(
        &self,
        schema: &str,
        table: &str,
    ) -> DbResult<Vec<ColumnDescriptor>> {
        let rows = sqlx::query(
            r#"
            SELECT CAST(COLUMN_NAME AS CHAR) AS column_name,
                   CAST(DATA_TYPE AS CHAR) AS data_type,
                   CAST(IS_NULLABLE AS CHAR) AS is_nullable
            FROM information_schema.COLUMNS
            WHERE TABLE_SCHEMA = ?
              AND TABLE_NAME = ?
              AND DATA_TYPE IN ('date', 'datetime', 'timestamp')
            ORDER BY ORDINAL_POSITION
            "#,
        )
        .bind(schema)
        .bind(table)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| {
                ColumnDescriptor::new(
                    row.get::<String, _>("column_name"),
                    row.get::<String, _>("data_type"),
                    row.get::<String, _>("is_nullable") == "YES",
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
        let dialect = SqlDialect::MySql;
        let column = dialect.quote_ident(column);
        let query = format!(
            "SELECT MIN({column}) AS earliest FROM {} WHERE {column} IS NOT NULL",
            dialect.qualified(schema, table)
        );

        let row = sqlx::query(&query).fetch_one(&self.pool).await?;

        // TIMESTAMP decodes as DateTime<Utc>, DATETIME as NaiveDateTime
        if let Ok(value) = row.try_get::<Option<DateTime<Utc>>, _>("earliest") {
            return Ok(value.map(|dt| TemporalValue::DateTime(dt.naive_utc())));
        }
        if let Ok(value) = row.try_get::<Option<NaiveDateTime>, _>("earliest") {
            return Ok(value.map(TemporalValue::DateTime));
        }
        if let Ok(value) = row.try_get::<Option<NaiveDate>, _>("earliest") {
            return Ok(value.map(TemporalValue::Date));
        }

        Ok(None)
    }

    async fn table_columns(&self, schema: &str, table: &str) -> DbResult<Vec<ColumnMetadata>> {
        let rows = sqlx::query(
            r#"
            SELECT CAST(COLUMN_NAME AS CHAR) AS column_name,
                   CAST(DATA_TYPE AS CHAR) AS data_type,
                   CAST(IS_NULLABLE AS CHAR) AS is_nullable,
                   CAST(COLUMN_KEY AS CHAR) AS column_key,
                   CAST(COLUMN_DEFAULT AS CHAR) AS column_default
            FROM information_schema.COLUMNS
            WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?
            ORDER BY ORDINAL_POSITION
            "#,
        )
        .bind(schema)
        .bind(table)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| ColumnMetadata {
                name: row.get("column_name"),
                data_type: row.get("data_type"),
                is_nullable: row.get::<String, _>("is_nullable") == "YES",
                is_primary_key: row.get::<String, _>("column_key") == "PRI",
                default: row.get("column_default"),
            })
            .collect())
    }
}

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sqlx::{PgPool, Row};

use crate::{
    db::{dialect::SqlDialect, error::DbResult, repos::CatalogRepo},
    models::{ColumnDescriptor, ColumnMetadata, TemporalValue},
};

pub struct PostgresCatalogRepo {
    pool: PgPool,
}

impl PostgresCatalogRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogRepo for PostgresCatalogRepo {
    async fn list_tables(&self, schema: &str) -> DbResult<Vec<String>> {
        let rows = sqlx::query(
            r#"
            SELECT table_name::text AS table_name
            FROM information_schema.tables
            WHERE table_schema = $1 AND table_type = 'BASE TABLE'
            ORDER BY table_name
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
            SELECT column_name::text AS column_name,
                   data_type::text AS data_type,
                   is_nullable::text AS is_nullable
            FROM information_schema.columns
            WHERE table_schema = $1
              AND table_name = $2
              AND data_type IN ('date', 'timestamp without time zone', 'timestamp with time zone')
            ORDER BY ordinal_position
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
        let dialect = SqlDialect::Postgres;
        let column = dialect.quote_ident(column);
        let query = format!(
            "SELECT MIN({column}) AS earliest FROM {} WHERE {column} IS NOT NULL",
            dialect.qualified(schema, table)
        );

        let row = sqlx::query(&query).fetch_one(&self.pool).await?;

        // timestamptz, timestamp and date decode to different chrono types
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
            SELECT c.column_name::text AS column_name,
                   c.data_type::text AS data_type,
                   c.is_nullable::text AS is_nullable,
                   c.column_default::text AS column_default,
                   EXISTS (
                       SELECT 1
                       FROM information_schema.table_constraints tc
                       JOIN information_schema.key_column_usage kcu
                         ON kcu.constraint_name = tc.constraint_name
                        AND kcu.table_schema = tc.table_schema
                        AND kcu.table_name = tc.table_name
                       WHERE tc.constraint_type = 'PRIMARY KEY'
                         AND tc.table_schema = c.table_schema
                         AND tc.table_name = c.table_name
                         AND kcu.column_name = c.column_name
                   ) AS is_primary_key
            FROM information_schema.columns c
            WHERE c.table_schema = $1 AND c.table_name = $2
            ORDER BY c.ordinal_position
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
                is_primary_key: row.get("is_primary_key"),
                default: row.get("column_default"),
            })
            .collect())
    }
}

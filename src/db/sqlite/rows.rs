use async_trait::async_trait;
use sqlx::SqlitePool;

use super::common::bind_value;
use crate::{
    db::{dialect::SqlDialect, error::DbResult, repos::RowRepo},
    models::{FakeColumnValue, FakeValue, InsertedKey},
};

const DIALECT: SqlDialect = SqlDialect::Sqlite;

pub struct SqliteRowRepo {
    pool: SqlitePool,
}

impl SqliteRowRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RowRepo for SqliteRowRepo {
    async fn select_sample(&self, schema: &str, table: &str) -> DbResult<u64> {
        let query = format!("SELECT * FROM {} LIMIT 1", DIALECT.qualified(schema, table));
        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;
        Ok(rows.len() as u64)
    }

    async fn insert_row(
        &self,
        schema: &str,
        table: &str,
        primary_key: Option<&str>,
        values: &[FakeColumnValue],
    ) -> DbResult<Option<InsertedKey>> {
        let columns: Vec<&str> = values.iter().map(|v| v.column.as_str()).collect();
        let sql = DIALECT.insert_statement(schema, table, &columns);

        let mut query = sqlx::query(&sql);
        for v in values {
            query = bind_value(query, &v.value);
        }
        let result = query.execute(&self.pool).await?;

        // The rowid is the key for INTEGER PRIMARY KEY tables, which is the
        // only kind of key the smoke test leaves to the engine.
        Ok(primary_key.map(|_| InsertedKey(result.last_insert_rowid().to_string())))
    }

    async fn update_row(
        &self,
        schema: &str,
        table: &str,
        column: &str,
        value: &FakeValue,
        primary_key: &str,
        key: &InsertedKey,
    ) -> DbResult<u64> {
        let sql = format!(
            "UPDATE {} SET {} = ? WHERE {} = ?",
            DIALECT.qualified(schema, table),
            DIALECT.quote_ident(column),
            DIALECT.quote_ident(primary_key),
        );

        let result = bind_value(sqlx::query(&sql), value)
            .bind(&key.0)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_row(
        &self,
        schema: &str,
        table: &str,
        primary_key: &str,
        key: &InsertedKey,
    ) -> DbResult<u64> {
        let sql = format!(
            "DELETE FROM {} WHERE {} = ?",
            DIALECT.qualified(schema, table),
            DIALECT.quote_ident(primary_key),
        );

        let result = sqlx::query(&sql).bind(&key.0).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

use async_trait::async_trait;
use sqlx::{MySql, MySqlPool, mysql::MySqlArguments, query::Query};

use crate::{
    db::{dialect::SqlDialect, error::DbResult, repos::RowRepo},
    models::{FakeColumnValue, FakeValue, InsertedKey},
};

const DIALECT: SqlDialect = SqlDialect::MySql;

pub struct MySqlRowRepo {
    pool: MySqlPool,
}

impl MySqlRowRepo {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

fn bind_value<'q>(
    query: Query<'q, MySql, MySqlArguments>,
    value: &FakeValue,
) -> Query<'q, MySql, MySqlArguments> {
    match value {
        FakeValue::Text(s) => query.bind(s.clone()),
        FakeValue::Int(i) => query.bind(*i),
        FakeValue::Float(f) => query.bind(*f),
        FakeValue::Date(d) => query.bind(*d),
        FakeValue::DateTime(dt) => query.bind(*dt),
        FakeValue::Bool(b) => query.bind(*b),
        FakeValue::Null => query.bind(Option::<String>::None),
    }
}

#[async_trait]
impl RowRepo for MySqlRowRepo {
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

        // last_insert_id is 0 unless the key is AUTO_INCREMENT
        Ok(match (primary_key, result.last_insert_id()) {
            (Some(_), id) if id > 0 => Some(InsertedKey(id.to_string())),
            _ => None,
        })
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

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Row, postgres::PgArguments, query::Query};

use crate::{
    db::{dialect::SqlDialect, error::DbResult, repos::RowRepo},
    models::{FakeColumnValue, FakeValue, InsertedKey},
};

const DIALECT: SqlDialect = SqlDialect::Postgres;

pub struct PostgresRowRepo {
    pool: PgPool,
}

impl PostgresRowRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Bind a non-null fake value. Nulls are written as SQL literals instead,
/// since a text-typed null parameter does not coerce to every column type.
fn bind_value<'q>(
    query: Query<'q, Postgres, PgArguments>,
    value: &FakeValue,
) -> Query<'q, Postgres, PgArguments> {
    match value {
        FakeValue::Text(s) => query.bind(s.clone()),
        FakeValue::Int(i) => query.bind(*i),
        FakeValue::Float(f) => query.bind(*f),
        FakeValue::Date(d) => query.bind(*d),
        FakeValue::DateTime(dt) => query.bind(*dt),
        FakeValue::Bool(b) => query.bind(*b),
        FakeValue::Null => query,
    }
}

#[async_trait]
impl RowRepo for PostgresRowRepo {
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
        // An omitted nullable column is inserted as NULL.
        let values: Vec<&FakeColumnValue> = values
            .iter()
            .filter(|v| v.value != FakeValue::Null)
            .collect();
        let columns: Vec<&str> = values.iter().map(|v| v.column.as_str()).collect();
        let mut sql = DIALECT.insert_statement(schema, table, &columns);

        let Some(pk) = primary_key else {
            let mut query = sqlx::query(&sql);
            for v in &values {
                query = bind_value(query, &v.value);
            }
            query.execute(&self.pool).await?;
            return Ok(None);
        };

        sql.push_str(&format!(
            " RETURNING {}::text AS inserted_key",
            DIALECT.quote_ident(pk)
        ));
        let mut query = sqlx::query(&sql);
        for v in &values {
            query = bind_value(query, &v.value);
        }
        let row = query.fetch_one(&self.pool).await?;

        Ok(row
            .get::<Option<String>, _>("inserted_key")
            .map(InsertedKey))
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
        let target = DIALECT.qualified(schema, table);
        let column = DIALECT.quote_ident(column);
        let pk = DIALECT.quote_ident(primary_key);

        let result = if *value == FakeValue::Null {
            let sql = format!("UPDATE {target} SET {column} = NULL WHERE {pk}::text = $1");
            sqlx::query(&sql).bind(&key.0).execute(&self.pool).await?
        } else {
            let sql = format!("UPDATE {target} SET {column} = $1 WHERE {pk}::text = $2");
            bind_value(sqlx::query(&sql), value)
                .bind(&key.0)
                .execute(&self.pool)
                .await?
        };
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
            "DELETE FROM {} WHERE {}::text = $1",
            DIALECT.qualified(schema, table),
            DIALECT.quote_ident(primary_key),
        );

        let result = sqlx::query(&sql).bind(&key.0).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

use sqlx::{Sqlite, query::Query, sqlite::SqliteArguments};

use crate::models::FakeValue;

/// Bind a fake value to the next placeholder.
///
/// SQLite stores dates as ISO text; chrono's encoders produce that form.
pub fn bind_value<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: &FakeValue,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
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

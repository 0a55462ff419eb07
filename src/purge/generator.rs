use chrono::NaiveDate;

use crate::{
    db::SqlDialect,
    models::{DeletionStatement, SchemaDeletionPlan},
};

/// Renders `DELETE` statements for classified tables.
///
/// Statements are text only and never executed. Rows dated on or before the
/// cutoff match.
#[derive(Debug, Clone, Copy)]
pub struct QueryGenerator {
    dialect: SqlDialect,
}

impl QueryGenerator {
    pub fn new(dialect: SqlDialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> SqlDialect {
        self.dialect
    }

    /// `None` when the table has no creation column.
    pub fn render(
        &self,
        table: &str,
        column: Option<&str>,
        cutoff: NaiveDate,
    ) -> Option<DeletionStatement> {
        let Some(column) = column else {
            tracing::debug!(table, "No creation column; no statement rendered");
            return None;
        };

        let text = format!(
            "DELETE FROM {} WHERE {} <= '{}';",
            self.dialect.quote_ident(table),
            self.dialect.quote_ident(column),
            cutoff.format("%Y-%m-%d"),
        );

        Some(DeletionStatement {
            table_name: table.to_string(),
            column_name: column.to_string(),
            cutoff_date: cutoff,
            text,
        })
    }

    /// Render every `(table, column)` pair, keeping input order and
    /// dropping tables without a column.
    pub fn generate_for_schema<I>(
        &self,
        schema: &str,
        mapping: I,
        cutoff: NaiveDate,
    ) -> SchemaDeletionPlan
    where
        I: IntoIterator<Item = (String, Option<String>)>,
    {
        let mut plan = SchemaDeletionPlan::new(schema, cutoff);
        for (table, column) in mapping {
            if let Some(statement) = self.render(&table, column.as_deref(), cutoff) {
                plan.insert(statement);
            }
        }
        plan
    }
}

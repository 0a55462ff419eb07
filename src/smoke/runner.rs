use std::{collections::HashMap, sync::Arc};

use thiserror::Error;

use super::fake::FakeDataGenerator;
use crate::{
    db::{CatalogRepo, DbError, RowRepo},
    models::{
        ColumnMetadata, FakeColumnValue, InsertedKey, SmokeReport, StepOutcome, TableSmokeResult,
    },
};

const TARGET: &str = "datesweep::smoke";

/// Why a smoke step did not succeed.
#[derive(Debug, Error)]
pub enum SmokeError {
    #[error("no primary key")]
    NoPrimaryKey,

    #[error("no inserted row")]
    NoInsertedRow,

    #[error("no updatable column")]
    NoUpdatableColumn,

    #[error("{statement} affected no rows")]
    NothingAffected { statement: &'static str },

    #[error(transparent)]
    Database(#[from] DbError),
}

/// State carried across the tables of one smoke run.
pub struct SmokeRun {
    schema: String,
    fake: FakeDataGenerator,
    /// Key of the row inserted into each table that has not been deleted yet
    inserted: HashMap<String, InsertedKey>,
    report: SmokeReport,
}

impl SmokeRun {
    pub fn new(schema: impl Into<String>, seed: Option<u64>) -> Self {
        let schema = schema.into();
        Self {
            report: SmokeReport {
                schema: schema.clone(),
                tables: Vec::new(),
            },
            schema,
            fake: FakeDataGenerator::new(seed),
            inserted: HashMap::new(),
        }
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Rows inserted by this run that were left behind.
    pub fn leftover_rows(&self) -> impl Iterator<Item = (&str, &InsertedKey)> {
        self.inserted.iter().map(|(t, k)| (t.as_str(), k))
    }

    pub fn into_report(self) -> SmokeReport {
        self.report
    }
}

/// Runs SELECT, INSERT, UPDATE and DELETE against each table with fake data.
///
/// Steps are independent. A failed step is logged and recorded, and the
/// next step still runs.
pub struct SmokeRunner {
    catalog: Arc<dyn CatalogRepo>,
    rows: Arc<dyn RowRepo>,
}

impl SmokeRunner {
    pub fn new(catalog: Arc<dyn CatalogRepo>, rows: Arc<dyn RowRepo>) -> Self {
        Self { catalog, rows }
    }

    pub async fn run(&self, schema: &str, tables: &[String], seed: Option<u64>) -> SmokeReport {
        let mut run = SmokeRun::new(schema, seed);
        for table in tables {
            let result = self.run_table(&mut run, table).await;
            run.report.tables.push(result);
        }

        for (table, key) in run.leftover_rows() {
            tracing::warn!(target: TARGET, table, key = %key, "Inserted row was not deleted");
        }

        let report = run.into_report();
        tracing::info!(
            target: TARGET,
            schema,
            tables = report.tables.len(),
            failures = report.failures(),
            "Smoke test finished"
        );
        report
    }

    pub async fn run_table(&self, run: &mut SmokeRun, table: &str) -> TableSmokeResult {
        let schema = run.schema.clone();

        let columns = match self.catalog.table_columns(&schema, table).await {
            Ok(columns) if !columns.is_empty() => columns,
            Ok(_) => {
                tracing::warn!(target: TARGET, table, "No column metadata; skipping table");
                return TableSmokeResult::skipped(table, "no column metadata");
            }
            Err(e) => {
                tracing::warn!(target: TARGET, table, error = %e, "Failed to read column metadata; skipping table");
                return TableSmokeResult::skipped(table, "no column metadata");
            }
        };

        let primary_key = columns
            .iter()
            .find(|c| c.is_primary_key)
            .map(|c| c.name.clone());
        if primary_key.is_none() {
            tracing::warn!(target: TARGET, table, "Table has no primary key; UPDATE and DELETE will fail");
        }

        let writable: Vec<&ColumnMetadata> = columns
            .iter()
            .filter(|c| !c.is_primary_key && !c.has_default())
            .collect();

        let select = self.select(&schema, table).await;
        let select = record(table, "SELECT", select);

        let insert = self
            .insert(run, &schema, table, primary_key.as_deref(), &writable)
            .await;
        let insert = record(table, "INSERT", insert);

        let update = self
            .update(run, &schema, table, primary_key.as_deref(), writable.first().copied())
            .await;
        let update = record(table, "UPDATE", update);

        let delete = self.delete(run, &schema, table, primary_key.as_deref()).await;
        let delete = record(table, "DELETE", delete);

        TableSmokeResult {
            table: table.to_string(),
            select,
            insert,
            update,
            delete,
        }
    }

    async fn select(&self, schema: &str, table: &str) -> Result<(), SmokeError> {
        let count = self.rows.select_sample(schema, table).await?;
        tracing::debug!(target: TARGET, table, rows = count, "Sample selected");
        Ok(())
    }

    async fn insert(
        &self,
        run: &mut SmokeRun,
        schema: &str,
        table: &str,
        primary_key: Option<&str>,
        writable: &[&ColumnMetadata],
    ) -> Result<(), SmokeError> {
        let values: Vec<FakeColumnValue> = writable
            .iter()
            .map(|c| FakeColumnValue {
                column: c.name.clone(),
                value: run.fake.value_for(c),
            })
            .collect();

        let key = self
            .rows
            .insert_row(schema, table, primary_key, &values)
            .await?;

        match key {
            Some(key) => {
                tracing::debug!(target: TARGET, table, key = %key, "Row inserted");
                run.inserted.insert(table.to_string(), key);
            }
            None => tracing::debug!(target: TARGET, table, "Row inserted without a key"),
        }
        Ok(())
    }

    async fn update(
        &self,
        run: &mut SmokeRun,
        schema: &str,
        table: &str,
        primary_key: Option<&str>,
        column: Option<&ColumnMetadata>,
    ) -> Result<(), SmokeError> {
        let primary_key = primary_key.ok_or(SmokeError::NoPrimaryKey)?;
        let key = run.inserted.get(table).ok_or(SmokeError::NoInsertedRow)?;
        let column = column.ok_or(SmokeError::NoUpdatableColumn)?;

        let value = run.fake.value_for(column);
        let affected = self
            .rows
            .update_row(schema, table, &column.name, &value, primary_key, key)
            .await?;
        if affected == 0 {
            return Err(SmokeError::NothingAffected {
                statement: "UPDATE",
            });
        }
        tracing::debug!(target: TARGET, table, column = %column.name, value = %value, "Row updated");
        Ok(())
    }

    async fn delete(
        &self,
        run: &mut SmokeRun,
        schema: &str,
        table: &str,
        primary_key: Option<&str>,
    ) -> Result<(), SmokeError> {
        let primary_key = primary_key.ok_or(SmokeError::NoPrimaryKey)?;
        let key = run.inserted.get(table).ok_or(SmokeError::NoInsertedRow)?;

        let affected = self
            .rows
            .delete_row(schema, table, primary_key, key)
            .await?;
        if affected == 0 {
            return Err(SmokeError::NothingAffected {
                statement: "DELETE",
            });
        }
        run.inserted.remove(table);
        tracing::debug!(target: TARGET, table, "Row deleted");
        Ok(())
    }
}

fn record(table: &str, step: &str, result: Result<(), SmokeError>) -> StepOutcome {
    match result {
        Ok(()) => {
            tracing::info!(target: TARGET, table, step, "Step succeeded");
            StepOutcome::Succeeded
        }
        Err(SmokeError::NoUpdatableColumn) => {
            tracing::info!(target: TARGET, table, step, "Nothing to update");
            StepOutcome::Skipped(SmokeError::NoUpdatableColumn.to_string())
        }
        Err(e) => {
            tracing::error!(target: TARGET, table, step, error = %e, "Step failed");
            StepOutcome::Failed(e.to_string())
        }
    }
}

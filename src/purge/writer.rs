use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::SchemaDeletionPlan;

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("Failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Writes one `.sql` file per schema plan.
#[derive(Debug, Clone)]
pub struct FileWriter {
    directory: PathBuf,
}

impl FileWriter {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// `<dir>/<schema>_<YYYY-MM-DD>.sql` for a run on `run_date`.
    pub fn path_for(&self, schema: &str, run_date: NaiveDate) -> PathBuf {
        self.directory
            .join(format!("{schema}_{}.sql", run_date.format("%Y-%m-%d")))
    }

    /// Write the plan and return the file path. An empty plan writes
    /// nothing and returns `None`. An existing file for the same schema
    /// and date is overwritten.
    pub async fn write_plan(
        &self,
        plan: &SchemaDeletionPlan,
        run_date: NaiveDate,
    ) -> Result<Option<PathBuf>, WriteError> {
        if plan.is_empty() {
            tracing::info!(schema = %plan.schema, "No statements generated; nothing to write");
            return Ok(None);
        }

        tokio::fs::create_dir_all(&self.directory)
            .await
            .map_err(|source| WriteError::CreateDir {
                path: self.directory.clone(),
                source,
            })?;

        let path = self.path_for(&plan.schema, run_date);
        tokio::fs::write(&path, render_plan(plan))
            .await
            .map_err(|source| WriteError::Write {
                path: path.clone(),
                source,
            })?;

        tracing::info!(
            schema = %plan.schema,
            path = %path.display(),
            statements = plan.len(),
            "Wrote deletion statements"
        );
        Ok(Some(path))
    }
}

/// The file body: a comment line, the statement and a blank line per table.
pub fn render_plan(plan: &SchemaDeletionPlan) -> String {
    let mut out = String::new();
    for statement in plan.statements() {
        out.push_str("-- Queries for table: ");
        out.push_str(&statement.table_name);
        out.push('\n');
        out.push_str(&statement.text);
        out.push_str("\n\n");
    }
    out
}
